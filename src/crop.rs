use crate::hierarchy::{Hierarchy, Pick};

/// 부류 → 품목 selection over the crop taxonomy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CropSelection {
    picks: [Pick; 2],
}

impl CropSelection {
    pub fn groups(&self) -> &Pick {
        &self.picks[0]
    }

    pub fn items(&self) -> &Pick {
        &self.picks[1]
    }

    pub fn group_options(&self, dict: &Hierarchy) -> Vec<String> {
        dict.options(&[])
    }

    pub fn item_options(&self, dict: &Hierarchy) -> Vec<String> {
        dict.options(&self.picks[..1])
    }

    pub fn toggle_group(&mut self, dict: &Hierarchy, name: &str) {
        self.picks[0].toggle(name);
        dict.cascade(&mut self.picks, 0);
    }

    pub fn toggle_item(&mut self, dict: &Hierarchy, name: &str) {
        self.picks[1].toggle(name);
        dict.cascade(&mut self.picks, 1);
    }

    /// Selection holding exactly `items`, with their groups picked. Names
    /// missing from the taxonomy are dropped.
    pub fn from_items(dict: &Hierarchy, items: &[String]) -> Self {
        let mut groups = Vec::new();
        let mut kept = Vec::new();
        for item in items {
            let Some(group) = dict.roots().iter().find(|g| g.children.iter().any(|c| &c.name == item)) else {
                continue;
            };
            if !groups.contains(&group.name) {
                groups.push(group.name.clone());
            }
            if !kept.contains(item) {
                kept.push(item.clone());
            }
        }
        if kept.is_empty() {
            return Self::default();
        }
        Self { picks: [Pick::Only(groups), Pick::Only(kept)] }
    }

    /// Pummok names the selection narrows to; empty when nothing narrows.
    pub fn resolve(&self, dict: &Hierarchy) -> Vec<String> {
        match (self.groups(), self.items()) {
            (_, Pick::Only(items)) => items.clone(),
            (Pick::Only(_), Pick::All) => self.item_options(dict),
            (Pick::All, Pick::All) => Vec::new(),
        }
    }
}
