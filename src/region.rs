use crate::hierarchy::{Hierarchy, Pick};
use std::fmt;
use std::str::FromStr;

/// Administrative levels: 행정시 → 권역 → 읍면 → 리동
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegionLevel {
    City,
    Zone,
    Town,
    Village,
}

impl RegionLevel {
    pub const ALL: [RegionLevel; 4] = [Self::City, Self::Zone, Self::Town, Self::Village];

    pub fn depth(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::City => "행정시",
            Self::Zone => "권역",
            Self::Town => "읍면",
            Self::Village => "리동",
        }
    }

    /// Feature property carrying the name of the region at this level.
    pub fn property(self) -> &'static str {
        match self {
            Self::City => "city",
            Self::Zone => "zone",
            Self::Town => "town",
            Self::Village => "village",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::City => Self::Zone,
            Self::Zone => Self::Town,
            Self::Town => Self::Village,
            Self::Village => Self::City,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::City => Self::Village,
            Self::Zone => Self::City,
            Self::Town => Self::Zone,
            Self::Village => Self::Town,
        }
    }
}

impl fmt::Display for RegionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.property())
    }
}

impl FromStr for RegionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RegionLevel::ALL
            .into_iter()
            .find(|l| l.property() == s || l.label() == s)
            .ok_or_else(|| format!("unknown region level: {s}"))
    }
}

/// The user's path through the region dictionary plus the display level (구분).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionSelection {
    pub level: RegionLevel,
    picks: [Pick; 4],
}

impl Default for RegionSelection {
    fn default() -> Self {
        Self {
            level: RegionLevel::City,
            picks: [Pick::none(), Pick::All, Pick::All, Pick::All],
        }
    }
}

impl RegionSelection {
    pub fn city(&self) -> Option<&str> {
        match &self.picks[0] {
            Pick::Only(names) => names.first().map(String::as_str),
            Pick::All => None,
        }
    }

    pub fn pick(&self, level: RegionLevel) -> &Pick {
        &self.picks[level.depth()]
    }

    pub fn zones(&self) -> &Pick {
        self.pick(RegionLevel::Zone)
    }

    pub fn towns(&self) -> &Pick {
        self.pick(RegionLevel::Town)
    }

    pub fn villages(&self) -> &Pick {
        self.pick(RegionLevel::Village)
    }

    /// No city chosen means the region narrows nothing.
    pub fn is_empty(&self) -> bool {
        self.city().is_none()
    }

    pub fn options(&self, dict: &Hierarchy, level: RegionLevel) -> Vec<String> {
        dict.options(&self.picks[..level.depth()])
    }

    pub fn set_city(&mut self, dict: &Hierarchy, city: Option<&str>) {
        let pick = match city {
            Some(c) => Pick::one(c),
            None => Pick::none(),
        };
        self.set(dict, RegionLevel::City, pick);
    }

    /// Replaces one level's pick and cascade-clears every level below it.
    pub fn set(&mut self, dict: &Hierarchy, level: RegionLevel, pick: Pick) {
        let pick = match (level, pick) {
            // the city is single-valued
            (RegionLevel::City, Pick::All) => Pick::none(),
            (RegionLevel::City, Pick::Only(mut names)) => {
                names.truncate(1);
                Pick::Only(names)
            }
            (_, pick) => pick,
        };
        self.picks[level.depth()] = pick;
        dict.cascade(&mut self.picks, level.depth());
        // an unknown city must not widen to every city
        if self.picks[0] == Pick::All {
            self.picks[0] = Pick::none();
            dict.cascade(&mut self.picks, 1);
        }
    }

    /// Toggles `name` in a multi-valued level, cascading afterwards.
    pub fn toggle(&mut self, dict: &Hierarchy, level: RegionLevel, name: &str) {
        if level == RegionLevel::City {
            let next = if self.city() == Some(name) { None } else { Some(name) };
            self.set_city(dict, next);
            return;
        }
        let mut pick = self.picks[level.depth()].clone();
        pick.toggle(name);
        self.set(dict, level, pick);
    }

    /// Region names of the current display level that the selection admits.
    pub fn visible(&self, dict: &Hierarchy) -> Vec<String> {
        let depth = self.level.depth();
        dict.nodes_at(&self.picks[..depth])
            .into_iter()
            .filter(|n| self.picks[depth].admits(&n.name))
            .map(|n| n.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::tests::sample;

    #[test]
    fn starts_with_no_city_and_all_below() {
        let sel = RegionSelection::default();
        let dict = sample();
        assert!(sel.is_empty());
        assert_eq!(sel.towns(), &Pick::All);
        assert!(sel.options(&dict, RegionLevel::Zone).is_empty());
        assert_eq!(sel.options(&dict, RegionLevel::City).len(), 2);
    }

    #[test]
    fn clearing_city_clears_town() {
        let dict = sample();
        let mut sel = RegionSelection::default();
        sel.set_city(&dict, Some("제주시"));
        sel.set(&dict, RegionLevel::Town, Pick::one("한림읍"));
        assert_eq!(sel.towns(), &Pick::one("한림읍"));

        sel.set_city(&dict, None);
        assert_eq!(sel.towns(), &Pick::All);
        assert!(sel.options(&dict, RegionLevel::Town).is_empty());
    }

    #[test]
    fn switching_city_drops_foreign_towns() {
        let dict = sample();
        let mut sel = RegionSelection::default();
        sel.set_city(&dict, Some("제주시"));
        sel.toggle(&dict, RegionLevel::Town, "한림읍");
        sel.toggle(&dict, RegionLevel::Village, "협재리");
        sel.set_city(&dict, Some("서귀포시"));
        assert_eq!(sel.towns(), &Pick::All);
        assert_eq!(sel.villages(), &Pick::All);
        assert_eq!(sel.options(&dict, RegionLevel::Town), vec!["성산읍", "표선면"]);
    }

    #[test]
    fn picks_outside_the_dictionary_are_rejected() {
        let dict = sample();
        let mut sel = RegionSelection::default();
        sel.set_city(&dict, Some("부산시"));
        assert_eq!(sel.city(), None);
        assert!(sel.options(&dict, RegionLevel::Zone).is_empty());

        sel.set_city(&dict, Some("제주시"));
        sel.set(&dict, RegionLevel::Town, Pick::one("성산읍"));
        assert_eq!(sel.towns(), &Pick::All);
        sel.set(&dict, RegionLevel::Town, Pick::Only(vec!["성산읍".into(), "한림읍".into()]));
        assert_eq!(sel.towns(), &Pick::one("한림읍"));
    }

    #[test]
    fn city_only_holds_one_name() {
        let dict = sample();
        let mut sel = RegionSelection::default();
        sel.set(&dict, RegionLevel::City, Pick::Only(vec!["제주시".into(), "서귀포시".into()]));
        assert_eq!(sel.city(), Some("제주시"));
        sel.toggle(&dict, RegionLevel::City, "제주시");
        assert_eq!(sel.city(), None);
    }

    #[test]
    fn visible_respects_display_level() {
        let dict = sample();
        let mut sel = RegionSelection::default();
        sel.set_city(&dict, Some("제주시"));
        sel.level = RegionLevel::Town;
        assert_eq!(sel.visible(&dict), vec!["한림읍", "애월읍", "구좌읍"]);
        sel.toggle(&dict, RegionLevel::Town, "구좌읍");
        assert_eq!(sel.visible(&dict), vec!["구좌읍"]);
    }

    #[test]
    fn parses_levels_by_key_or_label() {
        assert_eq!("town".parse::<RegionLevel>(), Ok(RegionLevel::Town));
        assert_eq!("리동".parse::<RegionLevel>(), Ok(RegionLevel::Village));
        assert!("province".parse::<RegionLevel>().is_err());
    }
}
