//! Ordered, nested dictionaries (city → zone → town → village, group → pummok)
//! and the option builders that walk them.
//!
//! A selection is a list of [`Pick`]s, one per level from the root down. The
//! nodes reachable at depth `n` are found by expanding the roots through the
//! first `n` picks.

use serde::Deserialize;
use std::collections::HashSet;

/// A named node with its children, in the order the dictionary declares them.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Node {
    pub name: String,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    pub fn leaf(name: &str) -> Self {
        Self { name: name.to_string(), children: Vec::new() }
    }

    pub fn branch(name: &str, children: Vec<Node>) -> Self {
        Self { name: name.to_string(), children }
    }
}

/// What is selected at one level.
///
/// `All` places no restriction on the level. `Only(vec![])` means nothing is
/// selected and admits no child, which is how an unset city is expressed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pick {
    All,
    Only(Vec<String>),
}

impl Default for Pick {
    fn default() -> Self {
        Pick::All
    }
}

impl Pick {
    pub fn one(name: &str) -> Self {
        Pick::Only(vec![name.to_string()])
    }

    pub fn none() -> Self {
        Pick::Only(Vec::new())
    }

    pub fn admits(&self, name: &str) -> bool {
        match self {
            Pick::All => true,
            Pick::Only(names) => names.iter().any(|n| n == name),
        }
    }

    pub fn is_cleared(&self) -> bool {
        matches!(self, Pick::Only(names) if names.is_empty())
    }

    /// Explicitly picked names, `None` for `All`.
    pub fn names(&self) -> Option<&[String]> {
        match self {
            Pick::All => None,
            Pick::Only(names) => Some(names),
        }
    }

    /// Adds or removes `name`; toggling the last explicit pick off returns to `All`.
    pub fn toggle(&mut self, name: &str) {
        match self {
            Pick::All => *self = Pick::one(name),
            Pick::Only(names) => {
                if let Some(pos) = names.iter().position(|n| n == name) {
                    names.remove(pos);
                    if names.is_empty() {
                        *self = Pick::All;
                    }
                } else {
                    names.push(name.to_string());
                }
            }
        }
    }

    /// Drops explicit picks missing from `options`; a pick emptied this way
    /// resets to `All`.
    pub fn retain_valid(&mut self, options: &[String]) {
        if let Pick::Only(names) = self {
            if names.is_empty() {
                return;
            }
            names.retain(|n| options.contains(n));
            if names.is_empty() {
                *self = Pick::All;
            }
        }
    }
}

/// A forest of [`Node`]s.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hierarchy {
    roots: Vec<Node>,
}

impl Hierarchy {
    pub fn new(roots: Vec<Node>) -> Self {
        Self { roots }
    }

    pub fn from_json(bytes: &[u8]) -> crate::error::Result<Self> {
        let roots: Vec<Node> = serde_json::from_slice(bytes)?;
        Ok(Self { roots })
    }

    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    /// Nodes reachable at depth `picks.len()`, deduplicated by name, first
    /// occurrence wins.
    pub fn nodes_at(&self, picks: &[Pick]) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.roots.iter().collect();
        for pick in picks {
            if nodes.is_empty() {
                break;
            }
            let mut seen = HashSet::new();
            nodes = nodes
                .iter()
                .copied()
                .filter(|n| pick.admits(&n.name))
                .flat_map(|n| n.children.iter())
                .filter(|c| seen.insert(c.name.as_str()))
                .collect();
        }
        nodes
    }

    /// Option labels for the level below `picks`.
    pub fn options(&self, picks: &[Pick]) -> Vec<String> {
        self.nodes_at(picks).into_iter().map(|n| n.name.clone()).collect()
    }

    /// Re-validates level `changed` and every level below it.
    ///
    /// Explicit picks no longer derivable from the level above are dropped.
    /// A level left with no valid pick, or whose parent yields no options,
    /// goes back to `All`.
    pub fn cascade(&self, picks: &mut [Pick], changed: usize) {
        for depth in changed..picks.len() {
            let options = self.options(&picks[..depth]);
            if options.is_empty() {
                picks[depth] = Pick::All;
            } else {
                picks[depth].retain_valid(&options);
            }
        }
    }
}
