//! Username -> preferred symbol mapping

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maps usernames to the symbol their particles should use.
///
/// Lookup tries an exact match first, then a case-insensitive one. The map
/// is only ever replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, String>", into = "HashMap<String, String>")]
pub struct UserSymbolMap {
    exact: HashMap<String, String>,
    folded: HashMap<String, String>,
}

impl UserSymbolMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the symbol for `username`, if one is mapped
    pub fn resolve(&self, username: &str) -> Option<&str> {
        self.exact
            .get(username)
            .or_else(|| self.folded.get(&username.to_lowercase()))
            .map(|s| s.as_str())
    }

    /// Pick the symbol a particle should use: mapped symbol, else the hint
    pub fn resolve_or<'a>(&'a self, username: Option<&str>, hint: &'a str) -> &'a str {
        username
            .and_then(|name| self.resolve(name))
            .unwrap_or(hint)
    }

    pub fn len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }
}

impl From<HashMap<String, String>> for UserSymbolMap {
    fn from(exact: HashMap<String, String>) -> Self {
        // Names that fold together resolve to the first in sorted order
        let mut names: Vec<&String> = exact.keys().collect();
        names.sort();
        let mut folded = HashMap::new();
        for name in names {
            folded
                .entry(name.to_lowercase())
                .or_insert_with(|| exact[name].clone());
        }
        Self { exact, folded }
    }
}

impl From<UserSymbolMap> for HashMap<String, String> {
    fn from(map: UserSymbolMap) -> Self {
        map.exact
    }
}
