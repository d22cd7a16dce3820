//! Name deduplication

use rustc_hash::{FxHashMap, FxHashSet};

/// Set of names in use within one function (or the module)
///
/// Asking for a name that is taken yields `name.1`, `name.2`, ... The empty
/// name is reserved, so unnamed temporaries come out as `.1`, `.2`, ...
#[derive(Debug, Clone)]
pub struct NameScope {
    used: FxHashSet<String>,
    suffixes: FxHashMap<String, u32>,
}

impl Default for NameScope {
    fn default() -> Self {
        let mut used = FxHashSet::default();
        used.insert(String::new());
        Self {
            used,
            suffixes: FxHashMap::default(),
        }
    }
}

impl NameScope {
    /// Create a scope where only the empty name is taken
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `name`, or the first free `name.N`, and return what was claimed
    pub fn deduplicate(&mut self, name: &str) -> String {
        let mut candidate = name.to_owned();
        while self.used.contains(&candidate) {
            let suffix = self.suffixes.entry(name.to_owned()).or_insert(0);
            *suffix += 1;
            candidate = format!("{name}.{suffix}");
        }
        self.used.insert(candidate.clone());
        candidate
    }

    /// Whether `name` is taken
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.used.contains(name)
    }
}
