//! Named persistent booleans used as narrative memory.
//!
//! Flags are scoped to one level instance: rebuilding a level starts from an
//! empty store. A name that was never set reads as false.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Mapping of flag name to boolean, owned by the level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlagStore {
    flags: HashMap<String, bool>,
}

impl FlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absent names read as false.
    pub fn is_set(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn set(&mut self, name: &str) {
        debug!(flag = name, "flag set");
        self.flags.insert(name.to_string(), true);
    }

    pub fn clear(&mut self, name: &str) {
        debug!(flag = name, "flag cleared");
        self.flags.insert(name.to_string(), false);
    }

    /// Names currently set to true, for diagnostics.
    pub fn set_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .flags
            .iter()
            .filter(|(_, value)| **value)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}
