//! Built-in levels and the level registry.

use std::collections::HashMap;

use tracing::debug;

use crate::level::LevelBlueprint;

pub mod simple_gate;

type LevelFactory = Box<dyn Fn() -> LevelBlueprint>;

/// Name-indexed level factories. Each `create` call returns a fresh
/// blueprint, so replays never share state.
#[derive(Default)]
pub struct LevelRegistry {
    factories: HashMap<String, LevelFactory>,
}

impl LevelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with every built-in level.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("simple_gate", simple_gate::blueprint);
        registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> LevelBlueprint + 'static,
    {
        let name = name.into();
        debug!(level = %name, "level registered");
        self.factories.insert(name, Box::new(factory));
    }

    /// Instantiate a fresh blueprint, or `None` for an unknown name.
    pub fn create(&self, name: &str) -> Option<LevelBlueprint> {
        self.factories.get(name).map(|factory| factory())
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
