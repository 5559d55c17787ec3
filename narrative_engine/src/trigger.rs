//! Trigger rules: (state, event pattern, conditions) -> ordered actions.

use serde::{Deserialize, Serialize};

use crate::events::EventFilter;
use crate::flags::FlagStore;
use crate::rules::{Action, Condition};

/// Which source state a trigger listens in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateMatch {
    /// Wildcard: the trigger is live in every state.
    Any,
    In(String),
}

impl StateMatch {
    pub fn in_state(state: impl Into<String>) -> Self {
        StateMatch::In(state.into())
    }

    pub fn matches(&self, current: &str) -> bool {
        match self {
            StateMatch::Any => true,
            StateMatch::In(state) => state == current,
        }
    }
}

/// A rule binding (state, event pattern, conditions) to an ordered action
/// list. Declared at level-build time, immutable afterwards.
///
/// Multiple triggers may share the same (state, event); the first whose
/// filter and conditions all match wins, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    /// Diagnostic label, shown in logs when the trigger fires.
    pub name: String,
    pub source: StateMatch,
    pub filter: EventFilter,
    /// All must hold (AND), evaluated in order with short-circuit.
    pub conditions: Vec<Condition>,
    /// Executed in declaration order.
    pub actions: Vec<Action>,
}

impl Trigger {
    pub fn new(name: impl Into<String>, source: StateMatch, filter: EventFilter) -> Self {
        Self {
            name: name.into(),
            source,
            filter,
            conditions: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn then(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// AND over the conditions, short-circuiting on the first failure.
    pub fn conditions_hold(&self, flags: &FlagStore) -> bool {
        self.conditions.iter().all(|c| c.holds(flags))
    }
}
