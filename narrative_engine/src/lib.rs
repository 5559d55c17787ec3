//! # Narrative Engine
//!
//! The "brain" of the dungeon stream: a declarative trigger engine over a
//! flat level state machine. This crate consumes world events from the host
//! (hero movement, NPC interaction, playback ends) and answers with ordered
//! command lists; it never touches rendering or pathfinding itself.
//!
//! ## Core Components
//!
//! - **events**: World event types, kinds, and field-level event filters
//! - **bus**: Synchronous publish-subscribe bus with breadth-first re-emission
//! - **flags**: The per-level boolean flag store triggers guard on
//! - **rules**: Conditions, actions, and host-directed commands
//! - **trigger**: (state, event pattern, conditions) -> ordered actions
//! - **level**: Level blueprints and the built level state machine
//! - **runtime**: Wires a level to a [`CommandHost`] over the bus
//! - **validation**: Whole-declaration static analysis with collected issues
//! - **level_file**: TOML level authoring
//! - **levels**: Built-in levels and the level registry
//!
//! ## Design Philosophy
//!
//! - **State-Driven**: Trigger selection depends only on the current state,
//!   the flag store, and the incoming event
//! - **Event-Driven**: The engine reacts to world events, never controlling
//!   the host's loop
//! - **Declarative**: Levels are data; the same blueprint can come from the
//!   builder API or a TOML file

pub mod bus;
pub mod events;
pub mod flags;
pub mod level;
pub mod level_file;
pub mod levels;
pub mod rules;
pub mod runtime;
pub mod trigger;
pub mod validation;

pub use bus::*;
pub use events::*;
pub use flags::*;
pub use level::*;
pub use level_file::*;
pub use levels::LevelRegistry;
pub use rules::*;
pub use runtime::*;
pub use trigger::*;
pub use validation::*;
