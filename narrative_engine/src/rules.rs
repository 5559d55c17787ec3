//! Guards and effects: the condition, action, and command model.
//!
//! Conditions are pure predicates over the flag store. Actions describe
//! effects; the level applies the subset that mutates its own state
//! immediately and wraps the rest as host-directed [`Command`]s. Both sets
//! are closed enums matched exhaustively, so adding a kind updates exactly
//! one match site per consumer.

use serde::{Deserialize, Serialize};

use dungeon_world::{Conversation, NpcDefinition, NpcId, Position, RoomId, Tile};

use crate::flags::FlagStore;

/// A pure predicate over the flag store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    FlagSet(String),
    FlagNotSet(String),
}

impl Condition {
    pub fn holds(&self, flags: &FlagStore) -> bool {
        match self {
            Condition::FlagSet(name) => flags.is_set(name),
            Condition::FlagNotSet(name) => !flags.is_set(name),
        }
    }
}

/// Navigation strategies the host can install on the hero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeroStrategy {
    /// Head for the goal, exploring through doors.
    GoalSeeking,
    /// Approach the named NPC and interact.
    NpcSeeking(NpcId),
}

/// A tagged effect description executed by a matched trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    // Applied by the level itself, visible to the very next evaluation.
    SetFlag(String),
    ClearFlag(String),
    /// Target must be a declared state; checked at build time.
    TransitionTo(String),
    /// Sets the completion flag and tells the host to stop the segment.
    EndLevel,

    // Deferred to the host as commands.
    PlayVideo {
        path: String,
        start_secs: f32,
        duration_secs: f32,
    },
    ShowConversation(Conversation),
    AddNpc(NpcDefinition),
    RemoveNpc(NpcId),
    MoveNpc {
        npc: NpcId,
        room: RoomId,
        tile: Position,
    },
    PlaceGoal(RoomId),
    RemoveGoal,
    /// Patches the level's own grid and asks the host to re-render the cell.
    SetTile {
        tile: Position,
        kind: Tile,
    },
    SetHeroStrategy(HeroStrategy),
    ResetHeroMemory,
}

/// A host-directed effect emitted by the state machine.
///
/// Each command carries exactly the parameters of its originating action.
/// The host must apply commands in the order given: later commands may
/// depend on the world state left by earlier ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    EndLevel,
    PlayVideo {
        path: String,
        start_secs: f32,
        duration_secs: f32,
    },
    ShowConversation(Conversation),
    AddNpc(NpcDefinition),
    RemoveNpc(NpcId),
    MoveNpc {
        npc: NpcId,
        room: RoomId,
        tile: Position,
    },
    PlaceGoal(RoomId),
    RemoveGoal,
    SetTile {
        tile: Position,
        kind: Tile,
    },
    SetHeroStrategy(HeroStrategy),
    ResetHeroMemory,
}
