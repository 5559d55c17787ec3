//! NPC definitions and the live placement records they become.
//!
//! Definitions are declared at authoring time; the builder materializes them
//! into [`LiveNpc`] records once room origins are resolved. At runtime NPCs
//! are removed, re-added, or moved only through engine actions, never by
//! direct mutation of the layout.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conversation::Conversation;
use crate::room::RoomId;
use crate::tiles::Position;

/// Unique identifier for an NPC within a level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NpcId(pub String);

impl NpcId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NpcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NpcId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NpcId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// An NPC declaration: who stands where, and what they say.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcDefinition {
    pub id: NpcId,
    /// The room that owns this NPC.
    pub room: RoomId,
    /// Tile position local to the owning room.
    pub tile: Position,
    /// Sprite key resolved by the host's asset manager.
    pub sprite: String,
    pub conversation: Option<Conversation>,
    /// Whether reaching this NPC is the level's goal.
    pub is_goal: bool,
}

impl NpcDefinition {
    pub fn new(
        id: impl Into<NpcId>,
        room: impl Into<RoomId>,
        tile: Position,
        sprite: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            room: room.into(),
            tile,
            sprite: sprite.into(),
            conversation: None,
            is_goal: false,
        }
    }

    pub fn with_conversation(mut self, conversation: Conversation) -> Self {
        self.conversation = Some(conversation);
        self
    }

    pub fn as_goal(mut self) -> Self {
        self.is_goal = true;
        self
    }
}

/// A runtime-mutable NPC placement materialized from a definition.
///
/// `instance` stays stable for the lifetime of this record; removing and
/// re-adding a definition produces a fresh instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveNpc {
    pub instance: Uuid,
    pub id: NpcId,
    pub room: RoomId,
    /// Absolute tile position on the dungeon canvas.
    pub tile: Position,
    pub sprite: String,
    pub conversation: Option<Conversation>,
    pub is_goal: bool,
}

impl LiveNpc {
    /// Materialize a definition at an absolute canvas position.
    pub fn materialize(definition: &NpcDefinition, room_origin: Position) -> Self {
        Self {
            instance: Uuid::new_v4(),
            id: definition.id.clone(),
            room: definition.room.clone(),
            tile: room_origin.offset(definition.tile),
            sprite: definition.sprite.clone(),
            conversation: definition.conversation.clone(),
            is_goal: definition.is_goal,
        }
    }

    pub fn occupies(&self, tile: Position) -> bool {
        self.tile == tile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::ConversationPage;

    #[test]
    fn test_definition_builder() {
        let def = NpcDefinition::new("priest", "nave", Position::new(2, 3), "robot_priest")
            .with_conversation(Conversation::new(vec![ConversationPage::new(
                "Robot Priest",
                "I bless you on your quest!",
            )]));
        assert_eq!(def.id.as_str(), "priest");
        assert!(!def.is_goal);
        assert!(def.conversation.is_some());
    }

    #[test]
    fn test_materialize_resolves_absolute_tile() {
        let def = NpcDefinition::new("goal", "vault", Position::new(1, 1), "goal").as_goal();
        let live = LiveNpc::materialize(&def, Position::new(10, 20));
        assert_eq!(live.tile, Position::new(11, 21));
        assert!(live.is_goal);
        assert!(live.occupies(Position::new(11, 21)));
    }

    #[test]
    fn test_each_materialization_is_a_new_instance() {
        let def = NpcDefinition::new("gate", "hall", Position::new(0, 0), "gate");
        let first = LiveNpc::materialize(&def, Position::new(0, 0));
        let second = LiveNpc::materialize(&def, Position::new(0, 0));
        assert_ne!(first.instance, second.instance);
        assert_eq!(first.id, second.id);
    }
}
