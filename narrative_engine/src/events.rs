//! World events consumed by the narrative engine.
//!
//! World collaborators (dungeon, hero, content systems) emit these through
//! the event bus once per observed occurrence, in the order they happened
//! within a simulation tick.

use serde::{Deserialize, Serialize};

use dungeon_world::{NpcId, Position, RoomId};

/// An event observed in the game world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorldEvent {
    /// The level has been activated and the first tick is about to run.
    LevelStart,
    HeroEntersRoom { room: RoomId },
    HeroExitsRoom { room: RoomId },
    /// The hero interacted with an NPC.
    NpcInteraction { npc: NpcId },
    /// The host finished playing an NPC's conversation.
    ConversationEnd { npc: NpcId },
    /// The host finished playing a video segment.
    VideoEnd { video: String },
    /// Edge-triggered: fires once when the hero steps onto the tile, not
    /// continuously while standing on it.
    HeroReachesTile { tile: Position },
    /// A collaborator outside the engine set a named flag.
    FlagSet { flag: String },
}

impl WorldEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            WorldEvent::LevelStart => EventKind::LevelStart,
            WorldEvent::HeroEntersRoom { .. } => EventKind::HeroEntersRoom,
            WorldEvent::HeroExitsRoom { .. } => EventKind::HeroExitsRoom,
            WorldEvent::NpcInteraction { .. } => EventKind::NpcInteraction,
            WorldEvent::ConversationEnd { .. } => EventKind::ConversationEnd,
            WorldEvent::VideoEnd { .. } => EventKind::VideoEnd,
            WorldEvent::HeroReachesTile { .. } => EventKind::HeroReachesTile,
            WorldEvent::FlagSet { .. } => EventKind::FlagSet,
        }
    }
}

/// Discriminant of [`WorldEvent`], used by trigger filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    LevelStart,
    HeroEntersRoom,
    HeroExitsRoom,
    NpcInteraction,
    ConversationEnd,
    VideoEnd,
    HeroReachesTile,
    FlagSet,
}

/// An event pattern: a kind plus optional field matchers.
///
/// A field set on the filter must equal the corresponding payload field of
/// the incoming event; unset fields are unconstrained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    pub kind: EventKind,
    pub npc: Option<NpcId>,
    pub room: Option<RoomId>,
    pub tile: Option<Position>,
    pub flag: Option<String>,
    pub video: Option<String>,
}

impl EventFilter {
    /// Match any event of the given kind.
    pub fn kind(kind: EventKind) -> Self {
        Self {
            kind,
            npc: None,
            room: None,
            tile: None,
            flag: None,
            video: None,
        }
    }

    pub fn with_npc(mut self, npc: impl Into<NpcId>) -> Self {
        self.npc = Some(npc.into());
        self
    }

    pub fn with_room(mut self, room: impl Into<RoomId>) -> Self {
        self.room = Some(room.into());
        self
    }

    pub fn with_tile(mut self, tile: Position) -> Self {
        self.tile = Some(tile);
        self
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flag = Some(flag.into());
        self
    }

    pub fn with_video(mut self, video: impl Into<String>) -> Self {
        self.video = Some(video.into());
        self
    }

    /// Whether the filter accepts the event.
    pub fn matches(&self, event: &WorldEvent) -> bool {
        if self.kind != event.kind() {
            return false;
        }

        let (npc, room, tile, flag, video) = match event {
            WorldEvent::LevelStart => (None, None, None, None, None),
            WorldEvent::HeroEntersRoom { room } | WorldEvent::HeroExitsRoom { room } => {
                (None, Some(room), None, None, None)
            }
            WorldEvent::NpcInteraction { npc } | WorldEvent::ConversationEnd { npc } => {
                (Some(npc), None, None, None, None)
            }
            WorldEvent::VideoEnd { video } => (None, None, None, None, Some(video)),
            WorldEvent::HeroReachesTile { tile } => (None, None, Some(tile), None, None),
            WorldEvent::FlagSet { flag } => (None, None, None, Some(flag), None),
        };

        fn field_ok<T: PartialEq>(wanted: &Option<T>, actual: Option<&T>) -> bool {
            match wanted {
                None => true,
                Some(value) => actual == Some(value),
            }
        }

        field_ok(&self.npc, npc)
            && field_ok(&self.room, room)
            && field_ok(&self.tile, tile)
            && field_ok(&self.flag, flag)
            && field_ok(&self.video, video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_only_filter_matches_any_payload() {
        let filter = EventFilter::kind(EventKind::HeroEntersRoom);
        assert!(filter.matches(&WorldEvent::HeroEntersRoom {
            room: RoomId::new("nave")
        }));
        assert!(filter.matches(&WorldEvent::HeroEntersRoom {
            room: RoomId::new("crypt")
        }));
        assert!(!filter.matches(&WorldEvent::HeroExitsRoom {
            room: RoomId::new("nave")
        }));
    }

    #[test]
    fn test_field_matchers_constrain() {
        let filter = EventFilter::kind(EventKind::NpcInteraction).with_npc("priest");
        assert!(filter.matches(&WorldEvent::NpcInteraction {
            npc: NpcId::new("priest")
        }));
        assert!(!filter.matches(&WorldEvent::NpcInteraction {
            npc: NpcId::new("gate")
        }));
    }

    #[test]
    fn test_field_matcher_on_wrong_kind_never_matches() {
        // A room matcher can't be satisfied by an event with no room field.
        let filter = EventFilter::kind(EventKind::LevelStart).with_room("nave");
        assert!(!filter.matches(&WorldEvent::LevelStart));
    }

    #[test]
    fn test_tile_and_flag_matchers() {
        let filter =
            EventFilter::kind(EventKind::HeroReachesTile).with_tile(Position::new(3, 4));
        assert!(filter.matches(&WorldEvent::HeroReachesTile {
            tile: Position::new(3, 4)
        }));
        assert!(!filter.matches(&WorldEvent::HeroReachesTile {
            tile: Position::new(3, 5)
        }));

        let filter = EventFilter::kind(EventKind::FlagSet).with_flag("saw_priest");
        assert!(filter.matches(&WorldEvent::FlagSet {
            flag: "saw_priest".to_string()
        }));
        assert!(!filter.matches(&WorldEvent::FlagSet {
            flag: "other".to_string()
        }));
    }

    #[test]
    fn test_event_serialization_is_stable() {
        let event = WorldEvent::NpcInteraction {
            npc: NpcId::new("tv"),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: WorldEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
