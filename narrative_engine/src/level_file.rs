//! TOML level authoring.
//!
//! A level file carries the whole declaration: room templates as ASCII art,
//! room placements, door connections, NPCs, and triggers. [`parse_level`]
//! turns the text into a [`LevelBlueprint`]; structural checks beyond
//! syntax stay with [`LevelBlueprint::build`] and
//! [`validate`](crate::validation::validate).

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

use dungeon_world::{
    Conversation, ConversationPage, Direction, NpcDefinition, Position, RoomLayout,
    RoomTemplate, TemplateError, Tile,
};

use crate::events::{EventFilter, EventKind};
use crate::level::LevelBlueprint;
use crate::rules::{Action, Condition, HeroStrategy};
use crate::trigger::{StateMatch, Trigger};

/// Errors raised while reading a level file.
#[derive(Debug, Error)]
pub enum LevelFileError {
    #[error("level file is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("room '{room}' uses unknown template '{template}'")]
    UnknownTemplate { room: String, template: String },
}

/// Parse a level file into a blueprint.
pub fn parse_level(text: &str) -> Result<LevelBlueprint, LevelFileError> {
    let file: LevelFile = toml::from_str(text)?;

    let mut templates: HashMap<String, RoomTemplate> = HashMap::new();
    for decl in file.templates {
        let art: Vec<&str> = decl.art.lines().filter(|line| !line.is_empty()).collect();
        templates.insert(decl.name.clone(), RoomTemplate::new(decl.name, &art));
    }

    let mut blueprint = LevelBlueprint::new(file.level.name)
        .initial_state(file.level.initial_state)
        .spawn_room(file.level.spawn_room.as_str());
    for state in file.level.states {
        blueprint = blueprint.state(state);
    }

    for room in file.rooms {
        let template =
            templates
                .get(&room.template)
                .ok_or_else(|| LevelFileError::UnknownTemplate {
                    room: room.id.clone(),
                    template: room.template.clone(),
                })?;
        let origin = Position::new(room.origin[0], room.origin[1]);
        blueprint = blueprint.room(RoomLayout::new(room.id, origin, template)?);
    }

    for conn in file.connections {
        let (room_a, side_a) = conn.from;
        let (room_b, side_b) = conn.to;
        blueprint = blueprint.connect(
            room_a.as_str(),
            side_a.into(),
            room_b.as_str(),
            side_b.into(),
        );
    }

    for npc in file.npcs {
        blueprint = blueprint.npc(npc.into_definition());
    }

    for trigger in file.triggers {
        blueprint = blueprint.trigger(trigger.into_trigger());
    }

    Ok(blueprint)
}

#[derive(Debug, Deserialize)]
struct LevelFile {
    level: LevelDecl,
    #[serde(default)]
    templates: Vec<TemplateDecl>,
    #[serde(default)]
    rooms: Vec<RoomDecl>,
    #[serde(default)]
    connections: Vec<ConnectionDecl>,
    #[serde(default)]
    npcs: Vec<NpcDecl>,
    #[serde(default)]
    triggers: Vec<TriggerDecl>,
}

#[derive(Debug, Deserialize)]
struct LevelDecl {
    name: String,
    states: Vec<String>,
    initial_state: String,
    spawn_room: String,
}

#[derive(Debug, Deserialize)]
struct TemplateDecl {
    name: String,
    art: String,
}

#[derive(Debug, Deserialize)]
struct RoomDecl {
    id: String,
    template: String,
    origin: [i32; 2],
}

#[derive(Debug, Deserialize)]
struct ConnectionDecl {
    from: (String, DirectionDecl),
    to: (String, DirectionDecl),
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum DirectionDecl {
    North,
    South,
    East,
    West,
}

impl From<DirectionDecl> for Direction {
    fn from(decl: DirectionDecl) -> Self {
        match decl {
            DirectionDecl::North => Direction::North,
            DirectionDecl::South => Direction::South,
            DirectionDecl::East => Direction::East,
            DirectionDecl::West => Direction::West,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NpcDecl {
    id: String,
    room: String,
    tile: [i32; 2],
    sprite: String,
    #[serde(default)]
    goal: bool,
    #[serde(default)]
    conversation: Vec<PageDecl>,
}

impl NpcDecl {
    fn into_definition(self) -> NpcDefinition {
        let tile = Position::new(self.tile[0], self.tile[1]);
        let mut def = NpcDefinition::new(self.id, self.room.as_str(), tile, self.sprite);
        if !self.conversation.is_empty() {
            def = def.with_conversation(pages_into_conversation(self.conversation));
        }
        if self.goal {
            def = def.as_goal();
        }
        def
    }
}

#[derive(Debug, Deserialize)]
struct PageDecl {
    speaker: String,
    text: String,
    duration_secs: Option<f32>,
}

fn pages_into_conversation(pages: Vec<PageDecl>) -> Conversation {
    Conversation::new(
        pages
            .into_iter()
            .map(|page| {
                let mut out = ConversationPage::new(page.speaker, page.text);
                if let Some(secs) = page.duration_secs {
                    out = out.with_duration(secs);
                }
                out
            })
            .collect(),
    )
}

#[derive(Debug, Deserialize)]
struct TriggerDecl {
    name: String,
    /// Source state, or `"*"` for any state.
    state: String,
    #[serde(default)]
    conditions: Vec<ConditionDecl>,
    #[serde(default)]
    actions: Vec<ActionDecl>,
    event: EventDecl,
}

impl TriggerDecl {
    fn into_trigger(self) -> Trigger {
        let source = if self.state == "*" {
            StateMatch::Any
        } else {
            StateMatch::in_state(self.state)
        };
        let mut trigger = Trigger::new(self.name, source, self.event.into_filter());
        for condition in self.conditions {
            trigger = trigger.when(condition.into());
        }
        for action in self.actions {
            trigger = trigger.then(action.into_action());
        }
        trigger
    }
}

#[derive(Debug, Deserialize)]
struct EventDecl {
    kind: EventKind,
    npc: Option<String>,
    room: Option<String>,
    tile: Option<[i32; 2]>,
    flag: Option<String>,
    video: Option<String>,
}

impl EventDecl {
    fn into_filter(self) -> EventFilter {
        let mut filter = EventFilter::kind(self.kind);
        if let Some(npc) = self.npc {
            filter = filter.with_npc(npc.as_str());
        }
        if let Some(room) = self.room {
            filter = filter.with_room(room.as_str());
        }
        if let Some(tile) = self.tile {
            filter = filter.with_tile(Position::new(tile[0], tile[1]));
        }
        if let Some(flag) = self.flag {
            filter = filter.with_flag(flag);
        }
        if let Some(video) = self.video {
            filter = filter.with_video(video);
        }
        filter
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ConditionDecl {
    FlagSet(String),
    FlagNotSet(String),
}

impl From<ConditionDecl> for Condition {
    fn from(decl: ConditionDecl) -> Self {
        match decl {
            ConditionDecl::FlagSet(flag) => Condition::FlagSet(flag),
            ConditionDecl::FlagNotSet(flag) => Condition::FlagNotSet(flag),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ActionDecl {
    SetFlag(String),
    ClearFlag(String),
    TransitionTo(String),
    EndLevel,
    PlayVideo {
        path: String,
        #[serde(default)]
        start_secs: f32,
        duration_secs: f32,
    },
    ShowConversation(Vec<PageDecl>),
    AddNpc(NpcDecl),
    RemoveNpc(String),
    MoveNpc {
        npc: String,
        room: String,
        tile: [i32; 2],
    },
    PlaceGoal(String),
    RemoveGoal,
    SetTile {
        tile: [i32; 2],
        kind: TileDecl,
    },
    SetHeroStrategy(StrategyDecl),
    ResetHeroMemory,
}

impl ActionDecl {
    fn into_action(self) -> Action {
        match self {
            ActionDecl::SetFlag(flag) => Action::SetFlag(flag),
            ActionDecl::ClearFlag(flag) => Action::ClearFlag(flag),
            ActionDecl::TransitionTo(state) => Action::TransitionTo(state),
            ActionDecl::EndLevel => Action::EndLevel,
            ActionDecl::PlayVideo {
                path,
                start_secs,
                duration_secs,
            } => Action::PlayVideo {
                path,
                start_secs,
                duration_secs,
            },
            ActionDecl::ShowConversation(pages) => {
                Action::ShowConversation(pages_into_conversation(pages))
            }
            ActionDecl::AddNpc(decl) => Action::AddNpc(decl.into_definition()),
            ActionDecl::RemoveNpc(npc) => Action::RemoveNpc(npc.as_str().into()),
            ActionDecl::MoveNpc { npc, room, tile } => Action::MoveNpc {
                npc: npc.as_str().into(),
                room: room.as_str().into(),
                tile: Position::new(tile[0], tile[1]),
            },
            ActionDecl::PlaceGoal(room) => Action::PlaceGoal(room.as_str().into()),
            ActionDecl::RemoveGoal => Action::RemoveGoal,
            ActionDecl::SetTile { tile, kind } => Action::SetTile {
                tile: Position::new(tile[0], tile[1]),
                kind: kind.into(),
            },
            ActionDecl::SetHeroStrategy(strategy) => Action::SetHeroStrategy(strategy.into()),
            ActionDecl::ResetHeroMemory => Action::ResetHeroMemory,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TileDecl {
    Void,
    Floor,
    NorthWall,
    SouthWall,
    WestWall,
    EastWall,
    Pillar,
    Door(DirectionDecl),
}

impl From<TileDecl> for Tile {
    fn from(decl: TileDecl) -> Self {
        match decl {
            TileDecl::Void => Tile::Void,
            TileDecl::Floor => Tile::Floor,
            TileDecl::NorthWall => Tile::NorthWall,
            TileDecl::SouthWall => Tile::SouthWall,
            TileDecl::WestWall => Tile::WestWall,
            TileDecl::EastWall => Tile::EastWall,
            TileDecl::Pillar => Tile::Pillar,
            TileDecl::Door(side) => Tile::Door(side.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum StrategyDecl {
    GoalSeeking,
    NpcSeeking(String),
}

impl From<StrategyDecl> for HeroStrategy {
    fn from(decl: StrategyDecl) -> Self {
        match decl {
            StrategyDecl::GoalSeeking => HeroStrategy::GoalSeeking,
            StrategyDecl::NpcSeeking(npc) => HeroStrategy::NpcSeeking(npc.as_str().into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::WorldEvent;
    use crate::rules::Command;
    use dungeon_world::RoomId;

    const TWO_ROOM_LEVEL: &str = r#"
[level]
name = "gatehouse"
states = ["start", "open"]
initial_state = "start"
spawn_room = "nave"

[[templates]]
name = "hall"
art = """
1-n-2
w...e
3_s_4
"""

[[rooms]]
id = "nave"
template = "hall"
origin = [0, 0]

[[rooms]]
id = "sanctum"
template = "hall"
origin = [3, 0]

[[connections]]
from = ["nave", "south"]
to = ["sanctum", "north"]

[[npcs]]
id = "keeper"
room = "nave"
tile = [1, 2]
sprite = "robot_priest"

[[npcs.conversation]]
speaker = "Keeper"
text = "The gate answers to those who ask."
duration_secs = 3.5

[[triggers]]
name = "ask the keeper"
state = "start"
conditions = [{ flag_not_set = "asked" }]
actions = [
    { set_flag = "asked" },
    { place_goal = "sanctum" },
    { transition_to = "open" },
]

[triggers.event]
kind = "npc_interaction"
npc = "keeper"

[[triggers]]
name = "reach the goal"
state = "open"
actions = ["end_level"]

[triggers.event]
kind = "hero_enters_room"
room = "sanctum"
"#;

    #[test]
    fn test_parse_builds_and_plays() {
        let blueprint = parse_level(TWO_ROOM_LEVEL).unwrap();
        assert!(crate::validation::validate(&blueprint).is_empty());

        let mut level = blueprint.build().unwrap();
        let commands = level.process_event(&WorldEvent::NpcInteraction {
            npc: "keeper".into(),
        });
        assert_eq!(commands, vec![Command::PlaceGoal(RoomId::new("sanctum"))]);
        assert_eq!(level.current_state(), "open");
        assert!(level.flags().is_set("asked"));

        let commands = level.process_event(&WorldEvent::HeroEntersRoom {
            room: "sanctum".into(),
        });
        assert_eq!(commands, vec![Command::EndLevel]);
        assert!(level.is_complete());
    }

    #[test]
    fn test_npc_declaration_carries_conversation() {
        let blueprint = parse_level(TWO_ROOM_LEVEL).unwrap();
        let keeper = &blueprint.npcs[0];
        let conversation = keeper.conversation.as_ref().unwrap();
        assert_eq!(conversation.pages.len(), 1);
        assert_eq!(conversation.pages[0].speaker, "Keeper");
        assert_eq!(conversation.pages[0].duration_secs, 3.5);
    }

    #[test]
    fn test_unknown_template_reported() {
        let text = r#"
[level]
name = "broken"
states = ["start"]
initial_state = "start"
spawn_room = "nave"

[[rooms]]
id = "nave"
template = "missing"
origin = [0, 0]
"#;
        let err = parse_level(text).unwrap_err();
        assert!(matches!(err, LevelFileError::UnknownTemplate { .. }));
    }

    #[test]
    fn test_bad_toml_reported() {
        assert!(matches!(
            parse_level("level = ").unwrap_err(),
            LevelFileError::Toml(_)
        ));
    }

    #[test]
    fn test_wildcard_state_and_tagged_actions() {
        let text = r#"
[level]
name = "wild"
states = ["start"]
initial_state = "start"
spawn_room = "r"

[[templates]]
name = "cell"
art = """
1-n-2
[...]
3___4
"""

[[rooms]]
id = "r"
template = "cell"
origin = [0, 0]

[[triggers]]
name = "always"
state = "*"
actions = [
    { set_hero_strategy = { npc_seeking = "keeper" } },
    { set_tile = { tile = [1, 1], kind = "pillar" } },
    "reset_hero_memory",
]

[triggers.event]
kind = "level_start"
"#;
        let blueprint = parse_level(text).unwrap();
        let trigger = &blueprint.triggers[0];
        assert_eq!(trigger.source, StateMatch::Any);
        assert_eq!(
            trigger.actions,
            vec![
                Action::SetHeroStrategy(HeroStrategy::NpcSeeking("keeper".into())),
                Action::SetTile {
                    tile: Position::new(1, 1),
                    kind: Tile::Pillar,
                },
                Action::ResetHeroMemory,
            ]
        );
    }
}
