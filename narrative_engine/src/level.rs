//! The narrative level: a flat state machine over a built dungeon.
//!
//! A level is declared as a [`LevelBlueprint`] (rooms, connections, NPCs,
//! states, triggers) and built into a [`NarrativeLevel`]. The built level is
//! a pure function of (state, flags, event) -> (new state, new flags,
//! command sequence): it owns its flag store, current state, and dungeon
//! grid, and defers everything else to the host as commands.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use dungeon_world::{
    BuildError, Direction, DoorConnection, DungeonBuilder, DungeonLayout, LiveNpc,
    NpcDefinition, RoomId, RoomLayout,
};

use crate::events::WorldEvent;
use crate::flags::FlagStore;
use crate::rules::{Action, Command};
use crate::trigger::{StateMatch, Trigger};

/// Errors raised while building a level from its declaration.
#[derive(Debug, Error)]
pub enum LevelBuildError {
    #[error(transparent)]
    Dungeon(#[from] BuildError),

    #[error("level declares no states")]
    NoStates,

    #[error("initial state '{0}' is not declared")]
    UnknownInitialState(String),

    #[error("state '{state}' referenced by {referenced_by} is not declared")]
    UnknownState { state: String, referenced_by: String },

    #[error("spawn room '{0}' is not declared")]
    UnknownSpawnRoom(RoomId),
}

/// The authoring aggregate: everything a level declaration contains.
#[derive(Debug, Clone, Default)]
pub struct LevelBlueprint {
    pub name: String,
    pub rooms: Vec<RoomLayout>,
    pub connections: Vec<DoorConnection>,
    pub npcs: Vec<NpcDefinition>,
    pub states: Vec<String>,
    pub initial_state: String,
    pub spawn_room: RoomId,
    pub triggers: Vec<Trigger>,
}

impl LevelBlueprint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn room(mut self, room: RoomLayout) -> Self {
        self.rooms.push(room);
        self
    }

    pub fn connect(
        mut self,
        room_a: impl Into<RoomId>,
        side_a: Direction,
        room_b: impl Into<RoomId>,
        side_b: Direction,
    ) -> Self {
        self.connections
            .push(DoorConnection::new(room_a, side_a, room_b, side_b));
        self
    }

    pub fn npc(mut self, npc: NpcDefinition) -> Self {
        self.npcs.push(npc);
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.states.push(state.into());
        self
    }

    pub fn initial_state(mut self, state: impl Into<String>) -> Self {
        self.initial_state = state.into();
        self
    }

    pub fn spawn_room(mut self, room: impl Into<RoomId>) -> Self {
        self.spawn_room = room.into();
        self
    }

    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    /// Build the dungeon and the state machine.
    ///
    /// State references are checked here so that a level that builds never
    /// raises a state error during live play.
    pub fn build(self) -> Result<NarrativeLevel, LevelBuildError> {
        if self.states.is_empty() {
            return Err(LevelBuildError::NoStates);
        }
        if !self.states.contains(&self.initial_state) {
            return Err(LevelBuildError::UnknownInitialState(self.initial_state));
        }
        for trigger in &self.triggers {
            if let StateMatch::In(state) = &trigger.source {
                if !self.states.contains(state) {
                    return Err(LevelBuildError::UnknownState {
                        state: state.clone(),
                        referenced_by: format!("trigger '{}'", trigger.name),
                    });
                }
            }
            for action in &trigger.actions {
                if let Action::TransitionTo(state) = action {
                    if !self.states.contains(state) {
                        return Err(LevelBuildError::UnknownState {
                            state: state.clone(),
                            referenced_by: format!("trigger '{}'", trigger.name),
                        });
                    }
                }
            }
        }
        if !self.rooms.iter().any(|r| r.id == self.spawn_room) {
            return Err(LevelBuildError::UnknownSpawnRoom(self.spawn_room));
        }

        let mut builder = DungeonBuilder::new();
        for room in self.rooms {
            builder = builder.room(room);
        }
        for conn in self.connections {
            builder = builder.connect(conn.room_a, conn.side_a, conn.room_b, conn.side_b);
        }
        for npc in self.npcs {
            builder = builder.npc(npc);
        }
        let (layout, npcs) = builder.build()?;

        debug!(level = %self.name, state = %self.initial_state, "level built");
        Ok(NarrativeLevel {
            name: self.name,
            layout,
            initial_npcs: npcs,
            states: self.states,
            triggers: self.triggers,
            flags: FlagStore::new(),
            current_state: self.initial_state.clone(),
            initial_state: self.initial_state,
            spawn_room: self.spawn_room,
            complete: false,
            unmatched_events: 0,
        })
    }
}

/// The level state machine core.
///
/// Invariants: the current state is always a declared state; the completion
/// flag is monotonic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeLevel {
    name: String,
    layout: DungeonLayout,
    initial_npcs: Vec<LiveNpc>,
    states: Vec<String>,
    triggers: Vec<Trigger>,
    flags: FlagStore,
    current_state: String,
    initial_state: String,
    spawn_room: RoomId,
    complete: bool,
    unmatched_events: u64,
}

impl NarrativeLevel {
    /// Consume one world event and return the host's ordered command list.
    ///
    /// The first trigger (in declaration order) whose source state, event
    /// filter, and conditions all match wins; later triggers for the same
    /// event are not evaluated. Internal mutations (flags, transitions) are
    /// applied immediately, so a later action in the same list sees the
    /// effects of an earlier one. An event with no matching trigger is a
    /// silent no-op.
    pub fn process_event(&mut self, event: &WorldEvent) -> Vec<Command> {
        if self.complete {
            debug!(level = %self.name, ?event, "level complete; ignoring event");
            return Vec::new();
        }

        let matched = self.triggers.iter().find(|trigger| {
            trigger.source.matches(&self.current_state)
                && trigger.filter.matches(event)
                && trigger.conditions_hold(&self.flags)
        });

        let Some(trigger) = matched else {
            self.unmatched_events += 1;
            debug!(level = %self.name, ?event, state = %self.current_state, "no trigger matched");
            return Vec::new();
        };

        debug!(level = %self.name, trigger = %trigger.name, ?event, "trigger fired");
        let actions = trigger.actions.clone();

        let mut commands = Vec::new();
        for action in actions {
            self.apply_action(action, &mut commands);
        }
        commands
    }

    fn apply_action(&mut self, action: Action, commands: &mut Vec<Command>) {
        match action {
            Action::SetFlag(name) => self.flags.set(&name),
            Action::ClearFlag(name) => self.flags.clear(&name),
            Action::TransitionTo(state) => {
                debug!(level = %self.name, from = %self.current_state, to = %state, "state transition");
                // Target declared; verified at build time.
                self.current_state = state;
            }
            Action::EndLevel => {
                self.complete = true;
                commands.push(Command::EndLevel);
            }
            Action::SetTile { tile, kind } => {
                // The engine patches its own grid; rendering is the host's
                // half of the same action.
                if let Err(err) = self.layout.set_tile(tile, kind) {
                    warn!(level = %self.name, %err, "set_tile skipped on engine grid");
                }
                commands.push(Command::SetTile { tile, kind });
            }
            Action::PlayVideo {
                path,
                start_secs,
                duration_secs,
            } => commands.push(Command::PlayVideo {
                path,
                start_secs,
                duration_secs,
            }),
            Action::ShowConversation(conversation) => {
                commands.push(Command::ShowConversation(conversation))
            }
            Action::AddNpc(def) => commands.push(Command::AddNpc(def)),
            Action::RemoveNpc(id) => commands.push(Command::RemoveNpc(id)),
            Action::MoveNpc { npc, room, tile } => {
                commands.push(Command::MoveNpc { npc, room, tile })
            }
            Action::PlaceGoal(room) => commands.push(Command::PlaceGoal(room)),
            Action::RemoveGoal => commands.push(Command::RemoveGoal),
            Action::SetHeroStrategy(strategy) => {
                commands.push(Command::SetHeroStrategy(strategy))
            }
            Action::ResetHeroMemory => commands.push(Command::ResetHeroMemory),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current_state(&self) -> &str {
        &self.current_state
    }

    pub fn initial_state(&self) -> &str {
        &self.initial_state
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn flags(&self) -> &FlagStore {
        &self.flags
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn layout(&self) -> &DungeonLayout {
        &self.layout
    }

    /// NPC placements materialized at build time, for the host to install.
    pub fn initial_npcs(&self) -> &[LiveNpc] {
        &self.initial_npcs
    }

    pub fn spawn_room(&self) -> &RoomId {
        &self.spawn_room
    }

    /// Events that matched no trigger since the level was built.
    pub fn unmatched_events(&self) -> u64 {
        self.unmatched_events
    }
}
