//! Static analysis of a level declaration.
//!
//! Unlike [`LevelBlueprint::build`], which stops at the first structural
//! error, the validator walks the whole declaration and reports every issue
//! it finds, including soft ones a build would let through: states no chain
//! of transitions can reach, and rooms no chain of doors can reach from the
//! spawn room.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use dungeon_world::{Direction, RoomId};

use crate::level::LevelBlueprint;
use crate::rules::Action;
use crate::trigger::StateMatch;

/// One finding from [`validate`]. All issues carry enough context to name
/// the declaration at fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    UnknownRoom { room: RoomId, referenced_by: String },
    UnknownDoor {
        room: RoomId,
        side: Direction,
        referenced_by: String,
    },
    UnknownState { state: String, referenced_by: String },
    UnreachableState { state: String },
    OrphanRoom { room: RoomId },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::UnknownRoom { room, referenced_by } => {
                write!(f, "unknown room '{room}' referenced by {referenced_by}")
            }
            ValidationIssue::UnknownDoor {
                room,
                side,
                referenced_by,
            } => write!(
                f,
                "room '{room}' has no {side} door, referenced by {referenced_by}"
            ),
            ValidationIssue::UnknownState { state, referenced_by } => {
                write!(f, "unknown state '{state}' referenced by {referenced_by}")
            }
            ValidationIssue::UnreachableState { state } => {
                write!(f, "state '{state}' is unreachable from the initial state")
            }
            ValidationIssue::OrphanRoom { room } => {
                write!(f, "room '{room}' is unreachable from the spawn room")
            }
        }
    }
}

/// Check a blueprint without building it. Returns every issue found; an
/// empty list means the declaration is coherent.
pub fn validate(blueprint: &LevelBlueprint) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    check_room_references(blueprint, &mut issues);
    check_state_references(blueprint, &mut issues);
    check_state_reachability(blueprint, &mut issues);
    check_room_reachability(blueprint, &mut issues);
    issues
}

fn room_known(blueprint: &LevelBlueprint, id: &RoomId) -> bool {
    blueprint.rooms.iter().any(|r| &r.id == id)
}

fn door_known(blueprint: &LevelBlueprint, id: &RoomId, side: Direction) -> bool {
    blueprint
        .rooms
        .iter()
        .find(|r| &r.id == id)
        .is_some_and(|r| r.door(side).is_some())
}

fn check_room_references(blueprint: &LevelBlueprint, issues: &mut Vec<ValidationIssue>) {
    for (i, conn) in blueprint.connections.iter().enumerate() {
        let source = format!("connection #{i}");
        for (room, side) in [(&conn.room_a, conn.side_a), (&conn.room_b, conn.side_b)] {
            if !room_known(blueprint, room) {
                issues.push(ValidationIssue::UnknownRoom {
                    room: room.clone(),
                    referenced_by: source.clone(),
                });
            } else if !door_known(blueprint, room, side) {
                issues.push(ValidationIssue::UnknownDoor {
                    room: room.clone(),
                    side,
                    referenced_by: source.clone(),
                });
            }
        }
    }

    for npc in &blueprint.npcs {
        if !room_known(blueprint, &npc.room) {
            issues.push(ValidationIssue::UnknownRoom {
                room: npc.room.clone(),
                referenced_by: format!("npc '{}'", npc.id),
            });
        }
    }

    for trigger in &blueprint.triggers {
        let source = format!("trigger '{}'", trigger.name);
        if let Some(room) = &trigger.filter.room {
            if !room_known(blueprint, room) {
                issues.push(ValidationIssue::UnknownRoom {
                    room: room.clone(),
                    referenced_by: source.clone(),
                });
            }
        }
        for action in &trigger.actions {
            let room = match action {
                Action::PlaceGoal(room) => Some(room),
                Action::AddNpc(def) => Some(&def.room),
                Action::MoveNpc { room, .. } => Some(room),
                _ => None,
            };
            if let Some(room) = room {
                if !room_known(blueprint, room) {
                    issues.push(ValidationIssue::UnknownRoom {
                        room: room.clone(),
                        referenced_by: source.clone(),
                    });
                }
            }
        }
    }

    if !room_known(blueprint, &blueprint.spawn_room) {
        issues.push(ValidationIssue::UnknownRoom {
            room: blueprint.spawn_room.clone(),
            referenced_by: "spawn room".to_string(),
        });
    }
}

fn check_state_references(blueprint: &LevelBlueprint, issues: &mut Vec<ValidationIssue>) {
    let known = |state: &String| blueprint.states.contains(state);

    if !known(&blueprint.initial_state) {
        issues.push(ValidationIssue::UnknownState {
            state: blueprint.initial_state.clone(),
            referenced_by: "initial state".to_string(),
        });
    }
    for trigger in &blueprint.triggers {
        let source = format!("trigger '{}'", trigger.name);
        if let StateMatch::In(state) = &trigger.source {
            if !known(state) {
                issues.push(ValidationIssue::UnknownState {
                    state: state.clone(),
                    referenced_by: source.clone(),
                });
            }
        }
        for action in &trigger.actions {
            if let Action::TransitionTo(state) = action {
                if !known(state) {
                    issues.push(ValidationIssue::UnknownState {
                        state: state.clone(),
                        referenced_by: source.clone(),
                    });
                }
            }
        }
    }
}

/// Breadth-first walk of the transition graph from the initial state. A
/// wildcard-source trigger contributes its targets from every state.
fn check_state_reachability(blueprint: &LevelBlueprint, issues: &mut Vec<ValidationIssue>) {
    if !blueprint.states.contains(&blueprint.initial_state) {
        // Already reported; reachability from a missing state is noise.
        return;
    }

    let mut reached: HashSet<&String> = HashSet::new();
    let mut queue = VecDeque::new();
    reached.insert(&blueprint.initial_state);
    queue.push_back(&blueprint.initial_state);

    while let Some(state) = queue.pop_front() {
        for trigger in &blueprint.triggers {
            if !trigger.source.matches(state) {
                continue;
            }
            for action in &trigger.actions {
                if let Action::TransitionTo(target) = action {
                    if blueprint.states.contains(target) && reached.insert(target) {
                        queue.push_back(target);
                    }
                }
            }
        }
    }

    for state in &blueprint.states {
        if !reached.contains(state) {
            issues.push(ValidationIssue::UnreachableState {
                state: state.clone(),
            });
        }
    }
}

/// Breadth-first walk of the declared door graph from the spawn room.
fn check_room_reachability(blueprint: &LevelBlueprint, issues: &mut Vec<ValidationIssue>) {
    if !room_known(blueprint, &blueprint.spawn_room) {
        return;
    }

    let mut reached: HashSet<&RoomId> = HashSet::new();
    let mut queue = VecDeque::new();
    reached.insert(&blueprint.spawn_room);
    queue.push_back(&blueprint.spawn_room);

    while let Some(room) = queue.pop_front() {
        for conn in &blueprint.connections {
            let next = if &conn.room_a == room {
                &conn.room_b
            } else if &conn.room_b == room {
                &conn.room_a
            } else {
                continue;
            };
            if room_known(blueprint, next) && reached.insert(next) {
                queue.push_back(next);
            }
        }
    }

    for room in &blueprint.rooms {
        if !reached.contains(&room.id) {
            issues.push(ValidationIssue::OrphanRoom {
                room: room.id.clone(),
            });
        }
    }
}
