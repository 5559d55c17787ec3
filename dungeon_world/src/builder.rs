//! Assembles validated room layouts into a single dungeon canvas.
//!
//! Unlike the organic growth of a random generator, this builder places each
//! room at its declared origin and connects rooms only through the door
//! pairs the author names. Validation is author-friendly: unresolved room
//! and door references are collected and reported together, so one pass
//! shows every problem.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

use crate::layout::{DungeonLayout, PlacedRoom};
use crate::npc::{LiveNpc, NpcDefinition, NpcId};
use crate::room::{DoorLink, RoomId, RoomLayout};
use crate::tiles::{Direction, Position, Tile};

/// A declared connection between two rooms' doors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorConnection {
    pub room_a: RoomId,
    pub side_a: Direction,
    pub room_b: RoomId,
    pub side_b: Direction,
}

impl DoorConnection {
    pub fn new(
        room_a: impl Into<RoomId>,
        side_a: Direction,
        room_b: impl Into<RoomId>,
        side_b: Direction,
    ) -> Self {
        Self {
            room_a: room_a.into(),
            side_a,
            room_b: room_b.into(),
            side_b,
        }
    }
}

/// Why a declared door pair cannot be connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorMismatch {
    /// The sides do not face each other (north pairs with south, east with west).
    Direction,
    /// The doors have different widths.
    Width,
    /// The doors are not flush across the room seam.
    Alignment,
}

impl std::fmt::Display for DoorMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            DoorMismatch::Direction => "directions are not opposite",
            DoorMismatch::Width => "widths differ",
            DoorMismatch::Alignment => "doors are not flush across the seam",
        };
        write!(f, "{}", reason)
    }
}

/// Errors raised while building a level from its declaration.
///
/// Never raised during live play: a level that passed building keeps its
/// structural guarantees for its whole lifetime.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("room id '{id}' declared more than once")]
    DuplicateRoom { id: RoomId },

    #[error("unknown room references: {}", ids.join(", "))]
    UnknownRooms { ids: Vec<String> },

    #[error("doors not present on their rooms: {}", doors.join(", "))]
    UnknownDoors { doors: Vec<String> },

    #[error("door {side} of room '{room}' used by more than one connection")]
    DoorAlreadyConnected { room: RoomId, side: Direction },

    #[error(
        "incompatible doors: '{room_a}' {side_a} door and '{room_b}' {side_b} door ({reason})"
    )]
    IncompatibleDoors {
        room_a: RoomId,
        side_a: Direction,
        room_b: RoomId,
        side_b: Direction,
        reason: DoorMismatch,
    },

    #[error("rooms '{room_a}' and '{room_b}' overlap at ({row}, {col})")]
    Overlap {
        room_a: RoomId,
        room_b: RoomId,
        row: i32,
        col: i32,
    },

    #[error("npc '{npc}' placed outside the bounds of room '{room}'")]
    NpcOutsideRoom { npc: NpcId, room: RoomId },
}

/// Composes room layouts into one tile grid and door graph.
#[derive(Debug, Default)]
pub struct DungeonBuilder {
    rooms: Vec<RoomLayout>,
    connections: Vec<DoorConnection>,
    npcs: Vec<NpcDefinition>,
}

impl DungeonBuilder {
    pub fn new() -> Self {
        Self::default()
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

    /// Build the merged layout and materialize the declared NPCs.
    ///
    /// All connections are validated before any door is marked connected, so
    /// a failing declaration performs no partial mutation of door lists.
    pub fn build(self) -> Result<(DungeonLayout, Vec<LiveNpc>), BuildError> {
        let DungeonBuilder {
            mut rooms,
            connections,
            npcs,
        } = self;

        let mut by_id: HashMap<RoomId, usize> = HashMap::new();
        for (idx, room) in rooms.iter().enumerate() {
            if by_id.insert(room.id.clone(), idx).is_some() {
                return Err(BuildError::DuplicateRoom {
                    id: room.id.clone(),
                });
            }
        }

        Self::check_references(&by_id, &rooms, &connections, &npcs)?;
        Self::check_connections(&by_id, &rooms, &connections)?;

        // Everything validated; commit the links.
        for conn in &connections {
            let link_b = DoorLink {
                room: conn.room_b.clone(),
                side: conn.side_b,
            };
            let link_a = DoorLink {
                room: conn.room_a.clone(),
                side: conn.side_a,
            };
            let idx_a = by_id[&conn.room_a];
            let idx_b = by_id[&conn.room_b];
            if let Some(door) = rooms[idx_a].doors.iter_mut().find(|d| d.direction == conn.side_a) {
                door.link = Some(link_b);
            }
            if let Some(door) = rooms[idx_b].doors.iter_mut().find(|d| d.direction == conn.side_b) {
                door.link = Some(link_a);
            }
        }

        // Normalize origins so the canvas starts at (0, 0).
        let min_row = rooms.iter().map(|r| r.origin.row).min().unwrap_or(0);
        let min_col = rooms.iter().map(|r| r.origin.col).min().unwrap_or(0);
        let shift = Position::new(-min_row, -min_col);
        for room in &mut rooms {
            room.origin = room.origin.offset(shift);
        }

        let canvas_rows = rooms
            .iter()
            .map(|r| r.origin.row + r.rows() as i32)
            .max()
            .unwrap_or(0) as usize;
        let canvas_cols = rooms
            .iter()
            .map(|r| r.origin.col + r.cols() as i32)
            .max()
            .unwrap_or(0) as usize;

        let mut grid = vec![vec![Tile::Void; canvas_cols]; canvas_rows];
        let mut owner: Vec<Vec<Option<usize>>> = vec![vec![None; canvas_cols]; canvas_rows];

        for (idx, room) in rooms.iter().enumerate() {
            for (local_row, row) in room.grid.iter().enumerate() {
                for (local_col, tile) in row.iter().enumerate() {
                    if *tile == Tile::Void {
                        continue;
                    }
                    let abs_row = (room.origin.row + local_row as i32) as usize;
                    let abs_col = (room.origin.col + local_col as i32) as usize;
                    if let Some(other) = owner[abs_row][abs_col] {
                        return Err(BuildError::Overlap {
                            room_a: rooms[other].id.clone(),
                            room_b: room.id.clone(),
                            row: abs_row as i32,
                            col: abs_col as i32,
                        });
                    }
                    owner[abs_row][abs_col] = Some(idx);
                    grid[abs_row][abs_col] = *tile;
                }
            }
        }

        // Blind doors lead nowhere; render them as walls, matching the
        // random generator's convention.
        let mut placed = Vec::with_capacity(rooms.len());
        for room in &rooms {
            let mut kept_doors = Vec::new();
            for door in &room.doors {
                if door.is_connected() {
                    kept_doors.push(door.clone());
                    continue;
                }
                for tile_pos in door.tiles() {
                    let abs = room.origin.offset(tile_pos);
                    grid[abs.row as usize][abs.col as usize] = Tile::wall_for(door.direction);
                }
            }
            placed.push(PlacedRoom {
                id: room.id.clone(),
                origin: room.origin,
                rows: room.rows(),
                cols: room.cols(),
                doors: kept_doors,
            });
        }

        let mut live = Vec::with_capacity(npcs.len());
        for def in &npcs {
            let room = &rooms[by_id[&def.room]];
            if !room.contains_local(def.tile) {
                return Err(BuildError::NpcOutsideRoom {
                    npc: def.id.clone(),
                    room: def.room.clone(),
                });
            }
            live.push(LiveNpc::materialize(def, room.origin));
        }

        debug!(
            rooms = rooms.len(),
            connections = connections.len(),
            npcs = live.len(),
            canvas_rows,
            canvas_cols,
            "dungeon built"
        );

        Ok((DungeonLayout::from_parts(grid, placed), live))
    }

    /// Every room id referenced by a connection or an NPC must exist.
    /// Unresolved references are collected so authors see them all at once.
    fn check_references(
        by_id: &HashMap<RoomId, usize>,
        rooms: &[RoomLayout],
        connections: &[DoorConnection],
        npcs: &[NpcDefinition],
    ) -> Result<(), BuildError> {
        let mut unknown_rooms: Vec<String> = Vec::new();
        let mut note_room = |id: &RoomId, unknown: &mut Vec<String>| {
            if !by_id.contains_key(id) && !unknown.contains(&id.0) {
                unknown.push(id.0.clone());
            }
        };
        for conn in connections {
            note_room(&conn.room_a, &mut unknown_rooms);
            note_room(&conn.room_b, &mut unknown_rooms);
        }
        for npc in npcs {
            note_room(&npc.room, &mut unknown_rooms);
        }
        if !unknown_rooms.is_empty() {
            unknown_rooms.sort();
            return Err(BuildError::UnknownRooms { ids: unknown_rooms });
        }

        let mut unknown_doors: Vec<String> = Vec::new();
        for conn in connections {
            for (room_id, side) in [(&conn.room_a, conn.side_a), (&conn.room_b, conn.side_b)] {
                let room = &rooms[by_id[room_id]];
                if room.door(side).is_none() {
                    let label = format!("{} ({})", room_id, side);
                    if !unknown_doors.contains(&label) {
                        unknown_doors.push(label);
                    }
                }
            }
        }
        if !unknown_doors.is_empty() {
            unknown_doors.sort();
            return Err(BuildError::UnknownDoors {
                doors: unknown_doors,
            });
        }

        Ok(())
    }

    /// Direction, width, seam alignment, and single-use checks for every
    /// declared connection. Runs before any door is marked connected.
    fn check_connections(
        by_id: &HashMap<RoomId, usize>,
        rooms: &[RoomLayout],
        connections: &[DoorConnection],
    ) -> Result<(), BuildError> {
        let mut used: HashSet<(RoomId, Direction)> = HashSet::new();
        for conn in connections {
            for (room, side) in [
                (conn.room_a.clone(), conn.side_a),
                (conn.room_b.clone(), conn.side_b),
            ] {
                if !used.insert((room.clone(), side)) {
                    return Err(BuildError::DoorAlreadyConnected { room, side });
                }
            }

            let room_a = &rooms[by_id[&conn.room_a]];
            let room_b = &rooms[by_id[&conn.room_b]];
            // References were checked already; doors are present.
            let door_a = room_a.door(conn.side_a).cloned().unwrap_or_else(|| {
                unreachable!("door presence verified in check_references")
            });
            let door_b = room_b.door(conn.side_b).cloned().unwrap_or_else(|| {
                unreachable!("door presence verified in check_references")
            });

            let incompatible = |reason| BuildError::IncompatibleDoors {
                room_a: conn.room_a.clone(),
                side_a: conn.side_a,
                room_b: conn.room_b.clone(),
                side_b: conn.side_b,
                reason,
            };

            if conn.side_b != conn.side_a.opposite() {
                return Err(incompatible(DoorMismatch::Direction));
            }
            if door_a.width != door_b.width {
                return Err(incompatible(DoorMismatch::Width));
            }

            let abs_a = room_a.origin.offset(door_a.position);
            let abs_b = room_b.origin.offset(door_b.position);
            if abs_a.offset(conn.side_a.step()) != abs_b {
                return Err(incompatible(DoorMismatch::Alignment));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::RoomTemplate;

    /// 5x5 room with width-1 doors on all four sides.
    fn cross_template() -> RoomTemplate {
        RoomTemplate::new(
            "cross",
            &[
                "1-n-2", //
                "[...]",
                "w...e",
                "[...]",
                "3_s_4",
            ],
        )
    }

    /// 6-wide room with a width-2 north door and no other doors.
    fn wide_template() -> RoomTemplate {
        RoomTemplate::new(
            "wide",
            &[
                "1-nn-2", //
                "[....]",
                "[....]",
                "3____4",
            ],
        )
    }

    fn cross_room(id: &str, origin: Position) -> RoomLayout {
        RoomLayout::new(id, origin, &cross_template()).unwrap()
    }

    #[test]
    fn test_two_rooms_connected_north_south() {
        let (layout, _) = DungeonBuilder::new()
            .room(cross_room("top", Position::new(0, 0)))
            .room(cross_room("bottom", Position::new(5, 0)))
            .connect("top", Direction::South, "bottom", Direction::North)
            .build()
            .unwrap();

        assert_eq!(layout.rows(), 10);
        assert_eq!(layout.cols(), 5);
        // The seam stays passable: both door tiles survive as doors.
        assert!(layout.is_walkable(Position::new(4, 2)));
        assert!(layout.is_walkable(Position::new(5, 2)));
        assert_eq!(layout.tile(Position::new(4, 2)), Tile::Door(Direction::South));
        assert_eq!(layout.unconnected_door_count(), 0);
    }

    #[test]
    fn test_blind_doors_become_walls() {
        let (layout, _) = DungeonBuilder::new()
            .room(cross_room("only", Position::new(0, 0)))
            .build()
            .unwrap();

        assert_eq!(layout.tile(Position::new(0, 2)), Tile::NorthWall);
        assert_eq!(layout.tile(Position::new(4, 2)), Tile::SouthWall);
        assert_eq!(layout.tile(Position::new(2, 0)), Tile::WestWall);
        assert_eq!(layout.tile(Position::new(2, 4)), Tile::EastWall);
        assert_eq!(layout.unconnected_door_count(), 0);
        assert!(layout.room(&RoomId::new("only")).unwrap().doors.is_empty());
    }

    #[test]
    fn test_direction_mismatch_is_incompatible() {
        let err = DungeonBuilder::new()
            .room(cross_room("a", Position::new(0, 0)))
            .room(cross_room("b", Position::new(0, 5)))
            .connect("a", Direction::North, "b", Direction::East)
            .build()
            .unwrap_err();

        assert!(matches!(
            err,
            BuildError::IncompatibleDoors {
                reason: DoorMismatch::Direction,
                ..
            }
        ));
    }

    #[test]
    fn test_width_mismatch_is_incompatible() {
        let top = RoomLayout::new("top", Position::new(0, 0), &wide_template()).unwrap();
        let err = DungeonBuilder::new()
            .room(cross_room("below", Position::new(4, 0)))
            .room(top)
            .connect("below", Direction::North, "top", Direction::South)
            .build()
            .unwrap_err();

        // "top" has no south door at all.
        assert!(matches!(err, BuildError::UnknownDoors { .. }));

        let err = DungeonBuilder::new()
            .room(RoomLayout::new("wide", Position::new(0, 0), &wide_template()).unwrap())
            .room(cross_room("narrow", Position::new(-5, 1)))
            .connect("wide", Direction::North, "narrow", Direction::South)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::IncompatibleDoors {
                reason: DoorMismatch::Width,
                ..
            }
        ));
    }

    #[test]
    fn test_misaligned_doors_are_incompatible() {
        let err = DungeonBuilder::new()
            .room(cross_room("top", Position::new(0, 0)))
            .room(cross_room("bottom", Position::new(5, 1)))
            .connect("top", Direction::South, "bottom", Direction::North)
            .build()
            .unwrap_err();

        assert!(matches!(
            err,
            BuildError::IncompatibleDoors {
                reason: DoorMismatch::Alignment,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_rooms_collected_across_connections_and_npcs() {
        let err = DungeonBuilder::new()
            .room(cross_room("real", Position::new(0, 0)))
            .connect("real", Direction::North, "ghost", Direction::South)
            .connect("phantom", Direction::East, "real", Direction::West)
            .npc(NpcDefinition::new("lost", "nowhere", Position::new(1, 1), "npc"))
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            BuildError::UnknownRooms {
                ids: vec![
                    "ghost".to_string(),
                    "nowhere".to_string(),
                    "phantom".to_string(),
                ],
            }
        );
    }

    #[test]
    fn test_overlap_detected() {
        let err = DungeonBuilder::new()
            .room(cross_room("a", Position::new(0, 0)))
            .room(cross_room("b", Position::new(2, 2)))
            .build()
            .unwrap_err();

        assert!(matches!(err, BuildError::Overlap { .. }));
    }

    #[test]
    fn test_door_used_twice_rejected() {
        let err = DungeonBuilder::new()
            .room(cross_room("a", Position::new(0, 0)))
            .room(cross_room("b", Position::new(5, 0)))
            .room(cross_room("c", Position::new(-5, 0)))
            .connect("a", Direction::North, "c", Direction::South)
            .connect("a", Direction::North, "b", Direction::South)
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            BuildError::DoorAlreadyConnected {
                room: RoomId::new("a"),
                side: Direction::North,
            }
        );
    }

    #[test]
    fn test_negative_origins_are_normalized() {
        let (layout, _) = DungeonBuilder::new()
            .room(cross_room("a", Position::new(-5, -2)))
            .room(cross_room("b", Position::new(0, -2)))
            .connect("a", Direction::South, "b", Direction::North)
            .build()
            .unwrap();

        assert_eq!(layout.rows(), 10);
        assert_eq!(layout.cols(), 5);
        assert_eq!(layout.room(&RoomId::new("a")).unwrap().origin, Position::new(0, 0));
        assert_eq!(layout.room(&RoomId::new("b")).unwrap().origin, Position::new(5, 0));
    }

    #[test]
    fn test_npcs_materialized_at_absolute_tiles() {
        let (_, npcs) = DungeonBuilder::new()
            .room(cross_room("a", Position::new(0, 0)))
            .room(cross_room("b", Position::new(5, 0)))
            .connect("a", Direction::South, "b", Direction::North)
            .npc(NpcDefinition::new("priest", "b", Position::new(2, 2), "robot_priest"))
            .build()
            .unwrap();

        assert_eq!(npcs.len(), 1);
        assert_eq!(npcs[0].tile, Position::new(7, 2));
        assert_eq!(npcs[0].room, RoomId::new("b"));
    }

    #[test]
    fn test_npc_outside_room_bounds_rejected() {
        let err = DungeonBuilder::new()
            .room(cross_room("a", Position::new(0, 0)))
            .npc(NpcDefinition::new("stray", "a", Position::new(9, 9), "npc"))
            .build()
            .unwrap_err();

        assert!(matches!(err, BuildError::NpcOutsideRoom { .. }));
    }
}
