//! The merged dungeon canvas and resolved door graph.
//!
//! Built once by [`crate::builder::DungeonBuilder`] and immutable afterwards,
//! except for the single [`DungeonLayout::set_tile`] patch operation.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;

use crate::room::{Door, RoomId};
use crate::tiles::{Position, Tile};

/// Errors from post-build layout access.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("tile ({row}, {col}) is outside the dungeon canvas")]
    OutOfBounds { row: i32, col: i32 },
}

/// A room after placement: normalized origin, extent, and resolved doors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedRoom {
    pub id: RoomId,
    pub origin: Position,
    pub rows: usize,
    pub cols: usize,
    pub doors: Vec<Door>,
}

impl PlacedRoom {
    pub fn contains(&self, pos: Position) -> bool {
        pos.row >= self.origin.row
            && pos.col >= self.origin.col
            && pos.row < self.origin.row + self.rows as i32
            && pos.col < self.origin.col + self.cols as i32
    }

    /// Absolute canvas positions of a door's tiles.
    pub fn door_tiles(&self, door: &Door) -> Vec<Position> {
        door.tiles().iter().map(|t| self.origin.offset(*t)).collect()
    }
}

/// Union of all room layouts merged onto one canvas, plus the door graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DungeonLayout {
    grid: Vec<Vec<Tile>>,
    rooms: Vec<PlacedRoom>,
    index: HashMap<RoomId, usize>,
}

impl DungeonLayout {
    pub(crate) fn from_parts(grid: Vec<Vec<Tile>>, rooms: Vec<PlacedRoom>) -> Self {
        let index = rooms
            .iter()
            .enumerate()
            .map(|(i, room)| (room.id.clone(), i))
            .collect();
        Self { grid, rooms, index }
    }

    pub fn rows(&self) -> usize {
        self.grid.len()
    }

    pub fn cols(&self) -> usize {
        self.grid.first().map(|r| r.len()).unwrap_or(0)
    }

    /// Tile at the given position; out-of-bounds reads as [`Tile::Void`].
    pub fn tile(&self, pos: Position) -> Tile {
        if pos.row < 0 || pos.col < 0 {
            return Tile::Void;
        }
        self.grid
            .get(pos.row as usize)
            .and_then(|row| row.get(pos.col as usize))
            .copied()
            .unwrap_or(Tile::Void)
    }

    pub fn is_walkable(&self, pos: Position) -> bool {
        self.tile(pos).is_walkable()
    }

    /// Patch one cell. The only allowed post-build mutation.
    pub fn set_tile(&mut self, pos: Position, tile: Tile) -> Result<(), LayoutError> {
        if pos.row < 0
            || pos.col < 0
            || pos.row as usize >= self.rows()
            || pos.col as usize >= self.cols()
        {
            return Err(LayoutError::OutOfBounds {
                row: pos.row,
                col: pos.col,
            });
        }
        self.grid[pos.row as usize][pos.col as usize] = tile;
        Ok(())
    }

    pub fn rooms(&self) -> impl Iterator<Item = &PlacedRoom> {
        self.rooms.iter()
    }

    pub fn room(&self, id: &RoomId) -> Option<&PlacedRoom> {
        self.index.get(id).map(|i| &self.rooms[*i])
    }

    pub fn contains_room(&self, id: &RoomId) -> bool {
        self.index.contains_key(id)
    }

    /// The room whose bounding box contains the position, if any.
    pub fn room_at(&self, pos: Position) -> Option<&RoomId> {
        self.rooms.iter().find(|room| room.contains(pos)).map(|r| &r.id)
    }

    /// Doors left unconnected after building. Always zero: the builder
    /// converts blind doors to walls, so this is a structural check.
    pub fn unconnected_door_count(&self) -> usize {
        self.rooms
            .iter()
            .flat_map(|r| r.doors.iter())
            .filter(|d| !d.is_connected())
            .count()
    }

    /// Find a floor tile within a room, preferring tiles near the center.
    ///
    /// Searches in a spiral pattern starting from the room's center; used by
    /// hosts for goal placement.
    pub fn find_floor_tile(&self, id: &RoomId) -> Option<Position> {
        let room = self.room(id)?;
        let center = Position::new(
            room.origin.row + room.rows as i32 / 2,
            room.origin.col + room.cols as i32 / 2,
        );
        if self.tile(center) == Tile::Floor {
            return Some(center);
        }

        for ring in 1..room.rows.max(room.cols) as i32 {
            for d_row in -ring..=ring {
                for d_col in -ring..=ring {
                    if d_row.abs() != ring && d_col.abs() != ring {
                        continue; // only the perimeter of this ring
                    }
                    let pos = Position::new(center.row + d_row, center.col + d_col);
                    if room.contains(pos) && self.tile(pos) == Tile::Floor {
                        return Some(pos);
                    }
                }
            }
        }
        None
    }

    /// All rooms reachable from `start` by following door connections,
    /// including `start` itself. Empty when `start` is unknown.
    pub fn rooms_reachable_from(&self, start: &RoomId) -> HashSet<RoomId> {
        let mut seen = HashSet::new();
        if !self.contains_room(start) {
            return seen;
        }
        let mut queue = VecDeque::from([start.clone()]);
        seen.insert(start.clone());
        while let Some(id) = queue.pop_front() {
            let Some(room) = self.room(&id) else { continue };
            for door in &room.doors {
                if let Some(link) = &door.link {
                    if seen.insert(link.room.clone()) {
                        queue.push_back(link.room.clone());
                    }
                }
            }
        }
        seen
    }

    /// Render the canvas with the ASCII dialect, one row per line.
    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity(self.rows() * (self.cols() + 1));
        for row in &self.grid {
            for tile in row {
                out.push(tile.to_ascii());
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::DoorLink;
    use crate::tiles::Direction;

    fn small_layout() -> DungeonLayout {
        // 3x4 canvas: one room covering everything but the east column.
        let grid = vec![
            vec![Tile::NwCorner, Tile::NorthWall, Tile::NeCorner, Tile::Void],
            vec![Tile::WestWall, Tile::Floor, Tile::EastWall, Tile::Void],
            vec![Tile::SwCorner, Tile::SouthWall, Tile::SeCorner, Tile::Void],
        ];
        let rooms = vec![PlacedRoom {
            id: RoomId::new("cell"),
            origin: Position::new(0, 0),
            rows: 3,
            cols: 3,
            doors: vec![],
        }];
        DungeonLayout::from_parts(grid, rooms)
    }

    #[test]
    fn test_tile_reads_void_out_of_bounds() {
        let layout = small_layout();
        assert_eq!(layout.tile(Position::new(-1, 0)), Tile::Void);
        assert_eq!(layout.tile(Position::new(10, 10)), Tile::Void);
        assert_eq!(layout.tile(Position::new(1, 1)), Tile::Floor);
    }

    #[test]
    fn test_set_tile_bounds_checked() {
        let mut layout = small_layout();
        layout.set_tile(Position::new(1, 1), Tile::Pillar).unwrap();
        assert_eq!(layout.tile(Position::new(1, 1)), Tile::Pillar);

        let err = layout.set_tile(Position::new(3, 0), Tile::Floor).unwrap_err();
        assert_eq!(err, LayoutError::OutOfBounds { row: 3, col: 0 });
    }

    #[test]
    fn test_room_at_uses_bounding_boxes() {
        let layout = small_layout();
        assert_eq!(layout.room_at(Position::new(2, 2)).unwrap().as_str(), "cell");
        assert!(layout.room_at(Position::new(0, 3)).is_none());
    }

    #[test]
    fn test_find_floor_tile_prefers_center() {
        let layout = small_layout();
        assert_eq!(
            layout.find_floor_tile(&RoomId::new("cell")),
            Some(Position::new(1, 1))
        );
        assert_eq!(layout.find_floor_tile(&RoomId::new("missing")), None);
    }

    #[test]
    fn test_reachability_follows_links() {
        let mut rooms = vec![
            PlacedRoom {
                id: RoomId::new("a"),
                origin: Position::new(0, 0),
                rows: 1,
                cols: 1,
                doors: vec![Door {
                    direction: Direction::East,
                    position: Position::new(0, 0),
                    width: 1,
                    link: Some(DoorLink {
                        room: RoomId::new("b"),
                        side: Direction::West,
                    }),
                }],
            },
            PlacedRoom {
                id: RoomId::new("b"),
                origin: Position::new(0, 1),
                rows: 1,
                cols: 1,
                doors: vec![],
            },
            PlacedRoom {
                id: RoomId::new("island"),
                origin: Position::new(5, 5),
                rows: 1,
                cols: 1,
                doors: vec![],
            },
        ];
        rooms[1].doors = vec![Door {
            direction: Direction::West,
            position: Position::new(0, 0),
            width: 1,
            link: Some(DoorLink {
                room: RoomId::new("a"),
                side: Direction::East,
            }),
        }];
        let layout = DungeonLayout::from_parts(vec![vec![Tile::Floor; 6]; 6], rooms);

        let reachable = layout.rooms_reachable_from(&RoomId::new("a"));
        assert!(reachable.contains(&RoomId::new("a")));
        assert!(reachable.contains(&RoomId::new("b")));
        assert!(!reachable.contains(&RoomId::new("island")));
    }

    #[test]
    fn test_render_ascii() {
        let layout = small_layout();
        assert_eq!(layout.render_ascii(), "1-2 \n[.] \n3_4 \n");
    }
}
