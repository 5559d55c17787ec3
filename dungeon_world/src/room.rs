//! Room templates and parsed room layouts.
//!
//! A room template is an authored rectangular ASCII pattern with embedded
//! door markers. Parsing produces the tile grid plus the door geometry the
//! builder needs to connect rooms.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::tiles::{Direction, Position, Tile};

/// Unique identifier for a room within a level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RoomId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Reference to the paired door on another room, set by the builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorLink {
    pub room: RoomId,
    pub side: Direction,
}

/// A directional opening on a room's boundary.
///
/// `position` is the north/west-most tile of the opening, in local room
/// coordinates. An unconnected door is converted to wall at build time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub direction: Direction,
    pub position: Position,
    pub width: usize,
    pub link: Option<DoorLink>,
}

impl Door {
    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    /// Local positions of every tile this door covers.
    pub fn tiles(&self) -> Vec<Position> {
        let along = match self.direction {
            Direction::North | Direction::South => Position::new(0, 1),
            Direction::East | Direction::West => Position::new(1, 0),
        };
        (0..self.width as i32)
            .map(|i| {
                Position::new(
                    self.position.row + along.row * i,
                    self.position.col + along.col * i,
                )
            })
            .collect()
    }
}

/// Errors raised while parsing a room template.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("room '{room}': unknown symbol '{symbol}' at ({row}, {col})")]
    UnknownSymbol {
        room: String,
        symbol: char,
        row: usize,
        col: usize,
    },

    #[error("room '{room}': more than one {side} door")]
    DuplicateDoor { room: String, side: Direction },

    #[error("room '{room}': {side} door marker at ({row}, {col}) is not on the {side} edge")]
    MisplacedDoor {
        room: String,
        side: Direction,
        row: usize,
        col: usize,
    },

    #[error("room '{room}': template has no tiles")]
    Empty { room: String },
}

/// An authored rectangular tile pattern with door markers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomTemplate {
    pub name: String,
    pub art: Vec<String>,
}

impl RoomTemplate {
    pub fn new(name: impl Into<String>, art: &[&str]) -> Self {
        Self {
            name: name.into(),
            art: art.iter().map(|line| line.to_string()).collect(),
        }
    }

    /// Parse the ASCII art into a tile grid plus door geometry.
    ///
    /// Rows are padded with [`Tile::Void`] to the widest line. A contiguous
    /// run of door markers on one side forms a single door of that width.
    pub fn parse(&self) -> Result<(Vec<Vec<Tile>>, Vec<Door>), TemplateError> {
        if self.art.iter().all(|line| line.trim().is_empty()) {
            return Err(TemplateError::Empty {
                room: self.name.clone(),
            });
        }

        let width = self.art.iter().map(|line| line.chars().count()).max().unwrap_or(0);

        let mut grid: Vec<Vec<Tile>> = Vec::with_capacity(self.art.len());
        for (row_idx, line) in self.art.iter().enumerate() {
            let mut row: Vec<Tile> = Vec::with_capacity(width);
            for (col_idx, symbol) in line.chars().enumerate() {
                let tile = Tile::from_ascii(symbol).ok_or(TemplateError::UnknownSymbol {
                    room: self.name.clone(),
                    symbol,
                    row: row_idx,
                    col: col_idx,
                })?;
                row.push(tile);
            }
            row.resize(width, Tile::Void);
            grid.push(row);
        }

        let doors = self.collect_doors(&grid)?;
        Ok((grid, doors))
    }

    fn collect_doors(&self, grid: &[Vec<Tile>]) -> Result<Vec<Door>, TemplateError> {
        let rows = grid.len() as i32;
        let cols = grid.first().map(|r| r.len()).unwrap_or(0) as i32;

        // Gather door tiles per side, sorted by position for run detection.
        let mut per_side: BTreeMap<usize, Vec<Position>> = BTreeMap::new();
        for (row_idx, row) in grid.iter().enumerate() {
            for (col_idx, tile) in row.iter().enumerate() {
                if let Tile::Door(side) = tile {
                    per_side
                        .entry(*side as usize)
                        .or_default()
                        .push(Position::new(row_idx as i32, col_idx as i32));
                }
            }
        }

        let mut doors = Vec::new();
        for side in Direction::all() {
            let Some(tiles) = per_side.get(&(side as usize)) else {
                continue;
            };

            // Every door tile must sit on its own edge: the cell one step
            // outward is void or outside the template.
            for pos in tiles {
                let out = pos.offset(side.step());
                let outward_clear = out.row < 0
                    || out.col < 0
                    || out.row >= rows
                    || out.col >= cols
                    || grid[out.row as usize][out.col as usize] == Tile::Void;
                if !outward_clear {
                    return Err(TemplateError::MisplacedDoor {
                        room: self.name.clone(),
                        side,
                        row: pos.row as usize,
                        col: pos.col as usize,
                    });
                }
            }

            // One contiguous run per side. Connections address doors as
            // (room, side), so a second run would be unaddressable.
            let along: fn(&Position) -> (i32, i32) = match side {
                Direction::North | Direction::South => |p: &Position| (p.row, p.col),
                Direction::East | Direction::West => |p: &Position| (p.col, p.row),
            };
            let mut sorted = tiles.clone();
            sorted.sort_by_key(|p| along(p));
            let contiguous = sorted.windows(2).all(|pair| {
                along(&pair[0]).0 == along(&pair[1]).0
                    && along(&pair[1]).1 == along(&pair[0]).1 + 1
            });
            if !contiguous {
                return Err(TemplateError::DuplicateDoor {
                    room: self.name.clone(),
                    side,
                });
            }

            doors.push(Door {
                direction: side,
                position: sorted[0],
                width: sorted.len(),
                link: None,
            });
        }

        Ok(doors)
    }
}

/// A parsed room placed at a fixed origin on the shared canvas.
///
/// Immutable once handed to the builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomLayout {
    pub id: RoomId,
    pub origin: Position,
    pub grid: Vec<Vec<Tile>>,
    pub doors: Vec<Door>,
}

impl RoomLayout {
    /// Parse `template` and place it with its north-west corner at `origin`.
    pub fn new(
        id: impl Into<RoomId>,
        origin: Position,
        template: &RoomTemplate,
    ) -> Result<Self, TemplateError> {
        let (grid, doors) = template.parse()?;
        Ok(Self {
            id: id.into(),
            origin,
            grid,
            doors,
        })
    }

    pub fn rows(&self) -> usize {
        self.grid.len()
    }

    pub fn cols(&self) -> usize {
        self.grid.first().map(|r| r.len()).unwrap_or(0)
    }

    /// The room's door on the given side, if the template declared one.
    pub fn door(&self, side: Direction) -> Option<&Door> {
        self.doors.iter().find(|d| d.direction == side)
    }

    /// Whether the given local position is inside the room's bounding box.
    pub fn contains_local(&self, pos: Position) -> bool {
        pos.row >= 0
            && pos.col >= 0
            && (pos.row as usize) < self.rows()
            && (pos.col as usize) < self.cols()
    }
}
