//! Tile kinds, directions, and the ASCII room dialect.
//!
//! Rooms are authored as rectangular ASCII grids. Walls are named for the
//! side of the room they sit on, so a `WestWall` is the left-most wall of a
//! room, facing east. Door markers are lowercase direction letters; a
//! contiguous run of the same marker forms one door of that width.

use serde::{Deserialize, Serialize};

/// Cardinal directions for door placement and room connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// The opposite direction. Connected door pairs face opposite ways.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Position offset for moving one tile in this direction.
    pub fn step(self) -> Position {
        match self {
            Direction::North => Position::new(-1, 0),
            Direction::South => Position::new(1, 0),
            Direction::East => Position::new(0, 1),
            Direction::West => Position::new(0, -1),
        }
    }

    /// All four directions, in the scan order used throughout the crate.
    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ]
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        };
        write!(f, "{}", name)
    }
}

/// A position in the dungeon grid, measured in tiles.
///
/// Signed so that placement math can go negative before the builder
/// normalizes all origins onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Component-wise sum.
    pub fn offset(self, other: Position) -> Position {
        Position::new(self.row + other.row, self.col + other.col)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Tile kinds for the dungeon canvas.
///
/// Door tiles render as floor but are tracked separately so the builder can
/// resolve connections and convert blind doors to walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Nothing outside a room.
    Void,
    Floor,

    // Walls (non-walkable)
    NorthWall,
    SouthWall,
    WestWall,
    EastWall,

    // Corners (non-walkable)
    NwCorner,
    NeCorner,
    SwCorner,
    SeCorner,

    Pillar,

    /// A door opening on the wall of the given side (walkable).
    Door(Direction),
}

impl Tile {
    /// Whether the hero can stand on this tile.
    pub fn is_walkable(self) -> bool {
        matches!(self, Tile::Floor | Tile::Door(_))
    }

    /// The wall tile that replaces an unconnected door on the given side.
    pub fn wall_for(side: Direction) -> Tile {
        match side {
            Direction::North => Tile::NorthWall,
            Direction::South => Tile::SouthWall,
            Direction::East => Tile::EastWall,
            Direction::West => Tile::WestWall,
        }
    }

    /// Parse one character of the ASCII room dialect.
    pub fn from_ascii(symbol: char) -> Option<Tile> {
        match symbol {
            ' ' => Some(Tile::Void),
            '.' => Some(Tile::Floor),
            '-' => Some(Tile::NorthWall),
            '_' => Some(Tile::SouthWall),
            '[' => Some(Tile::WestWall),
            ']' => Some(Tile::EastWall),
            '1' => Some(Tile::NwCorner),
            '2' => Some(Tile::NeCorner),
            '3' => Some(Tile::SwCorner),
            '4' => Some(Tile::SeCorner),
            'P' => Some(Tile::Pillar),
            'n' => Some(Tile::Door(Direction::North)),
            's' => Some(Tile::Door(Direction::South)),
            'e' => Some(Tile::Door(Direction::East)),
            'w' => Some(Tile::Door(Direction::West)),
            _ => None,
        }
    }

    /// Reverse mapping, kept in sync with [`Tile::from_ascii`] for debug
    /// rendering.
    pub fn to_ascii(self) -> char {
        match self {
            Tile::Void => ' ',
            Tile::Floor => '.',
            Tile::NorthWall => '-',
            Tile::SouthWall => '_',
            Tile::WestWall => '[',
            Tile::EastWall => ']',
            Tile::NwCorner => '1',
            Tile::NeCorner => '2',
            Tile::SwCorner => '3',
            Tile::SeCorner => '4',
            Tile::Pillar => 'P',
            Tile::Door(Direction::North) => 'n',
            Tile::Door(Direction::South) => 's',
            Tile::Door(Direction::East) => 'e',
            Tile::Door(Direction::West) => 'w',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposites() {
        assert_eq!(Direction::North.opposite(), Direction::South);
        assert_eq!(Direction::East.opposite(), Direction::West);
        for dir in Direction::all() {
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }

    #[test]
    fn test_step_offsets() {
        assert_eq!(Direction::North.step(), Position::new(-1, 0));
        assert_eq!(Direction::South.step(), Position::new(1, 0));
        assert_eq!(Direction::East.step(), Position::new(0, 1));
        assert_eq!(Direction::West.step(), Position::new(0, -1));
    }

    #[test]
    fn test_walkable_tiles() {
        assert!(Tile::Floor.is_walkable());
        assert!(Tile::Door(Direction::North).is_walkable());
        assert!(!Tile::Void.is_walkable());
        assert!(!Tile::NorthWall.is_walkable());
        assert!(!Tile::Pillar.is_walkable());
    }

    #[test]
    fn test_ascii_round_trip() {
        for symbol in [
            ' ', '.', '-', '_', '[', ']', '1', '2', '3', '4', 'P', 'n', 's', 'e', 'w',
        ] {
            let tile = Tile::from_ascii(symbol).unwrap();
            assert_eq!(tile.to_ascii(), symbol);
        }
        assert!(Tile::from_ascii('?').is_none());
    }
}
