//! # Dungeon World
//!
//! The "World Bible" crate - tiles, room templates, and explicit dungeon
//! assembly. This crate is the single source of truth for dungeon geometry
//! and does not contain any narrative logic.
//!
//! ## Core Components
//!
//! - **tiles**: Tile kinds, directions, and the ASCII room dialect
//! - **room**: Room templates and parsed room layouts with door geometry
//! - **builder**: Assembles validated room layouts into one dungeon canvas
//! - **layout**: The immutable merged canvas and resolved door graph
//! - **npc**: NPC definitions and the live placement records they become
//! - **conversation**: Page sequences NPCs speak when interacted with

pub mod builder;
pub mod conversation;
pub mod layout;
pub mod npc;
pub mod room;
pub mod tiles;

pub use builder::*;
pub use conversation::*;
pub use layout::*;
pub use npc::*;
pub use room::*;
pub use tiles::*;
