//! Dungen Core - Tile Dungeon Generation Engine
//!
//! Builds a dungeon by attaching room tiles to the open sockets of tiles
//! already placed, starting from a single root. Every socket ends either
//! joined to a new tile by a doorway or sealed with a blocker, and a run
//! succeeds only when exactly the target number of rooms was placed.
//!
//! # Architecture
//!
//! - **Catalog**: root templates plus weighted room templates
//! - **Placement**: depth-first expansion with per-socket backtracking
//! - **Graph**: committed tiles as `hecs` entities, in placement order
//! - **Oracle**: collision queries behind a trait, oriented boxes by default
//!
//! # Example
//!
//! ```rust,no_run
//! use dungen_core::prelude::*;
//!
//! let catalog = Catalog::new()
//!     .with_root(TileTemplate::room("hub", 6.0, 3.0, 6.0).with_face_sockets(&Face::ALL))
//!     .with_room(TileTemplate::room("cell", 4.0, 3.0, 4.0).with_face_sockets(&Face::ALL), 1.0);
//!
//! let mut generator = DungeonGenerator::new(GeneratorConfig::default(), catalog);
//! let dungeon = generator.generate_seeded(42).expect("generation failed");
//! println!("terminal {:?}, path {:?}", dungeon.terminal(), dungeon.main_path());
//! ```

pub mod catalog;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod generation;
pub mod graph;
pub mod occupancy;
pub mod persistence;
pub mod random;
pub mod validation;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::catalog::{Catalog, Face, TileTemplate};
    pub use crate::components::*;
    pub use crate::config::{BoxBounds, DungeonSpec, GeneratorConfig};
    pub use crate::engine::DungeonGenerator;
    pub use crate::error::{ConfigError, GenerationError};
    pub use crate::events::{EventSink, Flow, GenerationEvent, Pacer};
    pub use crate::generation::GenerationReport;
    pub use crate::graph::DungeonGraph;
    pub use crate::occupancy::{BoundsRestriction, BoxOccupancy, OccupancyOracle};
    pub use crate::random::{seeded, RandomSource};
    pub use dungen_logic::curve::ChanceCurve;
    pub use dungen_logic::path::PathPolicy;
}
