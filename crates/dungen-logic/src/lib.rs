//! Pure placement logic for dungen.
//!
//! This crate contains the math and selection rules used by the tile
//! placement engine that do not depend on an ECS, a random number generator
//! or any runtime. Functions take plain data and return results, making them
//! unit-testable in isolation.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`alignment`] | Closed-form pose that joins a tile socket to a target socket |
//! | [`curve`] | Connection chance curves (constant, linear, keyframes, custom) |
//! | [`geometry`] | Vectors, quaternions, rigid poses, oriented boxes and SAT overlap |
//! | [`path`] | Terminal tile and main path extraction over placement order |
//! | [`selection`] | Cumulative weighted selection over a prepared draw |

pub mod alignment;
pub mod curve;
pub mod geometry;
pub mod path;
pub mod selection;
