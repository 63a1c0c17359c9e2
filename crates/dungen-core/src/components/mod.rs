//! Component definitions for committed tiles.
//!
//! Every committed tile is one entity carrying [`Tile`], a world
//! [`Pose`], its [`Sockets`] and its local [`Footprint`]. Components are
//! plain data; placement logic lives in [`crate::generation`].

mod tile;

pub use dungen_logic::geometry::{Aabb, Pose, Quat, Vec3};
pub use tile::*;
