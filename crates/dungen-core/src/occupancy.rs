//! Occupancy oracle and bounds restriction.
//!
//! The engine never inspects geometry itself. It asks an oracle whether a
//! candidate volume overlaps anything already committed, and optionally asks
//! a bounds restriction whether the volume stays inside the allowed region.

use dungen_logic::geometry::{Aabb, Obb, Pose};

use crate::components::TileId;

/// Collision query service consulted for every candidate placement.
pub trait OccupancyOracle {
    /// Committed tiles whose volume overlaps `volume` placed at `pose`.
    fn query_overlap(&self, volume: &Aabb, pose: &Pose) -> Vec<TileId>;

    /// Record a committed tile so later queries see it.
    fn insert(&mut self, id: TileId, volume: &Aabb, pose: &Pose);

    /// Forget every committed tile.
    fn clear(&mut self);
}

/// Region check applied when bounds restriction is enabled.
pub trait BoundsRestriction {
    fn within_bounds(&self, pose: &Pose, extent: &Aabb) -> bool;
}

/// Oracle backed by oriented boxes and a separating axis test.
#[derive(Debug, Clone)]
pub struct BoxOccupancy {
    boxes: Vec<(TileId, Obb)>,
    tolerance: f32,
}

impl Default for BoxOccupancy {
    fn default() -> Self {
        Self::new(0.01)
    }
}

impl BoxOccupancy {
    /// `tolerance` is the penetration depth still treated as touching.
    pub fn new(tolerance: f32) -> Self {
        Self {
            boxes: Vec::new(),
            tolerance,
        }
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }
}

impl OccupancyOracle for BoxOccupancy {
    fn query_overlap(&self, volume: &Aabb, pose: &Pose) -> Vec<TileId> {
        let probe = Obb::from_box(volume, pose);
        self.boxes
            .iter()
            .filter(|(_, placed)| probe.overlaps(placed, self.tolerance))
            .map(|(id, _)| *id)
            .collect()
    }

    fn insert(&mut self, id: TileId, volume: &Aabb, pose: &Pose) {
        self.boxes.push((id, Obb::from_box(volume, pose)));
    }

    fn clear(&mut self) {
        self.boxes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungen_logic::geometry::{Quat, Vec3};
    use std::f32::consts::FRAC_PI_4;

    #[test]
    fn test_query_sees_inserted_tiles() {
        let room = Aabb::from_size(4.0, 3.0, 4.0);
        let mut oracle = BoxOccupancy::default();
        oracle.insert(TileId(0), &room, &Pose::IDENTITY);
        oracle.insert(TileId(1), &room, &Pose::from_position(Vec3::new(4.0, 0.0, 0.0)));

        // flush against tile 1's far wall
        let clear = Pose::from_position(Vec3::new(8.0, 0.0, 0.0));
        assert!(oracle.query_overlap(&room, &clear).is_empty());

        let between = Pose::from_position(Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(oracle.query_overlap(&room, &between), vec![TileId(0), TileId(1)]);

        oracle.clear();
        assert!(oracle.is_empty());
        assert!(oracle.query_overlap(&room, &between).is_empty());
    }

    #[test]
    fn test_rotated_probe() {
        let room = Aabb::from_size(4.0, 3.0, 4.0);
        let mut oracle = BoxOccupancy::default();
        oracle.insert(TileId(0), &room, &Pose::IDENTITY);
        // a 45° turn pushes the corner into the neighbour
        let turned = Pose::new(Vec3::new(4.0, 0.0, 0.0), Quat::from_yaw(FRAC_PI_4));
        assert_eq!(oracle.query_overlap(&room, &turned), vec![TileId(0)]);
    }
}
