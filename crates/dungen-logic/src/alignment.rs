//! Socket alignment: where a tile must go so one of its sockets meets a
//! target socket face to face.

use std::f32::consts::PI;

use crate::geometry::{Pose, Quat};

/// Compute the world pose of a tile so that the socket at `socket_local`
/// (relative to the tile) sits `padding` units out along the target socket's
/// outward axis.
///
/// With `allow_rotation` the socket's world orientation becomes the target
/// orientation yawed half a turn about world up, so it faces the target while
/// keeping the target's pitch and roll. Without it the tile keeps
/// `tile_rotation` and only its position is solved; the socket position then
/// still coincides exactly but its facing follows the fixed orientation.
pub fn align(
    target: &Pose,
    socket_local: &Pose,
    tile_rotation: Quat,
    allow_rotation: bool,
    padding: f32,
) -> Pose {
    let socket_position = target.position + target.forward() * padding;

    let rotation = if allow_rotation {
        let socket_rotation = Quat::from_yaw(PI) * target.rotation;
        (socket_rotation * socket_local.rotation.inverse()).normalize()
    } else {
        tile_rotation
    };

    Pose {
        position: socket_position - rotation.rotate(socket_local.position),
        rotation,
    }
}
