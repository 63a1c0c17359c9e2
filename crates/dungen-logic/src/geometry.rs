//! Rigid-body geometry for tile placement.
//!
//! Axis convention: +Y is up, +Z is forward. A socket faces outward along its
//! local forward axis. Angles are radians unless a function name says
//! otherwise.

use serde::{Deserialize, Serialize};

/// 3D vector
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };
    pub const X: Self = Self { x: 1.0, y: 0.0, z: 0.0 };
    pub const UP: Self = Self { x: 0.0, y: 1.0, z: 0.0 };
    pub const FORWARD: Self = Self { x: 0.0, y: 0.0, z: 1.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }

    pub fn dot(&self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn length(&self) -> f32 {
        self.dot(*self).sqrt()
    }

    pub fn distance(&self, other: Self) -> f32 {
        (*self - other).length()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            *self * (1.0 / len)
        } else {
            Self::ZERO
        }
    }

    pub fn abs(&self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    /// Component-wise comparison within `epsilon`.
    pub fn approx_eq(&self, other: Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.z - other.z).abs() <= epsilon
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl std::ops::AddAssign for Vec3 {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl std::ops::Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Unit quaternion rotation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    pub fn from_axis_angle(axis: Vec3, radians: f32) -> Self {
        let axis = axis.normalize();
        let (sin, cos) = (radians * 0.5).sin_cos();
        Self {
            x: axis.x * sin,
            y: axis.y * sin,
            z: axis.z * sin,
            w: cos,
        }
    }

    /// Rotation about world up.
    pub fn from_yaw(radians: f32) -> Self {
        Self::from_axis_angle(Vec3::UP, radians)
    }

    /// Euler angles in degrees, applied roll (Z), then pitch (X), then yaw (Y).
    pub fn from_euler_degrees(pitch: f32, yaw: f32, roll: f32) -> Self {
        let qy = Self::from_axis_angle(Vec3::UP, yaw.to_radians());
        let qx = Self::from_axis_angle(Vec3::X, pitch.to_radians());
        let qz = Self::from_axis_angle(Vec3::FORWARD, roll.to_radians());
        qy * qx * qz
    }

    /// Inverse of a unit quaternion.
    pub fn inverse(&self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: self.w,
        }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
                z: self.z / len,
                w: self.w / len,
            }
        } else {
            Self::IDENTITY
        }
    }

    pub fn rotate(&self, v: Vec3) -> Vec3 {
        let q = Vec3::new(self.x, self.y, self.z);
        let t = q.cross(v) * 2.0;
        v + t * self.w + q.cross(t)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }
}

impl std::ops::Mul for Quat {
    type Output = Self;
    fn mul(self, b: Self) -> Self {
        let a = self;
        Self {
            w: a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
            x: a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            y: a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            z: a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
        }
    }
}

/// Position and orientation of a tile or socket.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// World pose of `local`, expressed relative to this pose.
    pub fn compose(&self, local: &Pose) -> Pose {
        Pose {
            position: self.transform_point(local.position),
            rotation: (self.rotation * local.rotation).normalize(),
        }
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation.rotate(point)
    }

    /// Outward-facing axis.
    pub fn forward(&self) -> Vec3 {
        self.rotation.rotate(Vec3::FORWARD)
    }

    pub fn inverse(&self) -> Pose {
        let rotation = self.rotation.inverse();
        Pose {
            position: rotation.rotate(-self.position),
            rotation,
        }
    }
}

/// Axis-aligned box in a tile's local space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Aabb {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl Aabb {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// Box centered on the origin with the given full size.
    pub fn from_size(width: f32, height: f32, depth: f32) -> Self {
        Self::new(Vec3::ZERO, Vec3::new(width, height, depth) * 0.5)
    }

    pub fn size(&self) -> Vec3 {
        self.half_extents * 2.0
    }

    pub fn is_valid(&self) -> bool {
        self.center.is_finite()
            && self.half_extents.is_finite()
            && self.half_extents.x > 0.0
            && self.half_extents.y > 0.0
            && self.half_extents.z > 0.0
    }
}

/// Oriented box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub axes: [Vec3; 3],
}

impl Obb {
    pub fn from_box(local: &Aabb, pose: &Pose) -> Self {
        Self {
            center: pose.transform_point(local.center),
            half_extents: local.half_extents,
            axes: [
                pose.rotation.rotate(Vec3::X),
                pose.rotation.rotate(Vec3::UP),
                pose.rotation.rotate(Vec3::FORWARD),
            ],
        }
    }

    pub fn corners(&self) -> [Vec3; 8] {
        const SIGNS: [(f32, f32, f32); 8] = [
            (-1.0, -1.0, -1.0),
            (1.0, -1.0, -1.0),
            (1.0, 1.0, -1.0),
            (-1.0, 1.0, -1.0),
            (-1.0, -1.0, 1.0),
            (1.0, -1.0, 1.0),
            (1.0, 1.0, 1.0),
            (-1.0, 1.0, 1.0),
        ];
        let [ax, ay, az] = self.axes;
        let h = self.half_extents;
        let mut corners = [Vec3::ZERO; 8];
        for (i, &(sx, sy, sz)) in SIGNS.iter().enumerate() {
            corners[i] = self.center + ax * (sx * h.x) + ay * (sy * h.y) + az * (sz * h.z);
        }
        corners
    }

    fn projected_radius(&self, axis: Vec3) -> f32 {
        self.half_extents.x * self.axes[0].dot(axis).abs()
            + self.half_extents.y * self.axes[1].dot(axis).abs()
            + self.half_extents.z * self.axes[2].dot(axis).abs()
    }

    /// Separating axis test over the 15 candidate axes.
    ///
    /// Boxes whose penetration along some axis is at most `tolerance` are
    /// touching, not overlapping.
    pub fn overlaps(&self, other: &Obb, tolerance: f32) -> bool {
        let offset = other.center - self.center;
        let separated = |axis: Vec3| -> bool {
            let len = axis.length();
            if len < 1e-6 {
                // parallel edges give a degenerate cross product
                return false;
            }
            let axis = axis * (1.0 / len);
            let distance = offset.dot(axis).abs();
            distance >= self.projected_radius(axis) + other.projected_radius(axis) - tolerance
        };

        for axis in self.axes.iter().chain(other.axes.iter()) {
            if separated(*axis) {
                return false;
            }
        }
        for a in &self.axes {
            for b in &other.axes {
                if separated(a.cross(*b)) {
                    return false;
                }
            }
        }
        true
    }

    /// True if every corner lies inside `center ± extent` (inclusive).
    pub fn within(&self, center: Vec3, extent: Vec3, tolerance: f32) -> bool {
        self.corners().iter().all(|c| {
            let d = (*c - center).abs();
            d.x <= extent.x + tolerance && d.y <= extent.y + tolerance && d.z <= extent.z + tolerance
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    const EPS: f32 = 1e-4;

    #[test]
    fn test_yaw_rotates_forward() {
        let q = Quat::from_yaw(FRAC_PI_2);
        assert!(q.rotate(Vec3::FORWARD).approx_eq(Vec3::X, EPS));

        let half_turn = Quat::from_yaw(PI);
        assert!(half_turn.rotate(Vec3::FORWARD).approx_eq(-Vec3::FORWARD, EPS));
    }

    #[test]
    fn test_quat_inverse_undoes_rotation() {
        let q = Quat::from_euler_degrees(20.0, 135.0, -10.0);
        let v = Vec3::new(1.0, 2.0, 3.0);
        let back = q.inverse().rotate(q.rotate(v));
        assert!(back.approx_eq(v, EPS));
    }

    #[test]
    fn test_euler_order_matches_composition() {
        let q = Quat::from_euler_degrees(0.0, 90.0, 0.0);
        assert!(q.rotate(Vec3::FORWARD).approx_eq(Vec3::X, EPS));
        // pitch keeps x untouched
        let p = Quat::from_euler_degrees(90.0, 0.0, 0.0);
        assert!(p.rotate(Vec3::X).approx_eq(Vec3::X, EPS));
    }

    #[test]
    fn test_pose_compose_and_inverse() {
        let parent = Pose::new(Vec3::new(10.0, 0.0, 0.0), Quat::from_yaw(FRAC_PI_2));
        let local = Pose::from_position(Vec3::new(0.0, 0.0, 2.0));
        let world = parent.compose(&local);
        assert!(world.position.approx_eq(Vec3::new(12.0, 0.0, 0.0), EPS));

        let roundtrip = parent.inverse().compose(&world);
        assert!(roundtrip.position.approx_eq(local.position, EPS));
    }

    #[test]
    fn test_touching_boxes_do_not_overlap() {
        let cube = Aabb::from_size(2.0, 2.0, 2.0);
        let a = Obb::from_box(&cube, &Pose::IDENTITY);
        let b = Obb::from_box(&cube, &Pose::from_position(Vec3::new(2.0, 0.0, 0.0)));
        assert!(!a.overlaps(&b, 0.01));
        assert!(!b.overlaps(&a, 0.01));
    }

    #[test]
    fn test_penetrating_boxes_overlap() {
        let cube = Aabb::from_size(2.0, 2.0, 2.0);
        let a = Obb::from_box(&cube, &Pose::IDENTITY);
        let b = Obb::from_box(&cube, &Pose::from_position(Vec3::new(1.5, 0.0, 0.0)));
        assert!(a.overlaps(&b, 0.01));
    }

    #[test]
    fn test_rotated_box_separation() {
        let long = Aabb::from_size(10.0, 1.0, 1.0);
        let a = Obb::from_box(&long, &Pose::IDENTITY);
        // rotated 90° the long axis points along z and reaches back into `a`
        let b = Obb::from_box(
            &long,
            &Pose::new(Vec3::new(0.0, 0.0, 4.0), Quat::from_yaw(FRAC_PI_2)),
        );
        assert!(a.overlaps(&b, 0.01));
        let c = Obb::from_box(
            &long,
            &Pose::new(Vec3::new(0.0, 0.0, 4.0), Quat::IDENTITY),
        );
        assert!(!a.overlaps(&c, 0.01));
    }

    #[test]
    fn test_within_bounds() {
        let cube = Aabb::from_size(2.0, 2.0, 2.0);
        let inside = Obb::from_box(&cube, &Pose::from_position(Vec3::new(3.0, 0.0, 0.0)));
        assert!(inside.within(Vec3::ZERO, Vec3::splat(4.0), 0.0));
        let outside = Obb::from_box(&cube, &Pose::from_position(Vec3::new(3.5, 0.0, 0.0)));
        assert!(!outside.within(Vec3::ZERO, Vec3::splat(4.0), 0.0));
    }
}
