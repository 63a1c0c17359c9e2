//! Tile templates and the weighted catalog they are drawn from.

use std::f32::consts::{FRAC_PI_2, PI};

use dungen_logic::curve::ChanceCurve;
use dungen_logic::geometry::{Aabb, Pose, Quat, Vec3};
use dungen_logic::selection::{pick_weighted, total_weight};
use serde::{Deserialize, Serialize};

use crate::components::{RepeatMode, TemplateRef};
use crate::error::ConfigError;
use crate::random::RandomSource;

fn default_true() -> bool {
    true
}

/// Wall of a box-shaped tile, used to place sockets on face centers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Face {
    North,
    South,
    East,
    West,
}

impl Face {
    pub const ALL: [Face; 4] = [Face::North, Face::East, Face::South, Face::West];

    /// Socket pose at the center of this face, facing outward.
    pub fn socket_pose(self, bounds: &Aabb) -> Pose {
        let c = bounds.center;
        let h = bounds.half_extents;
        match self {
            Face::North => Pose::new(c + Vec3::new(0.0, 0.0, h.z), Quat::IDENTITY),
            Face::South => Pose::new(c + Vec3::new(0.0, 0.0, -h.z), Quat::from_yaw(PI)),
            Face::East => Pose::new(c + Vec3::new(h.x, 0.0, 0.0), Quat::from_yaw(FRAC_PI_2)),
            Face::West => Pose::new(c + Vec3::new(-h.x, 0.0, 0.0), Quat::from_yaw(-FRAC_PI_2)),
        }
    }
}

/// Immutable description of a placeable tile kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileTemplate {
    /// Opaque handle to the tile's asset
    pub name: String,
    /// Local bounding volume
    pub bounds: Aabb,
    /// Socket poses relative to the tile
    #[serde(default)]
    pub sockets: Vec<Pose>,
    #[serde(default = "default_true")]
    pub allow_rotation: bool,
    #[serde(default)]
    pub repeat_mode: RepeatMode,
    /// Overrides the configured default curve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_chance: Option<ChanceCurve>,
}

impl TileTemplate {
    pub fn new(name: impl Into<String>, bounds: Aabb) -> Self {
        Self {
            name: name.into(),
            bounds,
            sockets: Vec::new(),
            allow_rotation: true,
            repeat_mode: RepeatMode::Allow,
            connection_chance: None,
        }
    }

    /// Box tile centered on the origin.
    pub fn room(name: impl Into<String>, width: f32, height: f32, depth: f32) -> Self {
        Self::new(name, Aabb::from_size(width, height, depth))
    }

    pub fn with_socket(mut self, pose: Pose) -> Self {
        self.sockets.push(pose);
        self
    }

    pub fn with_face_socket(self, face: Face) -> Self {
        let pose = face.socket_pose(&self.bounds);
        self.with_socket(pose)
    }

    pub fn with_face_sockets(self, faces: &[Face]) -> Self {
        faces.iter().fold(self, |t, f| t.with_face_socket(*f))
    }

    pub fn fixed_rotation(mut self) -> Self {
        self.allow_rotation = false;
        self
    }

    pub fn with_repeat_mode(mut self, mode: RepeatMode) -> Self {
        self.repeat_mode = mode;
        self
    }

    pub fn with_connection_chance(mut self, curve: ChanceCurve) -> Self {
        self.connection_chance = Some(curve);
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.bounds.is_valid() {
            return Err(ConfigError::InvalidTemplateBounds {
                name: self.name.clone(),
            });
        }
        for (index, socket) in self.sockets.iter().enumerate() {
            if !socket.position.is_finite()
                || !socket.rotation.is_finite()
                || socket.rotation.length() < 1e-6
            {
                return Err(ConfigError::InvalidSocket {
                    name: self.name.clone(),
                    index,
                });
            }
        }
        if let Some(problem) = self.connection_chance.as_ref().and_then(|c| c.problem()) {
            return Err(ConfigError::InvalidCurve {
                owner: format!("template `{}`", self.name),
                problem,
            });
        }
        Ok(())
    }
}

/// Room template with its selection weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedTemplate {
    pub template: TileTemplate,
    pub weight: f32,
}

/// Root (spawn) templates plus weighted room templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub roots: Vec<TileTemplate>,
    #[serde(default)]
    pub rooms: Vec<WeightedTemplate>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, template: TileTemplate) -> Self {
        self.roots.push(template);
        self
    }

    pub fn with_room(mut self, template: TileTemplate, weight: f32) -> Self {
        self.rooms.push(WeightedTemplate { template, weight });
        self
    }

    pub fn template(&self, which: TemplateRef) -> Option<&TileTemplate> {
        match which {
            TemplateRef::Root(i) => self.roots.get(i),
            TemplateRef::Room(i) => self.rooms.get(i).map(|w| &w.template),
        }
    }

    pub fn weights(&self) -> Vec<f32> {
        self.rooms.iter().map(|w| w.weight).collect()
    }

    /// Weighted draw over room templates.
    pub fn select_room(&self, rng: &mut dyn RandomSource) -> Result<usize, ConfigError> {
        let weights = self.weights();
        let total = total_weight(&weights);
        if total <= 0.0 {
            return Err(if self.rooms.is_empty() {
                ConfigError::NoRoomTemplates
            } else {
                ConfigError::ZeroWeights
            });
        }
        let draw = rng.next_unit() * total;
        pick_weighted(&weights, draw).ok_or(ConfigError::SelectionFellThrough { draw, total })
    }

    /// Uniform draw over root templates.
    pub fn select_root(&self, rng: &mut dyn RandomSource) -> Result<usize, ConfigError> {
        match self.roots.len() {
            0 => Err(ConfigError::MissingRootTemplate),
            1 => Ok(0),
            n => Ok(rng.next_index(n)),
        }
    }

    /// Check the catalog can serve a run placing `target` room tiles.
    pub fn validate(&self, target: u32) -> Result<(), ConfigError> {
        if self.roots.is_empty() {
            return Err(ConfigError::MissingRootTemplate);
        }
        for template in &self.roots {
            template.validate()?;
        }
        for entry in &self.rooms {
            if !entry.weight.is_finite() || entry.weight < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    name: entry.template.name.clone(),
                    weight: entry.weight,
                });
            }
            entry.template.validate()?;
        }
        if target > 0 {
            if self.rooms.is_empty() {
                return Err(ConfigError::EmptyCatalog { target });
            }
            if total_weight(&self.weights()) <= 0.0 {
                return Err(ConfigError::ZeroWeights);
            }
        }
        for entry in &self.rooms {
            if entry.template.sockets.is_empty() {
                log::warn!(
                    "Room template `{}` has no sockets and can never be attached",
                    entry.template.name
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded;

    fn cube(name: &str) -> TileTemplate {
        TileTemplate::room(name, 4.0, 3.0, 4.0).with_face_sockets(&Face::ALL)
    }

    #[test]
    fn test_weighted_frequencies_converge() {
        let catalog = Catalog::new()
            .with_root(cube("hub"))
            .with_room(cube("a"), 1.0)
            .with_room(cube("b"), 2.0)
            .with_room(cube("c"), 1.0);
        let mut rng = seeded(42);
        let draws = 40_000;
        let mut counts = [0usize; 3];
        for _ in 0..draws {
            counts[catalog.select_room(&mut rng).unwrap()] += 1;
        }
        let expected = [0.25, 0.5, 0.25];
        for (count, want) in counts.iter().zip(expected) {
            let freq = *count as f64 / draws as f64;
            assert!((freq - want).abs() < 0.02, "freq {} vs {}", freq, want);
        }
    }

    #[test]
    fn test_zero_weight_never_selected() {
        let catalog = Catalog::new()
            .with_root(cube("hub"))
            .with_room(cube("never"), 0.0)
            .with_room(cube("always"), 3.0);
        let mut rng = seeded(3);
        for _ in 0..1000 {
            assert_eq!(catalog.select_room(&mut rng).unwrap(), 1);
        }
    }

    #[test]
    fn test_empty_and_zero_catalogs_fail() {
        let mut rng = seeded(0);
        let empty = Catalog::new().with_root(cube("hub"));
        assert!(matches!(
            empty.select_room(&mut rng),
            Err(ConfigError::NoRoomTemplates)
        ));
        assert_eq!(
            ConfigError::NoRoomTemplates.to_string(),
            "catalog has no room templates to select from"
        );
        assert!(matches!(
            empty.validate(3),
            Err(ConfigError::EmptyCatalog { target: 3 })
        ));
        assert!(empty.validate(0).is_ok());

        let zero = Catalog::new().with_root(cube("hub")).with_room(cube("a"), 0.0);
        assert!(matches!(zero.select_room(&mut rng), Err(ConfigError::ZeroWeights)));
        assert!(matches!(zero.validate(1), Err(ConfigError::ZeroWeights)));
    }

    #[test]
    fn test_validate_rejects_bad_templates() {
        let no_root = Catalog::new().with_room(cube("a"), 1.0);
        assert!(matches!(no_root.validate(1), Err(ConfigError::MissingRootTemplate)));

        let negative = Catalog::new().with_root(cube("hub")).with_room(cube("a"), -1.0);
        assert!(matches!(negative.validate(1), Err(ConfigError::InvalidWeight { .. })));

        let flat = Catalog::new()
            .with_root(TileTemplate::room("flat", 4.0, 0.0, 4.0))
            .with_room(cube("a"), 1.0);
        assert!(matches!(
            flat.validate(1),
            Err(ConfigError::InvalidTemplateBounds { .. })
        ));

        // an all-zero rotation would otherwise normalize to identity
        let degenerate = Pose::new(Vec3::new(0.0, 0.0, 2.0), Quat { x: 0.0, y: 0.0, z: 0.0, w: 0.0 });
        let twisted = Catalog::new()
            .with_root(cube("hub"))
            .with_room(cube("a").with_socket(degenerate), 1.0);
        assert!(matches!(
            twisted.validate(1),
            Err(ConfigError::InvalidSocket { index: 4, .. })
        ));
    }

    #[test]
    fn test_face_sockets_sit_on_walls() {
        let t = TileTemplate::room("r", 6.0, 3.0, 4.0).with_face_sockets(&Face::ALL);
        assert_eq!(t.sockets.len(), 4);
        let north = t.sockets[0];
        assert!(north.position.approx_eq(Vec3::new(0.0, 0.0, 2.0), 1e-5));
        let east = t.sockets[1];
        assert!(east.position.approx_eq(Vec3::new(3.0, 0.0, 0.0), 1e-5));
        assert!(east.forward().approx_eq(Vec3::X, 1e-5));
        let west = t.sockets[3];
        assert!(west.forward().approx_eq(-Vec3::X, 1e-5));
    }

    #[test]
    fn test_catalog_json() {
        let json = r#"{
            "roots": [{"name": "hub", "bounds": {"center": {"x":0,"y":0,"z":0}, "half_extents": {"x":2,"y":1,"z":2}}}],
            "rooms": [{"weight": 2.0, "template": {
                "name": "hall",
                "bounds": {"center": {"x":0,"y":0,"z":0}, "half_extents": {"x":1,"y":1,"z":3}},
                "sockets": [{"position": {"x":0,"y":0,"z":3}}],
                "allow_rotation": false,
                "connection_chance": {"kind": "constant", "value": 0.9}
            }}]
        }"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.roots.len(), 1);
        assert!(catalog.roots[0].allow_rotation);
        let hall = &catalog.rooms[0].template;
        assert!(!hall.allow_rotation);
        assert_eq!(hall.sockets[0].rotation, Quat::IDENTITY);
        assert!(catalog.validate(4).is_ok());
    }
}
