//! Generator configuration.
//!
//! Every field has a default, so a JSON document only needs to name what it
//! changes. Validation runs before any placement.

use dungen_logic::curve::ChanceCurve;
use dungen_logic::geometry::{Aabb, Obb, Pose, Vec3};
use dungen_logic::path::PathPolicy;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::ConfigError;
use crate::occupancy::BoundsRestriction;

/// Configuration for dungeon generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Room tiles to place, not counting the root
    pub target_tile_size: u32,
    /// Total generation attempts before giving up
    pub max_failed_attempts: u32,
    /// Gap between two facing sockets
    pub tile_padding: f32,
    pub restrict_to_bounds: bool,
    pub bounds: BoxBounds,
    /// Default chance curve for templates without their own
    pub connection_chance: ChanceCurve,
    pub doorway_kinds: Vec<String>,
    pub blocker_kinds: Vec<String>,
    pub path_policy: PathPolicy,
    /// Penetration depth the default oracle treats as touching
    pub overlap_tolerance: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            target_tile_size: 10,
            max_failed_attempts: 10,
            tile_padding: 0.0,
            restrict_to_bounds: false,
            bounds: BoxBounds::default(),
            connection_chance: ChanceCurve::default(),
            doorway_kinds: vec!["doorway".to_string()],
            blocker_kinds: vec!["wall".to_string()],
            path_policy: PathPolicy::DepthScan,
            overlap_tolerance: 0.01,
        }
    }
}

impl GeneratorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_target(mut self, target_tile_size: u32) -> Self {
        self.target_tile_size = target_tile_size;
        self
    }

    pub fn with_max_attempts(mut self, max_failed_attempts: u32) -> Self {
        self.max_failed_attempts = max_failed_attempts;
        self
    }

    pub fn with_padding(mut self, tile_padding: f32) -> Self {
        self.tile_padding = tile_padding;
        self
    }

    pub fn with_chance(mut self, curve: ChanceCurve) -> Self {
        self.connection_chance = curve;
        self
    }

    pub fn with_bounds(mut self, bounds: BoxBounds) -> Self {
        self.restrict_to_bounds = true;
        self.bounds = bounds;
        self
    }

    pub fn with_path_policy(mut self, policy: PathPolicy) -> Self {
        self.path_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tile_padding.is_finite() || self.tile_padding < 0.0 {
            return Err(ConfigError::NegativePadding(self.tile_padding));
        }
        if !self.overlap_tolerance.is_finite() || self.overlap_tolerance < 0.0 {
            return Err(ConfigError::InvalidTolerance(self.overlap_tolerance));
        }
        if self.max_failed_attempts == 0 {
            return Err(ConfigError::NoRetryBudget);
        }
        if self.restrict_to_bounds && !self.bounds.is_valid() {
            return Err(ConfigError::InvalidBounds(self.bounds.extent));
        }
        if let Some(problem) = self.connection_chance.problem() {
            return Err(ConfigError::InvalidCurve {
                owner: "the configuration default".to_string(),
                problem,
            });
        }
        if self.doorway_kinds.is_empty() {
            return Err(ConfigError::EmptyKinds("doorway"));
        }
        if self.blocker_kinds.is_empty() {
            return Err(ConfigError::EmptyKinds("blocker"));
        }
        Ok(())
    }
}

/// World region as a center and half extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxBounds {
    pub center: Vec3,
    pub extent: Vec3,
}

impl Default for BoxBounds {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            extent: Vec3::splat(50.0),
        }
    }
}

impl BoxBounds {
    pub fn new(center: Vec3, extent: Vec3) -> Self {
        Self { center, extent }
    }

    pub fn is_valid(&self) -> bool {
        self.center.is_finite()
            && self.extent.is_finite()
            && self.extent.x > 0.0
            && self.extent.y > 0.0
            && self.extent.z > 0.0
    }
}

impl BoundsRestriction for BoxBounds {
    fn within_bounds(&self, pose: &Pose, extent: &Aabb) -> bool {
        Obb::from_box(extent, pose).within(self.center, self.extent, 1e-4)
    }
}

/// Configuration and catalog loaded together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DungeonSpec {
    #[serde(default)]
    pub config: GeneratorConfig,
    pub catalog: Catalog,
}

impl DungeonSpec {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.config.validate()?;
        self.catalog.validate(self.config.target_tile_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = GeneratorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.path_policy, PathPolicy::DepthScan);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GeneratorConfig::from_json(
            r#"{"target_tile_size": 25, "tile_padding": 0.5, "path_policy": "parent_chain"}"#,
        )
        .unwrap();
        assert_eq!(config.target_tile_size, 25);
        assert_eq!(config.max_failed_attempts, 10);
        assert_eq!(config.tile_padding, 0.5);
        assert_eq!(config.path_policy, PathPolicy::ParentChain);
    }

    #[test]
    fn test_negative_target_is_a_configuration_error() {
        let err = GeneratorConfig::from_json(r#"{"target_tile_size": -3}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_invalid_values() {
        let negative = GeneratorConfig::default().with_padding(-1.0);
        assert!(matches!(negative.validate(), Err(ConfigError::NegativePadding(_))));

        let no_budget = GeneratorConfig::default().with_max_attempts(0);
        assert!(matches!(no_budget.validate(), Err(ConfigError::NoRetryBudget)));

        let flat = GeneratorConfig::default()
            .with_bounds(BoxBounds::new(Vec3::ZERO, Vec3::new(10.0, 0.0, 10.0)));
        assert!(matches!(flat.validate(), Err(ConfigError::InvalidBounds(_))));

        let no_walls = GeneratorConfig {
            blocker_kinds: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(no_walls.validate(), Err(ConfigError::EmptyKinds("blocker"))));
    }

    #[test]
    fn test_box_bounds() {
        let bounds = BoxBounds::new(Vec3::ZERO, Vec3::new(10.0, 5.0, 10.0));
        let room = Aabb::from_size(4.0, 3.0, 4.0);
        assert!(bounds.within_bounds(&Pose::from_position(Vec3::new(8.0, 0.0, 0.0)), &room));
        assert!(!bounds.within_bounds(&Pose::from_position(Vec3::new(9.0, 0.0, 0.0)), &room));
    }
}
