//! Generator - main entry point for building a dungeon

use crate::catalog::Catalog;
use crate::config::{DungeonSpec, GeneratorConfig};
use crate::error::{ConfigError, GenerationError, Result};
use crate::events::{EventSink, GenerationEvent, NullSink, Pacer, Unpaced};
use crate::generation::{finalize, GenerationReport, PlacementEngine};
use crate::graph::DungeonGraph;
use crate::occupancy::{BoundsRestriction, BoxOccupancy, OccupancyOracle};
use crate::random::{seeded, RandomSource};

/// Runs attempts until one places exactly the target number of tiles.
///
/// Each attempt starts from a fresh root. A short attempt is torn down and
/// retried; after `max_failed_attempts` attempts the call fails with
/// [`GenerationError::RetryBudgetExceeded`].
pub struct DungeonGenerator<O: OccupancyOracle = BoxOccupancy> {
    config: GeneratorConfig,
    catalog: Catalog,
    oracle: O,
}

impl DungeonGenerator<BoxOccupancy> {
    /// Generator using the box oracle with the configured tolerance.
    pub fn new(config: GeneratorConfig, catalog: Catalog) -> Self {
        let oracle = BoxOccupancy::new(config.overlap_tolerance);
        Self::with_oracle(config, catalog, oracle)
    }

    pub fn from_spec(spec: DungeonSpec) -> Self {
        Self::new(spec.config, spec.catalog)
    }

    /// Parse a `DungeonSpec` document.
    pub fn from_json(json: &str) -> std::result::Result<Self, ConfigError> {
        Ok(Self::from_spec(DungeonSpec::from_json(json)?))
    }
}

impl<O: OccupancyOracle> DungeonGenerator<O> {
    pub fn with_oracle(config: GeneratorConfig, catalog: Catalog, oracle: O) -> Self {
        Self {
            config,
            catalog,
            oracle,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The oracle keeps the last successful layout until the next call.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.config.validate()?;
        self.catalog.validate(self.config.target_tile_size)
    }

    /// Generate with the given random source, no events and no pacing.
    pub fn generate<R: RandomSource>(&mut self, rng: &mut R) -> Result<DungeonGraph> {
        self.generate_with(rng, &mut NullSink, &mut Unpaced)
    }

    /// Generate from a seeded `StdRng`; the same seed yields the same layout.
    pub fn generate_seeded(&mut self, seed: u64) -> Result<DungeonGraph> {
        let mut rng = seeded(seed);
        self.generate(&mut rng)
    }

    /// Generate, reporting events to `sink` and calling `pacer` before every
    /// socket step.
    pub fn generate_with(
        &mut self,
        rng: &mut dyn RandomSource,
        sink: &mut dyn EventSink,
        pacer: &mut dyn Pacer,
    ) -> Result<DungeonGraph> {
        self.validate()?;

        let target = self.config.target_tile_size;
        let max_attempts = self.config.max_failed_attempts;
        let bounds: Option<&dyn BoundsRestriction> = if self.config.restrict_to_bounds {
            Some(&self.config.bounds)
        } else {
            None
        };

        log::info!(
            "Generating dungeon: {} tiles, up to {} attempts",
            target,
            max_attempts
        );

        let mut graph = DungeonGraph::new();
        let mut report = GenerationReport::default();

        for attempt in 1..=max_attempts {
            self.oracle.clear();
            report.attempts = attempt;
            sink.send(GenerationEvent::AttemptStarted { attempt });
            log::info!("Attempt {}/{}", attempt, max_attempts);

            let outcome = PlacementEngine::new(
                &self.config,
                &self.catalog,
                bounds,
                &mut self.oracle,
                &mut *rng,
                &mut *sink,
                &mut *pacer,
                &mut graph,
                &mut report,
                attempt,
            )
            .run();

            match outcome {
                Ok(placed) if placed == target => {
                    finalize(&mut graph, self.config.path_policy, sink);
                    report.placed = placed;
                    fill_report(&mut report, &graph);
                    log::info!(
                        "Dungeon complete after {} attempt(s): {} tiles, max depth {}",
                        attempt,
                        report.tiles,
                        report.max_depth
                    );
                    graph.set_report(report);
                    return Ok(graph);
                }
                Ok(placed) => {
                    log::warn!(
                        "Attempt {}/{} placed {} of {} tiles",
                        attempt,
                        max_attempts,
                        placed,
                        target
                    );
                    sink.send(GenerationEvent::AttemptFailed {
                        attempt,
                        placed,
                        target,
                    });
                    graph.clear();
                    self.oracle.clear();
                }
                Err(err) => {
                    graph.clear();
                    self.oracle.clear();
                    log::warn!("Generation stopped: {}", err);
                    return Err(err);
                }
            }
        }

        log::warn!("Retry budget exhausted after {} attempts", max_attempts);
        Err(GenerationError::RetryBudgetExceeded {
            attempts: max_attempts,
        })
    }
}

fn fill_report(report: &mut GenerationReport, graph: &DungeonGraph) {
    let snapshots = graph.snapshots();
    report.tiles = snapshots.len();
    report.sockets_connected = snapshots.iter().map(|s| s.sockets.connected_count()).sum();
    report.sockets_sealed = snapshots.iter().map(|s| s.sockets.sealed_count()).sum();
    report.max_depth = graph.max_depth();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Face, TileTemplate};
    use crate::events::{FnPacer, Flow, VecSink};
    use crate::components::TileId;
    use dungen_logic::curve::ChanceCurve;

    fn catalog() -> Catalog {
        let cube = |name: &str| TileTemplate::room(name, 4.0, 3.0, 4.0).with_face_sockets(&Face::ALL);
        Catalog::new()
            .with_root(cube("hub"))
            .with_room(cube("room"), 3.0)
            .with_room(
                TileTemplate::room("hall", 2.0, 3.0, 8.0)
                    .with_face_sockets(&[Face::North, Face::South]),
                1.0,
            )
    }

    #[test]
    fn test_generates_target_count() {
        let config = GeneratorConfig::default()
            .with_target(12)
            .with_chance(ChanceCurve::constant(1.0));
        let mut generator = DungeonGenerator::new(config, catalog());
        let graph = generator.generate_seeded(5).unwrap();
        assert_eq!(graph.len(), 13);
        assert_eq!(graph.report().placed, 12);
        assert_eq!(graph.report().tiles, 13);
        assert!(graph.is_tree());
        assert_eq!(generator.oracle().len(), 13);
    }

    #[test]
    fn test_zero_target_yields_root_only() {
        let config = GeneratorConfig::default().with_target(0);
        let mut generator = DungeonGenerator::new(config, catalog());
        let graph = generator.generate_seeded(1).unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.terminal(), Some(TileId::ROOT));
        assert_eq!(graph.main_path(), &[TileId::ROOT]);
        assert_eq!(graph.report().sockets_sealed, 4);
    }

    #[test]
    fn test_abort_returns_empty_handed() {
        let config = GeneratorConfig::default()
            .with_target(20)
            .with_chance(ChanceCurve::constant(1.0));
        let mut generator = DungeonGenerator::new(config, catalog());
        let mut sink = VecSink::new();
        let mut pacer = FnPacer(|step: u64| if step >= 5 { Flow::Abort } else { Flow::Continue });
        let err = generator
            .generate_with(&mut seeded(2), &mut sink, &mut pacer)
            .unwrap_err();
        assert!(matches!(err, GenerationError::Aborted { attempt: 1 }));
        assert!(generator.oracle().is_empty());
        assert!(sink.terminal().is_none());
    }

    #[test]
    fn test_invalid_config_fails_before_placement() {
        let config = GeneratorConfig::default().with_padding(-0.5);
        let mut generator = DungeonGenerator::new(config, catalog());
        let mut sink = VecSink::new();
        let err = generator
            .generate_with(&mut seeded(0), &mut sink, &mut Unpaced)
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Configuration(ConfigError::NegativePadding(_))
        ));
        assert!(sink.events.is_empty());
    }
}
