//! Depth-first placement with per-socket backtracking.
//!
//! Each open socket of a tile is visited in random order. A socket either
//! receives a new tile (and the new tile is expanded before the next socket is
//! considered) or is sealed with a blocker. A candidate that cannot fit is
//! dropped on the spot; it never reaches the graph or the oracle.

use dungen_logic::alignment::align;
use dungen_logic::curve::ChanceCurve;
use dungen_logic::geometry::{Aabb, Pose, Quat};

use crate::catalog::Catalog;
use crate::components::{Doorway, Footprint, SocketState, Sockets, TemplateRef, Tile, TileId};
use crate::config::GeneratorConfig;
use crate::error::{GenerationError, Result};
use crate::events::{EventSink, Flow, GenerationEvent, Pacer};
use crate::graph::DungeonGraph;
use crate::occupancy::{BoundsRestriction, OccupancyOracle};
use crate::random::RandomSource;

use super::GenerationReport;

/// Borrowed state for a single attempt.
pub(crate) struct PlacementEngine<'a> {
    config: &'a GeneratorConfig,
    catalog: &'a Catalog,
    /// Present only when bounds restriction is enabled
    bounds: Option<&'a dyn BoundsRestriction>,
    oracle: &'a mut dyn OccupancyOracle,
    rng: &'a mut dyn RandomSource,
    sink: &'a mut dyn EventSink,
    pacer: &'a mut dyn Pacer,
    graph: &'a mut DungeonGraph,
    report: &'a mut GenerationReport,
    attempt: u32,
    placed: u32,
}

impl<'a> PlacementEngine<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: &'a GeneratorConfig,
        catalog: &'a Catalog,
        bounds: Option<&'a dyn BoundsRestriction>,
        oracle: &'a mut dyn OccupancyOracle,
        rng: &'a mut dyn RandomSource,
        sink: &'a mut dyn EventSink,
        pacer: &'a mut dyn Pacer,
        graph: &'a mut DungeonGraph,
        report: &'a mut GenerationReport,
        attempt: u32,
    ) -> Self {
        Self {
            config,
            catalog,
            bounds,
            oracle,
            rng,
            sink,
            pacer,
            graph,
            report,
            attempt,
            placed: 0,
        }
    }

    /// Spawn the root and expand it until every reachable socket is
    /// terminal. Returns the number of room tiles placed.
    pub fn run(mut self) -> Result<u32> {
        let root = self.spawn_root()?;
        self.expand(root)?;
        Ok(self.placed)
    }

    /// Instantiate the root tile at the origin.
    fn spawn_root(&mut self) -> Result<TileId> {
        let index = self.catalog.select_root(&mut *self.rng)?;
        let catalog = self.catalog;
        let template = &catalog.roots[index];
        let id = self.graph.next_id();
        let pose = Pose::IDENTITY;
        let tile = Tile {
            id,
            template: TemplateRef::Root(index),
            name: template.name.clone(),
            distance_from_root: 0,
            parent: None,
            allows_rotation: template.allow_rotation,
            repeat_mode: template.repeat_mode,
        };
        self.graph.commit(
            tile,
            pose,
            Sockets::from_poses(&template.sockets),
            Footprint(template.bounds),
        );
        self.oracle.insert(id, &template.bounds, &pose);
        self.sink.send(GenerationEvent::TileCommitted {
            tile: id,
            parent: None,
            depth: 0,
            position: pose.position,
        });
        Ok(id)
    }

    /// Visit every open socket of `tile`, recursing into each new child
    /// before moving on.
    fn expand(&mut self, tile: TileId) -> Result<()> {
        let (total, _, mut pool) = self.graph.socket_summary(tile);
        let curve = self.chance_for(tile);

        while !pool.is_empty() {
            self.report.steps += 1;
            if self.pacer.pause(self.report.steps) == Flow::Abort {
                return Err(GenerationError::Aborted {
                    attempt: self.attempt,
                });
            }

            let socket = pool.remove(self.rng.next_index(pool.len()));

            if self.placed >= self.config.target_tile_size {
                self.seal(tile, socket);
                continue;
            }

            let (_, used, _) = self.graph.socket_summary(tile);
            let chance = curve.evaluate(used as f32 / total as f32);
            let draw = self.rng.next_unit();
            if draw <= chance {
                if let Some(child) = self.try_connect(tile, socket)? {
                    self.expand(child)?;
                    continue;
                }
            }
            self.seal(tile, socket);
        }
        Ok(())
    }

    /// Draw a room template and look for one of its sockets that fits
    /// against `socket` of `owner`. Returns the committed tile.
    fn try_connect(&mut self, owner: TileId, socket: usize) -> Result<Option<TileId>> {
        let target = self.graph.socket_world_pose(owner, socket);
        debug_assert!(target.is_some(), "{} has no socket {}", owner, socket);
        let Some(target) = target else {
            return Ok(None);
        };

        let room = self.catalog.select_room(&mut *self.rng)?;
        self.report.candidates_tried += 1;

        let catalog = self.catalog;
        let template = &catalog.rooms[room].template;

        let id = self.graph.next_id();
        let mut sockets = Sockets::from_poses(&template.sockets);
        let mut untried: Vec<usize> = (0..sockets.len()).collect();

        while !untried.is_empty() {
            let candidate = untried.remove(self.rng.next_index(untried.len()));
            let pose = align(
                &target,
                &template.sockets[candidate],
                Quat::IDENTITY,
                template.allow_rotation,
                self.config.tile_padding,
            );

            if !self.is_clear(id, &template.bounds, &pose) {
                self.report.placements_rejected += 1;
                log::trace!(
                    "{} socket {} of `{}` blocked against {} socket {}",
                    id,
                    candidate,
                    template.name,
                    owner,
                    socket
                );
                continue;
            }

            let kind = self.pick_kind(self.config.doorway_kinds.len());
            sockets.0[candidate].state = SocketState::Connected(Doorway {
                kind,
                peer: owner,
                peer_socket: socket,
            });
            self.graph.set_socket_state(
                owner,
                socket,
                SocketState::Connected(Doorway {
                    kind,
                    peer: id,
                    peer_socket: candidate,
                }),
            );

            let depth = self.graph.distance_from_root(owner).unwrap_or(0) + 1;
            let tile = Tile {
                id,
                template: TemplateRef::Room(room),
                name: template.name.clone(),
                distance_from_root: depth,
                parent: Some(owner),
                allows_rotation: template.allow_rotation,
                repeat_mode: template.repeat_mode,
            };
            self.graph.commit(tile, pose, sockets, Footprint(template.bounds));
            self.oracle.insert(id, &template.bounds, &pose);
            self.placed += 1;
            self.sink.send(GenerationEvent::TileCommitted {
                tile: id,
                parent: Some(owner),
                depth,
                position: pose.position,
            });
            return Ok(Some(id));
        }

        log::debug!(
            "`{}` found no clear socket for {} socket {}",
            template.name,
            owner,
            socket
        );
        self.sink.send(GenerationEvent::CandidateRejected {
            template: room,
            target: owner,
            socket,
        });
        Ok(None)
    }

    /// Oracle finds nothing but the trial itself, and the bounds (if any)
    /// contain it.
    fn is_clear(&self, trial: TileId, volume: &Aabb, pose: &Pose) -> bool {
        let blocked = self
            .oracle
            .query_overlap(volume, pose)
            .into_iter()
            .any(|hit| hit != trial);
        if blocked {
            return false;
        }
        self.bounds
            .map_or(true, |bounds| bounds.within_bounds(pose, volume))
    }

    fn seal(&mut self, tile: TileId, socket: usize) {
        let blocker = self.pick_kind(self.config.blocker_kinds.len());
        if self
            .graph
            .set_socket_state(tile, socket, SocketState::Sealed { blocker })
        {
            log::debug!("Sealed {} socket {}", tile, socket);
            self.sink.send(GenerationEvent::SocketSealed { tile, socket });
        }
    }

    fn pick_kind(&mut self, len: usize) -> usize {
        if len > 1 {
            self.rng.next_index(len)
        } else {
            0
        }
    }

    /// The tile template's own curve, or the configured default.
    fn chance_for(&self, tile: TileId) -> &'a ChanceCurve {
        let catalog: &'a Catalog = self.catalog;
        let config: &'a GeneratorConfig = self.config;
        self.graph
            .template_of(tile)
            .and_then(|which| catalog.template(which))
            .and_then(|t| t.connection_chance.as_ref())
            .unwrap_or(&config.connection_chance)
    }
}
