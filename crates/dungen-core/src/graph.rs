//! The dungeon graph: committed tiles in placement order.
//!
//! Tiles live as entities in a `hecs::World`, which acts as the arena that
//! owns them; `order` keeps placement order so a tile's id is its index.
//! Edges are implicit in socket doorways.

use std::collections::{BTreeMap, HashSet, VecDeque};

use dungen_logic::geometry::{Aabb, Obb, Pose, Vec3};
use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use crate::components::{Footprint, SocketState, Sockets, TemplateRef, Tile, TileId};
use crate::generation::GenerationReport;

/// Owned copy of everything stored for one tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSnapshot {
    pub tile: Tile,
    pub pose: Pose,
    pub sockets: Sockets,
    pub footprint: Footprint,
}

impl TileSnapshot {
    pub fn world_box(&self) -> Obb {
        Obb::from_box(&self.footprint.0, &self.pose)
    }
}

#[derive(Default)]
pub struct DungeonGraph {
    world: World,
    order: Vec<Entity>,
    terminal: Option<TileId>,
    main_path: Vec<TileId>,
    report: GenerationReport,
}

impl std::fmt::Debug for DungeonGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DungeonGraph")
            .field("tiles", &self.order.len())
            .field("terminal", &self.terminal)
            .field("main_path", &self.main_path)
            .finish()
    }
}

impl DungeonGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// ECS world holding the tile entities
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Id the next committed tile will receive.
    pub fn next_id(&self) -> TileId {
        TileId(self.order.len() as u32)
    }

    pub fn entity(&self, id: TileId) -> Option<Entity> {
        self.order.get(id.index()).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = TileId> {
        (0..self.order.len() as u32).map(TileId)
    }

    pub(crate) fn commit(&mut self, tile: Tile, pose: Pose, sockets: Sockets, footprint: Footprint) -> TileId {
        let id = tile.id;
        debug_assert_eq!(id, self.next_id());
        let entity = self.world.spawn((tile, pose, sockets, footprint));
        self.order.push(entity);
        id
    }

    /// Destroy every tile and forget the results of the last run.
    pub(crate) fn clear(&mut self) {
        self.world.clear();
        self.order.clear();
        self.terminal = None;
        self.main_path.clear();
    }

    // ── Per-tile queries ────────────────────────────────────────────────

    pub fn tile(&self, id: TileId) -> Option<Tile> {
        let entity = self.entity(id)?;
        self.world.get::<&Tile>(entity).ok().map(|t| (*t).clone())
    }

    pub fn pose(&self, id: TileId) -> Option<Pose> {
        let entity = self.entity(id)?;
        self.world.get::<&Pose>(entity).ok().map(|p| *p)
    }

    pub fn footprint(&self, id: TileId) -> Option<Aabb> {
        let entity = self.entity(id)?;
        self.world.get::<&Footprint>(entity).ok().map(|f| f.0)
    }

    pub fn sockets(&self, id: TileId) -> Option<Sockets> {
        let entity = self.entity(id)?;
        self.world.get::<&Sockets>(entity).ok().map(|s| (*s).clone())
    }

    pub fn distance_from_root(&self, id: TileId) -> Option<u32> {
        let entity = self.entity(id)?;
        self.world
            .get::<&Tile>(entity)
            .ok()
            .map(|t| t.distance_from_root)
    }

    pub fn template_of(&self, id: TileId) -> Option<TemplateRef> {
        let entity = self.entity(id)?;
        self.world.get::<&Tile>(entity).ok().map(|t| t.template)
    }

    pub fn snapshot(&self, id: TileId) -> Option<TileSnapshot> {
        Some(TileSnapshot {
            tile: self.tile(id)?,
            pose: self.pose(id)?,
            sockets: self.sockets(id)?,
            footprint: Footprint(self.footprint(id)?),
        })
    }

    /// Snapshots of every tile in placement order.
    pub fn snapshots(&self) -> Vec<TileSnapshot> {
        self.ids().filter_map(|id| self.snapshot(id)).collect()
    }

    /// World pose of one socket.
    pub fn socket_world_pose(&self, id: TileId, socket: usize) -> Option<Pose> {
        let entity = self.entity(id)?;
        let pose = *self.world.get::<&Pose>(entity).ok()?;
        let sockets = self.world.get::<&Sockets>(entity).ok()?;
        sockets.get(socket).map(|s| pose.compose(&s.local_pose))
    }

    pub fn socket_state(&self, id: TileId, socket: usize) -> Option<SocketState> {
        let entity = self.entity(id)?;
        let sockets = self.world.get::<&Sockets>(entity).ok()?;
        sockets.get(socket).map(|s| s.state)
    }

    /// Move an open socket to a terminal state. Returns false if the socket
    /// does not exist or has already left `Open`.
    pub(crate) fn set_socket_state(&mut self, id: TileId, socket: usize, state: SocketState) -> bool {
        let Some(entity) = self.entity(id) else {
            return false;
        };
        if let Ok(mut sockets) = self.world.get::<&mut Sockets>(entity) {
            if let Some(s) = sockets.0.get_mut(socket) {
                if s.is_open() {
                    s.state = state;
                    return true;
                }
            }
        }
        false
    }

    /// (total sockets, connected sockets, open socket indices)
    pub(crate) fn socket_summary(&self, id: TileId) -> (usize, usize, Vec<usize>) {
        let Some(entity) = self.entity(id) else {
            return (0, 0, Vec::new());
        };
        match self.world.get::<&Sockets>(entity) {
            Ok(s) => (s.len(), s.connected_count(), s.open_indices()),
            Err(_) => (0, 0, Vec::new()),
        }
    }

    // ── Connectivity ────────────────────────────────────────────────────

    pub fn parent(&self, id: TileId) -> Option<TileId> {
        self.tile(id).and_then(|t| t.parent)
    }

    pub fn children(&self, id: TileId) -> Vec<TileId> {
        self.world
            .query::<&Tile>()
            .iter()
            .filter(|(_, t)| t.parent == Some(id))
            .map(|(_, t)| t.id)
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Tiles joined to `id` by a doorway.
    pub fn neighbors(&self, id: TileId) -> Vec<TileId> {
        self.sockets(id)
            .map(|s| s.doorways().map(|(_, d)| d.peer).collect())
            .unwrap_or_default()
    }

    /// Depth of every tile in placement order.
    pub fn depths(&self) -> Vec<u32> {
        self.ids()
            .map(|id| self.distance_from_root(id).unwrap_or(0))
            .collect()
    }

    /// Parent index of every tile in placement order.
    pub fn parents(&self) -> Vec<Option<usize>> {
        self.ids()
            .map(|id| self.parent(id).map(|p| p.index()))
            .collect()
    }

    pub fn max_depth(&self) -> u32 {
        self.depths().into_iter().max().unwrap_or(0)
    }

    /// Tile count per depth.
    pub fn depth_histogram(&self) -> BTreeMap<u32, usize> {
        let mut histogram = BTreeMap::new();
        for d in self.depths() {
            *histogram.entry(d).or_insert(0) += 1;
        }
        histogram
    }

    /// Number of doorways (each links two sockets).
    pub fn doorway_count(&self) -> usize {
        let sockets: usize = self
            .world
            .query::<&Sockets>()
            .iter()
            .map(|(_, s)| s.connected_count())
            .sum();
        sockets / 2
    }

    /// Tiles reachable from the root over doorways, breadth first.
    pub fn reachable_from_root(&self) -> Vec<TileId> {
        if self.is_empty() {
            return Vec::new();
        }
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        let mut out = Vec::new();
        visited.insert(TileId::ROOT);
        queue.push_back(TileId::ROOT);
        while let Some(id) = queue.pop_front() {
            out.push(id);
            for n in self.neighbors(id) {
                if visited.insert(n) {
                    queue.push_back(n);
                }
            }
        }
        out
    }

    /// Connected and acyclic over doorway edges.
    pub fn is_tree(&self) -> bool {
        let n = self.len();
        n == 0 || (self.doorway_count() == n - 1 && self.reachable_from_root().len() == n)
    }

    // ── Results ─────────────────────────────────────────────────────────

    /// Deepest tile, set once generation succeeds.
    pub fn terminal(&self) -> Option<TileId> {
        self.terminal
    }

    pub fn main_path(&self) -> &[TileId] {
        &self.main_path
    }

    /// World positions along the main path.
    pub fn main_path_positions(&self) -> Vec<Vec3> {
        self.main_path
            .iter()
            .filter_map(|id| self.pose(*id).map(|p| p.position))
            .collect()
    }

    pub fn report(&self) -> &GenerationReport {
        &self.report
    }

    pub(crate) fn set_results(&mut self, terminal: Option<TileId>, main_path: Vec<TileId>) {
        self.terminal = terminal;
        self.main_path = main_path;
    }

    pub(crate) fn set_report(&mut self, report: GenerationReport) {
        self.report = report;
    }

    /// Rebuild a graph from snapshots in placement order.
    pub(crate) fn from_snapshots(
        tiles: Vec<TileSnapshot>,
        terminal: Option<TileId>,
        main_path: Vec<TileId>,
        report: GenerationReport,
    ) -> Self {
        let mut graph = DungeonGraph::new();
        for s in tiles {
            graph.commit(s.tile, s.pose, s.sockets, s.footprint);
        }
        graph.terminal = terminal;
        graph.main_path = main_path;
        graph.report = report;
        graph
    }
}
