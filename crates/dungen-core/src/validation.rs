//! Layout validation for finished dungeons.
//!
//! Each check takes tile snapshots and returns the problems it found. A
//! layout produced by a successful generation should yield no errors; the
//! main path check may warn under the depth-scan policy.

use std::collections::HashSet;

use crate::components::{SocketState, TileId};
use crate::graph::{DungeonGraph, TileSnapshot};

/// A validation error or warning.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Error severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

// ── A. Geometry ─────────────────────────────────────────────────────────

/// No two tiles may overlap beyond `tolerance`.
pub fn check_overlaps(tiles: &[TileSnapshot], tolerance: f32) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let boxes: Vec<_> = tiles.iter().map(|t| (t.tile.id, t.world_box())).collect();
    for i in 0..boxes.len() {
        for j in (i + 1)..boxes.len() {
            if boxes[i].1.overlaps(&boxes[j].1, tolerance) {
                errors.push(ValidationError {
                    category: "overlap",
                    severity: Severity::Error,
                    message: format!("Tiles {} and {} overlap", boxes[i].0, boxes[j].0),
                });
            }
        }
    }
    errors
}

// ── B. Sockets ──────────────────────────────────────────────────────────

/// Every socket must have ended connected or sealed.
pub fn check_socket_states(tiles: &[TileSnapshot]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for t in tiles {
        for (index, socket) in t.sockets.0.iter().enumerate() {
            if socket.is_open() {
                errors.push(ValidationError {
                    category: "socket_state",
                    severity: Severity::Error,
                    message: format!("Tile {} socket {} was left open", t.tile.id, index),
                });
            }
        }
    }
    errors
}

/// A doorway must be recorded identically on both of its sockets.
pub fn check_doorway_symmetry(tiles: &[TileSnapshot]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for t in tiles {
        for (index, doorway) in t.sockets.doorways() {
            let back = tiles
                .get(doorway.peer.index())
                .and_then(|peer| peer.sockets.get(doorway.peer_socket))
                .map(|s| s.state);
            let expected = SocketState::Connected(crate::components::Doorway {
                kind: doorway.kind,
                peer: t.tile.id,
                peer_socket: index,
            });
            if back != Some(expected) {
                errors.push(ValidationError {
                    category: "doorway",
                    severity: Severity::Error,
                    message: format!(
                        "Doorway {} socket {} -> {} socket {} is not mirrored",
                        t.tile.id, index, doorway.peer, doorway.peer_socket
                    ),
                });
            }
        }
    }
    errors
}

// ── C. Structure ────────────────────────────────────────────────────────

/// Root at depth 0, every other tile one deeper than its parent, and the
/// parent joined to it by a doorway.
pub fn check_depths(tiles: &[TileSnapshot]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for t in tiles {
        match t.tile.parent {
            None => {
                if t.tile.distance_from_root != 0 || t.tile.id != TileId::ROOT {
                    errors.push(ValidationError {
                        category: "depth",
                        severity: Severity::Error,
                        message: format!(
                            "Parentless tile {} has depth {}",
                            t.tile.id, t.tile.distance_from_root
                        ),
                    });
                }
            }
            Some(parent) => {
                let Some(p) = tiles.get(parent.index()) else {
                    errors.push(ValidationError {
                        category: "depth",
                        severity: Severity::Error,
                        message: format!("Tile {} has missing parent {}", t.tile.id, parent),
                    });
                    continue;
                };
                if t.tile.distance_from_root != p.tile.distance_from_root + 1 {
                    errors.push(ValidationError {
                        category: "depth",
                        severity: Severity::Error,
                        message: format!(
                            "Tile {} depth {} but parent {} depth {}",
                            t.tile.id,
                            t.tile.distance_from_root,
                            parent,
                            p.tile.distance_from_root
                        ),
                    });
                }
                if !t.sockets.doorways().any(|(_, d)| d.peer == parent) {
                    errors.push(ValidationError {
                        category: "depth",
                        severity: Severity::Error,
                        message: format!("Tile {} has no doorway to parent {}", t.tile.id, parent),
                    });
                }
            }
        }
    }
    errors
}

/// Doorways must form a spanning tree rooted at tile 0.
pub fn check_tree_shape(graph: &DungeonGraph) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let n = graph.len();
    if n == 0 {
        return errors;
    }
    let doorways = graph.doorway_count();
    if doorways != n - 1 {
        errors.push(ValidationError {
            category: "tree",
            severity: Severity::Error,
            message: format!("{} tiles joined by {} doorways", n, doorways),
        });
    }
    let reached = graph.reachable_from_root().len();
    if reached != n {
        errors.push(ValidationError {
            category: "tree",
            severity: Severity::Error,
            message: format!("Only {} of {} tiles reachable from the root", reached, n),
        });
    }
    errors
}

/// Placed count (tiles minus the root) must equal the target.
pub fn check_target_count(graph: &DungeonGraph, target: u32) -> Vec<ValidationError> {
    let placed = graph.len().saturating_sub(1);
    if placed == target as usize {
        return Vec::new();
    }
    vec![ValidationError {
        category: "target",
        severity: Severity::Error,
        message: format!("Placed {} tiles, target was {}", placed, target),
    }]
}

/// Consecutive main path tiles should share a doorway. The depth-scan
/// policy only guarantees this for depth-first placement order.
pub fn check_main_path(graph: &DungeonGraph) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let path = graph.main_path();
    if let (Some(first), Some(last)) = (path.first(), path.last()) {
        if *first != TileId::ROOT || Some(*last) != graph.terminal() {
            errors.push(ValidationError {
                category: "main_path",
                severity: Severity::Warning,
                message: "Main path does not run from the root to the terminal".to_string(),
            });
        }
    }
    for pair in path.windows(2) {
        let linked: HashSet<TileId> = graph.neighbors(pair[0]).into_iter().collect();
        if !linked.contains(&pair[1]) {
            errors.push(ValidationError {
                category: "main_path",
                severity: Severity::Warning,
                message: format!("Main path steps from {} to {} without a doorway", pair[0], pair[1]),
            });
        }
    }
    errors
}

/// Run every check.
pub fn validate_layout(graph: &DungeonGraph, target: u32, tolerance: f32) -> Vec<ValidationError> {
    let tiles = graph.snapshots();
    let mut errors = Vec::new();
    errors.extend(check_overlaps(&tiles, tolerance));
    errors.extend(check_socket_states(&tiles));
    errors.extend(check_doorway_symmetry(&tiles));
    errors.extend(check_depths(&tiles));
    errors.extend(check_tree_shape(graph));
    errors.extend(check_target_count(graph, target));
    errors.extend(check_main_path(graph));
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Doorway, Footprint, RepeatMode, Sockets, TemplateRef, Tile};
    use dungen_logic::geometry::{Aabb, Pose, Vec3};

    fn snapshot(id: u32, parent: Option<u32>, depth: u32, x: f32) -> TileSnapshot {
        TileSnapshot {
            tile: Tile {
                id: TileId(id),
                template: TemplateRef::Room(0),
                name: "r".into(),
                distance_from_root: depth,
                parent: parent.map(TileId),
                allows_rotation: true,
                repeat_mode: RepeatMode::Allow,
            },
            pose: Pose::from_position(Vec3::new(x, 0.0, 0.0)),
            sockets: Sockets::from_poses(&[Pose::IDENTITY]),
            footprint: Footprint(Aabb::from_size(4.0, 3.0, 4.0)),
        }
    }

    fn connect(tiles: &mut [TileSnapshot], a: usize, b: usize) {
        tiles[a].sockets.0[0].state = SocketState::Connected(Doorway {
            kind: 0,
            peer: TileId(b as u32),
            peer_socket: 0,
        });
        tiles[b].sockets.0[0].state = SocketState::Connected(Doorway {
            kind: 0,
            peer: TileId(a as u32),
            peer_socket: 0,
        });
    }

    #[test]
    fn test_touching_tiles_are_not_overlaps() {
        let tiles = vec![snapshot(0, None, 0, 0.0), snapshot(1, Some(0), 1, 4.0)];
        assert!(check_overlaps(&tiles, 0.01).is_empty());

        let tiles = vec![snapshot(0, None, 0, 0.0), snapshot(1, Some(0), 1, 3.0)];
        let errs = check_overlaps(&tiles, 0.01);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].category, "overlap");
    }

    #[test]
    fn test_open_socket_flagged() {
        let tiles = vec![snapshot(0, None, 0, 0.0)];
        let errs = check_socket_states(&tiles);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].severity, Severity::Error);
    }

    #[test]
    fn test_doorways_and_depths() {
        let mut tiles = vec![snapshot(0, None, 0, 0.0), snapshot(1, Some(0), 1, 4.0)];
        connect(&mut tiles, 0, 1);
        assert!(check_doorway_symmetry(&tiles).is_empty());
        assert!(check_depths(&tiles).is_empty());

        tiles[1].tile.distance_from_root = 3;
        assert_eq!(check_depths(&tiles).len(), 1);

        tiles[0].sockets.0[0].state = SocketState::Sealed { blocker: 0 };
        assert_eq!(check_doorway_symmetry(&tiles).len(), 1);
    }
}
