//! Terminal tile and main path extraction.
//!
//! Tiles are addressed by their index in placement (insertion) order, with
//! the root at index 0.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// How the main path is derived once generation succeeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathPolicy {
    /// Backward scan over placement order keeping one tile per depth.
    ///
    /// Consecutive entries are only guaranteed to be adjacent when the order
    /// is a depth-first preorder. For other orders, when two branches share a
    /// depth the scan may pick a tile from a branch that does not lead to the
    /// terminal.
    #[default]
    DepthScan,
    /// Walk parent links from the terminal back to the root. Always a real
    /// path through the placement tree.
    ParentChain,
}

/// Index of the deepest tile, first in placement order on ties.
pub fn terminal_index(depths: &[u32]) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (i, &d) in depths.iter().enumerate() {
        match best {
            Some((_, best_depth)) if d <= best_depth => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

/// Scan backward from `terminal` to index 0 and keep a tile whenever no kept
/// tile has its depth yet; return the kept indices sorted by depth.
pub fn depth_scan_path(depths: &[u32], terminal: usize) -> Vec<usize> {
    if depths.is_empty() {
        return Vec::new();
    }
    let terminal = terminal.min(depths.len() - 1);
    let mut seen = HashSet::new();
    let mut path = Vec::new();
    for i in (0..=terminal).rev() {
        if seen.insert(depths[i]) {
            path.push(i);
        }
    }
    path.sort_by_key(|&i| depths[i]);
    path
}

/// Follow parent links from `terminal` to the root, returned root first.
/// Stops early if a link points outside the slice or loops.
pub fn parent_chain_path(parents: &[Option<usize>], terminal: usize) -> Vec<usize> {
    let mut path = Vec::new();
    let mut visited = HashSet::new();
    let mut current = Some(terminal);
    while let Some(i) = current {
        if i >= parents.len() || !visited.insert(i) {
            break;
        }
        path.push(i);
        current = parents[i];
    }
    path.reverse();
    path
}
