//! Generation - recursive placement of tiles and main path extraction.

mod path;
mod placement;

pub(crate) use path::finalize;
pub(crate) use placement::PlacementEngine;

use serde::{Deserialize, Serialize};

/// Counters for one call to the generator. Attempt-spanning fields are
/// cumulative; `placed`, `tiles` and the socket counts describe the final
/// graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub attempts: u32,
    pub placed: u32,
    pub tiles: usize,
    pub sockets_connected: usize,
    pub sockets_sealed: usize,
    /// Candidate templates drawn for a target socket
    pub candidates_tried: u64,
    /// Alignments refused by the oracle or the bounds check
    pub placements_rejected: u64,
    /// Socket steps, i.e. pacing hook invocations
    pub steps: u64,
    pub max_depth: u32,
}
