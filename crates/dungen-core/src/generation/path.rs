//! Terminal tile and main path of a finished graph.

use dungen_logic::path::{depth_scan_path, parent_chain_path, terminal_index, PathPolicy};

use crate::components::TileId;
use crate::events::{EventSink, GenerationEvent};
use crate::graph::DungeonGraph;

/// Pick the terminal tile, derive the main path with `policy`, store both on
/// the graph and notify the sink.
pub(crate) fn finalize(graph: &mut DungeonGraph, policy: PathPolicy, sink: &mut dyn EventSink) {
    let depths = graph.depths();
    let Some(terminal) = terminal_index(&depths) else {
        graph.set_results(None, Vec::new());
        return;
    };

    let indices = match policy {
        PathPolicy::DepthScan => depth_scan_path(&depths, terminal),
        PathPolicy::ParentChain => parent_chain_path(&graph.parents(), terminal),
    };
    let terminal = TileId(terminal as u32);
    let path: Vec<TileId> = indices.into_iter().map(|i| TileId(i as u32)).collect();
    graph.set_results(Some(terminal), path.clone());

    let depth = depths[terminal.index()];
    let position = graph.pose(terminal).map(|p| p.position).unwrap_or_default();
    log::info!(
        "Terminal tile {} at depth {}, main path of {} tiles",
        terminal,
        depth,
        path.len()
    );
    sink.send(GenerationEvent::TerminalIdentified {
        tile: terminal,
        depth,
        position,
    });
    sink.send(GenerationEvent::MainPath {
        positions: graph.main_path_positions(),
        tiles: path,
    });
}
