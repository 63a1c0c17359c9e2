//! Save/Load functionality for finished dungeons
//!
//! Uses bincode for a compact binary copy of every tile. Tiles are written in
//! placement order and re-committed on load, so ids survive the round trip.
//! A JSON summary is available for tools that only need the layout.

use std::io::{Read, Write};

use dungen_logic::geometry::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::TileId;
use crate::generation::GenerationReport;
use crate::graph::{DungeonGraph, TileSnapshot};

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of a generated dungeon
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    /// Seed the layout was generated from, if known
    pub seed: Option<u64>,
    pub tiles: Vec<TileSnapshot>,
    pub terminal: Option<TileId>,
    pub main_path: Vec<TileId>,
    pub report: GenerationReport,
}

/// Errors that can occur during save/load
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("Corrupt save: {0}")]
    Corrupt(String),
}

/// Save a dungeon to a writer
pub fn save_dungeon<W: Write>(
    writer: W,
    graph: &DungeonGraph,
    seed: Option<u64>,
) -> Result<(), SaveError> {
    let save_data = SaveData {
        version: SAVE_VERSION,
        seed,
        tiles: graph.snapshots(),
        terminal: graph.terminal(),
        main_path: graph.main_path().to_vec(),
        report: graph.report().clone(),
    };
    bincode::serialize_into(writer, &save_data)?;
    Ok(())
}

/// Result of loading a dungeon
pub struct LoadedDungeon {
    pub graph: DungeonGraph,
    pub seed: Option<u64>,
}

/// Load a dungeon from a reader
pub fn load_dungeon<R: Read>(reader: R) -> Result<LoadedDungeon, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }
    check_references(&save_data)?;

    let graph = DungeonGraph::from_snapshots(
        save_data.tiles,
        save_data.terminal,
        save_data.main_path,
        save_data.report,
    );
    Ok(LoadedDungeon {
        graph,
        seed: save_data.seed,
    })
}

fn check_references(save: &SaveData) -> Result<(), SaveError> {
    let count = save.tiles.len();
    let in_range = |id: TileId| id.index() < count;
    for (index, t) in save.tiles.iter().enumerate() {
        if t.tile.id.index() != index {
            return Err(SaveError::Corrupt(format!(
                "tile {} stored at position {}",
                t.tile.id, index
            )));
        }
        if let Some(parent) = t.tile.parent {
            if !in_range(parent) {
                return Err(SaveError::Corrupt(format!(
                    "tile {} has unknown parent {}",
                    t.tile.id, parent
                )));
            }
        }
        for (_, doorway) in t.sockets.doorways() {
            if !in_range(doorway.peer) {
                return Err(SaveError::Corrupt(format!(
                    "tile {} has a doorway to unknown tile {}",
                    t.tile.id, doorway.peer
                )));
            }
        }
    }
    if let Some(id) = save.terminal.iter().chain(&save.main_path).find(|id| !in_range(**id)) {
        return Err(SaveError::Corrupt(format!("path refers to unknown tile {}", id)));
    }
    Ok(())
}

/// Per-tile entry of the JSON summary.
#[derive(Debug, Serialize)]
pub struct TileSummary {
    pub id: TileId,
    pub name: String,
    pub depth: u32,
    pub parent: Option<TileId>,
    pub position: Vec3,
    pub neighbors: Vec<TileId>,
    pub sealed_sockets: usize,
}

/// Human-readable layout, e.g. for a viewer or diffing runs.
#[derive(Debug, Serialize)]
pub struct DungeonSummary {
    pub tiles: Vec<TileSummary>,
    pub terminal: Option<TileId>,
    pub main_path: Vec<TileId>,
    pub main_path_positions: Vec<Vec3>,
    pub report: GenerationReport,
}

pub fn summarize(graph: &DungeonGraph) -> DungeonSummary {
    let tiles = graph
        .snapshots()
        .into_iter()
        .map(|s| TileSummary {
            id: s.tile.id,
            depth: s.tile.distance_from_root,
            parent: s.tile.parent,
            position: s.pose.position,
            neighbors: s.sockets.doorways().map(|(_, d)| d.peer).collect(),
            sealed_sockets: s.sockets.sealed_count(),
            name: s.tile.name,
        })
        .collect();
    DungeonSummary {
        tiles,
        terminal: graph.terminal(),
        main_path: graph.main_path().to_vec(),
        main_path_positions: graph.main_path_positions(),
        report: graph.report().clone(),
    }
}

/// Pretty-printed JSON summary of a dungeon.
pub fn export_json(graph: &DungeonGraph) -> Result<String, SaveError> {
    Ok(serde_json::to_string_pretty(&summarize(graph))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Face, TileTemplate};
    use crate::config::GeneratorConfig;
    use crate::engine::DungeonGenerator;
    use dungen_logic::curve::ChanceCurve;

    fn generate() -> DungeonGraph {
        let cube = |name: &str| TileTemplate::room(name, 4.0, 3.0, 4.0).with_face_sockets(&Face::ALL);
        let catalog = Catalog::new().with_root(cube("hub")).with_room(cube("room"), 1.0);
        let config = GeneratorConfig::default()
            .with_target(8)
            .with_chance(ChanceCurve::constant(1.0));
        DungeonGenerator::new(config, catalog)
            .generate_seeded(11)
            .expect("generation failed")
    }

    #[test]
    fn test_save_load_roundtrip() {
        let graph = generate();

        let mut save_buffer = Vec::new();
        save_dungeon(&mut save_buffer, &graph, Some(11)).expect("Save failed");

        let loaded = load_dungeon(&save_buffer[..]).expect("Load failed");
        assert_eq!(loaded.seed, Some(11));
        assert_eq!(loaded.graph.snapshots(), graph.snapshots());
        assert_eq!(loaded.graph.terminal(), graph.terminal());
        assert_eq!(loaded.graph.main_path(), graph.main_path());
        assert_eq!(loaded.graph.report(), graph.report());
        assert!(loaded.graph.is_tree());
    }

    #[test]
    fn test_version_mismatch() {
        let graph = generate();
        let save_data = SaveData {
            version: SAVE_VERSION + 1,
            seed: None,
            tiles: graph.snapshots(),
            terminal: graph.terminal(),
            main_path: graph.main_path().to_vec(),
            report: GenerationReport::default(),
        };
        let bytes = bincode::serialize(&save_data).unwrap();
        assert!(matches!(
            load_dungeon(&bytes[..]),
            Err(SaveError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_dangling_path_is_corrupt() {
        let graph = generate();
        let save_data = SaveData {
            version: SAVE_VERSION,
            seed: None,
            tiles: graph.snapshots(),
            terminal: Some(TileId(500)),
            main_path: Vec::new(),
            report: GenerationReport::default(),
        };
        let bytes = bincode::serialize(&save_data).unwrap();
        assert!(matches!(load_dungeon(&bytes[..]), Err(SaveError::Corrupt(_))));
    }

    #[test]
    fn test_json_summary() {
        let graph = generate();
        let json = export_json(&graph).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["tiles"].as_array().map(|a| a.len()), Some(9));
        assert_eq!(value["report"]["placed"], 8);
    }
}
