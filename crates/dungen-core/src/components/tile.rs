//! Tile and socket components.

use std::fmt;

use dungen_logic::geometry::{Aabb, Pose};
use serde::{Deserialize, Serialize};

/// Tile identifier, equal to the tile's position in placement order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub u32);

impl TileId {
    pub const ROOT: TileId = TileId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which catalog list a tile was instantiated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateRef {
    Root(usize),
    Room(usize),
}

/// Declared repetition rule for a template.
///
/// Reserved: placement does not consult it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatMode {
    #[default]
    Allow,
    DisallowImmediate,
    Disallow,
}

/// Tile component - a committed room in the dungeon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub template: TemplateRef,
    /// Template name, kept for display and export
    pub name: String,
    /// 0 for the root, parent's value + 1 otherwise
    pub distance_from_root: u32,
    /// Tile this one was attached to
    pub parent: Option<TileId>,
    pub allows_rotation: bool,
    pub repeat_mode: RepeatMode,
}

impl Tile {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Link recorded on both sockets of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doorway {
    /// Index into the configured doorway kinds
    pub kind: usize,
    pub peer: TileId,
    pub peer_socket: usize,
}

/// Socket lifecycle. `Connected` and `Sealed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocketState {
    Open,
    Connected(Doorway),
    /// Index into the configured blocker kinds
    Sealed { blocker: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Socket {
    pub local_pose: Pose,
    pub state: SocketState,
}

impl Socket {
    pub fn new(local_pose: Pose) -> Self {
        Self {
            local_pose,
            state: SocketState::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == SocketState::Open
    }

    /// A doorway has been attached through this socket.
    pub fn is_used(&self) -> bool {
        matches!(self.state, SocketState::Connected(_))
    }

    pub fn is_sealed(&self) -> bool {
        matches!(self.state, SocketState::Sealed { .. })
    }

    pub fn doorway(&self) -> Option<&Doorway> {
        match &self.state {
            SocketState::Connected(d) => Some(d),
            _ => None,
        }
    }
}

/// Ordered sockets of a tile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sockets(pub Vec<Socket>);

impl Sockets {
    pub fn from_poses(poses: &[Pose]) -> Self {
        Self(poses.iter().copied().map(Socket::new).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Socket> {
        self.0.get(index)
    }

    pub fn open_indices(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_open())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn connected_count(&self) -> usize {
        self.0.iter().filter(|s| s.is_used()).count()
    }

    pub fn sealed_count(&self) -> usize {
        self.0.iter().filter(|s| s.is_sealed()).count()
    }

    pub fn doorways(&self) -> impl Iterator<Item = (usize, &Doorway)> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.doorway().map(|d| (i, d)))
    }
}

/// Local bounding volume handed to the occupancy oracle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint(pub Aabb);

#[cfg(test)]
mod tests {
    use super::*;
    use dungen_logic::geometry::Vec3;

    #[test]
    fn test_socket_states() {
        let mut sockets = Sockets::from_poses(&[
            Pose::from_position(Vec3::new(1.0, 0.0, 0.0)),
            Pose::from_position(Vec3::new(-1.0, 0.0, 0.0)),
            Pose::from_position(Vec3::new(0.0, 0.0, 1.0)),
        ]);
        assert_eq!(sockets.open_indices(), vec![0, 1, 2]);

        sockets.0[1].state = SocketState::Connected(Doorway {
            kind: 0,
            peer: TileId(4),
            peer_socket: 2,
        });
        sockets.0[2].state = SocketState::Sealed { blocker: 0 };

        assert_eq!(sockets.open_indices(), vec![0]);
        assert_eq!(sockets.connected_count(), 1);
        assert_eq!(sockets.sealed_count(), 1);
        assert_eq!(sockets.doorways().next().map(|(i, d)| (i, d.peer)), Some((1, TileId(4))));
        assert!(!sockets.0[2].is_used());
    }
}
