// SPDX-License-Identifier: MIT OR Apache-2.0
//! Paths: ordered sequences of resolved edges.

use crate::edge::EdgeId;
use serde::{Deserialize, Serialize};

/// Unique identifier for a path, assigned by the graph file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathId(pub u32);

impl std::fmt::Display for PathId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// An ordered edge sequence.
///
/// Edges are kept in file order. An empty path is valid and simply has no
/// presentation effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Path {
    /// Path id from the file
    pub id: PathId,
    /// Resolved edge ids in file order
    pub edges: Vec<EdgeId>,
}

impl Path {
    /// First edge of the path, if any
    pub fn first_edge(&self) -> Option<EdgeId> {
        self.edges.first().copied()
    }

    /// Number of edges
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the path has no edges
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
