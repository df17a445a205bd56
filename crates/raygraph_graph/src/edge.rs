// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edge entities of the assembled graph.
//!
//! An edge entity sits at the midpoint of its segment, looks from `from`
//! toward `to`, and is scaled along its long axis to the segment length.
//! The cross-section scale is the part the interactive rescale touches.

use crate::color::ColorState;
use crate::format::ThroughputData;
use crate::math::Vec3;
use crate::vertex::VertexId;
use serde::{Deserialize, Serialize};

/// Unique identifier for an edge, assigned by the graph file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// A directed edge entity between two resolved vertices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Edge id from the file
    pub id: EdgeId,
    /// Source vertex
    pub from: VertexId,
    /// Target vertex
    pub to: VertexId,
    /// Throughput payload, when the file carries throughput columns
    pub throughput: Option<ThroughputData>,
    /// Segment midpoint
    pub position: Vec3,
    /// Unit direction from `from` toward `to`
    pub direction: Vec3,
    /// Segment length (long-axis scale)
    pub length: f32,
    /// Cross-section scale, driven by the interactive rescale
    pub cross_scale: f32,
    /// Scale of the visual child mesh, set by presentation rules
    pub child_scale: f32,
    /// Current color state
    pub color: ColorState,
}

impl Edge {
    /// Build an edge entity between two resolved endpoint positions
    pub fn new(
        id: EdgeId,
        from: VertexId,
        to: VertexId,
        start: Vec3,
        end: Vec3,
        throughput: Option<ThroughputData>,
    ) -> Self {
        let position = (start + end) / 2.0;
        let length = (end - start).length();
        Self {
            id,
            from,
            to,
            throughput,
            position,
            direction: (end - start).normalize(),
            length,
            cross_scale: 1.0,
            child_scale: 1.0,
            color: ColorState::default(),
        }
    }

    /// Start point of the segment
    pub fn start(&self) -> Vec3 {
        self.position - self.direction * (self.length / 2.0)
    }

    /// End point of the segment
    pub fn end(&self) -> Vec3 {
        self.position + self.direction * (self.length / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_placement() {
        let edge = Edge::new(
            EdgeId(0),
            VertexId(0),
            VertexId(1),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            None,
        );

        assert_eq!(edge.position, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(edge.length, 2.0);
        assert_eq!(edge.direction, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(edge.start(), Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(edge.end(), Vec3::new(2.0, 0.0, 0.0));
    }
}
