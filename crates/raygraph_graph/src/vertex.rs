// SPDX-License-Identifier: MIT OR Apache-2.0
//! Vertex entities of the assembled graph.

use crate::color::ColorState;
use crate::edge::EdgeId;
use crate::format::{RayVertexType, VertexRecord};
use crate::math::Vec3;
use serde::{Deserialize, Serialize};

/// Unique identifier for a vertex, assigned by the graph file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexId(pub u32);

impl std::fmt::Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A positioned, colorable, scalable vertex entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    /// Vertex id from the file
    pub id: VertexId,
    /// Position declared in the file
    pub graph_pos: Vec3,
    /// Ray vertex type, when the file carries the type column
    pub vertex_type: Option<RayVertexType>,
    /// Lighting scalar, when the file carries the lighting column
    pub lighting: Option<f32>,
    /// Edges leaving this vertex, in build order
    pub out_edges: Vec<EdgeId>,
    /// Edges arriving at this vertex, in build order
    pub in_edges: Vec<EdgeId>,
    /// Uniform entity scale, driven by the interactive rescale
    pub scale: f32,
    /// Scale of the visual child mesh, set by presentation rules
    pub child_scale: f32,
    /// Current color state
    pub color: ColorState,
}

impl Vertex {
    /// Build a vertex entity from its parsed record
    pub fn from_record(record: &VertexRecord) -> Self {
        Self {
            id: VertexId(record.id),
            graph_pos: record.position,
            vertex_type: record.vertex_type,
            lighting: record.lighting,
            out_edges: Vec::new(),
            in_edges: Vec::new(),
            scale: 1.0,
            child_scale: 1.0,
            color: ColorState::default(),
        }
    }
}
