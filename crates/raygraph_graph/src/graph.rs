// SPDX-License-Identifier: MIT OR Apache-2.0
//! The assembled graph model.
//!
//! Built once per load by [`crate::builder`], consumed by the presentation
//! pass, then handed to the rendering layer. The whole model is replaced on
//! the next load; nothing is updated incrementally.

use crate::edge::{Edge, EdgeId};
use crate::format::{Generator, GraphFlags, IdCounters, TagSet};
use crate::math::{Aabb, Vec3};
use crate::path::Path;
use crate::vertex::{Vertex, VertexId};
use indexmap::IndexMap;

/// Lower bound of the interactive element scale
pub const MIN_ELEMENT_SCALE: f32 = 0.01;
/// Upper bound of the interactive element scale
pub const MAX_ELEMENT_SCALE: f32 = 100.0;

/// Camera framing parameters handed to the camera once per primary load
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    /// Center of the graph bounding box
    pub center: Vec3,
    /// Maximum corner of the bounding box
    pub bounding_max: Vec3,
}

/// A fully built graph: vertices, edges, paths and derived geometry.
///
/// Entity maps are keyed by file-assigned id and iterate in file order.
#[derive(Debug, Clone)]
pub struct Graph {
    /// Description tags driving the presentation rules
    pub tags: TagSet,
    /// Feature flags the file was parsed with
    pub flags: GraphFlags,
    /// Generator that produced the file
    pub generator: Generator,
    /// Next-id counters from the file
    pub counters: IdCounters,
    vertices: IndexMap<VertexId, Vertex>,
    edges: IndexMap<EdgeId, Edge>,
    paths: Vec<Path>,
    bounds: Aabb,
    cur_scale: f32,
}

impl Graph {
    pub(crate) fn from_parts(
        tags: TagSet,
        flags: GraphFlags,
        generator: Generator,
        counters: IdCounters,
        vertices: IndexMap<VertexId, Vertex>,
        edges: IndexMap<EdgeId, Edge>,
        paths: Vec<Path>,
        bounds: Aabb,
    ) -> Self {
        Self {
            tags,
            flags,
            generator,
            counters,
            vertices,
            edges,
            paths,
            bounds,
            cur_scale: 1.0,
        }
    }

    /// Get a vertex by id
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    /// Get a mutable vertex by id
    pub fn vertex_mut(&mut self, id: VertexId) -> Option<&mut Vertex> {
        self.vertices.get_mut(&id)
    }

    /// Get an edge by id
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Get a mutable edge by id
    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(&id)
    }

    /// All vertices in file order
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// Mutable iteration over vertices
    pub fn vertices_mut(&mut self) -> impl Iterator<Item = &mut Vertex> {
        self.vertices.values_mut()
    }

    /// All edges in file order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Mutable iteration over edges
    pub fn edges_mut(&mut self) -> impl Iterator<Item = &mut Edge> {
        self.edges.values_mut()
    }

    /// All paths in file order
    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of paths
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// Bounding box over all vertex positions
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Camera framing parameters for this graph
    pub fn framing(&self) -> CameraFrame {
        CameraFrame {
            center: self.bounds.center(),
            bounding_max: self.bounds.max,
        }
    }

    /// Current interactive element scale
    pub fn current_scale(&self) -> f32 {
        self.cur_scale
    }

    /// Interactive rescale of element sizes.
    ///
    /// `factor` is relative to the current scale. A result outside
    /// `[MIN_ELEMENT_SCALE, MAX_ELEMENT_SCALE]` drops the whole update
    /// without touching any entity; interactive input is expected to push
    /// against the bounds every frame, so this is not an error. Vertices
    /// scale uniformly; edges scale only in cross-section, never in length.
    pub fn scale_element_sizes(&mut self, factor: f32) {
        let new_scale = self.cur_scale * factor;
        if !(MIN_ELEMENT_SCALE..=MAX_ELEMENT_SCALE).contains(&new_scale) {
            return;
        }

        for vertex in self.vertices.values_mut() {
            vertex.scale = new_scale;
        }
        for edge in self.edges.values_mut() {
            edge.cross_scale = new_scale;
        }
        self.cur_scale = new_scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::format::GraphFile;

    fn small_graph() -> Graph {
        let input = "\
outline
uniform 1.0
true
0 2 1 0
0 0 0 0
1 2 0 0
0 0 1
";
        build(GraphFile::parse(input).unwrap()).unwrap()
    }

    #[test]
    fn test_rescale_applies_to_all_elements() {
        let mut graph = small_graph();
        graph.scale_element_sizes(2.0);

        assert_eq!(graph.current_scale(), 2.0);
        for vertex in graph.vertices() {
            assert_eq!(vertex.scale, 2.0);
        }
        let edge = graph.edges().next().unwrap();
        assert_eq!(edge.cross_scale, 2.0);
        // Length is never rescaled
        assert_eq!(edge.length, 2.0);
    }

    #[test]
    fn test_rescale_out_of_range_is_dropped() {
        let mut graph = small_graph();
        graph.scale_element_sizes(0.5);
        let before: Vec<f32> = graph.vertices().map(|v| v.scale).collect();

        // 0.5 * 0.01 would land below the lower bound
        graph.scale_element_sizes(0.01);
        assert_eq!(graph.current_scale(), 0.5);
        let after: Vec<f32> = graph.vertices().map(|v| v.scale).collect();
        assert_eq!(before, after);

        graph.scale_element_sizes(1000.0);
        assert_eq!(graph.current_scale(), 0.5);
    }

    #[test]
    fn test_rescale_boundaries_inclusive() {
        let mut graph = small_graph();
        graph.scale_element_sizes(100.0);
        assert_eq!(graph.current_scale(), 100.0);

        let mut graph = small_graph();
        graph.scale_element_sizes(0.01);
        assert_eq!(graph.current_scale(), 0.01);
    }

    #[test]
    fn test_framing_matches_bounds() {
        let graph = small_graph();
        let frame = graph.framing();
        assert_eq!(frame.center, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(frame.bounding_max, Vec3::new(2.0, 0.0, 0.0));
    }
}
