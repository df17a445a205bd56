// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph assembly from parsed records.
//!
//! Resolves integer ids into entities, derives edge placement and the
//! bounding box, and wires up per-vertex edge lists. Ids referenced by an
//! edge or path must have been defined earlier in the file; an unresolved
//! reference aborts the whole load.

use crate::edge::{Edge, EdgeId};
use crate::format::{GraphFile, ParseError};
use crate::graph::Graph;
use crate::math::Aabb;
use crate::path::{Path, PathId};
use crate::presentation::{apply_presentation, PresentationError};
use crate::vertex::{Vertex, VertexId};
use indexmap::IndexMap;
use thiserror::Error;

/// Reference-resolution errors during graph assembly
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// An edge referenced a vertex id not present in the file
    #[error("edge {edge} references unknown vertex {vertex}")]
    UnresolvedVertex {
        /// The referencing edge
        edge: EdgeId,
        /// The missing vertex id
        vertex: VertexId,
    },

    /// A path referenced an edge id not defined earlier in the file
    #[error("path {path} references unknown edge {edge}")]
    UnresolvedEdge {
        /// The referencing path
        path: PathId,
        /// The missing edge id
        edge: EdgeId,
    },
}

/// Any failure of the full load pipeline
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading or parsing the file failed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Id resolution failed
    #[error(transparent)]
    Build(#[from] BuildError),

    /// A presentation rule was misapplied
    #[error(transparent)]
    Presentation(#[from] PresentationError),
}

/// Assemble the entity model from a parsed file.
pub fn build(file: GraphFile) -> Result<Graph, BuildError> {
    let mut vertices: IndexMap<VertexId, Vertex> = IndexMap::with_capacity(file.vertices.len());
    for record in &file.vertices {
        let vertex = Vertex::from_record(record);
        vertices.insert(vertex.id, vertex);
    }

    let bounds = Aabb::from_points(vertices.values().map(|v| v.graph_pos));

    let mut edges: IndexMap<EdgeId, Edge> = IndexMap::with_capacity(file.edges.len());
    for record in &file.edges {
        let id = EdgeId(record.id);
        let from_id = VertexId(record.from);
        let to_id = VertexId(record.to);

        let Some(from) = vertices.get_mut(&from_id) else {
            return Err(BuildError::UnresolvedVertex { edge: id, vertex: from_id });
        };
        from.out_edges.push(id);
        let start = from.graph_pos;

        let Some(to) = vertices.get_mut(&to_id) else {
            return Err(BuildError::UnresolvedVertex { edge: id, vertex: to_id });
        };
        to.in_edges.push(id);
        let end = to.graph_pos;

        edges.insert(id, Edge::new(id, from_id, to_id, start, end, record.throughput));
    }

    let mut paths = Vec::with_capacity(file.paths.len());
    for record in &file.paths {
        let id = PathId(record.id);
        let mut resolved = Vec::with_capacity(record.edges.len());
        for &edge_id in &record.edges {
            let edge_id = EdgeId(edge_id);
            if !edges.contains_key(&edge_id) {
                return Err(BuildError::UnresolvedEdge { path: id, edge: edge_id });
            }
            resolved.push(edge_id);
        }
        paths.push(Path { id, edges: resolved });
    }

    tracing::debug!(
        "Built graph: {} vertices, {} edges, {} paths, bounds {:?}",
        vertices.len(),
        edges.len(),
        paths.len(),
        bounds,
    );

    Ok(Graph::from_parts(
        file.tags,
        file.flags,
        file.generator,
        file.counters,
        vertices,
        edges,
        paths,
        bounds,
    ))
}

/// Full load pipeline: read, parse, build, apply presentation rules.
pub fn load(path: &std::path::Path) -> Result<Graph, LoadError> {
    let file = GraphFile::read(path)?;
    let mut graph = build(file)?;
    apply_presentation(&mut graph)?;
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    #[test]
    fn test_counts_match_declared() {
        let input = "\
grid
uniform 1.0
true
0 3 2 1
0 0 0 0
1 1 0 0
2 1 1 0
0 0 1
1 1 2
0 2 0 1
";
        let graph = build(GraphFile::parse(input).unwrap()).unwrap();
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.path_count(), 1);
    }

    #[test]
    fn test_edge_registration_and_placement() {
        let input = "\
outline
uniform 1.0
true
0 2 1 0
0 0 0 0
1 2 0 0
0 0 1
";
        let graph = build(GraphFile::parse(input).unwrap()).unwrap();

        let from = graph.vertex(VertexId(0)).unwrap();
        let to = graph.vertex(VertexId(1)).unwrap();
        assert_eq!(from.out_edges, vec![EdgeId(0)]);
        assert!(from.in_edges.is_empty());
        assert_eq!(to.in_edges, vec![EdgeId(0)]);

        let edge = graph.edge(EdgeId(0)).unwrap();
        assert_eq!(edge.position, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(edge.length, 2.0);

        let bounds = graph.bounds();
        assert_eq!(bounds.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(bounds.center(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_bounds_contain_every_vertex() {
        let input = "\
grid
uniform 1.0
true
0 4 0 0
0 -1 5 2
1 3 -2 0
2 0 0 7
3 1 1 1
";
        let graph = build(GraphFile::parse(input).unwrap()).unwrap();
        let bounds = graph.bounds();
        for vertex in graph.vertices() {
            assert!(bounds.contains(vertex.graph_pos));
        }
    }

    #[test]
    fn test_unresolved_edge_vertex_is_fatal() {
        let input = "\
grid
uniform 1.0
true
0 1 1 0
0 0 0 0
0 0 5
";
        let err = build(GraphFile::parse(input).unwrap()).unwrap_err();
        assert_eq!(
            err,
            BuildError::UnresolvedVertex { edge: EdgeId(0), vertex: VertexId(5) }
        );
    }

    #[test]
    fn test_unresolved_path_edge_is_fatal() {
        let input = "\
grid
uniform 1.0
true
0 2 1 1
0 0 0 0
1 1 0 0
0 0 1
0 1 3
";
        let err = build(GraphFile::parse(input).unwrap()).unwrap_err();
        assert_eq!(
            err,
            BuildError::UnresolvedEdge { path: PathId(0), edge: EdgeId(3) }
        );
    }

    #[test]
    fn test_path_preserves_file_order() {
        let input = "\
grid
uniform 1.0
true
0 3 2 1
0 0 0 0
1 1 0 0
2 2 0 0
0 0 1
1 1 2
0 2 1 0
";
        let graph = build(GraphFile::parse(input).unwrap()).unwrap();
        assert_eq!(graph.paths()[0].edges, vec![EdgeId(1), EdgeId(0)]);
    }
}
