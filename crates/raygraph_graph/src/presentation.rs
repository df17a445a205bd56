// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tag-driven presentation rules.
//!
//! Each rule is selected by a description tag (exact token match), mutates
//! color and child-scale state deterministically, and runs in a fixed order
//! so that later rules win on shared state. Child scales are SET rather
//! than multiplied, which makes re-running the whole pass idempotent.

use crate::color::{ColorStateError, GraphColor};
use crate::edge::EdgeId;
use crate::format::RayVertexType;
use crate::graph::Graph;
use crate::vertex::VertexId;
use thiserror::Error;

/// Child-scale factor for highlighted path heads
const PATH_HEAD_SCALE: f32 = 0.2;
/// Child-scale factor for queue/surface highlights
const ENLARGED_SCALE: f32 = 1.2;
/// Child-scale factor for whole-grid renderings
const SHRUNK_SCALE: f32 = 0.6;

/// Errors from the presentation pass
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PresentationError {
    /// Gradient shading applied to a non-gradient-capable entity
    #[error(transparent)]
    Color(#[from] ColorStateError),
}

/// Highlight color for a ray vertex type
fn vertex_type_color(vertex_type: RayVertexType) -> GraphColor {
    match vertex_type {
        RayVertexType::Absorption => GraphColor::Black,
        RayVertexType::Scatter | RayVertexType::Null => GraphColor::White,
        RayVertexType::Entry => GraphColor::Green,
        RayVertexType::ScatterFinal => GraphColor::Red,
    }
}

/// Apply the full rule catalog to a freshly built graph.
pub fn apply_presentation(graph: &mut Graph) -> Result<(), PresentationError> {
    let path_edges: Vec<Vec<EdgeId>> =
        graph.paths().iter().map(|p| p.edges.clone()).collect();

    // 1. Highlight the head of every path; gradient-shade the rest.
    if graph.tags.contains_any(&["full_paths", "paths"]) {
        for edges in &path_edges {
            let Some(&first) = edges.first() else {
                continue;
            };

            let mut head_vertex = None;
            if let Some(edge) = graph.edge_mut(first) {
                edge.color.set_color(GraphColor::BlueTransparent);
                edge.child_scale = PATH_HEAD_SCALE;
                head_vertex = Some(edge.from);
            }
            if let Some(vertex) = head_vertex.and_then(|id| graph.vertex_mut(id)) {
                vertex.color.set_color(GraphColor::BlueTransparent);
                vertex.child_scale = PATH_HEAD_SCALE;
            }

            if graph.flags.use_throughput {
                for &id in &edges[1..] {
                    if let Some(edge) = graph.edge_mut(id) {
                        if let Some(throughput) = edge.throughput {
                            edge.color.set_color(GraphColor::Yellow);
                            edge.color.yellow_gradient(throughput.weighted)?;
                        }
                    }
                }
            }
        }
    }

    // 2. Color path vertices by their ray vertex type.
    if graph.flags.use_ray_vertex_type {
        for edges in &path_edges {
            for &id in edges {
                let Some(to) = graph.edge(id).map(|e| e.to) else {
                    continue;
                };
                color_vertex_by_type(graph, to);
            }
        }
    }

    // 3-6. Whole-vertex-set highlights.
    if graph.tags.contains_any(&["grid_queue", "search_queue"]) {
        color_all_vertices(graph, GraphColor::BlueTransparent, Some(ENLARGED_SCALE));
    }
    if graph.tags.contains_any(&["grid_surface", "search_surface"]) {
        color_all_vertices(graph, GraphColor::YellowTransparent, Some(ENLARGED_SCALE));
    }
    if graph.tags.contains("surface") {
        color_all_vertices(graph, GraphColor::YellowTransparent, Some(SHRUNK_SCALE));
    }
    if graph.tags.contains("grid") {
        color_all_vertices(graph, GraphColor::BlueTransparent, Some(SHRUNK_SCALE));
    }

    // 7. Transmittance: gradient-shade every edge from its first sample.
    if graph.tags.contains("transmittance") {
        for edge in graph.edges_mut() {
            edge.color.set_color(GraphColor::Yellow);
            if let Some(throughput) = edge.throughput {
                edge.color.yellow_gradient(throughput.samples[0])?;
            }
        }
    }

    // 8. Outline: neutral highlight on everything, no scaling.
    if graph.tags.contains("outline") {
        color_all_vertices(graph, GraphColor::White, None);
        for edge in graph.edges_mut() {
            edge.color.set_color(GraphColor::White);
        }
    }

    Ok(())
}

fn color_vertex_by_type(graph: &mut Graph, id: VertexId) {
    let Some(vertex) = graph.vertex_mut(id) else {
        return;
    };
    if let Some(vertex_type) = vertex.vertex_type {
        vertex.color.set_color(vertex_type_color(vertex_type));
    }
}

fn color_all_vertices(graph: &mut Graph, color: GraphColor, child_scale: Option<f32>) {
    for vertex in graph.vertices_mut() {
        vertex.color.set_color(color);
        if let Some(scale) = child_scale {
            vertex.child_scale = scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::format::GraphFile;
    use crate::math::Vec3;

    fn load(input: &str) -> Graph {
        let mut graph = build(GraphFile::parse(input).unwrap()).unwrap();
        apply_presentation(&mut graph).unwrap();
        graph
    }

    #[test]
    fn test_outline_end_to_end() {
        let graph = load(
            "\
outline
uniform 1.0
true
0 2 1 0
0 0 0 0
1 2 0 0
0 0 1
",
        );

        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 1);

        let edge = graph.edges().next().unwrap();
        assert_eq!(edge.position, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(edge.length, 2.0);
        assert_eq!(edge.color.color(), GraphColor::White);
        assert_eq!(edge.child_scale, 1.0);

        for vertex in graph.vertices() {
            assert_eq!(vertex.color.color(), GraphColor::White);
            assert_eq!(vertex.child_scale, 1.0);
        }

        assert_eq!(graph.bounds().center(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_full_paths_highlights_head() {
        let graph = load(
            "\
full_paths
uniform 1.0
true true
0 3 2 1
0 0 0 0
1 1 0 0
2 2 0 0
0 0 1 0.5 0.4 0.3 0.2 0.6 8
1 1 2 0.9 0.8 0.7 0.6 0.3 8
0 2 0 1
",
        );

        let first = graph.edge(EdgeId(0)).unwrap();
        assert_eq!(first.color.color(), GraphColor::BlueTransparent);
        assert_eq!(first.child_scale, 0.2);

        let head = graph.vertex(VertexId(0)).unwrap();
        assert_eq!(head.color.color(), GraphColor::BlueTransparent);
        assert_eq!(head.child_scale, 0.2);

        // Subsequent path edges get the weighted-throughput gradient
        let second = graph.edge(EdgeId(1)).unwrap();
        assert_eq!(second.color.color(), GraphColor::Yellow);
        assert_eq!(second.color.rgba()[2], 1.0 - 0.3);
    }

    #[test]
    fn test_empty_path_has_no_effect() {
        let graph = load(
            "\
full_paths
uniform 1.0
true
0 1 0 1
0 0 0 0
0 0
",
        );
        let vertex = graph.vertices().next().unwrap();
        assert_eq!(vertex.color.color(), GraphColor::White);
    }

    #[test]
    fn test_vertex_type_coloring() {
        let graph = load(
            "\
full_paths
uniform 1.0
true false true
0 2 1 1
0 0 0 0 3
1 1 0 0 4
0 0 1
0 1 0
",
        );
        // Path edge's `to` vertex is colored by its type (ScatterFinal)
        assert_eq!(
            graph.vertex(VertexId(1)).unwrap().color.color(),
            GraphColor::Red
        );
    }

    #[test]
    fn test_grid_and_surface_rules() {
        let graph = load("grid\nuniform 1.0\ntrue\n0 1 0 0\n0 0 0 0\n");
        let vertex = graph.vertices().next().unwrap();
        assert_eq!(vertex.color.color(), GraphColor::BlueTransparent);
        assert_eq!(vertex.child_scale, 0.6);

        let graph = load("grid_queue\nuniform 1.0\ntrue\n0 1 0 0\n0 0 0 0\n");
        let vertex = graph.vertices().next().unwrap();
        assert_eq!(vertex.color.color(), GraphColor::BlueTransparent);
        assert_eq!(vertex.child_scale, 1.2);

        let graph = load("surface\nuniform 1.0\ntrue\n0 1 0 0\n0 0 0 0\n");
        let vertex = graph.vertices().next().unwrap();
        assert_eq!(vertex.color.color(), GraphColor::YellowTransparent);
        assert_eq!(vertex.child_scale, 0.6);
    }

    #[test]
    fn test_transmittance_gradient_from_first_sample() {
        let graph = load(
            "\
transmittance
uniform 1.0
true true
0 2 1 0
0 0 0 0
1 1 0 0
0 0 1 0.25 0.5 0.5 0.5 0.4 4
",
        );
        let edge = graph.edges().next().unwrap();
        assert_eq!(edge.color.color(), GraphColor::Yellow);
        assert_eq!(edge.color.rgba()[2], 0.75);
    }

    #[test]
    fn test_presentation_pass_is_idempotent() {
        let input = "\
full_paths grid transmittance
uniform 1.0
true true
0 3 2 1
0 0 0 0
1 1 0 0
2 2 0 0
0 0 1 0.5 0.4 0.3 0.2 0.6 8
1 1 2 0.9 0.8 0.7 0.6 0.3 8
0 2 0 1
";
        let once = load(input);
        let mut twice = build(GraphFile::parse(input).unwrap()).unwrap();
        apply_presentation(&mut twice).unwrap();
        apply_presentation(&mut twice).unwrap();

        for (a, b) in once.vertices().zip(twice.vertices()) {
            assert_eq!(a.color, b.color);
            assert_eq!(a.child_scale, b.child_scale);
        }
        for (a, b) in once.edges().zip(twice.edges()) {
            assert_eq!(a.color, b.color);
            assert_eq!(a.child_scale, b.child_scale);
        }
    }

    #[test]
    fn test_rules_apply_in_declared_order() {
        // outline runs last and overwrites the grid coloring, but grid's
        // child scale survives because outline never touches scale.
        let graph = load("grid outline\nuniform 1.0\ntrue\n0 1 0 0\n0 0 0 0\n");
        let vertex = graph.vertices().next().unwrap();
        assert_eq!(vertex.color.color(), GraphColor::White);
        assert_eq!(vertex.child_scale, 0.6);
    }
}
