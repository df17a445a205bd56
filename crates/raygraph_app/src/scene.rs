// SPDX-License-Identifier: MIT OR Apache-2.0
//! Loaded graph instances and their renderable geometry.
//!
//! The scene owns every loaded graph (primary plus secondaries), runs the
//! per-frame rescale input, and flattens the entity model into line-list
//! vertices for the viewport renderer. Each graph is translated by the
//! negated bounding-box center so it sits centered at the origin.

use crate::config::ViewerSettings;
use crate::input::InputState;
use crate::viewport_renderer::LineVertex;
use raygraph_graph::{load, CameraFrame, Graph, Vec3};

/// Seconds to double (or halve) the element scale while a bracket is held
const SCALE_SPEED: f32 = 0.2;

/// Base half-extent of a vertex marker at scale 1
const VERTEX_MARKER_RADIUS: f32 = 0.12;

/// One loaded graph and its world placement
pub struct GraphInstance {
    /// File name the graph was loaded from
    pub file_name: String,
    /// Whether this instance drove the camera framing
    pub primary: bool,
    /// The built model
    pub graph: Graph,
    /// World translation (negated bounding-box center)
    pub offset: Vec3,
}

/// All loaded graphs plus per-frame interactive state
pub struct GraphScene {
    /// Loaded instances in settings order
    pub instances: Vec<GraphInstance>,
    /// Human-readable load failures for the overlay
    pub load_errors: Vec<String>,
    use_simple_meshes: bool,
    dirty: bool,
}

impl GraphScene {
    /// Load every configured graph.
    ///
    /// A failing slot is reported and skipped; the rest still load. The
    /// returned frame comes from the primary slot only and is handed to
    /// the camera exactly once.
    pub fn load(settings: &ViewerSettings) -> (Self, Option<CameraFrame>) {
        let mut scene = Self {
            instances: Vec::new(),
            load_errors: Vec::new(),
            use_simple_meshes: settings.use_simple_meshes,
            dirty: true,
        };
        let mut camera_frame = None;

        for slot in &settings.graphs {
            let path = settings.graph_file_path(slot);
            match load(&path) {
                Ok(graph) => {
                    let frame = graph.framing();
                    if slot.primary {
                        camera_frame = Some(frame);
                    }
                    tracing::info!(
                        "Loaded {}: {} vertices, {} edges, {} paths",
                        path.display(),
                        graph.vertex_count(),
                        graph.edge_count(),
                        graph.path_count(),
                    );
                    scene.instances.push(GraphInstance {
                        file_name: slot.file_name.clone(),
                        primary: slot.primary,
                        graph,
                        offset: -frame.center,
                    });
                }
                Err(e) => {
                    tracing::error!("Failed to load {}: {e}", path.display());
                    scene.load_errors.push(format!("{}: {e}", path.display()));
                }
            }
        }

        (scene, camera_frame)
    }

    /// Advance interactive state by one frame
    pub fn tick(&mut self, dt: f32, input: &InputState) {
        if input.shrink {
            self.rescale(1.0 - dt / SCALE_SPEED);
        }
        if input.grow {
            self.rescale(1.0 + dt / SCALE_SPEED);
        }
    }

    fn rescale(&mut self, factor: f32) {
        for instance in &mut self.instances {
            instance.graph.scale_element_sizes(factor);
        }
        self.dirty = true;
    }

    /// Whether render geometry needs rebuilding; clears the flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Element scale of the first instance, for the stats overlay
    pub fn current_scale(&self) -> f32 {
        self.instances
            .first()
            .map_or(1.0, |i| i.graph.current_scale())
    }

    /// Total entity counts across instances: (vertices, edges, paths)
    pub fn totals(&self) -> (usize, usize, usize) {
        self.instances.iter().fold((0, 0, 0), |acc, i| {
            (
                acc.0 + i.graph.vertex_count(),
                acc.1 + i.graph.edge_count(),
                acc.2 + i.graph.path_count(),
            )
        })
    }

    /// Flatten all instances into line-list geometry.
    pub fn line_vertices(&self) -> Vec<LineVertex> {
        let mut out = Vec::new();
        for instance in &self.instances {
            let offset = instance.offset;

            for edge in instance.graph.edges() {
                let color = rgb(edge.color.rgba());
                out.push(LineVertex {
                    position: (edge.start() + offset).to_array(),
                    color,
                });
                out.push(LineVertex {
                    position: (edge.end() + offset).to_array(),
                    color,
                });
            }

            for vertex in instance.graph.vertices() {
                let radius = VERTEX_MARKER_RADIUS * vertex.scale * vertex.child_scale;
                push_marker(
                    &mut out,
                    vertex.graph_pos + offset,
                    radius,
                    rgb(vertex.color.rgba()),
                    self.use_simple_meshes,
                );
            }
        }
        out
    }
}

fn rgb(rgba: [f32; 4]) -> [f32; 3] {
    [rgba[0], rgba[1], rgba[2]]
}

/// Append a vertex marker: a 3-axis cross for simple meshes, a wireframe
/// cube otherwise.
fn push_marker(out: &mut Vec<LineVertex>, center: Vec3, r: f32, color: [f32; 3], simple: bool) {
    let mut line = |a: Vec3, b: Vec3| {
        out.push(LineVertex { position: (center + a).to_array(), color });
        out.push(LineVertex { position: (center + b).to_array(), color });
    };

    if simple {
        line(Vec3::new(-r, 0.0, 0.0), Vec3::new(r, 0.0, 0.0));
        line(Vec3::new(0.0, -r, 0.0), Vec3::new(0.0, r, 0.0));
        line(Vec3::new(0.0, 0.0, -r), Vec3::new(0.0, 0.0, r));
        return;
    }

    // 12 cube edges
    let signs = [-r, r];
    for &y in &signs {
        for &z in &signs {
            line(Vec3::new(-r, y, z), Vec3::new(r, y, z));
        }
    }
    for &x in &signs {
        for &z in &signs {
            line(Vec3::new(x, -r, z), Vec3::new(x, r, z));
        }
    }
    for &x in &signs {
        for &y in &signs {
            line(Vec3::new(x, y, -r), Vec3::new(x, y, r));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_vertex_counts() {
        let mut out = Vec::new();
        push_marker(&mut out, Vec3::zero(), 0.1, [1.0, 1.0, 1.0], true);
        assert_eq!(out.len(), 6);

        out.clear();
        push_marker(&mut out, Vec3::zero(), 0.1, [1.0, 1.0, 1.0], false);
        assert_eq!(out.len(), 24);
    }

    #[test]
    fn test_marker_centered() {
        let mut out = Vec::new();
        let center = Vec3::new(3.0, -1.0, 2.0);
        push_marker(&mut out, center, 0.5, [1.0, 1.0, 1.0], false);

        let mut sum = [0.0f32; 3];
        for v in &out {
            for i in 0..3 {
                sum[i] += v.position[i];
            }
        }
        let n = out.len() as f32;
        assert!((sum[0] / n - center.x).abs() < 1e-5);
        assert!((sum[1] / n - center.y).abs() < 1e-5);
        assert!((sum[2] / n - center.z).abs() < 1e-5);
    }
}
