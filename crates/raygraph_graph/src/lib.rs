// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph file parsing and scene model for the `RayGraph` viewer.
//!
//! This crate is the engine-independent core:
//! - a parser for the versioned, positional graph text format
//! - id resolution and graph assembly (vertices, edges, paths)
//! - derived geometry: edge placement and the bounding box
//! - tag-driven presentation rules (colors, child scales, gradients)
//! - the interactive element rescale operation
//!
//! ## Architecture
//!
//! Bytes flow through [`format::GraphFile::parse`] into records, then
//! [`builder::build`] resolves ids into the entity model and
//! [`presentation::apply_presentation`] applies the tag rules. The host
//! application renders the resulting [`graph::Graph`] and drives
//! [`graph::Graph::scale_element_sizes`] from per-frame input.

pub mod builder;
pub mod color;
pub mod edge;
pub mod format;
pub mod graph;
pub mod math;
pub mod path;
pub mod presentation;
pub mod vertex;

pub use builder::{build, load, BuildError, LoadError};
pub use color::{ColorState, ColorStateError, GraphColor};
pub use edge::{Edge, EdgeId};
pub use format::{
    GraphFile, GraphFlags, ParseError, RayVertexType, TagSet, ThroughputData,
};
pub use graph::{CameraFrame, Graph, MAX_ELEMENT_SCALE, MIN_ELEMENT_SCALE};
pub use math::{Aabb, Vec3};
pub use path::{Path, PathId};
pub use presentation::{apply_presentation, PresentationError};
pub use vertex::{Vertex, VertexId};
