// SPDX-License-Identifier: MIT OR Apache-2.0
//! `RayGraph` Viewer - Interactive 3D Ray Graph Visualization
//!
//! Loads ray graphs from versioned text files and renders them as 3D
//! line geometry with a free-flying camera:
//! - Vertices colored by interaction type
//! - Paths, queues and surfaces styled by description tags
//! - Interactive element rescaling
//!
//! Graphs to load are listed in a `raygraph.ron` settings file next to
//! the executable; a default file is written on first run.

mod app;
mod camera;
mod config;
mod input;
mod scene;
mod viewport_renderer;

use app::ViewerApp;
use config::{ViewerSettings, SETTINGS_FILE_NAME};
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("raygraph_app=debug".parse().unwrap())
        .add_directive("raygraph_graph=debug".parse().unwrap())
        .add_directive("wgpu=warn".parse().unwrap())
        .add_directive("naga=warn".parse().unwrap());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting RayGraph Viewer v{}", env!("CARGO_PKG_VERSION"));

    let settings = ViewerSettings::load_or_default(Path::new(SETTINGS_FILE_NAME));

    if let Err(e) = ViewerApp::run(settings) {
        tracing::error!("Viewer crashed: {e}");
        std::process::exit(1);
    }
}
