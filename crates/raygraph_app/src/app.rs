// SPDX-License-Identifier: MIT OR Apache-2.0
//! Viewer application setup and event loop.

use crate::camera::FlyCamera;
use crate::config::ViewerSettings;
use crate::input::InputState;
use crate::scene::GraphScene;
use crate::viewport_renderer::ViewportRenderer;
use egui_wgpu::wgpu;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

/// Viewer application errors
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Event loop error
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// Result type for viewer operations
pub type Result<T> = std::result::Result<T, ViewerError>;

/// Graphics state for wgpu rendering
struct GraphicsState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    egui_renderer: egui_wgpu::Renderer,
}

impl GraphicsState {
    fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("Failed to create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("Failed to find suitable GPU adapter");

        tracing::info!("Using GPU: {}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("RayGraph Viewer Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            },
            None,
        ))
        .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(wgpu::TextureFormat::is_srgb)
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        Self {
            surface,
            device,
            queue,
            config,
            egui_renderer,
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    #[allow(unsafe_code)] // Workaround for wgpu 23 lifetime issue with RenderPass
    fn render(
        &mut self,
        egui_ctx: &egui::Context,
        full_output: egui::FullOutput,
        window: &Window,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Viewer Encoder"),
            });

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        // wgpu 23 has a 'static lifetime bound issue with RenderPass
        // We work around this using raw pointers
        let encoder_ptr = Box::into_raw(Box::new(encoder));

        {
            // SAFETY: encoder_ptr is valid and we'll properly reclaim it after the render_pass is dropped
            let encoder_ref: &'static mut wgpu::CommandEncoder = unsafe { &mut *encoder_ptr };

            let mut render_pass = encoder_ref.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Viewer Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.1,
                            g: 0.1,
                            b: 0.1,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.egui_renderer
                .render(&mut render_pass, &paint_jobs, &screen_descriptor);
            // render_pass is dropped here
        }

        // SAFETY: We're reclaiming the Box after render_pass is dropped
        let encoder = unsafe { Box::from_raw(encoder_ptr) };

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        Ok(())
    }
}

/// State that exists once the window has been created
struct ViewerRunning {
    window: Arc<Window>,
    graphics: GraphicsState,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    viewport_renderer: ViewportRenderer,
    scene: GraphScene,
    camera: FlyCamera,
    input: InputState,
    last_frame: Instant,
    show_grid: bool,
}

/// Main viewer application
pub struct ViewerApp {
    settings: ViewerSettings,
    running: Option<ViewerRunning>,
}

impl ViewerApp {
    /// Create a new viewer application
    pub fn new(settings: ViewerSettings) -> Self {
        Self { settings, running: None }
    }

    /// Run the viewer application to completion
    pub fn run(settings: ViewerSettings) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp::new(settings);
        event_loop.run_app(&mut app)?;

        Ok(())
    }

    /// Reload every configured graph from disk, reframing the camera from
    /// the primary one.
    fn reload(&mut self) {
        let Some(running) = &mut self.running else {
            return;
        };
        tracing::info!("Reloading graphs...");
        let (scene, frame) = GraphScene::load(&self.settings);
        running.scene = scene;
        if let Some(frame) = frame {
            running.camera.frame(frame);
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }

        tracing::info!("Creating viewer window...");

        let window_attrs = Window::default_attributes()
            .with_title("RayGraph Viewer")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.settings.window_width,
                self.settings.window_height,
            ))
            .with_min_inner_size(winit::dpi::LogicalSize::new(800, 600));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("Failed to create window"),
        );

        tracing::info!("Initializing graphics...");

        let graphics = GraphicsState::new(window.clone());
        let egui_ctx = egui::Context::default();

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2 * 1024), // max texture side
        );

        let initial_size = window.inner_size();
        let viewport_renderer = ViewportRenderer::new(
            &graphics.device,
            [initial_size.width.max(1), initial_size.height.max(1)],
        );

        let (scene, frame) = GraphScene::load(&self.settings);
        let mut camera = FlyCamera::from_settings(&self.settings);
        if let Some(frame) = frame {
            camera.frame(frame);
        }

        tracing::info!("Viewer initialized");

        self.running = Some(ViewerRunning {
            window,
            graphics,
            egui_ctx,
            egui_state,
            viewport_renderer,
            scene,
            camera,
            input: InputState::default(),
            last_frame: Instant::now(),
            show_grid: true,
        });
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(running) = &mut self.running else {
            return;
        };

        // Let egui handle the event first
        let response = running.egui_state.on_window_event(&running.window, &event);
        if response.consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                tracing::debug!("Window resized to {:?}", new_size);
                running.graphics.resize(new_size);
                running.window.request_redraw();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    running.input.on_key(code, event.state);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                running.input.on_cursor_moved(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                running.input.on_mouse_button(button, state);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                running.input.on_scroll(delta);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                // Cap dt so a stall does not turn into a camera jump
                let dt = (now - running.last_frame).as_secs_f32().min(0.1);
                running.last_frame = now;

                running.camera.tick(dt, &running.input);
                running.scene.tick(dt, &running.input);
                running.input.end_frame();

                if running.scene.take_dirty() {
                    let vertices = running.scene.line_vertices();
                    running
                        .viewport_renderer
                        .set_graph_vertices(&running.graphics.device, &vertices);
                }

                let size = running.viewport_renderer.size();
                let aspect = size[0] as f32 / size[1].max(1) as f32;
                running.viewport_renderer.update_camera(
                    &running.graphics.queue,
                    running.camera.position.to_array(),
                    running.camera.target().to_array(),
                    running.camera.up().to_array(),
                    aspect,
                    running.camera.fov.to_radians(),
                    running.camera.near,
                    running.camera.far,
                );
                running
                    .viewport_renderer
                    .render(&running.graphics.device, &running.graphics.queue, running.show_grid);

                // Begin egui frame
                let raw_input = running.egui_state.take_egui_input(&running.window);
                let mut reload_requested = false;
                let full_output = running.egui_ctx.run(raw_input, |ctx| {
                    overlay_ui(
                        ctx,
                        &running.scene,
                        &running.camera,
                        &mut running.show_grid,
                        &mut reload_requested,
                    );
                    viewport_ui(
                        ctx,
                        &mut running.viewport_renderer,
                        &running.graphics.device,
                        &mut running.graphics.egui_renderer,
                    );
                });

                running
                    .egui_state
                    .handle_platform_output(&running.window, full_output.platform_output.clone());

                match running
                    .graphics
                    .render(&running.egui_ctx, full_output, &running.window)
                {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = running.window.inner_size();
                        running.graphics.resize(size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        tracing::error!("Out of GPU memory!");
                        event_loop.exit();
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        tracing::warn!("Surface timeout");
                    }
                }

                if reload_requested {
                    self.reload();
                    if let Some(running) = &self.running {
                        running.window.request_redraw();
                    }
                    return;
                }

                running.window.request_redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = &self.running {
            running.window.request_redraw();
        }
    }
}

/// Stats and controls overlay
fn overlay_ui(
    ctx: &egui::Context,
    scene: &GraphScene,
    camera: &FlyCamera,
    show_grid: &mut bool,
    reload_requested: &mut bool,
) {
    egui::Window::new("Graph")
        .anchor(egui::Align2::LEFT_TOP, [12.0, 12.0])
        .resizable(false)
        .show(ctx, |ui| {
            let (vertices, edges, paths) = scene.totals();
            ui.label(format!("{vertices} vertices, {edges} edges, {paths} paths"));
            ui.label(format!("Element scale: {:.2}", scene.current_scale()));

            for instance in &scene.instances {
                let tags: Vec<&str> = instance.graph.tags.iter().collect();
                let marker = if instance.primary { " (primary)" } else { "" };
                ui.label(format!(
                    "{}{marker}: [{}]",
                    instance.file_name,
                    tags.join(" ")
                ));
            }

            for error in &scene.load_errors {
                ui.colored_label(egui::Color32::LIGHT_RED, error);
            }

            ui.separator();
            ui.checkbox(show_grid, "Show grid");
            if ui.button("Reload").clicked() {
                *reload_requested = true;
            }

            ui.collapsing("Controls", |ui| {
                ui.label("WASD: move, arrows: turn/rise, right-drag: look");
                ui.label("[ / ]: shrink / grow elements, scroll: altitude");
            });

            ui.separator();
            ui.label(format!(
                "Camera ({:.1}, {:.1}, {:.1})",
                camera.position.x, camera.position.y, camera.position.z
            ));
        });
}

/// Full-window viewport image behind the overlay
fn viewport_ui(
    ctx: &egui::Context,
    viewport_renderer: &mut ViewportRenderer,
    device: &wgpu::Device,
    egui_renderer: &mut egui_wgpu::Renderer,
) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| {
            let available = ui.available_size();
            let size = [available.x.max(1.0) as u32, available.y.max(1.0) as u32];
            viewport_renderer.resize(device, size);
            let texture_id = viewport_renderer.get_egui_texture_id(egui_renderer, device);
            ui.image((texture_id, available));
        });
}
