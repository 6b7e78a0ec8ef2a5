//! Interactive 3D viewer for channel scenes
//!
//! Opens a window sized from the scene layout and draws each channel layer
//! with the marker renderer. Mouse and keyboard drive an orbit camera and
//! per-layer visibility.

use std::sync::Arc;
use winit::{
    dpi::{LogicalSize, PhysicalPosition},
    event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::WindowBuilder,
};

use chromacloud_algorithms::Scene;
use chromacloud_core::{Error, Result};
use chromacloud_gpu::{box_edges, MarkerInstance, MarkerRenderer, RenderConfig};
use log::{error, info};

use crate::camera::Camera;

/// Radians of orbit per pixel of mouse drag
const ORBIT_SPEED: f32 = 0.01;
/// Fraction of camera distance panned per pixel of mouse drag
const PAN_SPEED: f32 = 0.002;
/// Fraction of camera distance zoomed per wheel line
const ZOOM_SPEED: f32 = 0.1;

/// Keyboard commands understood by the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerCommand {
    /// Show or hide the layer at this index
    ToggleLayer(usize),
    ResetCamera,
    Close,
}

impl ViewerCommand {
    /// Map a typed character to a command
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "1" => Some(ViewerCommand::ToggleLayer(0)),
            "2" => Some(ViewerCommand::ToggleLayer(1)),
            "3" => Some(ViewerCommand::ToggleLayer(2)),
            "r" | "R" => Some(ViewerCommand::ResetCamera),
            "q" | "Q" => Some(ViewerCommand::Close),
            _ => None,
        }
    }
}

/// Interactive viewer owning one scene
pub struct SceneViewer {
    scene: Scene,
    camera: Camera,
    render_config: RenderConfig,
    title: String,
    left_pressed: bool,
    right_pressed: bool,
    last_mouse_pos: Option<PhysicalPosition<f64>>,
}

impl SceneViewer {
    /// Create a viewer for `scene`
    pub fn new(scene: Scene) -> Self {
        let aspect = scene.layout.window_width as f32 / scene.layout.window_height as f32;
        Self {
            scene,
            camera: Camera::scene_default(aspect),
            render_config: RenderConfig::default(),
            title: "chromacloud".to_string(),
            left_pressed: false,
            right_pressed: false,
            last_mouse_pos: None,
        }
    }

    /// Set the window title prefix (usually the image file name)
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_render_config(mut self, config: RenderConfig) -> Self {
        self.render_config = config;
        self
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Full window title: prefix plus the three axis titles
    pub fn window_title(&self) -> String {
        let [x, y, z] = &self.scene.layout.axis_titles;
        format!("{} | {} / {} / {}", self.title, x, y, z)
    }

    /// Marker instances per layer, in scene box coordinates.
    ///
    /// `pixel_scale` converts marker sizes from logical to physical pixels.
    pub fn marker_layers(&self, pixel_scale: f32) -> Vec<Vec<MarkerInstance>> {
        self.scene
            .world_points()
            .into_iter()
            .zip(&self.scene.layers)
            .map(|(points, layer)| {
                let size = layer.marker_size * pixel_scale;
                points
                    .iter()
                    .map(|p| MarkerInstance::from_point(p, layer.rgb(), size))
                    .collect()
            })
            .collect()
    }

    /// Apply a command that does not need the window; returns false for `Close`
    pub fn apply(&mut self, command: ViewerCommand) -> bool {
        match command {
            ViewerCommand::ToggleLayer(index) => {
                if let Some(visible) = self.scene.toggle_layer(index) {
                    info!(
                        "{} {}",
                        self.scene.layers[index].name,
                        if visible { "shown" } else { "hidden" }
                    );
                }
                true
            }
            ViewerCommand::ResetCamera => {
                self.camera.reset();
                info!("Reset camera");
                true
            }
            ViewerCommand::Close => false,
        }
    }

    /// Open the window and block until it is closed
    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()
            .map_err(|e| Error::Visualization(format!("Failed to create event loop: {}", e)))?;
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(self.window_title())
                .with_inner_size(LogicalSize::new(
                    self.scene.layout.window_width as f64,
                    self.scene.layout.window_height as f64,
                ))
                .build(&event_loop)
                .map_err(|e| Error::Visualization(format!("Failed to create window: {}", e)))?,
        );

        let mut renderer = pollster::block_on(MarkerRenderer::new(window.clone(), self.render_config.clone()))?;
        renderer.set_layers(&self.marker_layers(window.scale_factor() as f32));
        for (index, layer) in self.scene.layers.iter().enumerate() {
            renderer.set_layer_visible(index, layer.visible);
        }
        renderer.set_box(&box_edges(self.scene.box_sides(), renderer.config.box_color));

        let size = window.inner_size();
        if size.height > 0 {
            self.camera.aspect_ratio = size.width as f32 / size.height as f32;
        }

        for layer in &self.scene.layers {
            info!("{}: {} points ({})", layer.name, layer.points.len(), layer.color);
        }
        info!("Controls: left drag orbit, right drag pan, wheel zoom, 1/2/3 toggle layers, R reset, Esc/Q close");

        window.request_redraw();
        event_loop
            .run(move |event, target| {
                target.set_control_flow(ControlFlow::Wait);

                let Event::WindowEvent { event, .. } = event else {
                    return;
                };
                match event {
                    WindowEvent::CloseRequested => target.exit(),
                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size);
                        if new_size.height > 0 {
                            self.camera.aspect_ratio = new_size.width as f32 / new_size.height as f32;
                        }
                        window.request_redraw();
                    }
                    WindowEvent::MouseInput { state, button, .. } => match button {
                        MouseButton::Left => self.left_pressed = state == ElementState::Pressed,
                        MouseButton::Right => self.right_pressed = state == ElementState::Pressed,
                        _ => {}
                    },
                    WindowEvent::CursorMoved { position, .. } => {
                        if let Some(last) = self.last_mouse_pos {
                            let dx = (position.x - last.x) as f32;
                            let dy = (position.y - last.y) as f32;
                            if self.left_pressed {
                                self.camera.orbit(dx * ORBIT_SPEED, dy * ORBIT_SPEED);
                                window.request_redraw();
                            } else if self.right_pressed {
                                self.camera.pan(dx * PAN_SPEED, dy * PAN_SPEED);
                                window.request_redraw();
                            }
                        }
                        self.last_mouse_pos = Some(position);
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let lines = match delta {
                            MouseScrollDelta::LineDelta(_, y) => y,
                            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                        };
                        self.camera.zoom(lines * ZOOM_SPEED);
                        window.request_redraw();
                    }
                    WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                        let command = match &event.logical_key {
                            Key::Named(NamedKey::Escape) => Some(ViewerCommand::Close),
                            Key::Character(c) => ViewerCommand::from_key(c.as_str()),
                            _ => None,
                        };
                        if let Some(command) = command {
                            if !self.apply(command) {
                                target.exit();
                                return;
                            }
                            if let ViewerCommand::ToggleLayer(index) = command {
                                if let Some(layer) = self.scene.layers.get(index) {
                                    renderer.set_layer_visible(index, layer.visible);
                                }
                            }
                            window.request_redraw();
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        renderer.update_camera(self.camera.view_matrix(), self.camera.projection_matrix());
                        if let Err(e) = renderer.render() {
                            error!("Render error: {}", e);
                            target.exit();
                        }
                    }
                    _ => {}
                }
            })
            .map_err(|e| Error::Visualization(format!("Event loop error: {}", e)))?;

        Ok(())
    }
}
