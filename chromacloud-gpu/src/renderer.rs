use std::sync::Arc;

use crate::device::GpuContext;
use bytemuck::{Pod, Zeroable};
use chromacloud_core::{Error, Point3f, Result, Rgb};
use log::{debug, warn};
use nalgebra::Matrix4;
use winit::window::Window;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Vertices per marker quad (two triangles)
const MARKER_VERTICES: u32 = 6;

/// nalgebra projections map depth to [-1, 1], wgpu expects [0, 1]
#[rustfmt::skip]
pub fn opengl_to_wgpu_matrix() -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.5,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Per-instance data of one square marker
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MarkerInstance {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub size: f32,
}

impl MarkerInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32,
    ];

    pub fn from_point(point: &Point3f, color: Rgb, size: f32) -> Self {
        Self {
            position: [point.x, point.y, point.z],
            color,
            size,
        }
    }

    /// Instance buffer layout descriptor
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MarkerInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Vertex of the scene box wireframe
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl LineVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
    ];

    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Camera uniform data
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub viewport: [f32; 2],
    pub _padding: [f32; 2],
}

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub background_color: [f64; 4],
    pub box_color: Rgb,
    pub enable_depth_test: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background_color: [1.0, 1.0, 1.0, 1.0],
            box_color: [0.75, 0.75, 0.75],
            enable_depth_test: true,
        }
    }
}

/// Line list tracing the 12 edges of a box of `sides` centered on the origin
pub fn box_edges(sides: [f32; 3], color: Rgb) -> Vec<LineVertex> {
    let half = sides.map(|s| s / 2.0);
    let corner = |i: usize| -> [f32; 3] {
        [
            if i & 1 == 0 { -half[0] } else { half[0] },
            if i & 2 == 0 { -half[1] } else { half[1] },
            if i & 4 == 0 { -half[2] } else { half[2] },
        ]
    };

    let mut vertices = Vec::with_capacity(24);
    for a in 0..8usize {
        for bit in [1usize, 2, 4] {
            // Each edge once, from the corner with the bit cleared
            if a & bit == 0 {
                vertices.push(LineVertex { position: corner(a), color });
                vertices.push(LineVertex { position: corner(a | bit), color });
            }
        }
    }
    vertices
}

struct LayerBuffer {
    buffer: Option<wgpu::Buffer>,
    count: u32,
    visible: bool,
}

/// Renders marker layers and the scene box into a window surface
pub struct MarkerRenderer {
    pub gpu_context: GpuContext,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub config: RenderConfig,
    marker_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    depth_view: wgpu::TextureView,
    layers: Vec<LayerBuffer>,
    box_buffer: Option<(wgpu::Buffer, u32)>,
}

impl MarkerRenderer {
    /// Create a renderer presenting to `window`
    pub async fn new(window: Arc<Window>, config: RenderConfig) -> Result<Self> {
        let instance = GpuContext::create_instance();
        let size = window.inner_size();
        let surface = instance
            .create_surface(window)
            .map_err(|e| Error::Gpu(format!("Failed to create surface: {}", e)))?;
        let gpu_context = GpuContext::new(instance, Some(&surface)).await?;

        let surface_caps = surface.get_capabilities(&gpu_context.adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| Error::Gpu("Surface reports no supported formats".to_string()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu_context.device, &surface_config);

        let camera_uniform = CameraUniform {
            view_proj: Matrix4::identity().into(),
            viewport: [surface_config.width as f32, surface_config.height as f32],
            _padding: [0.0; 2],
        };
        let camera_buffer = gpu_context.create_buffer_init(
            "Camera Buffer",
            &[camera_uniform],
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );

        let camera_bind_group_layout = gpu_context.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        });

        let camera_bind_group = gpu_context.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let shader = gpu_context.create_shader_module("Point Cloud Shader", include_str!("shaders/point_cloud.wgsl"));

        let pipeline_layout = gpu_context.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Point Cloud Render Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let marker_pipeline = create_pipeline(
            &gpu_context.device,
            &pipeline_layout,
            &shader,
            PipelineKind::Markers,
            surface_config.format,
            &config,
        );
        let line_pipeline = create_pipeline(
            &gpu_context.device,
            &pipeline_layout,
            &shader,
            PipelineKind::Lines,
            surface_config.format,
            &config,
        );

        let depth_view = create_depth_view(&gpu_context.device, &surface_config);

        Ok(Self {
            gpu_context,
            surface,
            surface_config,
            config,
            marker_pipeline,
            line_pipeline,
            camera_uniform,
            camera_buffer,
            camera_bind_group,
            depth_view,
            layers: Vec::new(),
            box_buffer: None,
        })
    }

    /// Replace all marker layers; every layer starts visible
    pub fn set_layers(&mut self, layers: &[Vec<MarkerInstance>]) {
        self.layers = layers
            .iter()
            .enumerate()
            .map(|(i, instances)| LayerBuffer {
                buffer: (!instances.is_empty()).then(|| {
                    self.gpu_context.create_buffer_init(
                        &format!("Marker Layer {}", i),
                        instances,
                        wgpu::BufferUsages::VERTEX,
                    )
                }),
                count: instances.len() as u32,
                visible: true,
            })
            .collect();
        debug!("uploaded {} marker layers", self.layers.len());
    }

    pub fn set_layer_visible(&mut self, index: usize, visible: bool) {
        if let Some(layer) = self.layers.get_mut(index) {
            layer.visible = visible;
        }
    }

    /// Set the wireframe drawn around the data
    pub fn set_box(&mut self, vertices: &[LineVertex]) {
        self.box_buffer = (!vertices.is_empty()).then(|| {
            (
                self.gpu_context
                    .create_buffer_init("Scene Box Buffer", vertices, wgpu::BufferUsages::VERTEX),
                vertices.len() as u32,
            )
        });
    }

    /// Update camera view and projection matrices
    pub fn update_camera(&mut self, view_matrix: Matrix4<f32>, proj_matrix: Matrix4<f32>) {
        let view_proj = opengl_to_wgpu_matrix() * proj_matrix * view_matrix;
        self.camera_uniform.view_proj = view_proj.into();
        self.camera_uniform.viewport = [self.surface_config.width as f32, self.surface_config.height as f32];

        self.gpu_context
            .queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&self.camera_uniform));
    }

    /// Resize renderer surface
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.surface_config.width = new_size.width;
            self.surface_config.height = new_size.height;
            self.surface.configure(&self.gpu_context.device, &self.surface_config);
            self.depth_view = create_depth_view(&self.gpu_context.device, &self.surface_config);
        }
    }

    /// Draw one frame
    pub fn render(&mut self) -> Result<()> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(e) => match surface_recovery(&e) {
                SurfaceRecovery::Reconfigure => {
                    warn!("surface {}, reconfiguring", e);
                    self.surface.configure(&self.gpu_context.device, &self.surface_config);
                    match self.surface.get_current_texture() {
                        Ok(output) => output,
                        Err(e) if surface_recovery(&e) == SurfaceRecovery::Fail => {
                            return Err(Error::Gpu(format!("Failed to get surface texture: {}", e)))
                        }
                        Err(_) => return Ok(()),
                    }
                }
                SurfaceRecovery::SkipFrame => return Ok(()),
                SurfaceRecovery::Fail => {
                    return Err(Error::Gpu(format!("Failed to get surface texture: {}", e)))
                }
            },
        };

        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu_context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Point Cloud Render Encoder"),
            });

        {
            let [r, g, b, a] = self.config.background_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Point Cloud Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: self.config.enable_depth_test.then(|| {
                    wgpu::RenderPassDepthStencilAttachment {
                        view: &self.depth_view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);

            if let Some((buffer, count)) = &self.box_buffer {
                render_pass.set_pipeline(&self.line_pipeline);
                render_pass.set_vertex_buffer(0, buffer.slice(..));
                render_pass.draw(0..*count, 0..1);
            }

            render_pass.set_pipeline(&self.marker_pipeline);
            for layer in self.layers.iter().filter(|l| l.visible) {
                if let Some(buffer) = &layer.buffer {
                    render_pass.set_vertex_buffer(0, buffer.slice(..));
                    render_pass.draw(0..MARKER_VERTICES, 0..layer.count);
                }
            }
        }

        self.gpu_context.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

/// What `render` does when the surface cannot hand out a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfaceRecovery {
    /// Reconfigure the surface and try the frame again
    Reconfigure,
    SkipFrame,
    Fail,
}

fn surface_recovery(error: &wgpu::SurfaceError) -> SurfaceRecovery {
    match error {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceRecovery::Reconfigure,
        wgpu::SurfaceError::Timeout => SurfaceRecovery::SkipFrame,
        _ => SurfaceRecovery::Fail,
    }
}

#[derive(Clone, Copy)]
enum PipelineKind {
    Markers,
    Lines,
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    kind: PipelineKind,
    format: wgpu::TextureFormat,
    config: &RenderConfig,
) -> wgpu::RenderPipeline {
    let (label, entry_point, buffer, topology) = match kind {
        PipelineKind::Markers => (
            "Marker Render Pipeline",
            "vs_marker",
            MarkerInstance::desc(),
            wgpu::PrimitiveTopology::TriangleList,
        ),
        PipelineKind::Lines => (
            "Box Render Pipeline",
            "vs_line",
            LineVertex::desc(),
            wgpu::PrimitiveTopology::LineList,
        ),
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point,
            buffers: &[buffer],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: config.enable_depth_test.then(|| wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

fn create_depth_view(device: &wgpu::Device, surface_config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: surface_config.width,
            height: surface_config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lost_surface_is_retried() {
        assert_eq!(surface_recovery(&wgpu::SurfaceError::Lost), SurfaceRecovery::Reconfigure);
        assert_eq!(surface_recovery(&wgpu::SurfaceError::Outdated), SurfaceRecovery::Reconfigure);
        assert_eq!(surface_recovery(&wgpu::SurfaceError::Timeout), SurfaceRecovery::SkipFrame);
        assert_eq!(surface_recovery(&wgpu::SurfaceError::OutOfMemory), SurfaceRecovery::Fail);
    }

    #[test]
    fn test_box_edges() {
        let edges = box_edges([1.0, 0.5, 0.4], [0.5; 3]);
        assert_eq!(edges.len(), 24);

        for pair in edges.chunks(2) {
            let (a, b) = (pair[0].position, pair[1].position);
            // Edges are axis aligned: exactly one coordinate differs
            let differing = (0..3).filter(|&i| a[i] != b[i]).count();
            assert_eq!(differing, 1);
        }
        for v in &edges {
            assert_relative_eq!(v.position[0].abs(), 0.5);
            assert_relative_eq!(v.position[1].abs(), 0.25);
            assert_relative_eq!(v.position[2].abs(), 0.2);
        }
    }

    #[test]
    fn test_marker_instance_layout() {
        assert_eq!(std::mem::size_of::<MarkerInstance>(), 28);
        assert_eq!(std::mem::size_of::<CameraUniform>(), 80);

        let m = MarkerInstance::from_point(&Point3f::new(1.0, 2.0, 3.0), [1.0, 0.0, 0.0], 2.0);
        assert_eq!(m.position, [1.0, 2.0, 3.0]);
        assert_eq!(m.size, 2.0);
    }

    #[test]
    fn test_depth_correction() {
        let near = opengl_to_wgpu_matrix() * nalgebra::Vector4::new(0.0, 0.0, -1.0, 1.0);
        let far = opengl_to_wgpu_matrix() * nalgebra::Vector4::new(0.0, 0.0, 1.0, 1.0);
        assert_relative_eq!(near.z, 0.0);
        assert_relative_eq!(far.z, 1.0);
    }
}
