//! wgpu renderer shared by the web and native front-ends.
//!
//! Two pipelines over one uniform block: the deformed heart as a solid black
//! occluder writing depth, then the surviving particle positions as instanced
//! camera-facing quads tested against that depth.

use crate::constants::{CLEAR_COLOR, POINT_SIZE};
use crate::error::RenderError;
use crate::sink::{FrameSink, FrameView, SceneLayout};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    camera_right: [f32; 4], // w = point size
    camera_up: [f32; 4],
}

/// Buffers sized for one loaded mesh and particle capacity.
struct SceneGeometry {
    mesh_vb: wgpu::Buffer,
    mesh_ib: wgpu::Buffer,
    index_count: u32,
    vertex_count: usize,
    position_vb: wgpu::Buffer,
    color_vb: wgpu::Buffer,
    point_capacity: usize,
}

pub struct GpuState<'w> {
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    mesh_pipeline: wgpu::RenderPipeline,
    points_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    quad_vb: wgpu::Buffer,
    depth_view: wgpu::TextureView,
    geometry: Option<SceneGeometry>,
    clear_color: wgpu::Color,
}

impl<'w> GpuState<'w> {
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'w>,
        width: u32,
        height: u32,
    ) -> anyhow::Result<Self> {
        let width = width.max(1);
        let height = height.max(1);
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("heart_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::SCENE_WGSL.into()),
        });
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniforms"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bgl"),
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
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bg"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        // Quad corners for two triangles, unit edge
        let quad_vertices: [f32; 12] = [
            -0.5, -0.5, 0.5, -0.5, 0.5, 0.5, -0.5, -0.5, 0.5, 0.5, -0.5, 0.5,
        ];
        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vb"),
            contents: bytemuck::cast_slice(&quad_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let depth_stencil = wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        };

        let mesh_buffers = [wgpu::VertexBufferLayout {
            array_stride: (std::mem::size_of::<f32>() * 3) as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 0,
                shader_location: 0,
            }],
        }];
        let mesh_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mesh_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_mesh"),
                buffers: &mesh_buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(depth_stencil.clone()),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_mesh"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        let point_buffers = [
            // slot 0: quad corners
            wgpu::VertexBufferLayout {
                array_stride: (std::mem::size_of::<f32>() * 2) as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 0,
                }],
            },
            // slot 1: per-point position
            wgpu::VertexBufferLayout {
                array_stride: (std::mem::size_of::<f32>() * 3) as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 1,
                }],
            },
            // slot 2: per-point color
            wgpu::VertexBufferLayout {
                array_stride: (std::mem::size_of::<f32>() * 3) as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 2,
                }],
            },
        ];
        let points_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("points_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_points"),
                buffers: &point_buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(depth_stencil),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_points"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        let depth_view = create_depth_view(&device, width, height);
        log::info!("[gpu] surface {}x{} format {:?}", width, height, format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            mesh_pipeline,
            points_pipeline,
            uniform_buffer,
            bind_group,
            quad_vb,
            depth_view,
            geometry: None,
            clear_color: wgpu::Color {
                r: CLEAR_COLOR[0],
                g: CLEAR_COLOR[1],
                b: CLEAR_COLOR[2],
                a: 1.0,
            },
        })
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, self.config.width, self.config.height);
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_tex"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&wgpu::TextureViewDescriptor::default())
}

impl FrameSink for GpuState<'_> {
    fn prepare(&mut self, layout: &SceneLayout<'_>) -> Result<(), RenderError> {
        let vertex_bytes = (layout.mesh_vertex_count * std::mem::size_of::<f32>() * 3) as u64;
        let point_bytes = (layout.point_capacity.max(1) * std::mem::size_of::<f32>() * 3) as u64;
        let mesh_vb = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("mesh_vb"),
            size: vertex_bytes,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let mesh_ib = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_ib"),
                contents: bytemuck::cast_slice(layout.mesh_indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let position_vb = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("position_vb"),
            size: point_bytes,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let color_vb = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("color_vb"),
            size: point_bytes,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.geometry = Some(SceneGeometry {
            mesh_vb,
            mesh_ib,
            index_count: layout.mesh_indices.len() as u32,
            vertex_count: layout.mesh_vertex_count,
            position_vb,
            color_vb,
            point_capacity: layout.point_capacity,
        });
        log::info!(
            "[gpu] prepared {} vertices, {} points",
            layout.mesh_vertex_count,
            layout.point_capacity
        );
        Ok(())
    }

    fn draw(&mut self, view: &FrameView<'_>) -> Result<(), RenderError> {
        let Some(geo) = self.geometry.as_ref() else {
            return Err(RenderError::NoSurface);
        };
        if view.mesh_vertices.len() != geo.vertex_count {
            return Err(RenderError::MeshSizeMismatch {
                expected: geo.vertex_count,
                got: view.mesh_vertices.len(),
            });
        }
        let points = view.buffers.point_count();
        if points > geo.point_capacity {
            return Err(RenderError::CapacityExceeded {
                points,
                capacity: geo.point_capacity,
            });
        }

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(e) => {
                if matches!(e, wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) {
                    self.surface.configure(&self.device, &self.config);
                }
                return Err(RenderError::Surface(e.to_string()));
            }
        };
        let target = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let uniforms = Uniforms {
            view_proj: view.view_proj.to_cols_array_2d(),
            camera_right: view.camera_right.extend(POINT_SIZE).to_array(),
            camera_up: view.camera_up.extend(0.0).to_array(),
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        self.queue
            .write_buffer(&geo.mesh_vb, 0, bytemuck::cast_slice(view.mesh_vertices));
        if points > 0 {
            self.queue.write_buffer(
                &geo.position_vb,
                0,
                bytemuck::cast_slice(&view.buffers.positions),
            );
            self.queue
                .write_buffer(&geo.color_vb, 0, bytemuck::cast_slice(&view.buffers.colors));
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("heart_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_bind_group(0, &self.bind_group, &[]);

            rpass.set_pipeline(&self.mesh_pipeline);
            rpass.set_vertex_buffer(0, geo.mesh_vb.slice(..));
            rpass.set_index_buffer(geo.mesh_ib.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..geo.index_count, 0, 0..1);

            if points > 0 {
                rpass.set_pipeline(&self.points_pipeline);
                rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
                rpass.set_vertex_buffer(1, geo.position_vb.slice(..));
                rpass.set_vertex_buffer(2, geo.color_vb.slice(..));
                rpass.draw(0..6, 0..points as u32);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.config.width || height != self.config.height {
            self.config.width = width;
            self.config.height = height;
            self.reconfigure();
        }
    }

    fn release(&mut self) {
        if let Some(geo) = self.geometry.take() {
            geo.mesh_vb.destroy();
            geo.mesh_ib.destroy();
            geo.position_vb.destroy();
            geo.color_vb.destroy();
            log::info!("[gpu] scene buffers released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_block_matches_shader_layout() {
        // mat4x4 + two vec4
        assert_eq!(std::mem::size_of::<Uniforms>(), 64 + 16 + 16);
    }
}
