//! Renderer initialization and GPU resource construction.
//!
//! This module owns `WgpuRenderContext::new` and the helpers that allocate
//! pipelines, bind groups, and the quad instance buffer.

use render_protocol::Rgba8;

use crate::{
    DrawList, FrameState, GpuState, INITIAL_QUAD_INSTANCE_CAPACITY, QuadInstanceGpu,
    RendererCreateError, ViewUniformGpu, WgpuRenderContext,
};

impl WgpuRenderContext {
    /// Creates a surface for `target`, then requests an adapter and device
    /// that can present to it.
    pub async fn for_target(
        instance: &wgpu::Instance,
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<Self, RendererCreateError> {
        let surface = instance.create_surface(target)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let limits = adapter.limits();
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("renderer.device"),
                required_features: wgpu::Features::empty(),
                required_limits: limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await?;

        let caps = surface.get_capabilities(&adapter);
        // Tile texels are written as raw bytes, so prefer a linear surface.
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|format| !format.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(RendererCreateError::UnsupportedSurface)?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        Ok(Self::new(device, queue, surface, surface_config))
    }

    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface: wgpu::Surface<'static>,
        surface_config: wgpu::SurfaceConfiguration,
    ) -> Self {
        surface.configure(&device, &surface_config);

        let view_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("renderer.view_uniform"),
            size: std::mem::size_of::<ViewUniformGpu>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let per_frame_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("renderer.per_frame_layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: true },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("renderer.tile_texture_layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let tile_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("renderer.tile_sampler.nearest"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("renderer.tile_quad"),
            source: wgpu::ShaderSource::Wgsl(include_str!("tile_quad.wgsl").into()),
        });

        let solid_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("renderer.solid_layout"),
            bind_group_layouts: &[&per_frame_bind_group_layout],
            immediate_size: 0,
        });
        let textured_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("renderer.textured_layout"),
                bind_group_layouts: &[&per_frame_bind_group_layout, &texture_bind_group_layout],
                immediate_size: 0,
            });
        let solid_pipeline = create_quad_pipeline(
            &device,
            &solid_pipeline_layout,
            &shader,
            surface_config.format,
            "fs_solid",
            "renderer.quad_pipeline.solid",
        );
        let textured_pipeline = create_quad_pipeline(
            &device,
            &textured_pipeline_layout,
            &shader,
            surface_config.format,
            "fs_textured",
            "renderer.quad_pipeline.textured",
        );

        let quad_instance_buffer =
            Self::create_quad_instance_buffer(&device, INITIAL_QUAD_INSTANCE_CAPACITY);
        let per_frame_bind_group = Self::create_per_frame_bind_group(
            &device,
            &per_frame_bind_group_layout,
            &view_uniform_buffer,
            &quad_instance_buffer,
        );

        Self {
            gpu_state: GpuState {
                device,
                queue,
                surface,
                surface_config,
                view_uniform_buffer,
                per_frame_bind_group_layout,
                per_frame_bind_group,
                texture_bind_group_layout,
                tile_sampler,
                solid_pipeline,
                textured_pipeline,
                quad_instance_buffer,
                quad_instance_capacity: INITIAL_QUAD_INSTANCE_CAPACITY,
            },
            frame_state: FrameState {
                draw_color: Rgba8::WHITE,
                clear_color: Rgba8::BLACK,
                draw_list: DrawList::default(),
            },
        }
    }

    pub(super) fn create_quad_instance_buffer(
        device: &wgpu::Device,
        capacity: usize,
    ) -> wgpu::Buffer {
        let instance_size = std::mem::size_of::<QuadInstanceGpu>() as u64;
        let capacity_u64 = u64::try_from(capacity).expect("quad instance capacity exceeds u64");
        let size = capacity_u64
            .checked_mul(instance_size)
            .expect("quad instance buffer size overflow");
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("renderer.quad_instances"),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    pub(super) fn create_per_frame_bind_group(
        device: &wgpu::Device,
        per_frame_bind_group_layout: &wgpu::BindGroupLayout,
        view_uniform_buffer: &wgpu::Buffer,
        quad_instance_buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("renderer.per_frame_bind_group"),
            layout: per_frame_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: view_uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: quad_instance_buffer.as_entire_binding(),
                },
            ],
        })
    }

    pub(super) fn ensure_quad_instance_capacity(&mut self, required_len: usize) {
        if required_len <= self.gpu_state.quad_instance_capacity {
            return;
        }

        let required_capacity = required_len.max(INITIAL_QUAD_INSTANCE_CAPACITY);
        let expanded_capacity = required_capacity
            .checked_next_power_of_two()
            .expect("quad instance capacity overflow");
        self.gpu_state.quad_instance_buffer =
            Self::create_quad_instance_buffer(&self.gpu_state.device, expanded_capacity);
        self.gpu_state.per_frame_bind_group = Self::create_per_frame_bind_group(
            &self.gpu_state.device,
            &self.gpu_state.per_frame_bind_group_layout,
            &self.gpu_state.view_uniform_buffer,
            &self.gpu_state.quad_instance_buffer,
        );
        self.gpu_state.quad_instance_capacity = expanded_capacity;
    }
}

fn create_quad_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    fragment_entry: &str,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}
