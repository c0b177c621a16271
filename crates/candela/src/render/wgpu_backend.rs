//! Headless wgpu implementation of [`RenderBackend`].
//!
//! All rendering lands on an offscreen texture. Draws are submitted one
//! encoder at a time with per-draw uniform and bind-group allocation;
//! pipeline reuse across draws comes from the engine's program cache,
//! not from this layer.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ahash::AHashMap;
use tracing::{debug, info};
use wgpu::util::DeviceExt;

use crate::error::PlotError;
use crate::render::backend::{
    BufferId, DrawCall, ProgramDescriptor, ProgramId, RenderBackend, ScissorBox, ScopeDescriptor,
    ScopeId, ScopePush, SurfaceId, UniformValue, Viewport,
};

const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

const BLIT_WGSL: &str = "
struct BlitUniforms {
    source_rect: vec4<f32>,
}

@group(0) @binding(0) var blit_texture: texture_2d<f32>;
@group(0) @binding(1) var blit_sampler: sampler;
@group(0) @binding(2) var<uniform> blit: BlitUniforms;

struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VsOut {
    // Fullscreen triangle; uv y runs bottom-up so the source is read
    // bottom-up like the rest of the pixel-space API.
    let corner = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    var out: VsOut;
    out.position = vec4<f32>(corner * 2.0 - 1.0, 0.0, 1.0);
    let uv = vec2<f32>(corner.x, 1.0 - corner.y);
    out.uv = blit.source_rect.xy + uv * blit.source_rect.zw;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return textureSample(blit_texture, blit_sampler, in.uv);
}
";

pub struct WgpuBackendOptions {
    /// Size of the primary offscreen target in pixels.
    pub width: u32,
    pub height: u32,
    pub backends: wgpu::Backends,
    pub power_preference: wgpu::PowerPreference,
}

impl Default for WgpuBackendOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            backends: wgpu::Backends::from_env().unwrap_or(wgpu::Backends::all()),
            power_preference: wgpu::PowerPreference::default(),
        }
    }
}

struct Target {
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

struct Program {
    pipeline: wgpu::RenderPipeline,
    group0_layout: wgpu::BindGroupLayout,
    group1_layout: Option<wgpu::BindGroupLayout>,
    coord_uniforms: Vec<&'static str>,
}

struct Blit {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

/// Offscreen wgpu backend. Construction blocks on adapter and device
/// acquisition.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    target: RefCell<Target>,
    buffers: RefCell<AHashMap<u64, wgpu::Buffer>>,
    programs: RefCell<AHashMap<u64, Program>>,
    surfaces: RefCell<AHashMap<u64, Target>>,
    stack: RefCell<Vec<ScopePush>>,
    blit: Blit,
    next_id: Cell<u64>,
}

impl WgpuBackend {
    pub fn new(options: WgpuBackendOptions) -> Result<Rc<Self>, String> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: options.backends,
            ..Default::default()
        });
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: options.power_preference,
            force_fallback_adapter: false,
            compatible_surface: None,
        }))
        .map_err(|e| format!("failed to request adapter: {e:?}"))?;
        info!(adapter = %adapter.get_info().name, "acquired adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("candela device"),
            required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
            ..Default::default()
        }))
        .map_err(|e| format!("failed to request device: {e:?}"))?;

        let target = create_target(&device, options.width, options.height);
        let blit = create_blit(&device);

        Ok(Rc::new(Self {
            device,
            queue,
            target: RefCell::new(target),
            buffers: RefCell::new(AHashMap::new()),
            programs: RefCell::new(AHashMap::new()),
            surfaces: RefCell::new(AHashMap::new()),
            stack: RefCell::new(Vec::new()),
            blit,
            next_id: Cell::new(0),
        }))
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    /// Resolve the innermost viewport and scissor, and the coordinate
    /// uniform values named by `names`, from the current scope stack.
    fn resolve_stack(
        &self,
        names: &[&'static str],
    ) -> (Option<Viewport>, Option<ScissorBox>, Vec<f32>) {
        let stack = self.stack.borrow();
        let mut viewport = None;
        let mut scissor = None;
        let mut values: Vec<f32> = Vec::with_capacity(names.len() * 2);
        for name in names {
            let mut found = [0.0f32; 2];
            for push in stack.iter() {
                if let ScopePush::Uniforms { values: pushed, .. } = push
                    && let Some((_, value)) = pushed.iter().find(|(n, _)| n == name)
                    && let UniformValue::Vec2(v) = value
                {
                    found = *v;
                }
            }
            values.extend_from_slice(&found);
        }
        for push in stack.iter() {
            match push {
                ScopePush::Viewport(v) => viewport = Some(*v),
                ScopePush::Scissor(s) => scissor = Some(*s),
                ScopePush::Uniforms { .. } => {}
            }
        }
        (viewport, scissor, values)
    }
}

impl RenderBackend for WgpuBackend {
    fn create_buffer(&self, data: &[f32]) -> BufferId {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: None,
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::VERTEX
                    | wgpu::BufferUsages::COPY_DST,
            });
        let id = self.next_id();
        self.buffers.borrow_mut().insert(id, buffer);
        BufferId(id)
    }

    fn update_buffer(&self, buffer: BufferId, data: &[f32]) {
        let mut buffers = self.buffers.borrow_mut();
        let Some(existing) = buffers.get(&buffer.0) else {
            return;
        };
        let bytes: &[u8] = bytemuck::cast_slice(data);
        if existing.size() == bytes.len() as u64 {
            self.queue.write_buffer(existing, 0, bytes);
        } else {
            let replacement = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: None,
                    contents: bytes,
                    usage: wgpu::BufferUsages::STORAGE
                        | wgpu::BufferUsages::VERTEX
                        | wgpu::BufferUsages::COPY_DST,
                });
            buffers.insert(buffer.0, replacement);
        }
    }

    fn destroy_buffer(&self, buffer: BufferId) {
        if let Some(buffer) = self.buffers.borrow_mut().remove(&buffer.0) {
            buffer.destroy();
        }
    }

    fn compile_program(&self, desc: &ProgramDescriptor) -> Result<ProgramId, PlotError> {
        debug!(label = desc.label, "compiling shader module");
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(desc.label),
                source: wgpu::ShaderSource::Wgsl(desc.source.as_str().into()),
            });

        let group0_layout =
            self.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(desc.label),
                    entries: &[
                        uniform_entry(0),
                        uniform_entry(1),
                    ],
                });
        let group1_layout = (desc.instanced_bindings > 0).then(|| {
            let entries: Vec<wgpu::BindGroupLayoutEntry> = (0..desc.instanced_bindings)
                .map(|i| wgpu::BindGroupLayoutEntry {
                    binding: i as u32,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                })
                .collect();
            self.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(desc.label),
                    entries: &entries,
                })
        });

        let mut group_layouts = vec![&group0_layout];
        if let Some(layout) = &group1_layout {
            group_layouts.push(layout);
        }
        let pipeline_layout =
            self.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some(desc.label),
                    bind_group_layouts: &group_layouts,
                    push_constant_ranges: &[],
                });

        let vertex_format = match desc.vertex_components {
            3 => wgpu::VertexFormat::Float32x3,
            _ => wgpu::VertexFormat::Float32x2,
        };
        let vertex_attributes = [wgpu::VertexAttribute {
            format: vertex_format,
            offset: 0,
            shader_location: 0,
        }];
        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(desc.label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: Some("vs_main"),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: vertex_format.size(),
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &vertex_attributes,
                    }],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: TARGET_FORMAT,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(PlotError::ProgramCompile(error.to_string()));
        }

        let id = self.next_id();
        self.programs.borrow_mut().insert(
            id,
            Program {
                pipeline,
                group0_layout,
                group1_layout,
                coord_uniforms: desc.coord_uniforms.clone(),
            },
        );
        Ok(ProgramId(id))
    }

    fn create_scope(&self, desc: &ScopeDescriptor) -> ScopeId {
        // Uniform values travel with each push; the scope itself only
        // needs an identity.
        let _ = desc;
        ScopeId(self.next_id())
    }

    fn push_scope(&self, push: ScopePush) {
        self.stack.borrow_mut().push(push);
    }

    fn pop_scope(&self) {
        self.stack.borrow_mut().pop();
    }

    fn draw(&self, program: ProgramId, call: &DrawCall) {
        let programs = self.programs.borrow();
        let Some(program) = programs.get(&program.0) else {
            return;
        };
        let (viewport, scissor, coord_values) = self.resolve_stack(&program.coord_uniforms);
        let target = self.target.borrow();
        let viewport = viewport.unwrap_or(Viewport {
            x: 0.0,
            y: 0.0,
            width: target.width as f32,
            height: target.height as f32,
        });

        let steps = call
            .uniforms
            .iter()
            .find_map(|(name, value)| match (name, value) {
                (&"steps", UniformValue::UVec4(v)) => Some(*v),
                _ => None,
            })
            .unwrap_or([0; 4]);

        // FrameUniforms: vec2<f32> resolution at offset 0, vec4<u32>
        // steps at offset 16.
        let mut frame_data = [0u8; 32];
        frame_data[0..8]
            .copy_from_slice(bytemuck::cast_slice(&[viewport.width, viewport.height]));
        frame_data[16..32].copy_from_slice(bytemuck::cast_slice(&steps));

        let coord_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: None,
                contents: bytemuck::cast_slice(&coord_values),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let frame_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: None,
                contents: &frame_data,
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let group0 = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: None,
            layout: &program.group0_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: coord_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: frame_buffer.as_entire_binding(),
                },
            ],
        });

        let buffers = self.buffers.borrow();
        let group1 = program.group1_layout.as_ref().map(|layout| {
            let entries: Vec<wgpu::BindGroupEntry> = call
                .bindings
                .iter()
                .enumerate()
                .filter_map(|(i, binding)| {
                    buffers.get(&binding.buffer.0).map(|buffer| wgpu::BindGroupEntry {
                        binding: i as u32,
                        resource: buffer.as_entire_binding(),
                    })
                })
                .collect();
            self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: None,
                layout,
                entries: &entries,
            })
        });

        let Some(geometry) = buffers.get(&call.geometry.0) else {
            return;
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: None,
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                ..Default::default()
            });
            // Pixel-space rectangles have a bottom-left origin; flip
            // into wgpu's top-left framebuffer convention.
            pass.set_viewport(
                viewport.x,
                target.height as f32 - viewport.y - viewport.height,
                viewport.width,
                viewport.height,
                0.0,
                1.0,
            );
            if let Some(scissor) = scissor {
                let (x, y, w, h) = clamp_scissor(&scissor, target.width, target.height);
                pass.set_scissor_rect(x, y, w, h);
            }
            pass.set_pipeline(&program.pipeline);
            pass.set_bind_group(0, &group0, &[]);
            if let Some(group1) = &group1 {
                pass.set_bind_group(1, group1, &[]);
            }
            pass.set_vertex_buffer(0, geometry.slice(..));
            pass.draw(0..call.vertices, 0..call.instances);
        }
        self.queue.submit([encoder.finish()]);
    }

    fn clear(&self, color: [f32; 4]) {
        let target = self.target.borrow();
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: None,
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: color[0] as f64,
                        g: color[1] as f64,
                        b: color[2] as f64,
                        a: color[3] as f64,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            ..Default::default()
        });
        self.queue.submit([encoder.finish()]);
    }

    fn create_surface(&self, width: u32, height: u32) -> SurfaceId {
        let id = self.next_id();
        self.surfaces
            .borrow_mut()
            .insert(id, create_target(&self.device, width, height));
        SurfaceId(id)
    }

    fn copy_to(
        &self,
        source: Viewport,
        destination: Option<SurfaceId>,
        destination_viewport: Option<Viewport>,
    ) -> SurfaceId {
        let destination_viewport = destination_viewport.unwrap_or(Viewport {
            x: 0.0,
            y: 0.0,
            width: source.width,
            height: source.height,
        });
        let destination = destination.unwrap_or_else(|| {
            self.create_surface(
                (destination_viewport.x + destination_viewport.width) as u32,
                (destination_viewport.y + destination_viewport.height) as u32,
            )
        });

        let target = self.target.borrow();
        // Source rectangle in normalized texture coordinates; the blit
        // shader's v axis already runs bottom-up.
        let rect = [
            source.x / target.width as f32,
            1.0 - (source.y + source.height) / target.height as f32,
            source.width / target.width as f32,
            source.height / target.height as f32,
        ];
        let rect_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: None,
                contents: bytemuck::cast_slice(&rect),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: None,
            layout: &self.blit.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&target.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.blit.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: rect_buffer.as_entire_binding(),
                },
            ],
        });

        let surfaces = self.surfaces.borrow();
        let Some(dest) = surfaces.get(&destination.0) else {
            return destination;
        };
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: None,
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &dest.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                ..Default::default()
            });
            pass.set_viewport(
                destination_viewport.x,
                dest.height as f32 - destination_viewport.y - destination_viewport.height,
                destination_viewport.width,
                destination_viewport.height,
                0.0,
                1.0,
            );
            pass.set_pipeline(&self.blit.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        self.queue.submit([encoder.finish()]);
        destination
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_target(device: &wgpu::Device, width: u32, height: u32) -> Target {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("candela target"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    Target {
        view,
        width: width.max(1),
        height: height.max(1),
    }
}

fn create_blit(device: &wgpu::Device) -> Blit {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("blit"),
        source: wgpu::ShaderSource::Wgsl(BLIT_WGSL.into()),
    });
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("blit sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    });
    let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("blit layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
    });
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("blit pipeline layout"),
        bind_group_layouts: &[&layout],
        push_constant_ranges: &[],
    });
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("blit pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: TARGET_FORMAT,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });
    Blit {
        pipeline,
        layout,
        sampler,
    }
}

fn clamp_scissor(scissor: &ScissorBox, width: u32, height: u32) -> (u32, u32, u32, u32) {
    let x = scissor.x.max(0.0) as u32;
    let flipped_y = height as f32 - scissor.y - scissor.height;
    let y = flipped_y.max(0.0) as u32;
    let w = (scissor.width.max(0.0) as u32).min(width.saturating_sub(x));
    let h = (scissor.height.max(0.0) as u32).min(height.saturating_sub(y));
    (x, y, w, h)
}
