//! GPU-side types shared by the sprite batcher: vertex layouts, bind group
//! layouts and the pipeline variants selected by depth state.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};

use crate::render::{DepthTest, WriteMask};

pub(super) const SHADER_SOURCE: &str = include_str!("../shaders/sprite.wgsl");

// ── blend ─────────────────────────────────────────────────────────────────

fn premul_alpha_blend() -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState { color: component, alpha: component }
}

// ── uniforms and vertices ─────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct ViewportUniform {
    pub size: [f32; 2],
    pub _pad: [f32; 2], // 16-byte alignment
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct QuadVertex {
    pub corner: [f32; 2], // 0..1
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

pub(super) const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { corner: [0.0, 0.0] },
    QuadVertex { corner: [1.0, 0.0] },
    QuadVertex { corner: [1.0, 1.0] },
    QuadVertex { corner: [0.0, 1.0] },
];

pub(super) const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// One textured quad.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(super) struct SpriteInstance {
    pub origin: [f32; 2],
    pub size: [f32; 2],
    pub uv_origin: [f32; 2],
    pub uv_size: [f32; 2],
    pub tint: [f32; 4], // premultiplied
    pub depth: f32,     // NDC, 0 nearest
}

impl SpriteInstance {
    const ATTRS: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        1 => Float32x2, // origin
        2 => Float32x2, // size
        3 => Float32x2, // uv_origin
        4 => Float32x2, // uv_size
        5 => Float32x4, // tint
        6 => Float32    // depth
    ];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

/// Maps a clip-space depth offset (`-1` nearest) to wgpu's `[0, 1]` range.
#[inline]
pub(super) fn clip_to_ndc_depth(offset: Option<f32>) -> f32 {
    offset.map_or(0.0, |z| (z.clamp(-1.0, 1.0) * 0.5) + 0.5)
}

// ── pipeline keys ─────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(super) enum DepthMode {
    /// Depth ignored.
    Off,
    /// Test and write.
    Write,
    /// Test only.
    Test,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(super) struct PipelineKey {
    pub depth: DepthMode,
    pub alpha_test: bool,
}

impl PipelineKey {
    pub(super) fn from_state(test: DepthTest, mask: WriteMask, alpha_test: bool) -> Self {
        let depth = match (test, mask) {
            (DepthTest::Disabled, _) => DepthMode::Off,
            (DepthTest::LessEqual, WriteMask::ColorAndDepth) => DepthMode::Write,
            (DepthTest::LessEqual, WriteMask::Color) => DepthMode::Test,
        };
        Self { depth, alpha_test }
    }

    fn depth_stencil(self, format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
        let (depth_write_enabled, depth_compare) = match self.depth {
            DepthMode::Off => (false, wgpu::CompareFunction::Always),
            DepthMode::Write => (true, wgpu::CompareFunction::LessEqual),
            DepthMode::Test => (false, wgpu::CompareFunction::LessEqual),
        };

        wgpu::DepthStencilState {
            format,
            depth_write_enabled,
            depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }

    fn fragment_entry(self) -> &'static str {
        if self.alpha_test { "fs_alpha_test" } else { "fs_main" }
    }
}

// ── layouts ───────────────────────────────────────────────────────────────

pub(super) fn viewport_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("strata sprite viewport bgl"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(
                    std::mem::size_of::<ViewportUniform>() as u64,
                ),
            },
            count: None,
        }],
    })
}

pub(super) fn texture_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("strata sprite texture bgl"),
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
    })
}

// ── pipelines ─────────────────────────────────────────────────────────────

/// Lazily built pipeline variants.
pub(super) struct SpritePipelines {
    layout: wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    depth_format: wgpu::TextureFormat,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl SpritePipelines {
    pub(super) fn new(
        device: &wgpu::Device,
        viewport_bgl: &wgpu::BindGroupLayout,
        texture_bgl: &wgpu::BindGroupLayout,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("strata sprite pipeline layout"),
            bind_group_layouts: &[viewport_bgl, texture_bgl],
            immediate_size: 0,
        });

        Self {
            layout,
            color_format,
            depth_format,
            pipelines: HashMap::new(),
        }
    }

    pub(super) fn ensure(&mut self, device: &wgpu::Device, module: &wgpu::ShaderModule, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }

        log::debug!("building sprite pipeline {key:?}");

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("strata sprite pipeline"),
            layout: Some(&self.layout),

            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout(), SpriteInstance::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some(key.fragment_entry()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.color_format,
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(key.depth_stencil(self.depth_format)),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        self.pipelines.insert(key, pipeline);
    }

    pub(super) fn get(&self, key: PipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(&key)
    }
}
