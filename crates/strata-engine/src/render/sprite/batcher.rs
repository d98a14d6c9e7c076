use std::ops::Range;

use anyhow::{bail, Result};
use wgpu::util::DeviceExt;

use crate::coords::{Rect, Viewport};
use crate::paint::Color;
use crate::render::{
    Backend, Canvas, DepthTest, RenderCtx, RenderTarget, ShaderDesc, ShaderId, WriteMask,
};

use super::pipeline::{
    clip_to_ndc_depth, texture_bind_group_layout, viewport_bind_group_layout, PipelineKey,
    SpriteInstance, SpritePipelines, ViewportUniform, QUAD_INDICES, QUAD_VERTICES,
    SHADER_SOURCE,
};
use super::textures::{TextureStore, WHITE_SLOT};

/// One GPU draw call: consecutive instances sharing a texture and pipeline.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(super) struct Batch {
    pub slot: usize,
    pub key: PipelineKey,
    pub start: u32,
    pub count: u32,
}

/// Draws of one frame grouped into draw calls and render passes.
///
/// A draw joins the previous batch only while deferred drawing is held and
/// texture and pipeline match. A depth clear starts a new pass.
#[derive(Debug, Default)]
pub(super) struct BatchList {
    batches: Vec<Batch>,
    /// First batch of each explicit pass, with its depth clear value.
    passes: Vec<(usize, f32)>,
    open: bool,
}

impl BatchList {
    pub(super) fn reset(&mut self) {
        self.batches.clear();
        self.passes.clear();
        self.open = false;
    }

    pub(super) fn push(&mut self, slot: usize, key: PipelineKey, instance: u32, held: bool) {
        if self.open {
            if let Some(last) = self.batches.last_mut() {
                if last.slot == slot && last.key == key && last.start + last.count == instance {
                    last.count += 1;
                    return;
                }
            }
        }

        self.batches.push(Batch { slot, key, start: instance, count: 1 });
        self.open = held;
    }

    /// Ends the open batch.
    #[inline]
    pub(super) fn close(&mut self) {
        self.open = false;
    }

    pub(super) fn clear_depth(&mut self, value: f32) {
        self.open = false;
        let start = self.batches.len();
        match self.passes.last_mut() {
            Some((first, clear)) if *first == start => *clear = value,
            _ => self.passes.push((start, value)),
        }
    }

    #[inline]
    pub(super) fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub(super) fn is_empty(&self) -> bool {
        self.batches.is_empty() && self.passes.is_empty()
    }

    /// Batch ranges per render pass, with the depth clear to apply first.
    pub(super) fn passes(&self) -> Vec<(Range<usize>, Option<f32>)> {
        let mut starts: Vec<(usize, Option<f32>)> =
            self.passes.iter().map(|&(s, v)| (s, Some(v))).collect();
        if starts.first().is_none_or(|&(s, _)| s != 0) {
            starts.insert(0, (0, None));
        }

        let ends = starts
            .iter()
            .skip(1)
            .map(|&(s, _)| s)
            .chain(std::iter::once(self.batches.len()));

        starts
            .iter()
            .zip(ends)
            .map(|(&(start, clear), end)| (start..end, clear))
            .filter(|(range, clear)| !range.is_empty() || clear.is_some())
            .collect()
    }
}

/// Draws recorded since the last [`SpriteBatcher::finish`].
#[derive(Default)]
struct Recording {
    instances: Vec<SpriteInstance>,
    batches: BatchList,
    held: bool,
}

impl Recording {
    fn push(&mut self, slot: usize, key: PipelineKey, instance: SpriteInstance) {
        let index = self.instances.len() as u32;
        self.instances.push(instance);
        self.batches.push(slot, key, index, self.held);
    }

    fn hold(&mut self, hold: bool) {
        if !hold {
            self.batches.close();
        }
        self.held = hold;
    }

    /// Empties the recording, keeping its allocations.
    fn clear(&mut self) {
        self.instances.clear();
        self.batches.reset();
        self.held = false;
    }
}

/// wgpu implementation of the render queue's [`Backend`].
///
/// Draws are recorded during the frame and encoded by [`SpriteBatcher::finish`]
/// into one render pass per depth clear. Coordinates are logical screen
/// pixels; the screen is stretched over the whole render target.
pub struct SpriteBatcher {
    device: wgpu::Device,
    queue: wgpu::Queue,

    module: wgpu::ShaderModule,
    shader_error: Option<String>,
    shaders: Vec<ShaderDesc>,

    screen: Viewport,
    viewport_ubo: wgpu::Buffer,
    viewport_bind_group: wgpu::BindGroup,

    quad_vbo: wgpu::Buffer,
    quad_ibo: wgpu::Buffer,
    instance_vbo: Option<wgpu::Buffer>,
    instance_capacity: usize,

    depth_format: wgpu::TextureFormat,
    depth_view: Option<wgpu::TextureView>,
    depth_size: (u32, u32),

    textures: TextureStore,
    pipelines: SpritePipelines,

    // Per-frame state.
    recording: Recording,
    shader: Option<ShaderId>,
    depth_test: DepthTest,
    write_mask: WriteMask,
    depth_offset: Option<f32>,

    last_draw_calls: usize,
    warned_missing_image: bool,
}

impl SpriteBatcher {
    /// Creates the batcher for a logical screen of `screen` pixels.
    pub fn new(ctx: &RenderCtx<'_>, screen: Viewport, depth_format: wgpu::TextureFormat) -> Self {
        let device = ctx.device.clone();
        let queue = ctx.queue.clone();

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("strata sprite shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SOURCE.into()),
        });
        let shader_error = compilation_error(&module);
        if let Some(err) = &shader_error {
            log::error!("sprite shader failed to compile: {err}");
        }

        let viewport_bgl = viewport_bind_group_layout(&device);
        let texture_bgl = texture_bind_group_layout(&device);
        let pipelines = SpritePipelines::new(
            &device,
            &viewport_bgl,
            &texture_bgl,
            ctx.surface_format,
            depth_format,
        );
        let textures = TextureStore::new(&device, &queue, texture_bgl);

        let viewport_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("strata sprite viewport ubo"),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let viewport_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("strata sprite viewport bind group"),
            layout: &viewport_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_ubo.as_entire_binding(),
            }],
        });

        let quad_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("strata sprite quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let quad_ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("strata sprite quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            device,
            queue,
            module,
            shader_error,
            shaders: Vec::new(),
            screen,
            viewport_ubo,
            viewport_bind_group,
            quad_vbo,
            quad_ibo,
            instance_vbo: None,
            instance_capacity: 0,
            depth_format,
            depth_view: None,
            depth_size: (0, 0),
            textures,
            pipelines,
            recording: Recording::default(),
            shader: None,
            depth_test: DepthTest::Disabled,
            write_mask: WriteMask::ColorAndDepth,
            depth_offset: None,
            last_draw_calls: 0,
            warned_missing_image: false,
        }
    }

    /// Registers straight-alpha RGBA8 pixels under `path`.
    pub fn register_image(&mut self, path: &str, width: u32, height: u32, rgba: &[u8]) -> Result<()> {
        self.textures
            .insert(&self.device, &self.queue, path, width, height, rgba)
            .map(|_| ())
    }

    pub fn image_count(&self) -> usize {
        self.textures.len()
    }

    pub fn set_screen_size(&mut self, screen: Viewport) {
        self.screen = screen;
    }

    /// GPU draw calls issued by the last [`SpriteBatcher::finish`].
    pub fn last_draw_calls(&self) -> usize {
        self.last_draw_calls
    }

    /// Encodes everything recorded since the last call into `target`.
    ///
    /// Returns the number of draw calls issued.
    pub fn finish(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) -> usize {
        let mut recording = std::mem::take(&mut self.recording);
        if recording.held {
            log::debug!("deferred drawing still held at finish; closing batch");
            recording.hold(false);
        }

        let draw_calls = if recording.batches.is_empty() {
            0
        } else {
            self.encode(&recording, ctx, target)
        };

        recording.clear();
        self.recording = recording;
        self.reset_state();
        self.last_draw_calls = draw_calls;
        draw_calls
    }

    fn encode(
        &mut self,
        recording: &Recording,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
    ) -> usize {
        self.ensure_depth_target(target.size);
        self.ensure_instance_capacity(recording.instances.len());
        for batch in recording.batches.batches() {
            self.pipelines.ensure(&self.device, &self.module, batch.key);
        }

        let uniform = ViewportUniform {
            size: [self.screen.width.max(1.0), self.screen.height.max(1.0)],
            _pad: [0.0; 2],
        };
        ctx.queue.write_buffer(&self.viewport_ubo, 0, bytemuck::bytes_of(&uniform));

        let Some(instance_vbo) = self.instance_vbo.as_ref() else { return 0 };
        let Some(depth_view) = self.depth_view.as_ref() else { return 0 };
        if !recording.instances.is_empty() {
            ctx.queue.write_buffer(instance_vbo, 0, bytemuck::cast_slice(&recording.instances));
        }

        let batches = recording.batches.batches();
        let mut draw_calls = 0;

        for (range, clear) in recording.batches.passes() {
            let depth_load = match clear {
                Some(value) => wgpu::LoadOp::Clear(value),
                None => wgpu::LoadOp::Load,
            };

            let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("strata sprite pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_bind_group(0, &self.viewport_bind_group, &[]);
            rpass.set_vertex_buffer(0, self.quad_vbo.slice(..));
            rpass.set_vertex_buffer(1, instance_vbo.slice(..));
            rpass.set_index_buffer(self.quad_ibo.slice(..), wgpu::IndexFormat::Uint16);

            for batch in &batches[range] {
                let Some(pipeline) = self.pipelines.get(batch.key) else { continue };
                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(1, &self.textures.get(batch.slot).bind_group, &[]);
                rpass.draw_indexed(0..6, 0, batch.start..batch.start + batch.count);
                draw_calls += 1;
            }
        }

        log::trace!(
            "sprite batcher: {} instances in {} draw calls",
            recording.instances.len(),
            draw_calls
        );

        draw_calls
    }

    fn reset_state(&mut self) {
        self.shader = None;
        self.depth_test = DepthTest::Disabled;
        self.write_mask = WriteMask::ColorAndDepth;
        self.depth_offset = None;
    }

    fn alpha_test(&self) -> bool {
        self.shader
            .and_then(|id| self.shaders.get(id.0 as usize))
            .is_some_and(|desc| desc.alpha_test)
    }

    fn push(&mut self, slot: usize, instance: SpriteInstance) {
        let key = PipelineKey::from_state(self.depth_test, self.write_mask, self.alpha_test());
        self.recording.push(slot, key, instance);
    }

    fn ensure_depth_target(&mut self, size: (u32, u32)) {
        let size = (size.0.max(1), size.1.max(1));
        if self.depth_view.is_some() && self.depth_size == size {
            return;
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("strata sprite depth"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.depth_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        self.depth_view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.depth_size = size;
    }

    fn ensure_instance_capacity(&mut self, required: usize) {
        if required <= self.instance_capacity && self.instance_vbo.is_some() {
            return;
        }

        let new_cap = required.next_power_of_two().max(256);
        self.instance_vbo = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("strata sprite instance vbo"),
            size: (new_cap * std::mem::size_of::<SpriteInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.instance_capacity = new_cap;
    }
}

fn compilation_error(module: &wgpu::ShaderModule) -> Option<String> {
    let info = pollster::block_on(module.get_compilation_info());
    let errors: Vec<&str> = info
        .messages
        .iter()
        .filter(|m| matches!(m.message_type, wgpu::CompilationMessageType::Error))
        .map(|m| m.message.as_str())
        .collect();

    if errors.is_empty() { None } else { Some(errors.join("; ")) }
}

impl Canvas for SpriteBatcher {
    fn screen_size(&self) -> Viewport {
        self.screen
    }

    fn draw_image(&mut self, image: &str, src: Rect, dst: Rect, tint: Color) {
        let Some(slot) = self.textures.slot(image) else {
            if !self.warned_missing_image {
                log::warn!("image {image} is not registered; draw skipped");
                self.warned_missing_image = true;
            }
            return;
        };

        let dst = dst.normalized();
        if dst.is_empty() {
            return;
        }

        let uv = src.to_uv(self.textures.get(slot).extent);
        let depth = clip_to_ndc_depth(self.depth_offset);
        self.push(
            slot,
            SpriteInstance {
                origin: [dst.origin.x, dst.origin.y],
                size: [dst.size.x, dst.size.y],
                uv_origin: [uv.origin.x, uv.origin.y],
                uv_size: [uv.size.x, uv.size.y],
                tint: tint.to_array(),
                depth,
            },
        );
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let rect = rect.normalized();
        if rect.is_empty() {
            return;
        }

        let depth = clip_to_ndc_depth(self.depth_offset);
        self.push(
            WHITE_SLOT,
            SpriteInstance {
                origin: [rect.origin.x, rect.origin.y],
                size: [rect.size.x, rect.size.y],
                uv_origin: [0.0, 0.0],
                uv_size: [1.0, 1.0],
                tint: color.to_array(),
                depth,
            },
        );
    }
}

impl Backend for SpriteBatcher {
    fn hold_drawing(&mut self, hold: bool) {
        self.recording.hold(hold);
    }

    fn is_drawing_held(&self) -> bool {
        self.recording.held
    }

    fn create_shader(&mut self, desc: ShaderDesc) -> Result<ShaderId> {
        if let Some(err) = &self.shader_error {
            bail!("sprite shader failed to compile: {err}");
        }

        let id = ShaderId(self.shaders.len() as u32);
        self.shaders.push(desc);
        log::debug!("sprite shader {id:?} created: {desc:?}");
        Ok(id)
    }

    fn use_shader(&mut self, shader: Option<ShaderId>) {
        self.shader = shader;
    }

    fn set_depth_test(&mut self, test: DepthTest) {
        self.depth_test = test;
    }

    fn set_write_mask(&mut self, mask: WriteMask) {
        self.write_mask = mask;
    }

    fn clear_depth(&mut self, value: f32) {
        self.recording.batches.clear_depth(value);
    }

    fn set_depth_offset(&mut self, z: Option<f32>) {
        self.depth_offset = z;
    }
}
