use std::collections::HashMap;

use anyhow::{ensure, Result};

use crate::coords::Vec2;

/// A registered image, ready to bind.
pub(super) struct SpriteTexture {
    _texture: wgpu::Texture,
    pub bind_group: wgpu::BindGroup,
    /// Size in pixels.
    pub extent: Vec2,
}

/// Slot of the 1x1 white texture used by solid fills.
pub(super) const WHITE_SLOT: usize = 0;

/// Images addressed by path.
///
/// Slots are stable: re-registering a path replaces its texture in place.
pub(super) struct TextureStore {
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    slots: HashMap<String, usize>,
    textures: Vec<SpriteTexture>,
}

impl TextureStore {
    pub(super) fn new(device: &wgpu::Device, queue: &wgpu::Queue, layout: wgpu::BindGroupLayout) -> Self {
        // Pixel art: no filtering.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("strata sprite sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let mut store = Self {
            layout,
            sampler,
            slots: HashMap::new(),
            textures: Vec::new(),
        };

        let white = store.upload(device, queue, "strata white", 1, 1, &[255; 4]);
        store.textures.push(white);
        store
    }

    /// Registers straight-alpha RGBA8 pixels under `path`.
    pub(super) fn insert(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<usize> {
        ensure!(width > 0 && height > 0, "image {path} has zero size");
        ensure!(
            rgba.len() == width as usize * height as usize * 4,
            "image {path}: expected {} bytes of RGBA, got {}",
            width as usize * height as usize * 4,
            rgba.len()
        );

        let texture = self.upload(device, queue, path, width, height, rgba);

        let slot = match self.slots.get(path) {
            Some(&slot) => {
                self.textures[slot] = texture;
                slot
            }
            None => {
                let slot = self.textures.len();
                self.textures.push(texture);
                self.slots.insert(path.to_owned(), slot);
                slot
            }
        };

        log::debug!("registered image {path} ({width}x{height}) in slot {slot}");
        Ok(slot)
    }

    #[inline]
    pub(super) fn slot(&self, path: &str) -> Option<usize> {
        self.slots.get(path).copied()
    }

    #[inline]
    pub(super) fn get(&self, slot: usize) -> &SpriteTexture {
        &self.textures[slot]
    }

    /// Number of registered images, not counting the white texture.
    pub(super) fn len(&self) -> usize {
        self.textures.len() - 1
    }

    fn upload(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> SpriteTexture {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        SpriteTexture {
            _texture: texture,
            bind_group,
            extent: Vec2::new(width as f32, height as f32),
        }
    }
}
