use render_protocol::{BYTES_PER_PIXEL, TextureLock, TextureLockError};

pub const TILE_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Row pitch of a staging buffer, padded to the copy row alignment.
pub fn padded_pitch(width: u32) -> usize {
    let unpadded = width as usize * BYTES_PER_PIXEL;
    unpadded.next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize)
}

/// Streaming tile texture. Locks hand out the CPU staging buffer; unlocking
/// uploads it with `Queue::write_texture`.
#[derive(Debug)]
pub struct GpuTileTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    staging: Vec<u8>,
    pitch: usize,
    width: u32,
    height: u32,
    locked: bool,
}

impl GpuTileTexture {
    pub(crate) fn new(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        width: u32,
        height: u32,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("renderer.tile_texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TILE_TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("renderer.tile_texture.bind_group"),
            layout: bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });
        let pitch = padded_pitch(width);
        Self {
            texture,
            bind_group,
            staging: vec![0; pitch * height as usize],
            pitch,
            width,
            height,
            locked: false,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pitch(&self) -> usize {
        self.pitch
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub(crate) fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub(crate) fn lock(&mut self) -> Result<TextureLock<'_>, TextureLockError> {
        if self.locked {
            return Err(TextureLockError::AlreadyLocked);
        }
        self.locked = true;
        Ok(TextureLock::new(&mut self.staging, self.pitch))
    }

    pub(crate) fn unlock(&mut self, queue: &wgpu::Queue) {
        assert!(self.locked, "tile texture unlocked without a matching lock");
        self.locked = false;
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &self.staging,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.pitch as u32),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }

    pub(crate) fn destroy(self) {
        assert!(!self.locked, "tile texture destroyed while locked");
        self.texture.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_is_padded_to_copy_alignment() {
        assert_eq!(padded_pitch(1), 256);
        assert_eq!(padded_pitch(64), 256);
        assert_eq!(padded_pitch(65), 512);
        assert_eq!(padded_pitch(256), 1024);
    }
}
