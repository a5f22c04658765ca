//! Contract between the pixel display and whatever draws it to the screen.
//!
//! A render context hands out tile-sized streaming textures, lets the caller
//! write them through a pitched lock, and draws flat rectangles and texture
//! copies in top-down screen space.

pub use model::{Rgba8, ScreenRect};

#[cfg(feature = "test-helpers")]
pub mod software;

pub const BYTES_PER_PIXEL: usize = 4;

/// Writable view of a locked texture. Rows are top-down and `pitch` bytes
/// apart; only the first `width * 4` bytes of each row are texels.
#[derive(Debug)]
pub struct TextureLock<'a> {
    pixels: &'a mut [u8],
    pitch: usize,
}

impl<'a> TextureLock<'a> {
    pub fn new(pixels: &'a mut [u8], pitch: usize) -> Self {
        assert!(pitch > 0, "texture lock pitch must be positive");
        Self { pixels, pitch }
    }

    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// Row `row` of the locked region, `pitch` bytes long (shorter for the last row
    /// when the backing buffer is not padded after it).
    pub fn row_mut(&mut self, row: usize) -> &mut [u8] {
        let start = row * self.pitch;
        let end = (start + self.pitch).min(self.pixels.len());
        &mut self.pixels[start..end]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextureCreateError {
    #[error("texture size must be positive, got {width}x{height}")]
    ZeroSize { width: u32, height: u32 },
    #[error("texture size {width}x{height} exceeds the device limit of {max}")]
    ExceedsLimit { width: u32, height: u32, max: u32 },
    #[error("render context cannot create textures: {0}")]
    ContextUnavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextureLockError {
    #[error("texture is already locked")]
    AlreadyLocked,
    #[error("texture cannot be locked: {0}")]
    Unavailable(String),
}

/// Drawing backend consumed by the pixel display.
///
/// Textures are owned by the caller and passed back in for every operation.
/// A texture must be unlocked before it is copied or destroyed.
pub trait RenderContext {
    type Texture;

    /// Size of the drawable area in pixels.
    fn drawable_size(&self) -> (u32, u32);

    /// Creates an RGBA8 texture whose contents are replaced through
    /// [`RenderContext::lock_texture`].
    fn create_streaming_texture(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<Self::Texture, TextureCreateError>;

    fn lock_texture<'t>(
        &mut self,
        texture: &'t mut Self::Texture,
    ) -> Result<TextureLock<'t>, TextureLockError>;

    /// Publishes everything written since the matching lock.
    fn unlock_texture(&mut self, texture: &mut Self::Texture);

    fn destroy_texture(&mut self, texture: Self::Texture);

    fn set_draw_color(&mut self, color: Rgba8);

    /// Fills `rect` with the current draw color, blending by its alpha.
    fn fill_rect(&mut self, rect: ScreenRect);

    /// Draws the whole texture into `rect`, blending by texel alpha.
    fn copy_texture(&mut self, texture: &Self::Texture, rect: ScreenRect);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_pitch_apart() {
        let mut bytes = vec![0u8; 3 * 12];
        let mut lock = TextureLock::new(&mut bytes, 12);
        assert_eq!(lock.pitch(), 12);
        lock.row_mut(1)[0] = 7;
        lock.row_mut(2)[11] = 9;
        assert_eq!(lock.row_mut(2).len(), 12);
        assert_eq!(bytes[12], 7);
        assert_eq!(bytes[35], 9);
    }

    #[test]
    fn trailing_row_may_be_unpadded() {
        let mut bytes = vec![0u8; 12 + 8];
        let mut lock = TextureLock::new(&mut bytes, 12);
        assert_eq!(lock.row_mut(1).len(), 8);
        assert_eq!(lock.row_mut(0).len(), 12);
    }
}
