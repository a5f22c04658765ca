//! CPU reference render context used by tests.
//!
//! Textures are double-buffered: a lock exposes the staging bytes and the
//! unlock publishes them, mirroring a staged GPU upload. Draw calls composite
//! source-over onto a top-down RGBA framebuffer and are also recorded as
//! [`RenderCommand`]s.

use crate::{
    BYTES_PER_PIXEL, RenderContext, Rgba8, ScreenRect, TextureCreateError, TextureLock,
    TextureLockError,
};

/// Extra bytes after every texture row, so callers that ignore the pitch fail.
pub const PITCH_PADDING: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderCommand {
    SetDrawColor(Rgba8),
    FillRect(ScreenRect),
    CopyTexture { texture: TextureId, rect: ScreenRect },
}

#[derive(Debug)]
pub struct SoftwareTexture {
    id: TextureId,
    width: u32,
    height: u32,
    pitch: usize,
    staging: Vec<u8>,
    contents: Vec<u8>,
    locked: bool,
}

impl SoftwareTexture {
    pub fn id(&self) -> TextureId {
        self.id
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

    /// Published texel bytes, `pitch` bytes per top-down row.
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    /// Published texel at `(x, y)`, top-down.
    pub fn texel(&self, x: u32, y: u32) -> Rgba8 {
        let start = y as usize * self.pitch + x as usize * BYTES_PER_PIXEL;
        let bytes = &self.contents[start..start + BYTES_PER_PIXEL];
        Rgba8::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }
}

#[derive(Debug)]
pub struct SoftwareRenderContext {
    width: u32,
    height: u32,
    max_texture_size: u32,
    texture_budget: Option<usize>,
    frame: Vec<Rgba8>,
    draw_color: Rgba8,
    commands: Vec<RenderCommand>,
    next_texture_id: u64,
    live_textures: usize,
    upload_count: usize,
    failing_locks: usize,
}

impl SoftwareRenderContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            max_texture_size: 8192,
            texture_budget: None,
            frame: vec![Rgba8::CLEAR; width as usize * height as usize],
            draw_color: Rgba8::WHITE,
            commands: Vec::new(),
            next_texture_id: 0,
            live_textures: 0,
            upload_count: 0,
            failing_locks: 0,
        }
    }

    pub fn with_max_texture_size(mut self, max_texture_size: u32) -> Self {
        self.max_texture_size = max_texture_size;
        self
    }

    /// Fails texture creation once `budget` textures are live.
    pub fn with_texture_budget(mut self, budget: usize) -> Self {
        self.texture_budget = Some(budget);
        self
    }

    /// Clears the framebuffer to transparent black and forgets recorded commands.
    pub fn begin_frame(&mut self) {
        self.frame.fill(Rgba8::CLEAR);
        self.commands.clear();
    }

    /// Makes the next `count` lock attempts fail with [`TextureLockError::Unavailable`].
    pub fn fail_next_locks(&mut self, count: usize) {
        self.failing_locks = count;
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Framebuffer pixel at `(x, y)`, top-down.
    pub fn frame_pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.frame[y as usize * self.width as usize + x as usize])
    }

    pub fn live_texture_count(&self) -> usize {
        self.live_textures
    }

    pub fn upload_count(&self) -> usize {
        self.upload_count
    }

    fn blend_rect(&mut self, rect: ScreenRect, mut source: impl FnMut(u32, u32) -> Rgba8) {
        let x0 = rect.x.max(0) as i64;
        let y0 = rect.y.max(0) as i64;
        let x1 = (i64::from(rect.x) + i64::from(rect.width)).min(i64::from(self.width));
        let y1 = (i64::from(rect.y) + i64::from(rect.height)).min(i64::from(self.height));
        for y in y0..y1 {
            for x in x0..x1 {
                let src = source((x - i64::from(rect.x)) as u32, (y - i64::from(rect.y)) as u32);
                let dst = &mut self.frame[y as usize * self.width as usize + x as usize];
                *dst = blend_over(src, *dst);
            }
        }
    }
}

fn blend_over(src: Rgba8, dst: Rgba8) -> Rgba8 {
    let alpha = u32::from(src.a);
    let inverse = 255 - alpha;
    let mix = |s: u8, d: u8| ((u32::from(s) * alpha + u32::from(d) * inverse + 127) / 255) as u8;
    Rgba8::new(
        mix(src.r, dst.r),
        mix(src.g, dst.g),
        mix(src.b, dst.b),
        (alpha + (u32::from(dst.a) * inverse + 127) / 255) as u8,
    )
}

impl RenderContext for SoftwareRenderContext {
    type Texture = SoftwareTexture;

    fn drawable_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn create_streaming_texture(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<SoftwareTexture, TextureCreateError> {
        if width == 0 || height == 0 {
            return Err(TextureCreateError::ZeroSize { width, height });
        }
        if width > self.max_texture_size || height > self.max_texture_size {
            return Err(TextureCreateError::ExceedsLimit {
                width,
                height,
                max: self.max_texture_size,
            });
        }
        if self
            .texture_budget
            .is_some_and(|budget| self.live_textures >= budget)
        {
            return Err(TextureCreateError::ContextUnavailable(format!(
                "texture budget of {} exhausted",
                self.live_textures
            )));
        }
        let pitch = width as usize * BYTES_PER_PIXEL + PITCH_PADDING;
        let id = TextureId(self.next_texture_id);
        self.next_texture_id += 1;
        self.live_textures += 1;
        Ok(SoftwareTexture {
            id,
            width,
            height,
            pitch,
            staging: vec![0; pitch * height as usize],
            contents: vec![0; pitch * height as usize],
            locked: false,
        })
    }

    fn lock_texture<'t>(
        &mut self,
        texture: &'t mut SoftwareTexture,
    ) -> Result<TextureLock<'t>, TextureLockError> {
        if self.failing_locks > 0 {
            self.failing_locks -= 1;
            return Err(TextureLockError::Unavailable(format!(
                "injected lock failure for texture {}",
                texture.id.0
            )));
        }
        if texture.locked {
            return Err(TextureLockError::AlreadyLocked);
        }
        texture.locked = true;
        Ok(TextureLock::new(&mut texture.staging, texture.pitch))
    }

    fn unlock_texture(&mut self, texture: &mut SoftwareTexture) {
        assert!(texture.locked, "texture {} is not locked", texture.id.0);
        texture.locked = false;
        texture.contents.copy_from_slice(&texture.staging);
        self.upload_count += 1;
    }

    fn destroy_texture(&mut self, texture: SoftwareTexture) {
        assert!(!texture.locked, "texture {} destroyed while locked", texture.id.0);
        self.live_textures -= 1;
    }

    fn set_draw_color(&mut self, color: Rgba8) {
        self.draw_color = color;
        self.commands.push(RenderCommand::SetDrawColor(color));
    }

    fn fill_rect(&mut self, rect: ScreenRect) {
        self.commands.push(RenderCommand::FillRect(rect));
        let color = self.draw_color;
        self.blend_rect(rect, |_, _| color);
    }

    fn copy_texture(&mut self, texture: &SoftwareTexture, rect: ScreenRect) {
        assert!(!texture.locked, "texture {} copied while locked", texture.id.0);
        self.commands.push(RenderCommand::CopyTexture {
            texture: texture.id,
            rect,
        });
        // Stretch to the destination with nearest sampling.
        let (tex_w, tex_h) = (u64::from(texture.width), u64::from(texture.height));
        let (dst_w, dst_h) = (u64::from(rect.width.max(1)), u64::from(rect.height.max(1)));
        self.blend_rect(rect, |x, y| {
            let tx = (u64::from(x) * tex_w / dst_w) as u32;
            let ty = (u64::from(y) * tex_h / dst_h) as u32;
            texture.texel(tx, ty)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba8 = Rgba8::opaque(255, 0, 0);

    fn rect(x: i32, y: i32, width: u32, height: u32) -> ScreenRect {
        ScreenRect {
            x,
            y,
            width,
            height,
        }
    }

    #[test]
    fn textures_are_padded_and_counted() {
        let mut ctx = SoftwareRenderContext::new(8, 8);
        let texture = ctx.create_streaming_texture(4, 2).expect("create texture");
        assert_eq!(texture.pitch(), 4 * 4 + PITCH_PADDING);
        assert_eq!(ctx.live_texture_count(), 1);
        ctx.destroy_texture(texture);
        assert_eq!(ctx.live_texture_count(), 0);
    }

    #[test]
    fn rejects_degenerate_and_oversized_textures() {
        let mut ctx = SoftwareRenderContext::new(8, 8).with_max_texture_size(16);
        assert_eq!(
            ctx.create_streaming_texture(0, 4).map(|_| ()),
            Err(TextureCreateError::ZeroSize {
                width: 0,
                height: 4
            })
        );
        assert!(matches!(
            ctx.create_streaming_texture(32, 4),
            Err(TextureCreateError::ExceedsLimit { max: 16, .. })
        ));
        assert_eq!(ctx.live_texture_count(), 0);
    }

    #[test]
    fn writes_publish_on_unlock() {
        let mut ctx = SoftwareRenderContext::new(8, 8);
        let mut texture = ctx.create_streaming_texture(2, 2).expect("create texture");
        {
            let mut lock = ctx.lock_texture(&mut texture).expect("lock texture");
            lock.row_mut(1)[4..8].copy_from_slice(&[1, 2, 3, 4]);
        }
        assert_eq!(texture.texel(1, 1), Rgba8::CLEAR);
        assert_eq!(
            ctx.lock_texture(&mut texture).map(|_| ()),
            Err(TextureLockError::AlreadyLocked)
        );
        ctx.unlock_texture(&mut texture);
        assert_eq!(texture.texel(1, 1), Rgba8::new(1, 2, 3, 4));
        assert_eq!(ctx.upload_count(), 1);
        ctx.destroy_texture(texture);
    }

    #[test]
    fn injected_lock_failures_run_out() {
        let mut ctx = SoftwareRenderContext::new(8, 8);
        let mut texture = ctx.create_streaming_texture(2, 2).expect("create texture");
        ctx.fail_next_locks(1);
        assert!(matches!(
            ctx.lock_texture(&mut texture),
            Err(TextureLockError::Unavailable(_))
        ));
        assert!(!texture.is_locked());
        assert!(ctx.lock_texture(&mut texture).is_ok());
        ctx.unlock_texture(&mut texture);
        ctx.destroy_texture(texture);
    }

    #[test]
    fn fill_rect_blends_and_clips() {
        let mut ctx = SoftwareRenderContext::new(4, 4);
        ctx.set_draw_color(RED);
        ctx.fill_rect(rect(2, 2, 10, 10));
        assert_eq!(ctx.frame_pixel(3, 3), Some(RED));
        assert_eq!(ctx.frame_pixel(1, 1), Some(Rgba8::CLEAR));
        assert_eq!(ctx.frame_pixel(4, 4), None);

        ctx.set_draw_color(Rgba8::new(0, 0, 255, 0));
        ctx.fill_rect(rect(0, 0, 4, 4));
        assert_eq!(ctx.frame_pixel(3, 3), Some(RED));
        assert_eq!(ctx.commands().len(), 4);

        ctx.begin_frame();
        assert!(ctx.commands().is_empty());
        assert_eq!(ctx.frame_pixel(3, 3), Some(Rgba8::CLEAR));
    }

    #[test]
    fn half_alpha_mixes_with_destination() {
        assert_eq!(
            blend_over(Rgba8::new(255, 0, 0, 128), Rgba8::opaque(0, 0, 255)),
            Rgba8::new(128, 0, 127, 255)
        );
    }

    #[test]
    fn copy_texture_places_texture_top_down() {
        let mut ctx = SoftwareRenderContext::new(4, 4);
        let mut texture = ctx.create_streaming_texture(2, 2).expect("create texture");
        {
            let mut lock = ctx.lock_texture(&mut texture).expect("lock texture");
            lock.row_mut(0)[0..4].copy_from_slice(&[255, 0, 0, 255]);
        }
        ctx.unlock_texture(&mut texture);
        ctx.copy_texture(&texture, rect(2, 0, 2, 2));

        assert_eq!(ctx.frame_pixel(2, 0), Some(RED));
        assert_eq!(ctx.frame_pixel(3, 0), Some(Rgba8::CLEAR));
        assert_eq!(
            ctx.commands(),
            &[RenderCommand::CopyTexture {
                texture: texture.id(),
                rect: rect(2, 0, 2, 2)
            }]
        );
        ctx.destroy_texture(texture);
    }
}
