//! Pixel-addressable display surface.
//!
//! `PixelDisplay` owns the tiled framebuffer and one streaming texture per
//! tile. Drawing calls go straight to the CPU tiles; once per frame
//! [`PixelDisplay::render`] pushes stale tiles to the render context and
//! draws the whole grid.

mod config;
mod ops;
mod render;

use model::{PixelRect, Rgba8, SurfaceLayout, SurfaceLayoutError};
use render_protocol::{RenderContext, TextureCreateError};
use tiles::PixelSurface;

pub use config::{ConfigError, DisplayConfig};
pub use ops::DisplayOp;
pub use render::RenderStats;

#[derive(Debug, thiserror::Error)]
pub enum DisplayCreateError {
    #[error("invalid display layout: {0}")]
    Layout(#[from] SurfaceLayoutError),
    #[error("failed to create texture for tile {tile_index}: {source}")]
    Texture {
        tile_index: usize,
        #[source]
        source: TextureCreateError,
    },
}

pub struct PixelDisplay<C: RenderContext> {
    surface: PixelSurface,
    textures: Vec<C::Texture>,
    draw_color: Rgba8,
    background_color: Rgba8,
}

impl<C: RenderContext> PixelDisplay<C> {
    /// Builds the tile grid and creates one texture per tile. On failure every
    /// texture created so far is destroyed before the error is returned.
    pub fn new(ctx: &mut C, config: &DisplayConfig) -> Result<Self, DisplayCreateError> {
        let (drawable_width, drawable_height) = ctx.drawable_size();
        let layout = SurfaceLayout::with_tile_size(
            config.width.unwrap_or(drawable_width),
            config.height.unwrap_or(drawable_height),
            config.tile_width,
            config.tile_height,
        )?;

        let mut textures = Vec::with_capacity(layout.tile_count());
        for tile_index in 0..layout.tile_count() {
            match ctx.create_streaming_texture(layout.tile_width(), layout.tile_height()) {
                Ok(texture) => textures.push(texture),
                Err(source) => {
                    for texture in textures.drain(..) {
                        ctx.destroy_texture(texture);
                    }
                    return Err(DisplayCreateError::Texture { tile_index, source });
                }
            }
        }

        log::debug!(
            "created pixel display {}x{} with {}x{} tiles of {}x{}",
            layout.width(),
            layout.height(),
            layout.tile_columns(),
            layout.tile_rows(),
            layout.tile_width(),
            layout.tile_height(),
        );
        Ok(Self {
            surface: PixelSurface::new(layout, config.background_color),
            textures,
            draw_color: config.draw_color,
            background_color: config.background_color,
        })
    }

    /// Releases every texture and pixel buffer.
    pub fn destroy(mut self, ctx: &mut C) {
        let texture_count = self.textures.len();
        for texture in self.textures.drain(..) {
            ctx.destroy_texture(texture);
        }
        let buffer_count = self.surface.store_mut().release_buffers();
        log::debug!(
            "destroyed pixel display: {texture_count} textures, {buffer_count} pixel buffers"
        );
    }

    pub fn width(&self) -> u32 {
        self.surface.layout().width()
    }

    pub fn height(&self) -> u32 {
        self.surface.layout().height()
    }

    pub fn layout(&self) -> &SurfaceLayout {
        self.surface.layout()
    }

    pub fn surface(&self) -> &PixelSurface {
        &self.surface
    }

    pub fn draw_color(&self) -> Rgba8 {
        self.draw_color
    }

    pub fn set_draw_color(&mut self, color: Rgba8) {
        self.draw_color = color;
    }

    pub fn background_color(&self) -> Rgba8 {
        self.background_color
    }

    pub fn set_background_color(&mut self, color: Rgba8) {
        self.background_color = color;
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba8> {
        self.surface.pixel(x, y)
    }

    /// Resets every tile to the background color.
    pub fn clear(&mut self) {
        self.surface.clear(self.background_color);
    }

    pub fn clear_to(&mut self, color: Rgba8) {
        self.surface.clear(color);
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgba8) {
        self.surface.set_pixel(x, y, color);
    }

    pub fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgba8) {
        self.surface.draw_line(x1, y1, x2, y2, color);
    }

    pub fn fill_rect(&mut self, left: i32, bottom: i32, width: i32, height: i32, color: Rgba8) {
        self.surface
            .fill_rect(PixelRect::new(left, bottom, width, height), color);
    }

    pub fn fill_ellipse(&mut self, left: i32, bottom: i32, width: i32, height: i32, color: Rgba8) {
        self.surface
            .fill_ellipse(PixelRect::new(left, bottom, width, height), color);
    }
}
