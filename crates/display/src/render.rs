//! Per-frame synchronization of CPU tiles with the render context.

use model::Rgba8;
use render_protocol::{BYTES_PER_PIXEL, RenderContext, TextureLock};
use tiles::TileView;

use crate::PixelDisplay;

/// What one [`PixelDisplay::render`] call did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    pub uploads: usize,
    pub solid_fills: usize,
    pub texture_copies: usize,
    pub transparent_skips: usize,
    pub lock_failures: usize,
}

impl<C: RenderContext> PixelDisplay<C> {
    /// Draws every tile. Dirty materialized tiles are uploaded first; a tile
    /// whose texture cannot be locked is skipped this frame and stays dirty.
    pub fn render(&mut self, ctx: &mut C) -> RenderStats {
        let layout = *self.surface.layout();
        let tile_width = layout.tile_width() as usize;
        let mut stats = RenderStats::default();

        for (index, pos) in layout.tile_positions() {
            let rect = layout.tile_screen_rect(pos);
            match self.surface.store().tile(index) {
                TileView::Solid(color) if color.is_transparent() => {
                    stats.transparent_skips += 1;
                }
                TileView::Solid(color) => {
                    ctx.set_draw_color(color);
                    ctx.fill_rect(rect);
                    stats.solid_fills += 1;
                }
                TileView::Materialized { pixels, dirty } => {
                    let texture = &mut self.textures[index];
                    if dirty {
                        let locked = match ctx.lock_texture(texture) {
                            Ok(mut lock) => {
                                write_rows_flipped(&mut lock, pixels, tile_width);
                                true
                            }
                            Err(error) => {
                                log::warn!(
                                    "skipping tile {index} ({},{}) this frame: {error}",
                                    pos.col,
                                    pos.row
                                );
                                false
                            }
                        };
                        if !locked {
                            stats.lock_failures += 1;
                            continue;
                        }
                        ctx.unlock_texture(texture);
                        self.surface.store_mut().mark_clean(index);
                        stats.uploads += 1;
                    }
                    ctx.copy_texture(&self.textures[index], rect);
                    stats.texture_copies += 1;
                }
            }
        }

        if stats.uploads > 0 || stats.lock_failures > 0 {
            log::debug!(
                "rendered pixel display: {} uploads, {} copies, {} fills, {} lock failures",
                stats.uploads,
                stats.texture_copies,
                stats.solid_fills,
                stats.lock_failures
            );
        }
        stats
    }
}

/// Copies bottom-up tile rows into the top-down texture, one pitch per row.
fn write_rows_flipped(lock: &mut TextureLock<'_>, pixels: &[Rgba8], tile_width: usize) {
    let row_bytes = tile_width * BYTES_PER_PIXEL;
    for (texture_row, tile_row) in pixels.chunks_exact(tile_width).rev().enumerate() {
        lock.row_mut(texture_row)[..row_bytes].copy_from_slice(bytemuck::cast_slice(tile_row));
    }
}
