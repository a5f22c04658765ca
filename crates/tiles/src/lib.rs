//! CPU side of the tiled framebuffer: per-tile solid/materialized state and
//! the rasterizer that draws into it.

mod raster;
mod store;

use model::{Rgba8, SurfaceLayout};

pub use store::{TilePixelsMut, TileStore, TileView};

/// A fixed-size pixel surface split into tiles.
#[derive(Debug)]
pub struct PixelSurface {
    layout: SurfaceLayout,
    store: TileStore,
}

impl PixelSurface {
    pub fn new(layout: SurfaceLayout, color: Rgba8) -> Self {
        let store = TileStore::new(layout.tile_count(), layout.pixels_per_tile(), color);
        Self { layout, store }
    }

    pub fn layout(&self) -> &SurfaceLayout {
        &self.layout
    }

    pub fn store(&self) -> &TileStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TileStore {
        &mut self.store
    }

    pub fn clear(&mut self, color: Rgba8) {
        self.store.clear(color);
    }

    /// Logical color at `(x, y)`, or `None` off-surface.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba8> {
        let index = self.layout.tile_index_of(x, y)?;
        Some(self.store.pixel_at(index, self.layout.local_offset(x, y)))
    }
}
