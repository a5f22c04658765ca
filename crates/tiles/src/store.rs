//! Per-tile state: solid color or materialized pixel cache.
//!
//! Tiles live in a flat arena indexed by `row * tile_columns + col`. A tile
//! only owns readable pixels while it is materialized; a tile that drops back
//! to solid keeps its buffer as a spare so the next materialization reuses it.

use std::ops::Range;

use model::Rgba8;

#[derive(Debug)]
enum Tile {
    Solid {
        color: Rgba8,
        spare: Option<Box<[Rgba8]>>,
    },
    Materialized {
        pixels: Box<[Rgba8]>,
        dirty: bool,
    },
}

/// Read-only view of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileView<'a> {
    Solid(Rgba8),
    Materialized { pixels: &'a [Rgba8], dirty: bool },
}

/// Writable pixel buffer of a materialized tile. Writes that change a pixel
/// raise the tile's dirty flag; writes of the value already stored do not.
#[derive(Debug)]
pub struct TilePixelsMut<'a> {
    pixels: &'a mut [Rgba8],
    dirty: &'a mut bool,
}

impl TilePixelsMut<'_> {
    pub fn pixels(&self) -> &[Rgba8] {
        self.pixels
    }

    pub fn is_dirty(&self) -> bool {
        *self.dirty
    }

    /// Returns whether the stored pixel changed.
    pub fn set(&mut self, offset: usize, color: Rgba8) -> bool {
        let pixel = &mut self.pixels[offset];
        if *pixel == color {
            return false;
        }
        *pixel = color;
        *self.dirty = true;
        true
    }

    /// Returns whether any pixel in `range` changed.
    pub fn fill(&mut self, range: Range<usize>, color: Rgba8) -> bool {
        let run = &mut self.pixels[range];
        if run.iter().all(|pixel| *pixel == color) {
            return false;
        }
        run.fill(color);
        *self.dirty = true;
        true
    }
}

#[derive(Debug)]
pub struct TileStore {
    tiles: Box<[Tile]>,
    pixels_per_tile: usize,
}

impl TileStore {
    pub fn new(tile_count: usize, pixels_per_tile: usize, color: Rgba8) -> Self {
        assert!(pixels_per_tile > 0, "tiles must hold at least one pixel");
        let tiles = (0..tile_count)
            .map(|_| Tile::Solid { color, spare: None })
            .collect();
        Self {
            tiles,
            pixels_per_tile,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn pixels_per_tile(&self) -> usize {
        self.pixels_per_tile
    }

    pub fn tile(&self, index: usize) -> TileView<'_> {
        match &self.tiles[index] {
            Tile::Solid { color, .. } => TileView::Solid(*color),
            Tile::Materialized { pixels, dirty } => TileView::Materialized {
                pixels,
                dirty: *dirty,
            },
        }
    }

    pub fn is_materialized(&self, index: usize) -> bool {
        matches!(self.tiles[index], Tile::Materialized { .. })
    }

    pub fn is_dirty(&self, index: usize) -> bool {
        matches!(self.tiles[index], Tile::Materialized { dirty: true, .. })
    }

    /// Color of the pixel at `offset`, whichever representation the tile is in.
    pub fn pixel_at(&self, index: usize, offset: usize) -> Rgba8 {
        match &self.tiles[index] {
            Tile::Solid { color, .. } => *color,
            Tile::Materialized { pixels, .. } => pixels[offset],
        }
    }

    pub fn materialized_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|tile| matches!(tile, Tile::Materialized { .. }))
            .count()
    }

    pub fn dirty_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|tile| matches!(tile, Tile::Materialized { dirty: true, .. }))
            .count()
    }

    /// Pixel buffers held by the store, materialized or kept as spares.
    pub fn allocated_buffer_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|tile| {
                matches!(
                    tile,
                    Tile::Materialized { .. } | Tile::Solid { spare: Some(_), .. }
                )
            })
            .count()
    }

    pub fn clear(&mut self, color: Rgba8) {
        for index in 0..self.tiles.len() {
            self.set_solid(index, color);
        }
    }

    pub fn set_solid(&mut self, index: usize, color: Rgba8) {
        let spare = match &mut self.tiles[index] {
            Tile::Solid { color: current, .. } => {
                *current = color;
                return;
            }
            Tile::Materialized { pixels, .. } => std::mem::take(pixels),
        };
        self.tiles[index] = Tile::Solid {
            color,
            spare: Some(spare),
        };
    }

    /// Gives the tile a pixel buffer filled with its solid color. The tile
    /// starts clean: materializing alone changes nothing visible.
    pub fn ensure_materialized(&mut self, index: usize) -> TilePixelsMut<'_> {
        if let Tile::Solid { color, spare } = &mut self.tiles[index] {
            let color = *color;
            let mut pixels = match spare.take() {
                Some(pixels) => pixels,
                None => vec![color; self.pixels_per_tile].into_boxed_slice(),
            };
            pixels.fill(color);
            self.tiles[index] = Tile::Materialized {
                pixels,
                dirty: false,
            };
        }
        match &mut self.tiles[index] {
            Tile::Materialized { pixels, dirty } => TilePixelsMut { pixels, dirty },
            Tile::Solid { .. } => unreachable!("tile {index} is solid after materialization"),
        }
    }

    /// Like [`Self::ensure_materialized`], but leaves a tile that is already
    /// solid `color` alone and returns `None`: painting it would change nothing.
    pub fn ensure_materialized_unless(
        &mut self,
        index: usize,
        color: Rgba8,
    ) -> Option<TilePixelsMut<'_>> {
        if let Tile::Solid { color: current, .. } = &self.tiles[index] {
            if *current == color {
                return None;
            }
        }
        Some(self.ensure_materialized(index))
    }

    pub fn mark_clean(&mut self, index: usize) {
        if let Tile::Materialized { dirty, .. } = &mut self.tiles[index] {
            *dirty = false;
        }
    }

    /// Drops every pixel buffer, spares included. Materialized tiles fall back
    /// to `Solid(CLEAR)`. Returns how many buffers were freed.
    pub fn release_buffers(&mut self) -> usize {
        let mut released = 0;
        for tile in self.tiles.iter_mut() {
            match tile {
                Tile::Solid { spare, .. } => {
                    if spare.take().is_some() {
                        released += 1;
                    }
                }
                Tile::Materialized { .. } => {
                    *tile = Tile::Solid {
                        color: Rgba8::CLEAR,
                        spare: None,
                    };
                    released += 1;
                }
            }
        }
        released
    }
}
