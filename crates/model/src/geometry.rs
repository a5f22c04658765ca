//! Tile-grid geometry for a fixed-size pixel surface.
//!
//! Surface coordinates are Cartesian: the origin is the bottom-left pixel and
//! y grows upward. Tile row 0 is the bottom row of tiles. Screen coordinates
//! (`ScreenRect`) are top-down, matching how textures are addressed.

use std::ops::Range;

pub const DEFAULT_TILE_SIZE: u32 = 256;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TilePos {
    pub col: u32,
    pub row: u32,
}

/// Rectangle in surface pixel space, anchored at its bottom-left corner.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PixelRect {
    pub left: i32,
    pub bottom: i32,
    pub width: i32,
    pub height: i32,
}

/// Rectangle in top-down screen space, as handed to a render context.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Inclusive range of tile columns and rows.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TileRange {
    pub col0: u32,
    pub col1: u32,
    pub row0: u32,
    pub row1: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceLayoutError {
    #[error("surface size must be positive, got {width}x{height}")]
    EmptySurface { width: u32, height: u32 },
    #[error("tile size must be positive, got {tile_width}x{tile_height}")]
    EmptyTile { tile_width: u32, tile_height: u32 },
    #[error("surface size {width}x{height} exceeds the addressable pixel range")]
    SurfaceTooLarge { width: u32, height: u32 },
    #[error("tile position {col},{row} is out of bounds")]
    TilePosOutOfBounds { col: u32, row: u32 },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SurfaceLayout {
    width: u32,
    height: u32,
    tile_width: u32,
    tile_height: u32,
    tile_columns: u32,
    tile_rows: u32,
}

impl SurfaceLayout {
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceLayoutError> {
        Self::with_tile_size(width, height, DEFAULT_TILE_SIZE, DEFAULT_TILE_SIZE)
    }

    pub fn with_tile_size(
        width: u32,
        height: u32,
        tile_width: u32,
        tile_height: u32,
    ) -> Result<Self, SurfaceLayoutError> {
        if width == 0 || height == 0 {
            return Err(SurfaceLayoutError::EmptySurface { width, height });
        }
        if tile_width == 0 || tile_height == 0 {
            return Err(SurfaceLayoutError::EmptyTile {
                tile_width,
                tile_height,
            });
        }
        let max = i32::MAX as u32;
        if width > max || height > max || tile_width > max || tile_height > max {
            return Err(SurfaceLayoutError::SurfaceTooLarge { width, height });
        }
        let tile_columns = width.div_ceil(tile_width);
        let tile_rows = height.div_ceil(tile_height);
        let tile_count = (tile_columns as usize).checked_mul(tile_rows as usize);
        let tile_pixels = (tile_width as usize).checked_mul(tile_height as usize);
        if tile_count.is_none() || tile_pixels.is_none() {
            return Err(SurfaceLayoutError::SurfaceTooLarge { width, height });
        }
        Ok(Self {
            width,
            height,
            tile_width,
            tile_height,
            tile_columns,
            tile_rows,
        })
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub const fn tile_width(&self) -> u32 {
        self.tile_width
    }

    pub const fn tile_height(&self) -> u32 {
        self.tile_height
    }

    pub const fn tile_columns(&self) -> u32 {
        self.tile_columns
    }

    pub const fn tile_rows(&self) -> u32 {
        self.tile_rows
    }

    pub const fn tile_count(&self) -> usize {
        self.tile_columns as usize * self.tile_rows as usize
    }

    pub const fn pixels_per_tile(&self) -> usize {
        self.tile_width as usize * self.tile_height as usize
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    pub fn tile_index(&self, pos: TilePos) -> Result<usize, SurfaceLayoutError> {
        if pos.col >= self.tile_columns || pos.row >= self.tile_rows {
            return Err(SurfaceLayoutError::TilePosOutOfBounds {
                col: pos.col,
                row: pos.row,
            });
        }
        Ok(pos.row as usize * self.tile_columns as usize + pos.col as usize)
    }

    /// Tiles in index order, paired with their grid position.
    pub fn tile_positions(&self) -> impl Iterator<Item = (usize, TilePos)> + use<> {
        let columns = self.tile_columns;
        let rows = self.tile_rows;
        (0..rows)
            .flat_map(move |row| (0..columns).map(move |col| TilePos { col, row }))
            .enumerate()
    }

    /// Tile index holding pixel `(x, y)`, or `None` when the pixel is off-surface.
    pub fn tile_index_of(&self, x: i32, y: i32) -> Option<usize> {
        if !self.contains(x, y) {
            return None;
        }
        let col = x as u32 / self.tile_width;
        let row = y as u32 / self.tile_height;
        Some(row as usize * self.tile_columns as usize + col as usize)
    }

    /// Offset of in-bounds pixel `(x, y)` inside its tile's bottom-up pixel buffer.
    pub fn local_offset(&self, x: i32, y: i32) -> usize {
        debug_assert!(self.contains(x, y), "pixel {x},{y} is off-surface");
        let local_x = x as u32 % self.tile_width;
        let local_y = y as u32 % self.tile_height;
        local_y as usize * self.tile_width as usize + local_x as usize
    }

    /// Tiles that lie entirely inside `rect`; partially covered tiles are excluded.
    pub fn contained_tile_range(&self, rect: PixelRect) -> Option<TileRange> {
        if rect.is_empty() {
            return None;
        }
        let (col0, col1) = contained_span(
            i64::from(rect.left),
            i64::from(rect.width),
            i64::from(self.tile_width),
            i64::from(self.tile_columns),
        )?;
        let (row0, row1) = contained_span(
            i64::from(rect.bottom),
            i64::from(rect.height),
            i64::from(self.tile_height),
            i64::from(self.tile_rows),
        )?;
        Some(TileRange {
            col0,
            col1,
            row0,
            row1,
        })
    }

    /// Top-down screen placement of a tile; row 0 lands at the bottom of the grid.
    pub fn tile_screen_rect(&self, pos: TilePos) -> ScreenRect {
        let flipped_row = self.tile_rows - pos.row - 1;
        ScreenRect {
            x: (pos.col * self.tile_width) as i32,
            y: (flipped_row * self.tile_height) as i32,
            width: self.tile_width,
            height: self.tile_height,
        }
    }
}

fn contained_span(start: i64, extent: i64, tile: i64, count: i64) -> Option<(u32, u32)> {
    let max = count - 1;
    let first = ceil_div(start, tile);
    let first = if first < 0 { 0 } else { first };
    if first > max {
        return None;
    }
    let last = (start + extent).div_euclid(tile) - 1;
    if last < 0 {
        return None;
    }
    let last = last.min(max);
    (first <= last).then_some((first as u32, last as u32))
}

fn ceil_div(value: i64, divisor: i64) -> i64 {
    -(-value).div_euclid(divisor)
}

impl PixelRect {
    pub const fn new(left: i32, bottom: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            bottom,
            width,
            height,
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Half-open column and row spans of this rect clipped to a `width`×`height` surface.
    pub fn clamped_spans(&self, width: u32, height: u32) -> Option<(Range<i32>, Range<i32>)> {
        if self.is_empty() {
            return None;
        }
        let xs = clamp_span(self.left, self.width, width);
        let ys = clamp_span(self.bottom, self.height, height);
        (!xs.is_empty() && !ys.is_empty()).then_some((xs, ys))
    }
}

fn clamp_span(start: i32, extent: i32, limit: u32) -> Range<i32> {
    let limit = i64::from(limit);
    let start = i64::from(start);
    let end = start + i64::from(extent);
    (start.clamp(0, limit) as i32)..(end.clamp(0, limit) as i32)
}

impl TileRange {
    pub fn iter(&self) -> impl Iterator<Item = TilePos> + use<> {
        let TileRange {
            col0,
            col1,
            row0,
            row1,
        } = *self;
        (row0..=row1).flat_map(move |row| (col0..=col1).map(move |col| TilePos { col, row }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(width: u32, height: u32, tile: u32) -> SurfaceLayout {
        SurfaceLayout::with_tile_size(width, height, tile, tile).expect("valid layout")
    }

    #[test]
    fn tile_counts_round_up_to_whole_tiles() {
        let layout = layout(257, 256, 256);
        assert_eq!(layout.tile_columns(), 2);
        assert_eq!(layout.tile_rows(), 1);
        assert_eq!(layout.tile_count(), 2);
        assert!(layout.width() < layout.tile_columns() * layout.tile_width());
    }

    #[test]
    fn rejects_degenerate_sizes() {
        assert_eq!(
            SurfaceLayout::new(0, 10),
            Err(SurfaceLayoutError::EmptySurface {
                width: 0,
                height: 10
            })
        );
        assert_eq!(
            SurfaceLayout::with_tile_size(10, 10, 0, 8),
            Err(SurfaceLayoutError::EmptyTile {
                tile_width: 0,
                tile_height: 8
            })
        );
    }

    #[test]
    fn tile_index_of_linearizes_bottom_up_rows() {
        let layout = layout(40, 24, 8);
        assert_eq!(layout.tile_index_of(0, 0), Some(0));
        assert_eq!(layout.tile_index_of(7, 7), Some(0));
        assert_eq!(layout.tile_index_of(8, 0), Some(1));
        assert_eq!(layout.tile_index_of(0, 8), Some(5));
        assert_eq!(layout.tile_index_of(39, 23), Some(14));
        assert_eq!(layout.tile_index_of(40, 0), None);
        assert_eq!(layout.tile_index_of(-1, 0), None);
        assert_eq!(layout.tile_index_of(0, 24), None);
    }

    #[test]
    fn tile_positions_agree_with_tile_index() {
        let layout = layout(40, 24, 8);
        for (index, pos) in layout.tile_positions() {
            assert_eq!(layout.tile_index(pos), Ok(index));
        }
        assert_eq!(layout.tile_positions().count(), 15);
        assert_eq!(
            layout.tile_index(TilePos { col: 5, row: 0 }),
            Err(SurfaceLayoutError::TilePosOutOfBounds { col: 5, row: 0 })
        );
    }

    #[test]
    fn local_offset_is_bottom_up_within_tile() {
        let layout = layout(16, 16, 8);
        assert_eq!(layout.local_offset(0, 0), 0);
        assert_eq!(layout.local_offset(3, 0), 3);
        assert_eq!(layout.local_offset(0, 1), 8);
        assert_eq!(layout.local_offset(9, 10), 2 * 8 + 1);
    }

    #[test]
    fn contained_range_excludes_partial_tiles() {
        let layout = layout(64, 64, 8);
        assert_eq!(
            layout.contained_tile_range(PixelRect::new(4, 4, 24, 24)),
            Some(TileRange {
                col0: 1,
                col1: 2,
                row0: 1,
                row1: 2
            })
        );
        assert_eq!(
            layout.contained_tile_range(PixelRect::new(0, 0, 8, 8)),
            Some(TileRange {
                col0: 0,
                col1: 0,
                row0: 0,
                row1: 0
            })
        );
        assert_eq!(layout.contained_tile_range(PixelRect::new(0, 0, 7, 8)), None);
        assert_eq!(layout.contained_tile_range(PixelRect::new(1, 1, 14, 14)), None);
    }

    #[test]
    fn contained_range_clamps_rects_hanging_off_surface() {
        let layout = layout(64, 64, 8);
        assert_eq!(
            layout.contained_tile_range(PixelRect::new(-100, -5, 300, 20)),
            Some(TileRange {
                col0: 0,
                col1: 7,
                row0: 0,
                row1: 0
            })
        );
        assert_eq!(
            layout.contained_tile_range(PixelRect::new(-20, 0, 10, 64)),
            None
        );
        assert_eq!(
            layout.contained_tile_range(PixelRect::new(64, 0, 100, 64)),
            None
        );
        assert_eq!(
            layout.contained_tile_range(PixelRect::new(0, 0, 0, 64)),
            None
        );
    }

    #[test]
    fn contained_range_counts_overhanging_edge_tile_when_covered() {
        let layout = layout(257, 10, 256);
        assert_eq!(
            layout.contained_tile_range(PixelRect::new(0, 0, 257, 256)),
            Some(TileRange {
                col0: 0,
                col1: 0,
                row0: 0,
                row1: 0
            })
        );
        assert_eq!(
            layout
                .contained_tile_range(PixelRect::new(0, 0, 1000, 256))
                .map(|range| range.iter().count()),
            Some(2)
        );
    }

    #[test]
    fn screen_rect_flips_rows() {
        let layout = layout(32, 24, 8);
        assert_eq!(
            layout.tile_screen_rect(TilePos { col: 0, row: 0 }),
            ScreenRect {
                x: 0,
                y: 16,
                width: 8,
                height: 8
            }
        );
        assert_eq!(
            layout.tile_screen_rect(TilePos { col: 3, row: 2 }),
            ScreenRect {
                x: 24,
                y: 0,
                width: 8,
                height: 8
            }
        );
    }

    #[test]
    fn clamped_spans_clip_to_surface() {
        let rect = PixelRect::new(-4, 30, 10, 10);
        assert_eq!(rect.clamped_spans(32, 32), Some((0..6, 30..32)));
        assert_eq!(PixelRect::new(40, 0, 5, 5).clamped_spans(32, 32), None);
        assert_eq!(PixelRect::new(0, 0, -3, 5).clamped_spans(32, 32), None);
    }

    #[test]
    fn tile_range_iterates_row_major() {
        let range = TileRange {
            col0: 1,
            col1: 2,
            row0: 0,
            row1: 1,
        };
        let positions: Vec<_> = range.iter().map(|pos| (pos.col, pos.row)).collect();
        assert_eq!(positions, vec![(1, 0), (2, 0), (1, 1), (2, 1)]);
    }
}
