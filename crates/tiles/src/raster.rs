//! Primitive rasterization into the tile store. Uniform regions are resolved
//! at tile granularity first; the remaining edges are written as pixel runs.

use model::{PixelRect, Rgba8, TilePos};

use crate::PixelSurface;

impl PixelSurface {
    /// Writes one pixel. Off-surface coordinates are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgba8) {
        let Some(index) = self.layout.tile_index_of(x, y) else {
            return;
        };
        let offset = self.layout.local_offset(x, y);
        if let Some(mut pixels) = self.store.ensure_materialized_unless(index, color) {
            pixels.set(offset, color);
        }
    }

    /// Writes the half-open run `[x0, x1)` on row `y`, clamped to the surface.
    pub fn set_pixel_run(&mut self, x0: i32, x1: i32, y: i32, color: Rgba8) {
        if y < 0 || y as u32 >= self.layout.height() {
            return;
        }
        let width = self.layout.width() as i32;
        let x0 = x0.clamp(0, width);
        let x1 = x1.clamp(0, width);
        if x0 >= x1 {
            return;
        }

        let tile_width = self.layout.tile_width() as i32;
        let row = y as u32 / self.layout.tile_height();
        let row_offset = (y as u32 % self.layout.tile_height()) as usize * tile_width as usize;
        let mut x = x0;
        while x < x1 {
            let col = (x / tile_width) as u32;
            let tile_end = ((i64::from(col) + 1) * i64::from(tile_width)).min(i64::from(x1)) as i32;
            let index = self
                .layout
                .tile_index(TilePos { col, row })
                .expect("clamped run stays on the tile grid");
            if let Some(mut pixels) = self.store.ensure_materialized_unless(index, color) {
                let start = row_offset + (x % tile_width) as usize;
                let end = start + (tile_end - x) as usize;
                pixels.fill(start..end, color);
            }
            x = tile_end;
        }
    }

    /// Integer Bresenham line between both endpoints, inclusive.
    pub fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgba8) {
        let (mut x1, mut y1, mut x2, mut y2) =
            (i64::from(x1), i64::from(y1), i64::from(x2), i64::from(y2));
        let steep = (y2 - y1).abs() > (x2 - x1).abs();
        if steep {
            std::mem::swap(&mut x1, &mut y1);
            std::mem::swap(&mut x2, &mut y2);
        }
        if x1 > x2 {
            std::mem::swap(&mut x1, &mut x2);
            std::mem::swap(&mut y1, &mut y2);
        }

        let dx = x2 - x1;
        let abs_dy = (y2 - y1).abs();
        let y_step = if y1 < y2 { 1 } else { -1 };
        let mut error = dx / 2;
        let mut y = y1;
        for x in x1..=x2 {
            // Both coordinates lie between i32 endpoints.
            let (px, py) = if steep { (y, x) } else { (x, y) };
            self.set_pixel(px as i32, py as i32, color);

            error -= abs_dy;
            if error < 0 {
                y += y_step;
                error += dx;
            }
        }
    }

    pub fn fill_rect(&mut self, rect: PixelRect, color: Rgba8) {
        if rect.is_empty() {
            return;
        }
        if let Some(range) = self.layout.contained_tile_range(rect) {
            for pos in range.iter() {
                self.set_tile_solid(pos, color);
            }
        }
        let Some((xs, ys)) = rect.clamped_spans(self.layout.width(), self.layout.height()) else {
            return;
        };
        for y in ys {
            self.set_pixel_run(xs.start, xs.end, y, color);
        }
    }

    /// Fills the ellipse inscribed in `rect`. Rects two pixels thin or less
    /// are filled as rectangles.
    pub fn fill_ellipse(&mut self, rect: PixelRect, color: Rgba8) {
        if rect.width <= 2 || rect.height <= 2 {
            self.fill_rect(rect, color);
            return;
        }

        let half_width = f64::from(rect.width) * 0.5;
        let half_height = f64::from(rect.height) * 0.5;
        let center_x = f64::from(rect.left) + half_width;
        let center_y = f64::from(rect.bottom) + half_height;

        if let Some(range) = self.layout.contained_tile_range(rect) {
            let tile_width = f64::from(self.layout.tile_width());
            let tile_height = f64::from(self.layout.tile_height());
            let inside = |x: f64, y: f64| {
                let dx = (x - center_x) / half_width;
                let dy = (y - center_y) / half_height;
                dx * dx + dy * dy <= 1.0
            };
            for pos in range.iter() {
                let x = f64::from(pos.col) * tile_width;
                let y = f64::from(pos.row) * tile_height;
                if inside(x, y)
                    && inside(x + tile_width, y)
                    && inside(x + tile_width, y + tile_height)
                    && inside(x, y + tile_height)
                {
                    self.set_tile_solid(pos, color);
                }
            }
        }

        let Some((_, ys)) = rect.clamped_spans(self.layout.width(), self.layout.height()) else {
            return;
        };
        let radius_sq = half_height * half_height;
        let aspect = f64::from(rect.width) / f64::from(rect.height);
        let width = f64::from(self.layout.width());
        for y in ys {
            let dy = center_y - f64::from(y) - 0.5;
            let chord_sq = radius_sq - dy * dy;
            if chord_sq < 0.0 {
                continue;
            }
            let half_chord = chord_sq.sqrt() * aspect;
            let x0 = (center_x - half_chord + 0.5).floor().clamp(0.0, width) as i32;
            let x1 = (center_x + half_chord + 0.5).floor().clamp(0.0, width) as i32;
            self.set_pixel_run(x0, x1, y, color);
        }
    }

    fn set_tile_solid(&mut self, pos: TilePos, color: Rgba8) {
        let index = self
            .layout
            .tile_index(pos)
            .expect("contained tile range lies on the tile grid");
        self.store.set_solid(index, color);
    }
}
