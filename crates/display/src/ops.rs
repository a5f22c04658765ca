//! Drawing commands as issued by a scripting or binding layer.

use model::Rgba8;
use render_protocol::RenderContext;
use serde::{Deserialize, Serialize};

use crate::PixelDisplay;

/// One drawing command. A `None` color means the display's current draw
/// color, except for `Clear`, where it means the background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DisplayOp {
    Clear {
        #[serde(default)]
        color: Option<Rgba8>,
    },
    SetPixel {
        x: i32,
        y: i32,
        #[serde(default)]
        color: Option<Rgba8>,
    },
    DrawLine {
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        #[serde(default)]
        color: Option<Rgba8>,
    },
    FillRect {
        left: i32,
        bottom: i32,
        width: i32,
        height: i32,
        #[serde(default)]
        color: Option<Rgba8>,
    },
    FillEllipse {
        left: i32,
        bottom: i32,
        width: i32,
        height: i32,
        #[serde(default)]
        color: Option<Rgba8>,
    },
    SetDrawColor {
        color: Rgba8,
    },
    SetBackgroundColor {
        color: Rgba8,
    },
}

impl<C: RenderContext> PixelDisplay<C> {
    pub fn apply(&mut self, op: DisplayOp) {
        let draw_color = self.draw_color;
        match op {
            DisplayOp::Clear { color } => match color {
                Some(color) => self.clear_to(color),
                None => self.clear(),
            },
            DisplayOp::SetPixel { x, y, color } => {
                self.set_pixel(x, y, color.unwrap_or(draw_color));
            }
            DisplayOp::DrawLine {
                x1,
                y1,
                x2,
                y2,
                color,
            } => self.draw_line(x1, y1, x2, y2, color.unwrap_or(draw_color)),
            DisplayOp::FillRect {
                left,
                bottom,
                width,
                height,
                color,
            } => self.fill_rect(left, bottom, width, height, color.unwrap_or(draw_color)),
            DisplayOp::FillEllipse {
                left,
                bottom,
                width,
                height,
                color,
            } => self.fill_ellipse(left, bottom, width, height, color.unwrap_or(draw_color)),
            DisplayOp::SetDrawColor { color } => self.set_draw_color(color),
            DisplayOp::SetBackgroundColor { color } => self.set_background_color(color),
        }
    }
}
