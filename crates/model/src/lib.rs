//! Shared value types for the tiled pixel display: the RGBA color and the
//! tile-grid geometry every other crate addresses pixels through.

mod color;
mod geometry;

pub use color::{ColorParseError, Rgba8};
pub use geometry::{
    DEFAULT_TILE_SIZE, PixelRect, ScreenRect, SurfaceLayout, SurfaceLayoutError, TilePos,
    TileRange,
};
