use std::path::{Path, PathBuf};

use model::{DEFAULT_TILE_SIZE, Rgba8};
use serde::{Deserialize, Serialize};

/// Construction parameters for a [`crate::PixelDisplay`].
///
/// Every field may be omitted from JSON. Unset `width`/`height` follow the
/// render context's drawable size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub tile_width: u32,
    pub tile_height: u32,
    pub background_color: Rgba8,
    pub draw_color: Rgba8,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            tile_width: DEFAULT_TILE_SIZE,
            tile_height: DEFAULT_TILE_SIZE,
            background_color: Rgba8::CLEAR,
            draw_color: Rgba8::WHITE,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read display config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid display config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl DisplayConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}
