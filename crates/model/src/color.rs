use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 8-bit RGBA color, laid out exactly like one texel of an `Rgba8Unorm` texture.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

static_assertions::assert_eq_size!(Rgba8, [u8; 4]);
static_assertions::assert_eq_align!(Rgba8, u8);

impl Rgba8 {
    pub const CLEAR: Self = Self::new(0, 0, 0, 0);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }

    pub fn to_unorm(self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    #[error("color `{0}` must have 6 or 8 hex digits")]
    InvalidLength(String),
    #[error("color `{0}` contains a non-hex digit")]
    InvalidDigit(String),
}

impl FromStr for Rgba8 {
    type Err = ColorParseError;

    /// Parses `#RRGGBB` or `#RRGGBBAA`; the leading `#` is optional.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let digits = text.trim().trim_start_matches('#');
        if digits.len() != 6 && digits.len() != 8 {
            return Err(ColorParseError::InvalidLength(text.to_owned()));
        }
        if !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidDigit(text.to_owned()));
        }

        let channel = |index: usize| {
            u8::from_str_radix(&digits[index * 2..index * 2 + 2], 16)
                .map_err(|_| ColorParseError::InvalidDigit(text.to_owned()))
        };
        let alpha = if digits.len() == 8 { channel(3)? } else { 255 };
        Ok(Self::new(channel(0)?, channel(1)?, channel(2)?, alpha))
    }
}

impl fmt::Display for Rgba8 {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "#{:02X}{:02X}{:02X}{:02X}",
            self.r, self.g, self.b, self.a
        )
    }
}

impl Serialize for Rgba8 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgba8 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rgb_and_rgba_hex() {
        assert_eq!("#FF8000".parse::<Rgba8>(), Ok(Rgba8::opaque(255, 128, 0)));
        assert_eq!("00ff0080".parse::<Rgba8>(), Ok(Rgba8::new(0, 255, 0, 128)));
        assert_eq!(" #000000 ".parse::<Rgba8>(), Ok(Rgba8::BLACK));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert_eq!(
            "#FFF".parse::<Rgba8>(),
            Err(ColorParseError::InvalidLength("#FFF".to_owned()))
        );
        assert_eq!(
            "#GG0000".parse::<Rgba8>(),
            Err(ColorParseError::InvalidDigit("#GG0000".to_owned()))
        );
    }

    #[test]
    fn display_uses_full_rgba_notation() {
        let color = Rgba8::new(1, 2, 171, 255);
        assert_eq!(color.to_string(), "#0102ABFF");
        assert_eq!(color.to_string().parse::<Rgba8>(), Ok(color));
    }

    #[test]
    fn deserializes_from_hex_string() {
        let color: Rgba8 = serde_json::from_str("\"#10203040\"").expect("deserialize color");
        assert_eq!(color, Rgba8::new(0x10, 0x20, 0x30, 0x40));
        assert!(serde_json::from_str::<Rgba8>("\"red\"").is_err());
    }

    #[test]
    fn pixel_rows_cast_to_texel_bytes() {
        let row = [Rgba8::new(1, 2, 3, 4), Rgba8::new(5, 6, 7, 8)];
        let bytes: &[u8] = bytemuck::cast_slice(&row);
        assert_eq!(bytes, &[1, 2, 3, 4, 5, 6, 7, 8]);
    }
}
