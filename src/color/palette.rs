// src/color/palette.rs

//! Ordered palettes of native colors and exact-match index lookup.

use thiserror::Error;

use super::native::NativeColor;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorError {
    /// An encode asked for a color the target palette cannot represent.
    /// Recoverable: the caller decides whether to abort or skip.
    #[error("color ({r}, {g}, {b}, {a}) has no exact match in palette")]
    ColorNotFound { r: u8, g: u8, b: u8, a: u8 },
    #[error("palette index {index} out of range for palette of {len} entries")]
    IndexOutOfRange { index: usize, len: usize },
}

/// An ordered list of native colors, looked up by indexed codecs during
/// decode and scanned for exact matches during encode.
///
/// Nearest-match lookup is not implemented; encode requires a bit-for-bit
/// exact palette entry and reports [`ColorError::ColorNotFound`] otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<NativeColor>,
}

impl Palette {
    pub fn new(colors: Vec<NativeColor>) -> Self {
        Self { colors }
    }

    /// An evenly spaced grayscale ramp with `2^depth` entries, used as the
    /// default when an element carries no palette of its own.
    pub fn grayscale(depth: usize) -> Self {
        let count = 1usize << depth;
        let colors = (0..count)
            .map(|i| {
                let v = (i * 255 / (count - 1).max(1)) as u8;
                NativeColor::opaque(v, v, v)
            })
            .collect();
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The native color stored at `index`.
    pub fn native_color(&self, index: usize) -> Result<NativeColor, ColorError> {
        self.colors
            .get(index)
            .copied()
            .ok_or(ColorError::IndexOutOfRange {
                index,
                len: self.colors.len(),
            })
    }

    /// Linear scan for a bit-for-bit exact match. The returned index is not
    /// bounded by any color depth; codecs check it against their own.
    pub fn exact_index(&self, color: NativeColor) -> Result<usize, ColorError> {
        self.colors
            .iter()
            .position(|&c| c == color)
            .ok_or(ColorError::ColorNotFound {
                r: color.r,
                g: color.g,
                b: color.b,
                a: color.a,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_index_hit_and_miss() {
        let palette = Palette::new(vec![
            NativeColor::opaque(0, 0, 0),
            NativeColor::opaque(255, 0, 0),
        ]);
        assert_eq!(palette.exact_index(NativeColor::opaque(255, 0, 0)), Ok(1));
        assert_eq!(
            palette.exact_index(NativeColor::opaque(254, 0, 0)),
            Err(ColorError::ColorNotFound {
                r: 254,
                g: 0,
                b: 0,
                a: 255
            })
        );
    }

    #[test]
    fn test_grayscale_endpoints() {
        let palette = Palette::grayscale(2);
        assert_eq!(palette.len(), 4);
        assert_eq!(palette.native_color(0).unwrap(), NativeColor::opaque(0, 0, 0));
        assert_eq!(
            palette.native_color(3).unwrap(),
            NativeColor::opaque(255, 255, 255)
        );
    }

    #[test]
    fn test_exact_index_beyond_byte_range() {
        // Indices past 255 must come back untruncated.
        let mut colors: Vec<NativeColor> =
            (0..=255).map(|v| NativeColor::opaque(v, 0, 0)).collect();
        colors.push(NativeColor::opaque(0, 255, 0));
        let palette = Palette::new(colors);
        assert_eq!(palette.exact_index(NativeColor::opaque(0, 255, 0)), Ok(256));
    }

    #[test]
    fn test_index_out_of_range() {
        let palette = Palette::grayscale(1);
        assert_eq!(
            palette.native_color(2),
            Err(ColorError::IndexOutOfRange { index: 2, len: 2 })
        );
    }
}
