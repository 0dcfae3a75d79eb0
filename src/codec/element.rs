// src/codec/element.rs

//! Placement descriptors for decodable units.

use std::sync::Arc;

use crate::color::palette::Palette;

/// The placement and addressing metadata for one decodable unit.
///
/// Owned by the project layer; codecs consume it read-only during a call.
/// The byte region handed to a codec begins at `bit_address` in the source
/// file; the address itself is retained for diagnostics and re-encoding.
#[derive(Debug, Clone)]
pub struct ArrangerElement {
    pub width: usize,
    pub height: usize,
    /// Absolute bit offset of this element in its source file.
    pub bit_address: u64,
    /// Palette for indexed formats; `None` lets the codec fall back to its
    /// default palette.
    pub palette: Option<Arc<Palette>>,
}

impl ArrangerElement {
    pub fn new(width: usize, height: usize, bit_address: u64) -> Self {
        Self {
            width,
            height,
            bit_address,
            palette: None,
        }
    }

    pub fn with_palette(mut self, palette: Arc<Palette>) -> Self {
        self.palette = Some(palette);
        self
    }

    /// Convenience for byte-aligned formats.
    pub fn at_byte_offset(width: usize, height: usize, byte_offset: u64) -> Self {
        Self::new(width, height, byte_offset * 8)
    }
}
