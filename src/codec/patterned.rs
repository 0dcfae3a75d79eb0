// src/codec/patterned.rs

//! The pattern-driven indexed codec, for irregular or scrambled bit-plane
//! layouts that cannot be expressed as a simple formula of `(x, y, plane)`.
//!
//! Decode walks the element in on-disk order, letting the compiled pattern's
//! decode table scatter bits to their natural coordinates. Encode walks in
//! natural order and uses the encode table plus `seek_absolute` to land each
//! bit at its on-disk offset.

use std::sync::Arc;

use log::trace;

use super::element::ArrangerElement;
use super::format::{CodecCapabilities, FormatDescriptor, Layout};
use super::tile_codec::{
    Result, TileCodec, effective_dims, element_palette, ensure_encoded_len, ensure_pixel_dims,
};
use crate::color::native::ColorBuffer;
use crate::color::palette::{ColorError, Palette};
use crate::pattern::compiler::{PatternDefinition, PatternError, compile};
use crate::pattern::pattern_list::{PatternList, PlaneCoordinate};
use crate::stream::bit_stream::BitStream;

/// An indexed codec whose bit layout comes from a compiled [`PatternList`].
pub struct PatternCodec {
    desc: FormatDescriptor,
    pattern: Arc<PatternList>,
    default_palette: Arc<Palette>,
    stream: BitStream,
    out: BitStream,
    indices: Vec<u8>,
    buf: ColorBuffer,
}

impl PatternCodec {
    /// Wraps an already-compiled pattern. The pattern fixes the element
    /// geometry, so these codecs do not resize.
    pub fn new(pattern: Arc<PatternList>) -> Self {
        assert!(pattern.planes() <= 8, "pattern codecs support up to 8 planes");
        let storage = pattern.pattern_size() * pattern.height();
        let desc = FormatDescriptor {
            name: pattern.name().to_string(),
            width: pattern.width(),
            height: pattern.height(),
            layout: Layout::Tiled,
            color_depth: pattern.planes(),
            storage_size_bits: storage,
            capabilities: CodecCapabilities::CAN_ENCODE,
            resize_increment: 0,
            row_stride_bits: 0,
        };
        let default_palette = Arc::new(Palette::grayscale(pattern.planes()));
        Self {
            desc,
            pattern,
            default_palette,
            stream: BitStream::open_write(0, 1),
            out: BitStream::open_write(storage, 1),
            indices: Vec::new(),
            buf: ColorBuffer::new(0, 0),
        }
    }

    /// Compiles a definition and wraps the result.
    pub fn from_definition(def: &PatternDefinition) -> std::result::Result<Self, Vec<PatternError>> {
        compile(def).map(|pattern| Self::new(Arc::new(pattern)))
    }

    pub fn pattern(&self) -> &Arc<PatternList> {
        &self.pattern
    }
}

impl TileCodec for PatternCodec {
    fn descriptor(&self) -> &FormatDescriptor {
        &self.desc
    }

    fn decode_element(
        &mut self,
        element: &ArrangerElement,
        encoded: &[u8],
    ) -> Result<&ColorBuffer> {
        let (width, height) = effective_dims(&self.desc, element)?;
        let bits = self.desc.storage_size_bits;
        ensure_encoded_len(&self.desc, bits, encoded)?;
        trace!(
            "decoding {}x{} pattern '{}' element at bit address {}",
            width, height, self.pattern.name(), element.bit_address
        );

        self.stream.reload(&encoded[..bits.div_ceil(8)], bits)?;
        self.indices.clear();
        self.indices.resize(width * height, 0);

        let pattern_size = self.pattern.pattern_size();
        for y in 0..height {
            for i in 0..pattern_size {
                let coord = self.pattern.decode_index(i);
                let bit = self.stream.read_bit()?;
                let pixel = (y + coord.y as usize) * width + coord.x as usize;
                self.indices[pixel] |= bit << coord.plane;
            }
        }

        let palette = element_palette(element, &self.default_palette);
        self.buf.resize(width, height);
        for y in 0..height {
            for x in 0..width {
                let index = self.indices[y * width + x] as usize;
                self.buf.set(x, y, palette.native_color(index)?);
            }
        }
        Ok(&self.buf)
    }

    fn encode_element(
        &mut self,
        element: &ArrangerElement,
        pixels: &ColorBuffer,
    ) -> Result<&[u8]> {
        let (width, height) = effective_dims(&self.desc, element)?;
        ensure_pixel_dims(&self.desc, width, height, pixels)?;
        let bits = self.desc.storage_size_bits;

        let palette = element_palette(element, &self.default_palette);
        let depth = self.desc.color_depth;
        self.indices.clear();
        for y in 0..height {
            for x in 0..width {
                let index = palette.exact_index(pixels.get(x, y))?;
                if index >= 1 << depth {
                    return Err(ColorError::IndexOutOfRange {
                        index,
                        len: 1 << depth,
                    }
                    .into());
                }
                self.indices.push(index as u8);
            }
        }

        if self.out.bit_len() != bits {
            self.out = BitStream::open_write(bits, 1);
        } else {
            self.out.rewind_for_write();
        }
        let pattern_size = self.pattern.pattern_size();
        for y in 0..height {
            let row_base = y * pattern_size;
            for x in 0..width {
                let index = self.indices[y * width + x];
                for plane in 0..depth {
                    let disk = self
                        .pattern
                        .encode_index(PlaneCoordinate::new(x as i16, 0, plane as i16));
                    self.out.seek_absolute(row_base + disk)?;
                    self.out.write_bit(index >> plane & 1)?;
                }
            }
        }
        Ok(self.out.data())
    }
}
