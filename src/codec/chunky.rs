// src/codec/chunky.rs

//! Indexed codecs for chunky formats: every pixel's full color depth is
//! stored contiguously before the next pixel. Genesis packs the left pixel
//! of a byte in the high nibble; PSX VRAM packs it in the low nibble.

use std::sync::Arc;

use log::trace;

use super::element::ArrangerElement;
use super::format::FormatDescriptor;
use super::tile_codec::{
    Result, TileCodec, effective_dims, element_palette, ensure_encoded_len, ensure_pixel_dims,
};
use crate::color::native::ColorBuffer;
use crate::color::palette::{ColorError, Palette};
use crate::stream::bit_stream::BitStream;

/// On-disk ordering of pixels that share a byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubByteOrder {
    /// Leftmost pixel in the most significant bits (Genesis).
    HighFirst,
    /// Leftmost pixel in the least significant bits (PSX, GBA).
    LowFirst,
}

/// A formula-driven chunky indexed codec.
pub struct ChunkyCodec {
    desc: FormatDescriptor,
    order: SubByteOrder,
    default_palette: Arc<Palette>,
    stream: BitStream,
    out: BitStream,
    buf: ColorBuffer,
}

impl ChunkyCodec {
    fn new(desc: FormatDescriptor, order: SubByteOrder) -> Self {
        assert!(8 % desc.color_depth == 0, "chunky depth must divide a byte");
        let default_palette = Arc::new(Palette::grayscale(desc.color_depth));
        let storage = desc.storage_size_bits;
        Self {
            desc,
            order,
            default_palette,
            stream: BitStream::open_write(0, 1),
            out: BitStream::open_write(storage, 1),
            buf: ColorBuffer::new(0, 0),
        }
    }

    /// Genesis/Mega Drive 4bpp: one nibble per pixel, high nibble first.
    pub fn genesis_4bpp() -> Self {
        Self::new(
            FormatDescriptor::tiled("Genesis 4bpp", 8, 8, 4),
            SubByteOrder::HighFirst,
        )
    }

    /// PSX 4bpp: one nibble per pixel, low nibble first.
    pub fn psx_4bpp() -> Self {
        let mut desc = FormatDescriptor::linear("PSX 4bpp", 64, 64, 4);
        // Rows must fill whole bytes.
        desc.resize_increment = 2;
        Self::new(desc, SubByteOrder::LowFirst)
    }

    /// PSX 8bpp: one byte per pixel.
    pub fn psx_8bpp() -> Self {
        Self::new(
            FormatDescriptor::linear("PSX 8bpp", 64, 64, 8),
            SubByteOrder::HighFirst,
        )
    }

    /// Pads each row out to `row_stride_bits` on disk.
    pub fn with_row_stride(mut self, row_stride_bits: usize) -> Self {
        self.desc.row_stride_bits = row_stride_bits;
        self
    }

    fn pixels_per_byte(&self) -> usize {
        8 / self.desc.color_depth
    }
}

impl TileCodec for ChunkyCodec {
    fn descriptor(&self) -> &FormatDescriptor {
        &self.desc
    }

    fn decode_element(
        &mut self,
        element: &ArrangerElement,
        encoded: &[u8],
    ) -> Result<&ColorBuffer> {
        let (width, height) = effective_dims(&self.desc, element)?;
        let bits = self.desc.storage_bits_for(width, height);
        ensure_encoded_len(&self.desc, bits, encoded)?;
        trace!(
            "decoding {}x{} '{}' element at bit address {}",
            width, height, self.desc.name, element.bit_address
        );

        self.stream.reload(&encoded[..bits.div_ceil(8)], bits)?;
        let palette = element_palette(element, &self.default_palette);
        self.buf.resize(width, height);

        let depth = self.desc.color_depth;
        let per_byte = self.pixels_per_byte();
        let mask = ((1u16 << depth) - 1) as u8;
        let stride = self.desc.row_stride_for(width);
        for y in 0..height {
            self.stream.seek_absolute(y * stride)?;
            for x_base in (0..width).step_by(per_byte) {
                let byte = self.stream.read_byte()?;
                for k in 0..per_byte {
                    let shift = match self.order {
                        SubByteOrder::HighFirst => 8 - depth * (k + 1),
                        SubByteOrder::LowFirst => depth * k,
                    };
                    let index = (byte >> shift & mask) as usize;
                    self.buf.set(x_base + k, y, palette.native_color(index)?);
                }
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
        let bits = self.desc.storage_bits_for(width, height);

        if self.out.bit_len() != bits {
            self.out = BitStream::open_write(bits, 1);
        } else {
            self.out.rewind_for_write();
        }

        let depth = self.desc.color_depth;
        let per_byte = self.pixels_per_byte();
        let palette = element_palette(element, &self.default_palette);
        let stride = self.desc.row_stride_for(width);
        for y in 0..height {
            self.out.seek_absolute(y * stride)?;
            for x_base in (0..width).step_by(per_byte) {
                let mut byte = 0u8;
                for k in 0..per_byte {
                    let index = palette.exact_index(pixels.get(x_base + k, y))?;
                    if index >= 1 << depth {
                        // Palette entry exists but cannot be stored at this depth.
                        return Err(ColorError::IndexOutOfRange {
                            index,
                            len: 1 << depth,
                        }
                        .into());
                    }
                    let shift = match self.order {
                        SubByteOrder::HighFirst => 8 - depth * (k + 1),
                        SubByteOrder::LowFirst => depth * k,
                    };
                    byte |= (index as u8) << shift;
                }
                self.out.write_byte(byte)?;
            }
        }
        Ok(self.out.data())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::native::NativeColor;

    #[test]
    fn test_genesis_nibble_order() {
        let palette = Arc::new(Palette::grayscale(4));
        let mut codec = ChunkyCodec::genesis_4bpp();
        let element = ArrangerElement::new(8, 8, 0).with_palette(Arc::clone(&palette));

        let mut encoded = [0u8; 32];
        encoded[0] = 0x1F; // pixel 0 = 1, pixel 1 = 15
        let buf = codec.decode_element(&element, &encoded).unwrap();
        assert_eq!(buf.get(0, 0), palette.native_color(1).unwrap());
        assert_eq!(buf.get(1, 0), palette.native_color(15).unwrap());
    }

    #[test]
    fn test_psx_nibble_order_is_swapped() {
        let palette = Arc::new(Palette::grayscale(4));
        let mut codec = ChunkyCodec::psx_4bpp();
        let element = ArrangerElement::new(4, 2, 0).with_palette(Arc::clone(&palette));

        let buf = codec
            .decode_element(&element, &[0x1F, 0x00, 0x00, 0x00])
            .unwrap();
        assert_eq!(buf.get(0, 0), palette.native_color(15).unwrap());
        assert_eq!(buf.get(1, 0), palette.native_color(1).unwrap());
    }

    #[test]
    fn test_psx_8bpp_round_trip() {
        let palette = Arc::new(Palette::grayscale(8));
        let mut codec = ChunkyCodec::psx_8bpp();
        let element = ArrangerElement::new(16, 4, 0).with_palette(Arc::clone(&palette));

        let mut pixels = ColorBuffer::new(16, 4);
        for y in 0..4 {
            for x in 0..16 {
                pixels.set(x, y, palette.native_color(x * 16 + y).unwrap());
            }
        }
        let encoded = codec.encode_element(&element, &pixels).unwrap().to_vec();
        assert_eq!(encoded.len(), 64);
        let decoded = codec.decode_element(&element, &encoded).unwrap();
        assert_eq!(decoded, &pixels);
    }

    #[test]
    fn test_genesis_round_trip() {
        let palette = Arc::new(Palette::grayscale(4));
        let mut codec = ChunkyCodec::genesis_4bpp();
        let element = ArrangerElement::new(8, 8, 0).with_palette(Arc::clone(&palette));

        let mut pixels = ColorBuffer::new(8, 8);
        for y in 0..8 {
            for x in 0..8 {
                pixels.set(x, y, palette.native_color((x * y) % 16).unwrap());
            }
        }
        let encoded = codec.encode_element(&element, &pixels).unwrap().to_vec();
        let decoded = codec.decode_element(&element, &encoded).unwrap();
        assert_eq!(decoded, &pixels);
    }

    #[test]
    fn test_row_stride_padding_round_trip() {
        // 4 pixels of 8bpp per row, padded to 6 bytes on disk.
        let palette = Arc::new(Palette::grayscale(8));
        let mut codec = ChunkyCodec::psx_8bpp().with_row_stride(48);
        let element = ArrangerElement::new(4, 2, 0).with_palette(Arc::clone(&palette));

        let mut pixels = ColorBuffer::new(4, 2);
        for y in 0..2 {
            for x in 0..4 {
                pixels.set(x, y, palette.native_color(x * 10 + y).unwrap());
            }
        }
        let encoded = codec.encode_element(&element, &pixels).unwrap().to_vec();
        assert_eq!(encoded.len(), 12);
        assert_eq!(&encoded[0..6], &[0, 10, 20, 30, 0, 0]);
        assert_eq!(&encoded[6..12], &[1, 11, 21, 31, 0, 0]);

        let decoded = codec.decode_element(&element, &encoded).unwrap();
        assert_eq!(decoded, &pixels);
    }

    #[test]
    fn test_encode_rejects_index_beyond_depth() {
        // 300 entries: a match past index 255 cannot be stored in one byte
        // and must be reported, never truncated.
        let colors: Vec<NativeColor> = (0..300u16)
            .map(|i| NativeColor::opaque((i / 2) as u8, (i % 2) as u8, 0))
            .collect();
        let target = colors[280];
        let palette = Arc::new(Palette::new(colors));

        let mut codec = ChunkyCodec::psx_8bpp();
        let element = ArrangerElement::new(2, 1, 0).with_palette(palette);
        let mut pixels = ColorBuffer::new(2, 1);
        pixels.set(0, 0, NativeColor::opaque(0, 0, 0));
        pixels.set(1, 0, target);

        let err = codec.encode_element(&element, &pixels).unwrap_err();
        assert!(matches!(
            err,
            super::super::tile_codec::CodecError::Color(
                crate::color::palette::ColorError::IndexOutOfRange { index: 280, len: 256 }
            )
        ));
    }

    #[test]
    fn test_default_palette_when_element_has_none() {
        let mut codec = ChunkyCodec::psx_8bpp();
        let element = ArrangerElement::new(2, 1, 0);
        let buf = codec.decode_element(&element, &[0, 255]).unwrap();
        assert_eq!(buf.get(0, 0), NativeColor::opaque(0, 0, 0));
        assert_eq!(buf.get(1, 0), NativeColor::opaque(255, 255, 255));
    }
}
