// src/codec/direct.rs

//! Direct-color codecs: every encoded pixel directly encodes a foreign
//! color, no palette consulted. These formats are byte aligned, so I/O goes
//! through `byteorder` over the raw slice instead of the bit stream.

use byteorder::{ByteOrder, LittleEndian};
use log::trace;

use super::element::ArrangerElement;
use super::format::FormatDescriptor;
use super::tile_codec::{
    Result, TileCodec, effective_dims, ensure_encoded_len, ensure_pixel_dims,
};
use crate::color::foreign::{ColorModel, decode_color, encode_color};
use crate::color::native::ColorBuffer;

/// A direct-color codec over one fixed [`ColorModel`].
pub struct DirectCodec {
    desc: FormatDescriptor,
    model: ColorModel,
    buf: ColorBuffer,
    out: Vec<u8>,
}

impl DirectCodec {
    fn new(desc: FormatDescriptor, model: ColorModel) -> Self {
        debug_assert_eq!(desc.color_depth, model.bit_width());
        Self {
            desc,
            model,
            buf: ColorBuffer::new(0, 0),
            out: Vec::new(),
        }
    }

    /// PSX 16bpp: little-endian ABGR16, 1-bit alpha in bit 15.
    pub fn psx_16bpp() -> Self {
        Self::new(
            FormatDescriptor::linear("PSX 16bpp", 64, 64, 16),
            ColorModel::Abgr16,
        )
    }

    /// SNES/GBA-style 15-bit BGR, little-endian, bit 15 ignored.
    pub fn bgr15() -> Self {
        Self::new(
            FormatDescriptor::linear("BGR15", 64, 64, 16),
            ColorModel::Bgr15,
        )
    }

    /// Packed 24-bit RGB.
    pub fn rgb24() -> Self {
        Self::new(
            FormatDescriptor::linear("RGB24", 64, 64, 24),
            ColorModel::Rgb24,
        )
    }

    /// Pads each row out to `row_stride_bits` on disk. Direct formats are
    /// byte aligned, so the stride must be a whole number of bytes.
    pub fn with_row_stride(mut self, row_stride_bits: usize) -> Self {
        debug_assert_eq!(row_stride_bits % 8, 0);
        self.desc.row_stride_bits = row_stride_bits;
        self
    }

    fn bytes_per_pixel(&self) -> usize {
        self.desc.color_depth / 8
    }
}

impl TileCodec for DirectCodec {
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

        let bpp = self.bytes_per_pixel();
        let stride_bytes = self.desc.row_stride_for(width) / 8;
        self.buf.resize(width, height);
        for y in 0..height {
            for x in 0..width {
                let offset = y * stride_bytes + x * bpp;
                let chunk = &encoded[offset..offset + bpp];
                let raw = match self.model {
                    ColorModel::Rgb24 => {
                        (chunk[0] as u32) << 16 | (chunk[1] as u32) << 8 | chunk[2] as u32
                    }
                    _ => LittleEndian::read_u16(chunk) as u32,
                };
                self.buf.set(x, y, decode_color(self.model, raw));
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

        let bpp = self.bytes_per_pixel();
        let stride_bytes = self.desc.row_stride_for(width) / 8;
        self.out.clear();
        self.out.resize(stride_bytes * height, 0);
        for y in 0..height {
            for x in 0..width {
                let raw = encode_color(self.model, pixels.get(x, y));
                let offset = y * stride_bytes + x * bpp;
                let chunk = &mut self.out[offset..offset + bpp];
                match self.model {
                    ColorModel::Rgb24 => {
                        chunk[0] = (raw >> 16) as u8;
                        chunk[1] = (raw >> 8) as u8;
                        chunk[2] = raw as u8;
                    }
                    _ => LittleEndian::write_u16(chunk, raw as u16),
                }
            }
        }
        Ok(&self.out)
    }
}
