// src/codec/planar.rs

//! Indexed codecs for planar formats whose bit layout is a regular function
//! of `(x, y, plane)`: per-pixel offsets are computed arithmetically, no
//! compiled pattern involved.
//!
//! The layouts differ only in how planes are grouped. NES stores each plane
//! as a whole-tile block; SNES and Game Boy interleave a pair of planes per
//! scanline; SNES 4bpp stores two such paired blocks back to back. All of
//! these fall out of one parameter, the number of planes per row-interleaved
//! group.

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

/// A formula-driven planar indexed codec.
pub struct PlanarCodec {
    desc: FormatDescriptor,
    /// Planes per row-interleaved group. 1 means whole-plane blocks.
    group_size: usize,
    default_palette: Arc<Palette>,
    stream: BitStream,
    out: BitStream,
    indices: Vec<u8>,
    buf: ColorBuffer,
}

/// Visits every bit of one element in on-disk order, yielding the natural
/// pixel index and the plane it belongs to.
fn visit_disk_bits(
    planes: usize,
    group_size: usize,
    width: usize,
    height: usize,
    mut f: impl FnMut(usize, usize) -> Result<()>,
) -> Result<()> {
    for group in 0..planes / group_size {
        for y in 0..height {
            for within in 0..group_size {
                let plane = group * group_size + within;
                for x in 0..width {
                    f(y * width + x, plane)?;
                }
            }
        }
    }
    Ok(())
}

impl PlanarCodec {
    pub fn new(desc: FormatDescriptor, group_size: usize) -> Self {
        assert!(group_size >= 1 && desc.color_depth % group_size == 0);
        let default_palette = Arc::new(Palette::grayscale(desc.color_depth));
        let storage = desc.storage_size_bits;
        Self {
            desc,
            group_size,
            default_palette,
            stream: BitStream::open_write(0, 1),
            out: BitStream::open_write(storage, 1),
            indices: Vec::new(),
            buf: ColorBuffer::new(0, 0),
        }
    }

    /// NES CHR 1bpp: one plane, one 8-byte block per 8x8 tile.
    pub fn nes_1bpp() -> Self {
        Self::new(FormatDescriptor::tiled("NES 1bpp", 8, 8, 1), 1)
    }

    /// NES CHR 2bpp: plane 0 as an 8-byte block, then plane 1.
    pub fn nes_2bpp() -> Self {
        Self::new(FormatDescriptor::tiled("NES 2bpp", 8, 8, 2), 1)
    }

    /// SNES 2bpp: planes 0 and 1 interleaved per scanline.
    pub fn snes_2bpp() -> Self {
        Self::new(FormatDescriptor::tiled("SNES 2bpp", 8, 8, 2), 2)
    }

    /// Game Boy 2bpp: identical interleave to SNES 2bpp.
    pub fn gb_2bpp() -> Self {
        Self::new(FormatDescriptor::tiled("Game Boy 2bpp", 8, 8, 2), 2)
    }

    /// SNES 4bpp: a row-interleaved bp0/bp1 block, then a bp2/bp3 block.
    pub fn snes_4bpp() -> Self {
        Self::new(FormatDescriptor::tiled("SNES 4bpp", 8, 8, 4), 2)
    }
}

impl TileCodec for PlanarCodec {
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
        self.indices.clear();
        self.indices.resize(width * height, 0);

        let stream = &mut self.stream;
        let indices = &mut self.indices;
        visit_disk_bits(
            self.desc.color_depth,
            self.group_size,
            width,
            height,
            |pixel, plane| {
                indices[pixel] |= stream.read_bit()? << plane;
                Ok(())
            },
        )?;

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
        let bits = self.desc.storage_bits_for(width, height);

        // Resolve every color to a palette index up front so a miss fails
        // before any output is produced.
        let palette = element_palette(element, &self.default_palette);
        let depth = self.desc.color_depth;
        self.indices.clear();
        for y in 0..height {
            for x in 0..width {
                let index = palette.exact_index(pixels.get(x, y))?;
                if index >= 1 << depth {
                    // Palette entry exists but cannot be stored at this depth.
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
        let out = &mut self.out;
        let indices = &self.indices;
        visit_disk_bits(
            self.desc.color_depth,
            self.group_size,
            width,
            height,
            |pixel, plane| {
                out.write_bit(indices[pixel] >> plane & 1)?;
                Ok(())
            },
        )?;
        Ok(self.out.data())
    }
}
