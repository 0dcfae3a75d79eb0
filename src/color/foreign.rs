// src/color/foreign.rs

//! Conversion between the canonical native color and console bit-packed
//! ("foreign") color encodings.
//!
//! Channel orders and bit widths are per-model constants. Narrowing an 8-bit
//! channel truncates its low bits; widening a 5-bit channel replicates its
//! high bits into the low positions, so narrow-widen-narrow is stable.

use super::native::NativeColor;

/// A console's direct-color bit packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorModel {
    /// 15-bit BGR, blue in the high bits (SNES CGRAM, GBA).
    Bgr15,
    /// 15-bit BGR plus a 1-bit alpha flag in bit 15 (PSX VRAM).
    Abgr16,
    /// 15-bit RGB, red in the high bits.
    Rgb15,
    /// 24-bit RGB, 8 bits per channel.
    Rgb24,
}

impl ColorModel {
    /// Storage width of one packed color in bits.
    pub const fn bit_width(self) -> usize {
        match self {
            ColorModel::Bgr15 | ColorModel::Abgr16 | ColorModel::Rgb15 => 16,
            ColorModel::Rgb24 => 24,
        }
    }
}

#[inline]
const fn expand5(v: u8) -> u8 {
    (v << 3) | (v >> 2)
}

/// Converts a packed foreign color into the canonical native color.
pub fn decode_color(model: ColorModel, raw: u32) -> NativeColor {
    match model {
        ColorModel::Bgr15 => NativeColor::opaque(
            expand5((raw & 0x1F) as u8),
            expand5((raw >> 5 & 0x1F) as u8),
            expand5((raw >> 10 & 0x1F) as u8),
        ),
        ColorModel::Abgr16 => NativeColor::new(
            expand5((raw & 0x1F) as u8),
            expand5((raw >> 5 & 0x1F) as u8),
            expand5((raw >> 10 & 0x1F) as u8),
            if raw >> 15 & 1 != 0 { 255 } else { 0 },
        ),
        ColorModel::Rgb15 => NativeColor::opaque(
            expand5((raw >> 10 & 0x1F) as u8),
            expand5((raw >> 5 & 0x1F) as u8),
            expand5((raw & 0x1F) as u8),
        ),
        ColorModel::Rgb24 => NativeColor::opaque(
            (raw >> 16 & 0xFF) as u8,
            (raw >> 8 & 0xFF) as u8,
            (raw & 0xFF) as u8,
        ),
    }
}

/// Converts a native color into a packed foreign color. Lossy where the
/// target channel is narrower than 8 bits.
pub fn encode_color(model: ColorModel, color: NativeColor) -> u32 {
    let (r5, g5, b5) = (
        (color.r >> 3) as u32,
        (color.g >> 3) as u32,
        (color.b >> 3) as u32,
    );
    match model {
        ColorModel::Bgr15 => b5 << 10 | g5 << 5 | r5,
        ColorModel::Abgr16 => {
            let a = if color.a >= 128 { 1u32 } else { 0 };
            a << 15 | b5 << 10 | g5 << 5 | r5
        }
        ColorModel::Rgb15 => r5 << 10 | g5 << 5 | b5,
        ColorModel::Rgb24 => (color.r as u32) << 16 | (color.g as u32) << 8 | color.b as u32,
    }
}
