// src/color/native.rs

//! The canonical 32-bit RGBA color and the 2D buffers codecs fill.

use bytemuck::{Pod, Zeroable};

/// Canonical native color: fixed-point R, G, B, A, each 0-255.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct NativeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl NativeColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const TRANSPARENT: NativeColor = NativeColor::new(0, 0, 0, 0);
}

/// A row-major rectangular buffer of native colors.
///
/// Codecs keep one of these as reusable scratch, resizing only when element
/// dimensions change, so repeated decode calls do not reallocate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorBuffer {
    width: usize,
    height: usize,
    pixels: Vec<NativeColor>,
}

impl ColorBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![NativeColor::TRANSPARENT; width * height],
        }
    }

    /// Resizes in place. Contents are unspecified afterwards; callers
    /// overwrite every pixel. No-op when dimensions already match.
    pub fn resize(&mut self, width: usize, height: usize) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, NativeColor::TRANSPARENT);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> NativeColor {
        self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, color: NativeColor) {
        self.pixels[y * self.width + x] = color;
    }

    pub fn pixels(&self) -> &[NativeColor] {
        &self.pixels
    }

    /// Raw RGBA byte view, 4 bytes per pixel, for display or persistence.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}
