// src/codec/format.rs

//! Static per-format metadata.

use bitflags::bitflags;

/// How a format's elements map to file regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Each element is addressed independently at its own file offset.
    Tiled,
    /// One contiguous image, rows packed back to back.
    Linear,
    /// One contiguous image occupying the whole source.
    Single,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CodecCapabilities: u8 {
        /// Elements may use dimensions other than the descriptor defaults.
        const CAN_RESIZE = 1 << 0;
        /// The codec supports the encode direction.
        const CAN_ENCODE = 1 << 1;
    }
}

/// Immutable metadata describing one on-disk format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub name: String,
    /// Default element width in pixels.
    pub width: usize,
    /// Default element height in pixels.
    pub height: usize,
    pub layout: Layout,
    /// Bits per pixel.
    pub color_depth: usize,
    /// Total bits required to encode one default-sized element.
    pub storage_size_bits: usize,
    pub capabilities: CodecCapabilities,
    /// Granularity constraint on resized element dimensions.
    pub resize_increment: usize,
    /// On-disk bits per row for linear layouts whose rows do not pack
    /// tightly to the pixel width. Zero means tight packing.
    pub row_stride_bits: usize,
}

impl FormatDescriptor {
    /// A tiled format with tightly packed storage.
    pub fn tiled(name: impl Into<String>, width: usize, height: usize, color_depth: usize) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            layout: Layout::Tiled,
            color_depth,
            storage_size_bits: width * height * color_depth,
            capabilities: CodecCapabilities::CAN_RESIZE | CodecCapabilities::CAN_ENCODE,
            resize_increment: 8,
            row_stride_bits: 0,
        }
    }

    /// A linear format addressing one contiguous image.
    pub fn linear(name: impl Into<String>, width: usize, height: usize, color_depth: usize) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            layout: Layout::Linear,
            color_depth,
            storage_size_bits: width * height * color_depth,
            capabilities: CodecCapabilities::CAN_RESIZE | CodecCapabilities::CAN_ENCODE,
            resize_increment: 1,
            row_stride_bits: 0,
        }
    }

    /// On-disk bits per row of the given pixel width: the declared stride,
    /// or the tight row size when no stride is set or the row outgrows it.
    pub fn row_stride_for(&self, width: usize) -> usize {
        (width * self.color_depth).max(self.row_stride_bits)
    }

    /// Storage bits for an element of the given dimensions, stride included.
    pub fn storage_bits_for(&self, width: usize, height: usize) -> usize {
        self.row_stride_for(width) * height
    }

    pub fn can_resize(&self) -> bool {
        self.capabilities.contains(CodecCapabilities::CAN_RESIZE)
    }
}
