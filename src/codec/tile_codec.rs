// src/codec/tile_codec.rs

//! The decode/encode contract every codec satisfies, and the shared
//! precondition checks behind it.

use std::sync::Arc;

use thiserror::Error;

use super::element::ArrangerElement;
use super::format::FormatDescriptor;
use crate::color::native::ColorBuffer;
use crate::color::palette::{ColorError, Palette};
use crate::stream::bit_stream::StreamError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The encoded region is smaller than the format's declared storage
    /// size. Contract violation: indicates caller misuse such as reading
    /// past end of file. Never partially decoded.
    #[error("codec '{codec}' requires {expected_bits} bits of encoded data but only {actual_bits} were supplied")]
    BufferTooSmall {
        codec: String,
        expected_bits: usize,
        actual_bits: usize,
    },
    /// Element or buffer dimensions disagree with what the codec declares.
    #[error("codec '{codec}' expected a {expected_width}x{expected_height} element but got {actual_width}x{actual_height}")]
    DimensionMismatch {
        codec: String,
        expected_width: usize,
        expected_height: usize,
        actual_width: usize,
        actual_height: usize,
    },
    /// Requested element dimensions are not a legal resize of this format.
    #[error("codec '{codec}' cannot use a {width}x{height} element: dimensions must be positive multiples of {increment}")]
    InvalidResize {
        codec: String,
        width: usize,
        height: usize,
        increment: usize,
    },
    #[error("no codec registered under the name '{0}'")]
    UnknownCodec(String),
    #[error(transparent)]
    Stream(#[from] StreamError),
    #[error(transparent)]
    Color(#[from] ColorError),
}

pub type Result<T> = std::result::Result<T, CodecError>;

/// A per-format decode/encode engine.
///
/// A codec instance owns mutable scratch state (its bit stream and cached
/// buffers) and is not safe for concurrent use; callers serialize access or
/// use one instance per worker. Returned references stay valid until the
/// next call on the same instance.
pub trait TileCodec {
    fn descriptor(&self) -> &FormatDescriptor;

    /// Decodes one element from `encoded` into a native color buffer.
    ///
    /// `encoded` must hold at least the element's storage size; a shorter
    /// buffer fails fast with [`CodecError::BufferTooSmall`] and no partial
    /// output. The returned buffer is scratch reused across calls.
    fn decode_element(
        &mut self,
        element: &ArrangerElement,
        encoded: &[u8],
    ) -> Result<&ColorBuffer>;

    /// Encodes a native color buffer back into the on-disk representation.
    ///
    /// `pixels` dimensions must match the element's. For indexed formats a
    /// color missing from the palette is reported, never clamped.
    fn encode_element(
        &mut self,
        element: &ArrangerElement,
        pixels: &ColorBuffer,
    ) -> Result<&[u8]>;
}

/// Validates element dimensions against the descriptor and returns the
/// effective geometry for this call.
///
/// Resizable formats accept any positive multiple of `resize_increment`;
/// fixed formats require exactly the descriptor dimensions.
pub(crate) fn effective_dims(
    desc: &FormatDescriptor,
    element: &ArrangerElement,
) -> Result<(usize, usize)> {
    let (w, h) = (element.width, element.height);
    if w == desc.width && h == desc.height {
        return Ok((w, h));
    }
    if !desc.can_resize() {
        return Err(CodecError::DimensionMismatch {
            codec: desc.name.clone(),
            expected_width: desc.width,
            expected_height: desc.height,
            actual_width: w,
            actual_height: h,
        });
    }
    let inc = desc.resize_increment.max(1);
    if w == 0 || h == 0 || w % inc != 0 || h % inc != 0 {
        return Err(CodecError::InvalidResize {
            codec: desc.name.clone(),
            width: w,
            height: h,
            increment: inc,
        });
    }
    Ok((w, h))
}

/// Fails fast when the encoded region cannot hold one full element.
pub(crate) fn ensure_encoded_len(
    desc: &FormatDescriptor,
    expected_bits: usize,
    encoded: &[u8],
) -> Result<()> {
    let actual_bits = encoded.len() * 8;
    if actual_bits < expected_bits {
        return Err(CodecError::BufferTooSmall {
            codec: desc.name.clone(),
            expected_bits,
            actual_bits,
        });
    }
    Ok(())
}

/// Fails when the pixel buffer handed to encode does not match the
/// element's geometry.
pub(crate) fn ensure_pixel_dims(
    desc: &FormatDescriptor,
    width: usize,
    height: usize,
    pixels: &ColorBuffer,
) -> Result<()> {
    if pixels.width() != width || pixels.height() != height {
        return Err(CodecError::DimensionMismatch {
            codec: desc.name.clone(),
            expected_width: width,
            expected_height: height,
            actual_width: pixels.width(),
            actual_height: pixels.height(),
        });
    }
    Ok(())
}

/// The element's palette, or the codec's default when it carries none.
pub(crate) fn element_palette(
    element: &ArrangerElement,
    default: &Arc<Palette>,
) -> Arc<Palette> {
    element
        .palette
        .clone()
        .unwrap_or_else(|| Arc::clone(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_dims_rejects_bad_resize() {
        let desc = FormatDescriptor::tiled("test", 8, 8, 2);
        let element = ArrangerElement::new(12, 8, 0);
        assert!(matches!(
            effective_dims(&desc, &element),
            Err(CodecError::InvalidResize { width: 12, .. })
        ));

        let element = ArrangerElement::new(16, 24, 0);
        assert_eq!(effective_dims(&desc, &element).unwrap(), (16, 24));
    }

    #[test]
    fn test_ensure_encoded_len() {
        let desc = FormatDescriptor::tiled("test", 8, 8, 2);
        assert!(ensure_encoded_len(&desc, 128, &[0u8; 16]).is_ok());
        let err = ensure_encoded_len(&desc, 128, &[0u8; 15]).unwrap_err();
        assert!(matches!(
            err,
            CodecError::BufferTooSmall {
                expected_bits: 128,
                actual_bits: 120,
                ..
            }
        ));
    }
}
