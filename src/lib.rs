//! # Retrotile
//!
//! A library for decoding and encoding pixel graphics stored in arbitrary,
//! console-specific binary tile formats (NES, SNES, Genesis, Game Boy, PSX,
//! GBA, ...) into and out of a uniform in-memory RGBA representation.
//!
//! This library is organized into several modules:
//! - `utils`: Error handling shared across the crate
//! - `stream`: Bit-addressable reading and writing over byte buffers
//! - `pattern`: The bit-layout pattern language and its compiler
//! - `color`: Native/foreign color conversion and palettes
//! - `codec`: Per-format decode/encode engines and the codec registry

// Re-export commonly used types at the crate root
pub use utils::error::{Result, TileError};

// Core modules
pub mod utils {
    pub mod error;
}

pub mod stream {
    pub mod bit_stream;

    pub use bit_stream::{BitStream, StreamError};
}

pub mod pattern {
    pub mod compiler;
    pub mod pattern_list;

    pub use compiler::{PatternDefinition, PatternError, compile};
    pub use pattern_list::{PatternList, PixelPacking, PlaneCoordinate};
}

pub mod color {
    pub mod foreign;
    pub mod native;
    pub mod palette;

    pub use foreign::ColorModel;
    pub use native::{ColorBuffer, NativeColor};
    pub use palette::{ColorError, Palette};
}

pub mod codec {
    pub mod chunky;
    pub mod direct;
    pub mod element;
    pub mod format;
    pub mod patterned;
    pub mod planar;
    pub mod registry;
    pub mod tile_codec;

    pub use chunky::ChunkyCodec;
    pub use direct::DirectCodec;
    pub use element::ArrangerElement;
    pub use format::{CodecCapabilities, FormatDescriptor, Layout};
    pub use patterned::PatternCodec;
    pub use planar::PlanarCodec;
    pub use registry::{BatchReport, CodecRegistry};
    pub use tile_codec::{CodecError, TileCodec};
}

// Public API exports
pub use codec::{ArrangerElement, CodecRegistry, FormatDescriptor, TileCodec};
pub use color::{ColorBuffer, NativeColor, Palette};
pub use pattern::{PatternList, PixelPacking, PlaneCoordinate};
pub use stream::BitStream;
