// src/utils/error.rs

use thiserror::Error;

use crate::codec::tile_codec::CodecError;
use crate::color::palette::ColorError;
use crate::pattern::compiler::PatternError;
use crate::stream::bit_stream::StreamError;

/// Main error type for the retrotile library.
///
/// Recoverable validation failures (pattern compilation, palette misses)
/// and fatal contract violations (buffer-size mismatches, out-of-range
/// stream access) both flow through this type; the distinction is carried
/// by the variant, not by a separate channel.
#[derive(Error, Debug)]
pub enum TileError {
    /// Bit-level access outside a stream's declared length
    #[error(transparent)]
    Stream(#[from] StreamError),
    /// A codec contract violation or decode/encode failure
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// A color conversion or palette lookup failure
    #[error(transparent)]
    Color(#[from] ColorError),
    /// One or more pattern compilation failures, collected together
    #[error("pattern compilation failed with {} error(s)", .0.len())]
    PatternCompile(Vec<PatternError>),
}

impl From<Vec<PatternError>> for TileError {
    fn from(errors: Vec<PatternError>) -> Self {
        TileError::PatternCompile(errors)
    }
}

/// A specialized `Result` type for retrotile operations.
pub type Result<T> = std::result::Result<T, TileError>;
