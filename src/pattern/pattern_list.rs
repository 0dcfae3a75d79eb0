// src/pattern/pattern_list.rs

//! Compiled bit-layout patterns and their index tables.

/// Identifies one bit's logical position within a pixel grid that may span
/// multiple bit-planes. Value type; equality by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PlaneCoordinate {
    pub x: i16,
    pub y: i16,
    pub plane: i16,
}

impl PlaneCoordinate {
    pub const fn new(x: i16, y: i16, plane: i16) -> Self {
        Self { x, y, plane }
    }
}

/// Governs how multi-plane pixels are interleaved during compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelPacking {
    /// Each plane stored as a separate contiguous bit-run per scanline.
    Planar,
    /// All planes of one pixel stored contiguously before the next pixel.
    Chunky,
}

/// A compiled bit-layout pattern.
///
/// Holds a pair of O(1) index-lookup tables mapping between "natural" pixel
/// order and "on-disk" bit order for one scanline group of `pattern_size`
/// bits; a pattern-driven codec re-applies the tables per scanline. The
/// tables are exact inverses: `encode_index(decode_index(i)) == i` for every
/// `i` in `0..pattern_size`. Immutable once compiled; share via `Arc`.
#[derive(Debug, Clone)]
pub struct PatternList {
    name: String,
    width: usize,
    height: usize,
    planes: usize,
    pattern_size: usize,
    packing: PixelPacking,
    decode: Vec<PlaneCoordinate>,
    encode: Vec<usize>,
}

impl PatternList {
    /// Built only by the compiler, which guarantees bijectivity.
    pub(crate) fn from_tables(
        name: String,
        width: usize,
        height: usize,
        planes: usize,
        packing: PixelPacking,
        decode: Vec<PlaneCoordinate>,
    ) -> Self {
        let pattern_size = decode.len();
        let mut encode = vec![0usize; pattern_size];
        for (disk_index, coord) in decode.iter().enumerate() {
            encode[coord.plane as usize * width + coord.x as usize] = disk_index;
        }
        Self {
            name,
            width,
            height,
            planes,
            pattern_size,
            packing,
            decode,
            encode,
        }
    }

    /// Maps a linear on-disk bit index to its natural coordinate.
    ///
    /// Out-of-range input is a caller error and panics.
    #[inline]
    pub fn decode_index(&self, disk_index: usize) -> PlaneCoordinate {
        self.decode[disk_index]
    }

    /// Maps a natural coordinate to its linear on-disk bit index.
    ///
    /// Out-of-range input is a caller error and panics.
    #[inline]
    pub fn encode_index(&self, coord: PlaneCoordinate) -> usize {
        self.encode[coord.plane as usize * self.width + coord.x as usize]
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn planes(&self) -> usize {
        self.planes
    }

    /// Total bits covered by one application of the pattern.
    pub fn pattern_size(&self) -> usize {
        self.pattern_size
    }

    pub fn packing(&self) -> PixelPacking {
        self.packing
    }
}
