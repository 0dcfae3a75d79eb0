// src/stream/bit_stream.rs

//! Bit-granular sequential and random access over a byte buffer.
//!
//! Console tile formats address individual bits at arbitrary offsets with no
//! byte-alignment guarantees, so every codec in this crate performs its I/O
//! through [`BitStream`] rather than touching bytes directly. Bits are read
//! and written most-significant-bit first within each byte.

use bitvec::prelude::*;
use thiserror::Error;

/// Largest transfer `read_bits`/`write_bits` accepts in one call.
pub const MAX_BIT_TRANSFER: usize = 32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// Access past the declared bit length. This is a contract violation:
    /// the supplied buffer was too small for the declared format.
    #[error("bit access out of range: cursor {position} + {requested} bits exceeds stream length {bit_len}")]
    OutOfRange {
        position: usize,
        requested: usize,
        bit_len: usize,
    },
    #[error("cannot transfer {requested} bits in one call (limit {MAX_BIT_TRANSFER})")]
    TooManyBits { requested: usize },
}

pub type Result<T> = std::result::Result<T, StreamError>;

/// A bit-addressable reader/writer over an owned byte buffer.
///
/// A stream owns its buffer exclusively for its lifetime and carries a
/// declared bit-length ceiling; any access beyond that ceiling fails with
/// [`StreamError::OutOfRange`] rather than silently truncating. Streams are
/// single-use-at-a-time: codecs construct one per instance and [`reload`]
/// or [`seek_absolute`] it between calls instead of re-allocating.
///
/// [`reload`]: BitStream::reload
/// [`seek_absolute`]: BitStream::seek_absolute
pub struct BitStream {
    bits: BitVec<u8, Msb0>,
    bit_len: usize,
    cursor: usize,
}

impl BitStream {
    /// Opens a read stream over a copy of `data`, declared `bit_len` bits long.
    pub fn open_read(data: &[u8], bit_len: usize) -> Result<Self> {
        if bit_len > data.len() * 8 {
            return Err(StreamError::OutOfRange {
                position: 0,
                requested: bit_len,
                bit_len: data.len() * 8,
            });
        }
        Ok(Self {
            bits: BitVec::from_slice(data),
            bit_len,
            cursor: 0,
        })
    }

    /// Opens a write stream over a fresh zeroed buffer of `bit_len` bits,
    /// with the byte capacity rounded up to a multiple of `byte_alignment`.
    pub fn open_write(bit_len: usize, byte_alignment: usize) -> Self {
        let alignment = byte_alignment.max(1);
        let mut byte_len = bit_len.div_ceil(8);
        byte_len = byte_len.div_ceil(alignment) * alignment;
        Self {
            bits: bitvec![u8, Msb0; 0; byte_len * 8],
            bit_len,
            cursor: 0,
        }
    }

    /// Replaces the stream contents with `data` and rewinds the cursor.
    ///
    /// Reuses the existing allocation where possible, so a codec can decode
    /// many elements through one stream without churning the allocator.
    pub fn reload(&mut self, data: &[u8], bit_len: usize) -> Result<()> {
        if bit_len > data.len() * 8 {
            return Err(StreamError::OutOfRange {
                position: 0,
                requested: bit_len,
                bit_len: data.len() * 8,
            });
        }
        self.bits.clear();
        self.bits.extend_from_raw_slice(data);
        self.bit_len = bit_len;
        self.cursor = 0;
        Ok(())
    }

    /// Rewinds the write cursor and zeroes the buffer for a fresh encode.
    pub fn rewind_for_write(&mut self) {
        self.bits.fill(false);
        self.cursor = 0;
    }

    #[inline]
    fn check(&self, requested: usize) -> Result<()> {
        if requested > MAX_BIT_TRANSFER {
            return Err(StreamError::TooManyBits { requested });
        }
        if self.cursor + requested > self.bit_len {
            return Err(StreamError::OutOfRange {
                position: self.cursor,
                requested,
                bit_len: self.bit_len,
            });
        }
        Ok(())
    }

    /// Reads the bit at the cursor and advances by one.
    #[inline]
    pub fn read_bit(&mut self) -> Result<u8> {
        self.check(1)?;
        let bit = self.bits[self.cursor];
        self.cursor += 1;
        Ok(bit as u8)
    }

    /// Reads `count` bits (at most 32) MSB-first and advances the cursor.
    #[inline]
    pub fn read_bits(&mut self, count: usize) -> Result<u32> {
        if count == 0 {
            return Ok(0);
        }
        self.check(count)?;
        let value = self.bits[self.cursor..self.cursor + count].load_be::<u32>();
        self.cursor += count;
        Ok(value)
    }

    /// Convenience for byte-aligned formats; equivalent to `read_bits(8)`.
    #[inline]
    pub fn read_byte(&mut self) -> Result<u8> {
        Ok(self.read_bits(8)? as u8)
    }

    /// Writes a single bit at the cursor and advances by one.
    #[inline]
    pub fn write_bit(&mut self, bit: u8) -> Result<()> {
        self.check(1)?;
        self.bits.set(self.cursor, bit & 1 != 0);
        self.cursor += 1;
        Ok(())
    }

    /// Writes the low `count` bits of `value` MSB-first at the cursor.
    #[inline]
    pub fn write_bits(&mut self, count: usize, value: u32) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        self.check(count)?;
        let masked = if count == 32 {
            value
        } else {
            value & ((1u32 << count) - 1)
        };
        self.bits[self.cursor..self.cursor + count].store_be(masked);
        self.cursor += count;
        Ok(())
    }

    /// Equivalent to `write_bits(8, value)`.
    #[inline]
    pub fn write_byte(&mut self, value: u8) -> Result<()> {
        self.write_bits(8, value as u32)
    }

    /// Repositions the cursor. Seeking to the end (`bit_position == bit_len`)
    /// is legal; any subsequent read or write fails.
    pub fn seek_absolute(&mut self, bit_position: usize) -> Result<()> {
        if bit_position > self.bit_len {
            return Err(StreamError::OutOfRange {
                position: bit_position,
                requested: 0,
                bit_len: self.bit_len,
            });
        }
        self.cursor = bit_position;
        Ok(())
    }

    /// The underlying bytes. For a write stream this is the encoded output
    /// once encoding is complete.
    pub fn data(&self) -> &[u8] {
        self.bits.as_raw_slice()
    }

    /// Declared length in bits.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Current cursor position in bits.
    pub fn position(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_msb_first() {
        let mut stream = BitStream::open_read(&[0b1011_0001, 0b1100_0000], 16).unwrap();
        assert_eq!(stream.read_bit().unwrap(), 1);
        assert_eq!(stream.read_bit().unwrap(), 0);
        assert_eq!(stream.read_bits(6).unwrap(), 0b11_0001);
        assert_eq!(stream.read_byte().unwrap(), 0b1100_0000);
    }

    #[test]
    fn test_read_bits_spanning_bytes() {
        let mut stream = BitStream::open_read(&[0xAB, 0xCD, 0xEF], 24).unwrap();
        assert_eq!(stream.read_bits(12).unwrap(), 0xABC);
        assert_eq!(stream.read_bits(12).unwrap(), 0xDEF);
    }

    #[test]
    fn test_write_then_read_back_unchanged() {
        let mut stream = BitStream::open_read(&[0x5A, 0x3C], 16).unwrap();
        let value = stream.read_bits(11).unwrap();
        stream.seek_absolute(0).unwrap();
        stream.write_bits(11, value).unwrap();
        assert_eq!(stream.data(), &[0x5A, 0x3C]);
    }

    #[test]
    fn test_seek_then_read() {
        let mut stream = BitStream::open_read(&[0b0000_0100], 8).unwrap();
        stream.read_bits(3).unwrap();
        stream.seek_absolute(5).unwrap();
        assert_eq!(stream.read_bit().unwrap(), 1);
        stream.seek_absolute(5).unwrap();
        assert_eq!(stream.read_bit().unwrap(), 1);
    }

    #[test]
    fn test_read_past_end_fails() {
        let mut stream = BitStream::open_read(&[0xFF], 6).unwrap();
        stream.read_bits(6).unwrap();
        assert_eq!(
            stream.read_bit(),
            Err(StreamError::OutOfRange {
                position: 6,
                requested: 1,
                bit_len: 6,
            })
        );
    }

    #[test]
    fn test_declared_length_exceeding_buffer_fails() {
        assert!(BitStream::open_read(&[0xFF], 9).is_err());
    }

    #[test]
    fn test_open_write_alignment() {
        let stream = BitStream::open_write(12, 4);
        assert_eq!(stream.data().len(), 4);
        assert!(stream.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_write_past_end_fails() {
        let mut stream = BitStream::open_write(4, 1);
        stream.write_bits(4, 0xF).unwrap();
        assert!(stream.write_bit(1).is_err());
    }

    #[test]
    fn test_write_msb_first() {
        let mut stream = BitStream::open_write(16, 1);
        stream.write_bits(4, 0b1010).unwrap();
        stream.write_bits(12, 0xFFF).unwrap();
        assert_eq!(stream.data(), &[0b1010_1111, 0xFF]);
    }

    #[test]
    fn test_reload_rewinds() {
        let mut stream = BitStream::open_read(&[0xAA], 8).unwrap();
        stream.read_bits(8).unwrap();
        stream.reload(&[0x0F, 0xF0], 16).unwrap();
        assert_eq!(stream.position(), 0);
        assert_eq!(stream.read_byte().unwrap(), 0x0F);
    }

    #[test]
    fn test_too_many_bits() {
        let mut stream = BitStream::open_read(&[0; 8], 64).unwrap();
        assert_eq!(
            stream.read_bits(33),
            Err(StreamError::TooManyBits { requested: 33 })
        );
    }
}
