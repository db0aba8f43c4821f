//! Binary reader for zero-copy parsing of byte slices.
//!
//! This module provides [`BinaryReader`], a cursor-like type that efficiently
//! reads binary data from a byte slice without copying.

use byteorder::{ByteOrder, LittleEndian};
use zerocopy::FromBytes;

use crate::{varint, Error, Result};

/// A binary reader that provides zero-copy reading from a byte slice.
///
/// Maintains a position into the underlying buffer and hands out subslices
/// without copying. All multi-byte integers are little-endian, matching the
/// wire formats Veles parses.
///
/// # Example
///
/// ```
/// use veles_common::BinaryReader;
///
/// let data = [0x96, 0x01, 0x02, b'h', b'i'];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_varint().unwrap(), 150);
/// assert_eq!(reader.read_prefixed_str().unwrap(), "hi");
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    /// Create a new reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Create a new reader starting at a specific position.
    #[inline]
    pub const fn new_at(data: &'a [u8], position: usize) -> Self {
        Self { data, position }
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Get the remaining bytes as a slice.
    #[inline]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.position.min(self.data.len())..]
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::UnexpectedEof {
                needed: count,
                available: self.remaining(),
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Peek at the next byte without advancing.
    #[inline]
    pub fn peek_u8(&self) -> Result<u8> {
        self.peek_bytes(1).map(|b| b[0])
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    /// Read a signed byte.
    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        self.read_u8().map(|b| b as i8)
    }

    /// Read a boolean (non-zero = true).
    #[inline]
    pub fn read_bool(&mut self) -> Result<bool> {
        self.read_u8().map(|b| b != 0)
    }

    /// Read a little-endian u16.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_bytes(2).map(LittleEndian::read_u16)
    }

    /// Read a little-endian i16.
    #[inline]
    pub fn read_i16(&mut self) -> Result<i16> {
        self.read_bytes(2).map(LittleEndian::read_i16)
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_bytes(4).map(LittleEndian::read_u32)
    }

    /// Read a little-endian i32.
    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_bytes(4).map(LittleEndian::read_i32)
    }

    /// Read a little-endian i64.
    #[inline]
    pub fn read_i64(&mut self) -> Result<i64> {
        self.read_bytes(8).map(LittleEndian::read_i64)
    }

    /// Read a little-endian u64.
    #[inline]
    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_bytes(8).map(LittleEndian::read_u64)
    }

    /// Read a little-endian f32.
    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_bytes(4).map(LittleEndian::read_f32)
    }

    /// Read a little-endian f64.
    #[inline]
    pub fn read_f64(&mut self) -> Result<f64> {
        self.read_bytes(8).map(LittleEndian::read_f64)
    }

    /// Read a 7-bit variable-length unsigned integer.
    ///
    /// Errors carry the absolute offset of the integer's first byte.
    #[inline]
    pub fn read_varint(&mut self) -> Result<u32> {
        let (value, consumed) = varint::decode_at(self.data, self.position)?;
        self.position += consumed;
        Ok(value)
    }

    /// Read a varint byte count followed by that many UTF-8 bytes.
    ///
    /// There is no terminator; the declared length is validated against the
    /// remaining buffer before anything is sliced.
    pub fn read_prefixed_str(&mut self) -> Result<&'a str> {
        let offset = self.position;
        let declared = self.read_varint()? as usize;
        if self.remaining() < declared {
            return Err(Error::TruncatedString {
                offset,
                declared,
                available: self.remaining(),
            });
        }
        let bytes = self.read_bytes(declared)?;
        std::str::from_utf8(bytes).map_err(Error::Utf8)
    }

    /// Read a struct using zerocopy.
    ///
    /// The struct must implement `FromBytes` from the zerocopy crate.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            needed: size,
            available: bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_primitives() {
        let data = [
            0x01u8, 0x02, 0x03, 0x04, // u32: 0x04030201
            0xFF, 0xFF, 0xFF, 0xFF, // u32: 0xFFFFFFFF
        ];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_u32().unwrap(), 0x04030201);
        assert_eq!(reader.read_u32().unwrap(), 0xFFFFFFFF);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_read_prefixed_str() {
        let data = [0x05, b'h', b'e', b'l', b'l', b'o', 0x00];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_prefixed_str().unwrap(), "hello");
        assert_eq!(reader.read_prefixed_str().unwrap(), "");
        assert!(reader.is_empty());
    }

    #[test]
    fn test_truncated_prefixed_str() {
        let data = [0x05, b'h', b'i'];
        let mut reader = BinaryReader::new(&data);

        assert!(matches!(
            reader.read_prefixed_str(),
            Err(Error::TruncatedString {
                offset: 0,
                declared: 5,
                available: 2,
            })
        ));
    }

    #[test]
    fn test_varint_error_offset_is_absolute() {
        let data = [0x00, 0x00, 0x80];
        let mut reader = BinaryReader::new(&data);
        reader.read_bytes(2).unwrap();

        assert!(matches!(
            reader.read_varint(),
            Err(Error::TruncatedVarint { offset: 2 })
        ));
    }

    #[test]
    fn test_peek_does_not_advance() {
        let data = [0x01, 0x02];
        let reader = BinaryReader::new(&data);

        assert_eq!(reader.peek_u8().unwrap(), 0x01);
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_eof_error() {
        let data = [0x01, 0x02];
        let mut reader = BinaryReader::new(&data);

        assert!(reader.read_u32().is_err());
    }
}
