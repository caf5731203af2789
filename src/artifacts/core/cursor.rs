//! Big-endian cursor over an immutable byte slice
//!
//! Every read comes in two flavours: an absolute one (`*_at`) that leaves the
//! cursor where it is, and an advancing one. Short reads are reported as
//! [`Error::OutOfBounds`], never as end-of-data.

use crate::errors::{Error, Result};
use byteorder::{ByteOrder, NetworkEndian};

#[derive(Debug, Clone)]
pub struct ByteCursor<'b> {
    bytes: &'b [u8],
    position: usize,
}

impl<'b> ByteCursor<'b> {
    pub fn new(bytes: &'b [u8]) -> Self {
        ByteCursor { bytes, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    pub fn is_at_end(&self) -> bool {
        self.position == self.bytes.len()
    }

    /// Bytes from the current position to the end, without advancing
    pub fn rest(&self) -> &'b [u8] {
        &self.bytes[self.position..]
    }

    pub fn slice_at(&self, offset: usize, len: usize) -> Result<&'b [u8]> {
        let end = offset.checked_add(len).filter(|end| *end <= self.bytes.len());

        match end {
            Some(end) => Ok(&self.bytes[offset..end]),
            None => Err(Error::OutOfBounds {
                offset,
                needed: len,
                available: self.bytes.len().saturating_sub(offset),
            }),
        }
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'b [u8]> {
        let slice = self.slice_at(self.position, len)?;
        self.position += len;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    pub fn u8_at(&self, offset: usize) -> Result<u8> {
        Ok(self.slice_at(offset, 1)?[0])
    }

    pub fn u16_at(&self, offset: usize) -> Result<u16> {
        Ok(NetworkEndian::read_u16(self.slice_at(offset, 2)?))
    }

    pub fn u32_at(&self, offset: usize) -> Result<u32> {
        Ok(NetworkEndian::read_u32(self.slice_at(offset, 4)?))
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let value = self.u8_at(self.position)?;
        self.position += 1;
        Ok(value)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let value = self.u16_at(self.position)?;
        self.position += 2;
        Ok(value)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let value = self.u32_at(self.position)?;
        self.position += 4;
        Ok(value)
    }

    /// Read up to (not including) `delimiter` and step past it.
    ///
    /// Running out of bytes before the delimiter shows up is a truncation.
    pub fn read_until(&mut self, delimiter: u8) -> Result<&'b [u8]> {
        let rest = self.rest();

        match rest.iter().position(|&b| b == delimiter) {
            Some(len) => {
                self.position += len + 1;
                Ok(&rest[..len])
            }
            None => Err(Error::OutOfBounds {
                offset: self.bytes.len(),
                needed: 1,
                available: 0,
            }),
        }
    }

    /// NUL-terminated string; the NUL is consumed but not returned
    pub fn read_cstr(&mut self) -> Result<&'b [u8]> {
        self.read_until(0)
    }
}
