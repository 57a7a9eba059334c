// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Bounds-checked reading from a terminfo buffer

use crate::decode::Error;

/// Read position over an immutable buffer
///
/// Every read is checked against the end of the buffer before any byte is
/// returned, so a short buffer is reported as [`Error::UnexpectedEnd`].
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    pub const fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Return the next `count` bytes and advance past them
    pub fn read(&mut self, count: usize) -> Result<&'a [u8], Error> {
        if count > self.remaining() {
            return Err(Error::UnexpectedEnd);
        }
        let start = self.position;
        self.position += count;
        Ok(&self.buffer[start..self.position])
    }

    /// Skip a byte if needed to ensure 2-byte alignment
    ///
    /// The position never goes past the end of the buffer.
    pub const fn align(&mut self) {
        if self.position & 1 == 1 && self.position < self.buffer.len() {
            self.position += 1;
        }
    }

    /// Number of bytes left to read
    pub const fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    pub const fn position(&self) -> usize {
        self.position
    }

    pub const fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    /// Read a signed little-endian 16-bit number
    pub fn read_i16(&mut self) -> Result<i16, Error> {
        let bytes = self.read(2)?;
        Ok(i16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read a signed little-endian 32-bit number
    pub fn read_i32(&mut self) -> Result<i32, Error> {
        let bytes = self.read(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}
