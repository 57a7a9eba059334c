// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Terminfo file headers
//!
//! Headers are validated against the capability registry and against the
//! size of the buffer before any section is read.

use std::array::from_fn;

use crate::{
    caps::{BOOLEAN_COUNT, NUMBER_COUNT, STRING_COUNT},
    cursor::ByteCursor,
    decode::Error,
    section::{NumberWidth, read_int16_array},
};

/// Magic number of the original format with 16-bit numbers
pub const MAGIC: u16 = 0o432;

/// Magic number of the ncurses 6.1 format with 32-bit numbers
pub const MAGIC_WIDE: u16 = 0o1036;

/// Files of the original format are smaller than this
pub const MAX_FILE_SIZE: usize = 4096;

/// Files of the 32-bit format are smaller than this
pub const MAX_FILE_SIZE_WIDE: usize = 32768;

/// Size limit for a buffer, chosen by its leading magic number
pub fn max_file_size(buffer: &[u8]) -> usize {
    if buffer.starts_with(&MAGIC_WIDE.to_le_bytes()) {
        MAX_FILE_SIZE_WIDE
    } else {
        MAX_FILE_SIZE
    }
}

/// Read the magic number and return the number width it stands for
pub fn read_magic(cursor: &mut ByteCursor<'_>) -> Result<NumberWidth, Error> {
    match cursor.read_i16()? as u16 {
        MAGIC => Ok(NumberWidth::Narrow),
        MAGIC_WIDE => Ok(NumberWidth::Wide),
        _ => Err(Error::InvalidMagic),
    }
}

/// Read five header fields, rejecting negative ones with `error`
fn read_fields(cursor: &mut ByteCursor<'_>, error: Error) -> Result<[usize; 5], Error> {
    let fields = read_int16_array(cursor, 5)?;
    if fields.iter().any(|field| *field < 0) {
        return Err(error);
    }
    Ok(from_fn(|index| fields[index] as usize))
}

/// Header of the standard capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Size of the terminal names, including the final NUL
    pub name_size: usize,
    pub bool_count: usize,
    pub num_count: usize,
    pub string_count: usize,
    /// Size of the string data
    pub table_size: usize,
    pub number_width: NumberWidth,
}

impl Header {
    /// Read and validate the header that follows the magic number
    pub fn read(cursor: &mut ByteCursor<'_>, number_width: NumberWidth) -> Result<Self, Error> {
        let [name_size, bool_count, num_count, string_count, table_size] =
            read_fields(cursor, Error::InvalidHeader)?;
        let header = Self {
            name_size,
            bool_count,
            num_count,
            string_count,
            table_size,
            number_width,
        };

        if bool_count > BOOLEAN_COUNT || num_count > NUMBER_COUNT || string_count > STRING_COUNT {
            return Err(Error::InvalidHeader);
        }

        if cursor.remaining() < header.section_length() {
            return Err(Error::UnexpectedEnd);
        }

        Ok(header)
    }

    /// Bytes taken by the names and the standard capabilities
    ///
    /// The alignment pad after the booleans is only required when numbers or
    /// strings follow it.
    pub const fn section_length(&self) -> usize {
        let pad = if self.num_count + self.string_count + self.table_size > 0 {
            (self.name_size + self.bool_count) % 2
        } else {
            0
        };
        self.name_size
            + self.bool_count
            + pad
            + self.num_count * self.number_width.bytes()
            + self.string_count * 2
            + self.table_size
    }
}

/// Header of the extended capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtendedHeader {
    pub bool_count: usize,
    pub num_count: usize,
    pub string_count: usize,
    /// Number of entries in the string table, values and names together
    pub offset_count: usize,
    /// Size of the string data
    pub table_size: usize,
    pub number_width: NumberWidth,
}

impl ExtendedHeader {
    /// Read and validate the extended header
    ///
    /// The extended section must end exactly at the end of the buffer.
    pub fn read(cursor: &mut ByteCursor<'_>, number_width: NumberWidth) -> Result<Self, Error> {
        let [bool_count, num_count, string_count, offset_count, table_size] =
            read_fields(cursor, Error::InvalidExtendedHeader)?;
        let header = Self {
            bool_count,
            num_count,
            string_count,
            offset_count,
            table_size,
            number_width,
        };

        // One name for every capability and one value for every string
        if offset_count != bool_count + num_count + 2 * string_count {
            return Err(Error::InvalidExtendedHeader);
        }

        if cursor.remaining() != header.section_length() {
            return Err(Error::InvalidExtendedHeader);
        }

        Ok(header)
    }

    /// Bytes taken by the extended capabilities after the header
    pub const fn section_length(&self) -> usize {
        self.bool_count
            + self.bool_count % 2
            + self.num_count * self.number_width.bytes()
            + self.offset_count * 2
            + self.table_size
    }
}
