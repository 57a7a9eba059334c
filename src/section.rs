// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Readers for the capability arrays of a terminfo file

use std::{
    collections::{BTreeMap, BTreeSet},
    ops::Range,
};

use crate::{cursor::ByteCursor, decode::Error};

const ABSENT_ENTRY: i32 = -1;
const CANCELED_ENTRY: i32 = -2;

const TRUE_BYTE: u8 = 1;
const ABSENT_BYTE: u8 = ABSENT_ENTRY as u8;
const CANCELED_BYTE: u8 = CANCELED_ENTRY as u8;

/// Capabilities of one kind, indexed by their position in the file
///
/// An index is either present, canceled or absent. Absent indices are in
/// neither collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<T> {
    /// Present capabilities
    pub values: BTreeMap<usize, T>,
    /// Capabilities explicitly canceled with `@` in the source
    pub canceled: BTreeSet<usize>,
}

impl<T> Default for Section<T> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
            canceled: BTreeSet::new(),
        }
    }
}

impl<T> Section<T> {
    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(&index)
    }

    pub fn is_canceled(&self, index: usize) -> bool {
        self.canceled.contains(&index)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.canceled.is_empty()
    }

    /// Classify a raw value by the `-1`/`-2` sentinels and record it
    fn insert(
        &mut self,
        index: usize,
        raw: i32,
        value: impl FnOnce() -> Result<T, Error>,
    ) -> Result<(), Error> {
        match raw {
            CANCELED_ENTRY => {
                self.canceled.insert(index);
            }
            // tic never writes other negative values, treat them as absent
            ABSENT_ENTRY | i32::MIN..=-3 => {}
            _ => {
                self.values.insert(index, value()?);
            }
        }
        Ok(())
    }
}

/// Size of numeric capabilities, selected by the file magic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberWidth {
    /// Original format, 16-bit numbers
    Narrow,
    /// ncurses 6.1 format, 32-bit numbers
    Wide,
}

impl NumberWidth {
    /// Size of one number in bytes
    pub const fn bytes(self) -> usize {
        match self {
            Self::Narrow => 2,
            Self::Wide => 4,
        }
    }

    fn read(self, cursor: &mut ByteCursor<'_>) -> Result<i32, Error> {
        match self {
            Self::Narrow => cursor.read_i16().map(i32::from),
            Self::Wide => cursor.read_i32(),
        }
    }
}

/// Read `count` signed 16-bit numbers without interpreting them
pub fn read_int16_array(cursor: &mut ByteCursor<'_>, count: usize) -> Result<Vec<i16>, Error> {
    let bytes = cursor.read(count * 2)?;
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// Read `count` boolean bytes followed by the alignment pad
///
/// Every byte other than the sentinels is present, and only `1` is true.
pub fn read_bools(cursor: &mut ByteCursor<'_>, count: usize) -> Result<Section<bool>, Error> {
    let bytes = cursor.read(count)?;
    cursor.align();

    let mut section = Section::default();
    for (index, byte) in bytes.iter().enumerate() {
        match *byte {
            ABSENT_BYTE => {}
            CANCELED_BYTE => {
                section.canceled.insert(index);
            }
            byte => {
                section.values.insert(index, byte == TRUE_BYTE);
            }
        }
    }
    Ok(section)
}

/// Read `count` numbers of the given width
pub fn read_nums(
    cursor: &mut ByteCursor<'_>,
    count: usize,
    width: NumberWidth,
) -> Result<Section<i32>, Error> {
    // Check the whole array up front so a short buffer never yields a partial read
    let mut array = ByteCursor::new(cursor.read(count * width.bytes())?);

    let mut section = Section::default();
    for index in 0..count {
        let raw = width.read(&mut array)?;
        section.insert(index, raw, || Ok(raw))?;
    }
    Ok(section)
}

/// Read `count` string offsets and the `size` bytes of string data they refer to
pub fn read_strings(
    cursor: &mut ByteCursor<'_>,
    count: usize,
    size: usize,
) -> Result<Section<Vec<u8>>, Error> {
    let table = StringTable::read(cursor, count, size)?;
    table.values(0..count, 0)
}

/// String offsets together with the data blob they point into
#[derive(Debug)]
pub struct StringTable<'a> {
    offsets: Vec<i16>,
    data: &'a [u8],
}

impl<'a> StringTable<'a> {
    /// Read `count` offsets, `size` bytes of data and the alignment pad
    pub fn read(cursor: &mut ByteCursor<'a>, count: usize, size: usize) -> Result<Self, Error> {
        let offsets = read_int16_array(cursor, count)?;
        let data = cursor.read(size)?;
        cursor.align();
        Ok(Self { offsets, data })
    }

    pub const fn len(&self) -> usize {
        self.offsets.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// NUL terminated string starting at `offset` in the data, without the NUL
    pub fn get(&self, offset: usize) -> Result<&'a [u8], Error> {
        let Some(tail) = self.data.get(offset..) else {
            return Err(Error::InvalidStringTable);
        };
        match tail.iter().position(|byte| *byte == b'\0') {
            Some(length) => Ok(&tail[..length]),
            None => Err(Error::InvalidStringTable),
        }
    }

    /// Resolve the offsets in `slots` as capability values
    ///
    /// Offsets are relative to `base` in the data. The result is indexed from
    /// the start of `slots`.
    pub fn values(&self, slots: Range<usize>, base: usize) -> Result<Section<Vec<u8>>, Error> {
        let mut section = Section::default();
        for (index, offset) in self.slots(slots)?.iter().enumerate() {
            let raw = i32::from(*offset);
            section.insert(index, raw, || {
                self.get(base + raw as usize).map(<[u8]>::to_vec)
            })?;
        }
        Ok(section)
    }

    /// Resolve the offsets in `slots` as capability names
    ///
    /// Unlike values, every name slot must point to a string.
    pub fn names(&self, slots: Range<usize>, base: usize) -> Result<BTreeMap<usize, String>, Error> {
        let mut names = BTreeMap::new();
        for (index, offset) in self.slots(slots)?.iter().enumerate() {
            let Ok(offset) = usize::try_from(*offset) else {
                return Err(Error::InvalidStringTable);
            };
            let name = str::from_utf8(self.get(base + offset)?)?;
            names.insert(index, name.to_owned());
        }
        Ok(names)
    }

    fn slots(&self, slots: Range<usize>) -> Result<&[i16], Error> {
        self.offsets.get(slots).ok_or(Error::InvalidStringTable)
    }
}

#[cfg(test)]
mod test {
    use collection_literals::collection;

    use super::*;

    #[test]
    fn int16_array() {
        let buffer = [0x50, 0x00, 0xff, 0xff, 0xfe, 0xff, 0x00, 0x80];
        let mut cursor = ByteCursor::new(&buffer);
        let array = read_int16_array(&mut cursor, 4).unwrap();
        assert_eq!(array, vec![80, -1, -2, i16::MIN]);
        assert!(cursor.is_at_end());
    }

    #[test]
    fn int16_array_truncated() {
        let mut cursor = ByteCursor::new(&[0x50, 0x00, 0x01]);
        assert_eq!(read_int16_array(&mut cursor, 2), Err(Error::UnexpectedEnd));
    }

    #[test]
    fn bools_with_sentinels() {
        let buffer = [1, 0, 0xfe, 0xff, 1, 0x55];
        let mut cursor = ByteCursor::new(&buffer);
        cursor.read(1).unwrap();
        let section = read_bools(&mut cursor, 4).unwrap();
        assert_eq!(section.values, collection!(0 => false, 3 => true));
        assert_eq!(section.canceled, collection!(1));
        assert_eq!(section.get(2), None);
        // 1 + 4 bytes read, then padded to an even position
        assert_eq!(cursor.position(), 6);
    }

    #[test]
    fn narrow_numbers() {
        let buffer = [80, 0, 0xfe, 0xff, 24, 0, 0xff, 0xff, 0, 0];
        let mut cursor = ByteCursor::new(&buffer);
        let section = read_nums(&mut cursor, 5, NumberWidth::Narrow).unwrap();
        assert_eq!(section.values, collection!(0 => 80, 2 => 24, 4 => 0));
        assert_eq!(section.canceled, collection!(1));
        assert_eq!(section.get(3), None);
        assert!(!section.is_canceled(3));
    }

    #[test]
    fn wide_numbers() {
        let buffer = [0x00, 0x00, 0x00, 0x01, 0xfe, 0xff, 0xff, 0xff];
        let mut cursor = ByteCursor::new(&buffer);
        let section = read_nums(&mut cursor, 2, NumberWidth::Wide).unwrap();
        assert_eq!(section.values, collection!(0 => 0x0100_0000));
        assert_eq!(section.canceled, collection!(1));
    }

    #[test]
    fn numbers_truncated() {
        let mut cursor = ByteCursor::new(&[80, 0, 24]);
        assert_eq!(
            read_nums(&mut cursor, 2, NumberWidth::Narrow),
            Err(Error::UnexpectedEnd)
        );
    }

    #[test]
    fn strings_with_sentinels() {
        let mut buffer = vec![];
        for offset in [0i16, -1, -2, 4, 6] {
            buffer.extend_from_slice(&offset.to_le_bytes());
        }
        buffer.extend_from_slice(b"\x1b[H\0\x07\0\0");
        let mut cursor = ByteCursor::new(&buffer);
        let section = read_strings(&mut cursor, 5, 7).unwrap();
        assert_eq!(
            section.values,
            collection!(0 => b"\x1b[H".to_vec(), 3 => b"\x07".to_vec(), 4 => vec![])
        );
        assert_eq!(section.canceled, collection!(2));
        assert!(cursor.is_at_end());
    }

    #[test]
    fn string_without_terminator() {
        let mut buffer = vec![];
        buffer.extend_from_slice(&0i16.to_le_bytes());
        buffer.extend_from_slice(b"abc");
        let mut cursor = ByteCursor::new(&buffer);
        assert_eq!(read_strings(&mut cursor, 1, 3), Err(Error::InvalidStringTable));
    }

    #[test]
    fn string_offset_outside_table() {
        let mut buffer = vec![];
        buffer.extend_from_slice(&9i16.to_le_bytes());
        buffer.extend_from_slice(b"ab\0\0");
        let mut cursor = ByteCursor::new(&buffer);
        assert_eq!(read_strings(&mut cursor, 1, 4), Err(Error::InvalidStringTable));
    }

    #[test]
    fn string_data_truncated() {
        let mut buffer = vec![];
        buffer.extend_from_slice(&0i16.to_le_bytes());
        buffer.extend_from_slice(b"ab\0");
        let mut cursor = ByteCursor::new(&buffer);
        assert_eq!(read_strings(&mut cursor, 1, 4), Err(Error::UnexpectedEnd));
    }

    #[test]
    fn names_relative_to_base() {
        let mut buffer = vec![];
        for offset in [0i16, 0, 3] {
            buffer.extend_from_slice(&offset.to_le_bytes());
        }
        buffer.extend_from_slice(b"on\0AX\0XT\0");
        let mut cursor = ByteCursor::new(&buffer);
        let table = StringTable::read(&mut cursor, 3, 9).unwrap();
        assert_eq!(table.len(), 3);
        let values = table.values(0..1, 0).unwrap();
        assert_eq!(values.values, collection!(0 => b"on".to_vec()));
        let names = table.names(1..3, 3).unwrap();
        assert_eq!(names, collection!(0 => "AX".to_owned(), 1 => "XT".to_owned()));
    }

    #[test]
    fn missing_name() {
        let mut buffer = vec![];
        buffer.extend_from_slice(&(-1i16).to_le_bytes());
        buffer.extend_from_slice(b"AX\0");
        let mut cursor = ByteCursor::new(&buffer);
        let table = StringTable::read(&mut cursor, 1, 3).unwrap();
        assert_eq!(table.names(0..1, 0), Err(Error::InvalidStringTable));
        assert_eq!(table.names(0..2, 0), Err(Error::InvalidStringTable));
    }
}
