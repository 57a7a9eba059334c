// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Decoding compiled terminfo entries

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use tracing::{debug, trace};

use crate::{
    caps::{self, CapKind},
    cursor::ByteCursor,
    header::{ExtendedHeader, Header, max_file_size, read_magic},
    section::{NumberWidth, Section, StringTable, read_bools, read_nums, read_strings},
};

/// Separator between the terminal names
const NAME_SEPARATOR: char = '|';

/// Errors reported when decoding a terminfo buffer
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The buffer is too large to be a terminfo entry
    #[error("Invalid file size")]
    InvalidFileSize,
    /// The magic number is invalid or unsupported
    #[error("Invalid magic number")]
    InvalidMagic,
    /// Capability counts or sizes in the header are invalid
    #[error("Invalid header")]
    InvalidHeader,
    /// Counts or sizes in the extended header are inconsistent
    #[error("Invalid extended header")]
    InvalidExtendedHeader,
    /// A read went past the end of the buffer
    #[error("Unexpected end of file")]
    UnexpectedEnd,
    /// A string offset does not lead to a NUL terminated string
    #[error("Invalid string table")]
    InvalidStringTable,
    /// A terminal or capability name is not valid UTF-8
    #[error("Invalid UTF-8 name")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Extended capabilities
///
/// Extended capabilities have no fixed index. Each value map shares its
/// indices with the name map of the same kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extended {
    pub booleans: Section<bool>,
    pub numbers: Section<i32>,
    pub strings: Section<Vec<u8>>,
    pub boolean_names: BTreeMap<usize, String>,
    pub number_names: BTreeMap<usize, String>,
    pub string_names: BTreeMap<usize, String>,
}

impl Extended {
    pub fn is_empty(&self) -> bool {
        self.boolean_names.is_empty()
            && self.number_names.is_empty()
            && self.string_names.is_empty()
    }

    /// Names of the extended capabilities of one kind
    pub const fn names(&self, kind: CapKind) -> &BTreeMap<usize, String> {
        match kind {
            CapKind::Boolean => &self.boolean_names,
            CapKind::Number => &self.number_names,
            CapKind::String => &self.string_names,
        }
    }

    /// Index of an extended capability by name
    pub fn find(&self, kind: CapKind, name: &str) -> Option<usize> {
        self.names(kind)
            .iter()
            .find_map(|(index, ext_name)| (ext_name == name).then_some(*index))
    }
}

/// Decoded terminfo entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Terminfo {
    /// Terminal names, the first one is canonical
    pub names: Vec<String>,
    pub booleans: Section<bool>,
    pub numbers: Section<i32>,
    pub strings: Section<Vec<u8>>,
    pub extended: Extended,
    /// File the entry was read from, set by the caller
    pub file: Option<PathBuf>,
}

impl Terminfo {
    /// Decode a terminfo entry from the supplied buffer
    pub fn decode(buffer: &[u8]) -> Result<Self, Error> {
        decode(buffer)
    }

    /// Attach the path of the file the entry was read from
    #[must_use]
    pub fn with_file(mut self, file: impl AsRef<Path>) -> Self {
        self.file = Some(file.as_ref().to_path_buf());
        self
    }

    /// Canonical terminal name
    pub fn name(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    /// Boolean capability by its short, long or extended name
    pub fn boolean(&self, name: &str) -> bool {
        let value = match caps::find(CapKind::Boolean, name) {
            Some(index) => self.booleans.get(index),
            None => self
                .extended
                .find(CapKind::Boolean, name)
                .and_then(|index| self.extended.booleans.get(index)),
        };
        value.is_some_and(|value| *value)
    }

    /// Numeric capability by its short, long or extended name
    pub fn number(&self, name: &str) -> Option<i32> {
        match caps::find(CapKind::Number, name) {
            Some(index) => self.numbers.get(index),
            None => self.extended.numbers.get(self.extended.find(CapKind::Number, name)?),
        }
        .copied()
    }

    /// String capability by its short, long or extended name
    pub fn string(&self, name: &str) -> Option<&[u8]> {
        match caps::find(CapKind::String, name) {
            Some(index) => self.strings.get(index),
            None => self.extended.strings.get(self.extended.find(CapKind::String, name)?),
        }
        .map(Vec::as_slice)
    }

    /// All present boolean capabilities, standard and extended, by name
    pub fn boolean_caps(&self, long_names: bool) -> BTreeMap<String, bool> {
        let names = &self.extended.boolean_names;
        by_name(CapKind::Boolean, &self.booleans, &self.extended.booleans, names, long_names)
    }

    /// All present numeric capabilities, standard and extended, by name
    pub fn number_caps(&self, long_names: bool) -> BTreeMap<String, i32> {
        let names = &self.extended.number_names;
        by_name(CapKind::Number, &self.numbers, &self.extended.numbers, names, long_names)
    }

    /// All present string capabilities, standard and extended, by name
    pub fn string_caps(&self, long_names: bool) -> BTreeMap<String, Vec<u8>> {
        let names = &self.extended.string_names;
        by_name(CapKind::String, &self.strings, &self.extended.strings, names, long_names)
    }
}

/// Join standard and extended values with their names
fn by_name<T: Clone>(
    kind: CapKind,
    standard: &Section<T>,
    extended: &Section<T>,
    extended_names: &BTreeMap<usize, String>,
    long_names: bool,
) -> BTreeMap<String, T> {
    let mut caps = BTreeMap::new();
    for (index, value) in &standard.values {
        let name = if long_names {
            caps::name(kind, *index)
        } else {
            caps::display_name(kind, *index)
        };
        if let Some(name) = name {
            caps.insert(name.to_owned(), value.clone());
        }
    }
    for (index, value) in &extended.values {
        if let Some(name) = extended_names.get(index) {
            caps.insert(name.clone(), value.clone());
        }
    }
    caps
}

/// Decode a terminfo entry from the supplied buffer
///
/// Returns a fully populated `Terminfo` or the first error encountered.
pub fn decode(buffer: &[u8]) -> Result<Terminfo, Error> {
    if buffer.len() >= max_file_size(buffer) {
        return Err(Error::InvalidFileSize);
    }

    let mut cursor = ByteCursor::new(buffer);
    let number_width = read_magic(&mut cursor)?;
    let header = Header::read(&mut cursor, number_width)?;
    trace!(?header, "standard header");

    let names = decode_names(cursor.read(header.name_size)?)?;
    let booleans = read_bools(&mut cursor, header.bool_count)?;
    let numbers = read_nums(&mut cursor, header.num_count, number_width)?;
    let strings = read_strings(&mut cursor, header.string_count, header.table_size)?;

    let mut terminfo = Terminfo {
        names,
        booleans,
        numbers,
        strings,
        ..Terminfo::default()
    };

    if !cursor.is_at_end() {
        terminfo.extended = decode_extended(&mut cursor, number_width)?;
    }

    debug!(
        name = terminfo.name(),
        booleans = terminfo.booleans.values.len(),
        numbers = terminfo.numbers.values.len(),
        strings = terminfo.strings.values.len(),
        extended = !terminfo.extended.is_empty(),
        "decoded terminfo entry"
    );

    Ok(terminfo)
}

/// Split the NUL terminated name field into aliases
fn decode_names(bytes: &[u8]) -> Result<Vec<String>, Error> {
    let bytes = match bytes.iter().position(|byte| *byte == b'\0') {
        Some(length) => &bytes[..length],
        None => bytes,
    };
    Ok(str::from_utf8(bytes)?
        .split(NAME_SEPARATOR)
        .map(str::to_owned)
        .collect())
}

/// Decode the extended section that follows the standard capabilities
fn decode_extended(
    cursor: &mut ByteCursor<'_>,
    number_width: NumberWidth,
) -> Result<Extended, Error> {
    let header = ExtendedHeader::read(cursor, number_width)?;
    trace!(?header, "extended header");

    let booleans = read_bools(cursor, header.bool_count)?;
    let numbers = read_nums(cursor, header.num_count, number_width)?;
    let table = StringTable::read(cursor, header.offset_count, header.table_size)?;

    // The offsets are laid out as string values, then names of booleans,
    // numbers and strings. Values are relative to the start of the data,
    // names to the byte after the last value.
    let value_slots = 0..header.string_count;
    let boolean_slots = value_slots.end..value_slots.end + header.bool_count;
    let number_slots = boolean_slots.end..boolean_slots.end + header.num_count;
    let string_slots = number_slots.end..number_slots.end + header.string_count;

    let strings = table.values(value_slots, 0)?;
    let names_base = strings.values.values().map(|value| value.len() + 1).sum();

    Ok(Extended {
        booleans,
        numbers,
        strings,
        boolean_names: table.names(boolean_slots, names_base)?,
        number_names: table.names(number_slots, names_base)?,
        string_names: table.names(string_slots, names_base)?,
    })
}
