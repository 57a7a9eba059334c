// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Capability listing in the `infocmp -1` format

use std::{
    collections::BTreeMap,
    fmt::{self, Write},
};

use crate::{
    caps::{self, CapKind},
    decode::Terminfo,
    escape::escape,
    section::Section,
};

/// Suffix printed after a canceled capability
const CANCELED_SUFFIX: &str = "@";

/// Options for listing a terminfo entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Listing {
    /// Use long capability names, like `infocmp -L`
    pub long_names: bool,
    /// Include extended capabilities, like `infocmp -x`
    pub extended: bool,
}

impl Listing {
    /// Render the entry, one capability per line
    ///
    /// Booleans come first, then numbers, then strings. Within each kind the
    /// standard capabilities are sorted by name and followed by the extended
    /// ones, sorted separately.
    pub fn render(&self, terminfo: &Terminfo) -> String {
        let mut output = String::new();
        if let Some(file) = &terminfo.file {
            output.push_str(&format!(
                "#\tReconstructed via infocmp from file: {}\n",
                file.display()
            ));
        }
        output.push_str(&format!("{},\n", terminfo.names.join("|").trim()));

        let extended = &terminfo.extended;
        let groups = [
            self.group(
                CapKind::Boolean,
                &terminfo.booleans,
                &extended.booleans,
                &extended.boolean_names,
                |value| value.then(String::new),
            ),
            self.group(
                CapKind::Number,
                &terminfo.numbers,
                &extended.numbers,
                &extended.number_names,
                |value| Some(format!("#{value}")),
            ),
            self.group(
                CapKind::String,
                &terminfo.strings,
                &extended.strings,
                &extended.string_names,
                |value| Some(format!("={}", escape(value))),
            ),
        ];

        for (name, suffix) in groups.iter().flatten().flatten() {
            output.push_str(&format!("\t{name}{suffix},\n"));
        }
        output
    }

    pub fn write(&self, output: &mut impl Write, terminfo: &Terminfo) -> fmt::Result {
        output.write_str(&self.render(terminfo))
    }

    /// Printed suffixes of the standard and the extended capabilities of
    /// one kind, by name
    ///
    /// `suffix` returns `None` for values that are not printed.
    fn group<T>(
        &self,
        kind: CapKind,
        standard: &Section<T>,
        extended: &Section<T>,
        extended_names: &BTreeMap<usize, String>,
        suffix: impl Fn(&T) -> Option<String>,
    ) -> [BTreeMap<String, String>; 2] {
        let standard_lines = lines(standard, |index| self.name(kind, index), &suffix);
        let extended_lines = if self.extended {
            lines(extended, |index| extended_names.get(&index).map(String::as_str), &suffix)
        } else {
            BTreeMap::new()
        };
        [standard_lines, extended_lines]
    }

    fn name(&self, kind: CapKind, index: usize) -> Option<&'static str> {
        if self.long_names {
            caps::name(kind, index)
        } else {
            caps::display_name(kind, index)
        }
    }
}

/// Printed suffix of every present or canceled capability of a section
fn lines<'a, T>(
    section: &Section<T>,
    name: impl Fn(usize) -> Option<&'a str>,
    suffix: impl Fn(&T) -> Option<String>,
) -> BTreeMap<String, String> {
    let mut lines = BTreeMap::new();
    for (index, value) in &section.values {
        if let (Some(name), Some(suffix)) = (name(*index), suffix(value)) {
            lines.insert(name.to_owned(), suffix);
        }
    }
    for index in &section.canceled {
        if let Some(name) = name(*index) {
            lines.insert(name.to_owned(), CANCELED_SUFFIX.to_owned());
        }
    }
    lines
}
