// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Printable representation of capability strings, as shown by `infocmp`

const ESC: u8 = 0x1b;

/// Escape a capability value the way `infocmp` prints it
///
/// ```
/// use terminfo_reader::escape::escape;
///
/// assert_eq!(escape(b"\x1b[%i%p1%d;%p2%dH"), r"\E[%i%p1%d;%p2%dH");
/// assert_eq!(escape(b"\x07"), "^G");
/// ```
pub fn escape(value: &[u8]) -> String {
    Escaper::default().escape(value)
}

/// Single pass escaper with one byte of lookahead and lookbehind
///
/// The order of the checks in [`Escaper::escape`] matters, the same byte can
/// be rendered differently depending on its neighbors.
#[derive(Debug, Default)]
pub struct Escaper {
    previous: u8,
    after_escape: bool,
}

impl Escaper {
    pub fn escape(mut self, value: &[u8]) -> String {
        let length = value.len();
        let mut output = String::with_capacity(length * 2);
        let mut bytes = value.iter().copied().enumerate().peekable();

        while let Some((position, byte)) = bytes.next() {
            let next = bytes.peek().map(|(_, next)| *next);
            match byte {
                0 | 0x80 => output.push_str(r"\0"),
                ESC => {
                    self.after_escape = true;
                    output.push_str(r"\E");
                }
                b'\r' if next == Some(b'\n') && length > 2 => {
                    output.push_str(r"\r\n");
                    bytes.next();
                }
                b'\r' if length > 2 && position != 0 => output.push_str(r"\r"),
                byte if byte < b' ' && (self.previous == ESC || !self.after_escape) => {
                    output.push('^');
                    output.push(char::from(byte + b'@'));
                }
                // `%:` and `%!` are operators in parameterized strings
                b':' | b'!' if self.previous == b'%' => output.push(char::from(byte)),
                b',' | b':' | b'!' | b'^' => push_octal(&mut output, byte),
                byte if !(b' '..=b'~').contains(&byte) => push_octal(&mut output, byte),
                byte => output.push(char::from(byte)),
            }
            self.previous = byte;
        }

        output
    }
}

fn push_octal(output: &mut String, byte: u8) {
    output.push_str(&format!("\\{byte:03o}"));
}
