use proptest::prelude::*;
use terminfo_reader::{Error, decode};

const MAGIC: u16 = 0o432;

/// Standard and extended capabilities of a generated entry
///
/// Booleans are raw bytes. Numbers use -1 for absent and -2 for canceled.
/// Strings are `None` when absent and `Some(None)` when canceled.
#[derive(Debug, Clone)]
struct Entry {
    names: String,
    booleans: Vec<u8>,
    numbers: Vec<i16>,
    strings: Vec<Option<Option<Vec<u8>>>>,
    extended: Option<ExtendedEntry>,
}

#[derive(Debug, Clone)]
struct ExtendedEntry {
    booleans: Vec<(String, u8)>,
    numbers: Vec<(String, i16)>,
    strings: Vec<(String, Option<Vec<u8>>)>,
}

fn push_i16(buffer: &mut Vec<u8>, value: i16) {
    buffer.extend_from_slice(&value.to_le_bytes());
}

fn pad(buffer: &mut Vec<u8>) {
    if !buffer.len().is_multiple_of(2) {
        buffer.push(0);
    }
}

/// Offsets and data of a string table, values laid out before names
fn string_table<'a>(
    values: impl IntoIterator<Item = Option<Option<&'a [u8]>>>,
    names: impl IntoIterator<Item = &'a str>,
) -> (Vec<i16>, Vec<u8>) {
    let mut offsets = vec![];
    let mut data = vec![];
    for value in values {
        match value {
            Some(Some(value)) => {
                offsets.push(data.len() as i16);
                data.extend_from_slice(value);
                data.push(0);
            }
            Some(None) => offsets.push(-2),
            None => offsets.push(-1),
        }
    }
    let names_base = data.len();
    for name in names {
        offsets.push((data.len() - names_base) as i16);
        data.extend_from_slice(name.as_bytes());
        data.push(0);
    }
    (offsets, data)
}

impl Entry {
    fn to_bytes(&self) -> Vec<u8> {
        let (offsets, data) = string_table(
            self.strings
                .iter()
                .map(|value| value.as_ref().map(|value| value.as_deref())),
            [],
        );

        let mut buffer = vec![];
        for field in [
            MAGIC as i16,
            self.names.len() as i16 + 1,
            self.booleans.len() as i16,
            self.numbers.len() as i16,
            self.strings.len() as i16,
            data.len() as i16,
        ] {
            push_i16(&mut buffer, field);
        }
        buffer.extend_from_slice(self.names.as_bytes());
        buffer.push(0);
        buffer.extend_from_slice(&self.booleans);
        if !self.numbers.is_empty() || !self.strings.is_empty() {
            pad(&mut buffer);
        }
        for number in &self.numbers {
            push_i16(&mut buffer, *number);
        }
        for offset in offsets {
            push_i16(&mut buffer, offset);
        }
        buffer.extend_from_slice(&data);

        if let Some(extended) = &self.extended {
            pad(&mut buffer);
            extended.push(&mut buffer);
        }
        buffer
    }
}

impl ExtendedEntry {
    fn push(&self, buffer: &mut Vec<u8>) {
        let names = self
            .booleans
            .iter()
            .map(|(name, _)| name)
            .chain(self.numbers.iter().map(|(name, _)| name))
            .chain(self.strings.iter().map(|(name, _)| name))
            .map(String::as_str);
        let values = self
            .strings
            .iter()
            .map(|(_, value)| Some(value.as_deref()));
        let (offsets, data) = string_table(values, names);

        for field in [
            self.booleans.len(),
            self.numbers.len(),
            self.strings.len(),
            offsets.len(),
            data.len(),
        ] {
            push_i16(buffer, field as i16);
        }
        buffer.extend(self.booleans.iter().map(|(_, value)| *value));
        if !self.booleans.len().is_multiple_of(2) {
            buffer.push(0);
        }
        for (_, number) in &self.numbers {
            push_i16(buffer, *number);
        }
        for offset in offsets {
            push_i16(buffer, offset);
        }
        buffer.extend_from_slice(&data);
    }
}

fn name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9-]{0,7}"
}

fn string_value() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(1..=u8::MAX, 0..8)
}

fn entry() -> impl Strategy<Value = Entry> {
    (
        prop::collection::vec(name(), 1..4),
        prop::collection::vec(prop_oneof![Just(0u8), Just(1), Just(2), Just(0xfe), Just(0xff)], 0..12),
        prop::collection::vec(prop_oneof![-3i16..=1000, Just(-1), Just(-2)], 0..12),
        prop::collection::vec(prop::option::of(prop::option::of(string_value())), 0..12),
        prop::option::of(extended_entry()),
    )
        .prop_map(|(names, booleans, numbers, strings, extended)| Entry {
            names: names.join("|"),
            booleans,
            numbers,
            strings,
            extended,
        })
}

fn extended_entry() -> impl Strategy<Value = ExtendedEntry> {
    (
        prop::collection::vec((name(), prop_oneof![Just(0u8), Just(1), Just(0xfe), Just(0xff)]), 0..4),
        prop::collection::vec((name(), prop_oneof![0i16..=1000, Just(-1), Just(-2)]), 0..4),
        prop::collection::vec((name(), prop::option::of(string_value())), 0..4),
    )
        .prop_map(|(booleans, numbers, strings)| ExtendedEntry {
            booleans,
            numbers,
            strings,
        })
}

proptest! {
    #[test]
    fn entries_decode(entry in entry()) {
        let terminfo = decode(&entry.to_bytes()).unwrap();

        let names: Vec<_> = entry.names.split('|').collect();
        prop_assert_eq!(&terminfo.names, &names);

        for (index, byte) in entry.booleans.iter().enumerate() {
            let expected = (*byte != 0xff && *byte != 0xfe).then_some(*byte == 1);
            prop_assert_eq!(terminfo.booleans.get(index).copied(), expected);
            prop_assert_eq!(terminfo.booleans.is_canceled(index), *byte == 0xfe);
        }
        for (index, number) in entry.numbers.iter().enumerate() {
            let expected = (*number >= 0).then_some(i32::from(*number));
            prop_assert_eq!(terminfo.numbers.get(index).copied(), expected);
            prop_assert_eq!(terminfo.numbers.is_canceled(index), *number == -2);
        }
        for (index, string) in entry.strings.iter().enumerate() {
            let expected = string.as_ref().and_then(|value| value.as_deref());
            prop_assert_eq!(terminfo.strings.get(index).map(Vec::as_slice), expected);
            prop_assert_eq!(terminfo.strings.is_canceled(index), matches!(string, Some(None)));
        }

        let extended = &terminfo.extended;
        let Some(expected) = &entry.extended else {
            prop_assert!(extended.is_empty());
            return Ok(());
        };
        for (index, (name, byte)) in expected.booleans.iter().enumerate() {
            prop_assert_eq!(extended.boolean_names.get(&index), Some(name));
            let expected = (*byte != 0xff && *byte != 0xfe).then_some(*byte == 1);
            prop_assert_eq!(extended.booleans.get(index).copied(), expected);
            prop_assert_eq!(extended.booleans.is_canceled(index), *byte == 0xfe);
        }
        for (index, (name, number)) in expected.numbers.iter().enumerate() {
            prop_assert_eq!(extended.number_names.get(&index), Some(name));
            let expected = (*number >= 0).then_some(i32::from(*number));
            prop_assert_eq!(extended.numbers.get(index).copied(), expected);
        }
        for (index, (name, value)) in expected.strings.iter().enumerate() {
            prop_assert_eq!(extended.string_names.get(&index), Some(name));
            prop_assert_eq!(extended.strings.get(index), value.as_ref());
        }
    }

    #[test]
    fn decoding_is_repeatable(entry in entry()) {
        let buffer = entry.to_bytes();
        prop_assert_eq!(decode(&buffer), decode(&buffer));
    }

    #[test]
    fn truncated_entries_fail(entry in entry(), cut in any::<prop::sample::Index>()) {
        let entry = Entry { extended: None, ..entry };
        let buffer = entry.to_bytes();
        let length = cut.index(buffer.len());
        prop_assert_eq!(decode(&buffer[..length]), Err(Error::UnexpectedEnd));
    }

    #[test]
    fn truncated_extended_entries_fail(entry in entry(), cut in 1..10usize) {
        prop_assume!(entry.extended.is_some());
        let buffer = entry.to_bytes();
        let length = buffer.len() - cut.min(buffer.len());
        prop_assert!(decode(&buffer[..length]).is_err());
    }

    #[test]
    fn arbitrary_bytes_never_panic(mut buffer in prop::collection::vec(any::<u8>(), 0..512)) {
        if buffer.len() >= 2 {
            buffer[..2].copy_from_slice(&MAGIC.to_le_bytes());
        }
        let _ = decode(&buffer);
    }

    #[test]
    fn negative_header_fields_are_rejected(entry in entry(), field in 0..5usize) {
        let mut buffer = entry.to_bytes();
        let position = 2 + field * 2;
        buffer[position..position + 2].copy_from_slice(&(-5i16).to_le_bytes());
        prop_assert_eq!(decode(&buffer), Err(Error::InvalidHeader));
    }

    #[test]
    fn extended_offset_count_must_match(entry in entry(), delta in prop_oneof![Just(-1i16), Just(1)]) {
        let Some(extended) = &entry.extended else {
            return Ok(());
        };
        let standard = Entry { extended: None, ..entry.clone() }.to_bytes();
        let mut buffer = entry.to_bytes();
        let header = standard.len() + standard.len() % 2;
        let position = header + 6;
        let offset_count = extended.booleans.len() + extended.numbers.len() + 2 * extended.strings.len();
        let changed = offset_count as i16 + delta;
        prop_assume!(changed >= 0);
        buffer[position..position + 2].copy_from_slice(&changed.to_le_bytes());
        prop_assert_eq!(decode(&buffer), Err(Error::InvalidExtendedHeader));
    }
}
