//! XML `Name` / `Nmtoken` lexical check used to gate metadata types.
//!
//! Productions follow XML 1.0 (Fifth Edition), §2.3.

/// `NameStartChar` ranges other than the ASCII letters handled inline.
const NAME_START_RANGES: &[(char, char)] = &[
    ('\u{C0}', '\u{D6}'),
    ('\u{D8}', '\u{F6}'),
    ('\u{F8}', '\u{2FF}'),
    ('\u{370}', '\u{37D}'),
    ('\u{37F}', '\u{1FFF}'),
    ('\u{200C}', '\u{200D}'),
    ('\u{2070}', '\u{218F}'),
    ('\u{2C00}', '\u{2FEF}'),
    ('\u{3001}', '\u{D7FF}'),
    ('\u{F900}', '\u{FDCF}'),
    ('\u{FDF0}', '\u{FFFD}'),
    ('\u{10000}', '\u{EFFFF}'),
];

/// Extra `NameChar` ranges beyond `NameStartChar`.
const NAME_EXTRA_RANGES: &[(char, char)] = &[
    ('\u{300}', '\u{36F}'),
    ('\u{203F}', '\u{2040}'),
];

fn in_ranges(c: char, ranges: &[(char, char)]) -> bool {
    ranges.iter().any(|&(lo, hi)| (lo..=hi).contains(&c))
}

/// `NameStartChar`: `:` | `_` | ASCII letters | the listed Unicode ranges.
pub fn is_name_start_char(c: char) -> bool {
    c == ':' || c == '_' || c.is_ascii_alphabetic() || in_ranges(c, NAME_START_RANGES)
}

/// `NameChar`: `NameStartChar` | `-` | `.` | ASCII digits | `·` | combining ranges.
pub fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || c == '-'
        || c == '.'
        || c.is_ascii_digit()
        || c == '\u{B7}'
        || in_ranges(c, NAME_EXTRA_RANGES)
}

/// Returns `true` when `name` is a legal XML `Name`.
///
/// Empty input is rejected. The first character must be a `NameStartChar`;
/// every following character must be a `NameChar`.
pub fn is_nm_token(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) => chars.all(is_name_char),
        _ => false,
    }
}
