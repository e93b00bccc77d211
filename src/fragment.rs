//! Fragment extraction and percent decoding.
//!
//! Not every environment exposes the fragment directly, so extraction
//! falls back to the `#`-delimited suffix of the location's string form.
//! Both paths are pure: the same location state always yields the same
//! fragment.

use std::sync::OnceLock;

use regex::Regex;

use crate::environment::Location;

/// Percent sequences containing digits trigger a decode pass.
fn percent_trigger() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"%[0-9]+").expect("literal pattern compiles"))
}

/// Read the current fragment from `location`.
///
/// Prefers the fragment property, stripping a single leading `#`; falls
/// back to everything after the first `#` of the location's string form;
/// yields the empty string when neither carries fragment data.
#[must_use]
pub fn current_fragment(location: &dyn Location) -> String {
    let raw = match location.fragment() {
        Some(fragment) if !fragment.is_empty() => fragment
            .strip_prefix('#')
            .unwrap_or(&fragment)
            .to_string(),
        _ => {
            let href = location.href();
            match href.find('#') {
                Some(idx) => href[idx + 1..].to_string(),
                None => String::new(),
            }
        }
    };

    if percent_trigger().is_match(&raw) {
        percent_decode(&raw)
    } else {
        raw
    }
}

/// Decode `%XX` sequences into their byte values.
///
/// Malformed sequences pass through literally. If the decoded bytes are
/// not valid UTF-8 the input is returned unchanged.
#[must_use]
pub fn percent_decode(raw: &str) -> String {
    fn hex_val(b: u8) -> Option<u8> {
        match b {
            b'0'..=b'9' => Some(b - b'0'),
            b'a'..=b'f' => Some(b - b'a' + 10),
            b'A'..=b'F' => Some(b - b'A' + 10),
            _ => None,
        }
    }

    let bytes = raw.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8(out).unwrap_or_else(|_| raw.to_string())
}

/// Encode a value for query-string serialization. RFC 3986 unreserved
/// characters pass through; everything else becomes `%XX`.
#[must_use]
pub fn percent_encode(raw: &str) -> String {
    use std::fmt::Write as _;

    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(char::from(b));
            }
            _ => {
                let _ = write!(out, "%{b:02X}");
            }
        }
    }
    out
}
