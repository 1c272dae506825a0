//! Reversible escaping of arbitrary text into the shortname token alphabet.
//!
//! Lowercase ASCII letters and digits stand for themselves. Common URI
//! punctuation is written as a single uppercase code letter; `://` has its own
//! code and is matched before `:`. Everything else, uppercase letters and `_`
//! included, becomes `_hh` (two lowercase hex digits, Latin-1) or `_uhhhhhh`
//! for code points above U+00FF. `Z` marks a namespace/local-name boundary
//! and contributes nothing to the decoded text.

use std::fmt::Write;

/// Punctuation codes, longest sequence first.
const CODES: [(&str, char); 11] = [
    ("://", 'X'),
    (":", 'C'),
    ("/", 'S'),
    ("-", 'M'),
    (".", 'D'),
    ("#", 'H'),
    ("?", 'Q'),
    ("=", 'E'),
    ("&", 'A'),
    ("~", 'T'),
    ("+", 'P'),
];

pub(crate) const BOUNDARY: char = 'Z';

const WIDE_ESCAPE: char = 'u';
const WIDE_DIGITS: usize = 6;

fn is_literal(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit()
}

fn code_text(code: char) -> Option<&'static str> {
    CODES
        .iter()
        .find(|(_, candidate)| *candidate == code)
        .map(|(text, _)| *text)
}

/// Escape `text` into the token alphabet.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    'scan: while let Some(c) = rest.chars().next() {
        for (sequence, code) in CODES {
            if let Some(after) = rest.strip_prefix(sequence) {
                out.push(code);
                rest = after;
                continue 'scan;
            }
        }

        let point = u32::from(c);
        if is_literal(c) {
            out.push(c);
        } else if point <= 0xFF {
            let _ = write!(out, "_{point:02x}");
        } else {
            let _ = write!(out, "_{WIDE_ESCAPE}{point:06x}");
        }
        rest = &rest[c.len_utf8()..];
    }

    out
}

/// Reverse [`escape`]. Returns `None` when `token` is not well formed.
///
/// Hex digits are accepted in either case.
pub fn unescape(token: &str) -> Option<String> {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();

    while let Some(c) = chars.next() {
        match c {
            c if is_literal(c) => out.push(c),
            '_' => {
                let first = chars.next()?;
                let point = if first == WIDE_ESCAPE {
                    let digits: String = chars.by_ref().take(WIDE_DIGITS).collect();
                    if digits.len() != WIDE_DIGITS {
                        return None;
                    }
                    parse_hex(&digits)?
                } else {
                    let second = chars.next()?;
                    parse_hex(&format!("{first}{second}"))?
                };
                out.push(char::from_u32(point)?);
            }
            BOUNDARY => {}
            code => out.push_str(code_text(code)?),
        }
    }

    Some(out)
}

fn parse_hex(digits: &str) -> Option<u32> {
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}
