// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Lexical classification of raw source tokens.
//!
//! Every predicate here is pure and works on the token text alone. The
//! engine uses them to decide whether an operand is a literal, a symbol
//! reference or a label definition before anything is looked up.

/// Maximum length of a numeric literal, prefix and suffix included.
pub const MAX_NUMERIC_LEN: usize = 6;

/// Characters treated as blank between tokens.
pub const WHITE_CHARS: &str = "\r\n\x0c\t\x0b ";

/// Punctuation characters, each one a token on its own.
pub const SYMBOL_CHARS: &str = "~!@#$%^&*()+-={}[]:\";'<>?,./|\\";

pub const QUOTE_CHAR: char = '"';
pub const COMMENT_CHAR: char = ';';

#[inline]
pub fn is_white(c: char) -> bool {
    WHITE_CHARS.contains(c)
}

#[inline]
pub fn is_symbol(c: char) -> bool {
    SYMBOL_CHARS.contains(c)
}

/// Check if a character may appear in an identifier.
#[inline]
pub fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Split a numeric token into its digit run and radix.
///
/// A `0x` prefix or a trailing `h` selects hex. With the suffix form the
/// first digit must not be a hex letter, so `0FFh` is a number while
/// `FFh` stays an identifier.
fn numeric_digits(s: &str) -> Option<(&str, u32)> {
    if s.is_empty() || s.len() > MAX_NUMERIC_LEN || !s.is_ascii() {
        return None;
    }

    let (digits, radix) = if s.starts_with("0x") || s.starts_with("0X") {
        (&s[2..], 16)
    } else if s.ends_with('h') || s.ends_with('H') {
        let digits = &s[..s.len() - 1];
        match digits.chars().next() {
            Some(c) if matches!(c.to_ascii_lowercase(), 'a'..='f') => return None,
            _ => {}
        }
        (digits, 16)
    } else {
        (s, 10)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    Some((digits, radix))
}

/// Check if a token is a numeric literal (decimal, `0x` hex or `h` hex).
pub fn is_numeric(s: &str) -> bool {
    numeric_digits(s).is_some()
}

/// Check if a token is an identifier.
///
/// Identifiers use `[A-Za-z0-9_]`, cannot start with a digit, cannot contain
/// a run of three underscores and need at least one non-underscore.
pub fn is_identifier(s: &str) -> bool {
    let Some(first) = s.chars().next() else {
        return false;
    };
    if first.is_ascii_digit() {
        return false;
    }
    if !s.chars().all(is_ident_char) {
        return false;
    }
    if s.contains("___") {
        return false;
    }
    s.chars().any(|c| c != '_')
}

/// Check if a token is a label definition of the form `name:`.
pub fn is_label(s: &str) -> bool {
    match s.strip_suffix(':') {
        Some(name) => s.len() >= 2 && is_identifier(name),
        None => false,
    }
}

/// Check if a token is a numeric literal that fits in eight bits.
pub fn is_byte(s: &str) -> bool {
    is_numeric(s) && convert(s) <= 0xFF
}

/// Check if a token is a numeric literal that fits in sixteen bits.
pub fn is_word(s: &str) -> bool {
    is_numeric(s) && convert(s) <= 0xFFFF
}

/// Convert a numeric literal to its value.
///
/// Tokens that are not numeric convert to zero; callers check
/// [`is_numeric`] first.
pub fn convert(s: &str) -> u32 {
    let Some((digits, radix)) = numeric_digits(s) else {
        return 0;
    };
    digits
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0u32, |acc, d| acc * radix + d)
}

/// True for a hex literal spelled wider than a byte, like `0x00FF`.
///
/// The single leading zero the `h` form needs is not counted.
pub fn is_wide_hex(s: &str) -> bool {
    match numeric_digits(s) {
        Some((digits, 16)) => {
            let digits = if s.ends_with(['h', 'H']) {
                digits.strip_prefix('0').unwrap_or(digits)
            } else {
                digits
            };
            digits.len() > 2
        }
        _ => false,
    }
}

/// Format a value as a `0x` literal that [`convert`] reads back unchanged.
pub fn to_hex_string(value: u16) -> String {
    format!("0x{value:04X}")
}

/// Two upper-case hex digits.
pub fn hex8(value: u8) -> String {
    format!("{value:02X}")
}

/// Four upper-case hex digits.
pub fn hex16(value: u16) -> String {
    format!("{value:04X}")
}
