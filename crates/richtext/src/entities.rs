//! Minimal character reference decoding.
//!
//! Only a small named set plus well-formed, semicolon-terminated numeric
//! references are decoded. Anything else passes through unchanged; malformed
//! references are text, never errors.

use memchr::memchr;

/// Longest accepted reference body (`#x10FFFF` is 8 bytes).
const MAX_BODY_LEN: usize = 8;

pub(crate) fn decode_entities(input: &str) -> String {
    let bytes = input.as_bytes();
    if memchr(b'&', bytes).is_none() {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < bytes.len() {
        let Some(rel) = memchr(b'&', &bytes[i..]) else {
            out.push_str(&input[i..]);
            break;
        };
        let amp = i + rel;
        out.push_str(&input[i..amp]);
        match decode_one(input, amp) {
            Some((ch, next)) => {
                out.push(ch);
                i = next;
            }
            None => {
                out.push('&');
                i = amp + 1;
            }
        }
    }
    out
}

/// Decode the reference starting at the `&` at byte `amp`. Returns the
/// character and the byte offset just past the terminating `;`.
fn decode_one(input: &str, amp: usize) -> Option<(char, usize)> {
    let tail = input.as_bytes().get(amp + 1..)?;
    let semi = tail
        .iter()
        .take(MAX_BODY_LEN + 1)
        .position(|&b| b == b';')?;
    let body = &input[amp + 1..amp + 1 + semi];
    let ch = if let Some(numeric) = body.strip_prefix('#') {
        let (digits, radix) = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => (hex, 16),
            None => (numeric, 10),
        };
        if digits.is_empty() {
            return None;
        }
        let code = u32::from_str_radix(digits, radix).ok()?;
        char::from_u32(code)?
    } else {
        match body {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            "nbsp" => '\u{00A0}',
            "bull" => '\u{2022}',
            "mdash" => '\u{2014}',
            "ndash" => '\u{2013}',
            "hellip" => '\u{2026}',
            "copy" => '\u{00A9}',
            "times" => '\u{00D7}',
            _ => return None,
        }
    };
    Some((ch, amp + 1 + semi + 1))
}
