//! Incremental permissive HTML tokenizer.
//!
//! Single-pass byte scanning over an append-only buffer. Structural
//! characters are all ASCII, so byte offsets from `memchr` are always valid
//! `str` boundaries. The tokenizer never fails: malformed markup degrades to
//! text or is skipped.
//!
//! Incrementality contract: a construct is emitted only once its terminator
//! has arrived. Unterminated tags, comments and doctypes stay in the buffer
//! across `feed` calls, and trailing text is held back until it is terminated
//! by markup or by `finish()`. This is what makes the emitted event sequence
//! identical for every chunking of the same document, including chunk
//! boundaries that would otherwise split an entity in half.

use memchr::memchr;

use crate::entities::decode_entities;
use crate::types::Token;

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

#[derive(Debug, Default)]
pub struct Tokenizer {
    buffer: String,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and emit every token completed by it.
    pub fn feed<F: FnMut(Token)>(&mut self, chunk: &str, sink: &mut F) {
        self.buffer.push_str(chunk);
        let consumed = scan(&self.buffer, sink);
        if consumed > 0 {
            self.buffer.replace_range(..consumed, "");
        }
    }

    /// Emit text still held in the buffer; drop unterminated markup.
    pub fn finish<F: FnMut(Token)>(&mut self, sink: &mut F) {
        if self.buffer.is_empty() {
            return;
        }
        if self.buffer.starts_with('<') {
            log::trace!(
                target: "richtext.tokenizer",
                "dropping unterminated markup at end of input: {:?}",
                self.buffer
            );
        } else {
            emit_text(&self.buffer, sink);
        }
        self.buffer.clear();
    }

    /// Discard buffered input.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

fn emit_text<F: FnMut(Token)>(raw: &str, sink: &mut F) {
    let decoded = decode_entities(raw);
    if !decoded.is_empty() {
        sink(Token::Text(decoded));
    }
}

/// Scan `input` from the start, emitting completed tokens. Returns the number
/// of bytes consumed; the unconsumed tail is an incomplete construct (or
/// trailing text) to be retried once more input arrives.
fn scan<F: FnMut(Token)>(input: &str, sink: &mut F) -> usize {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let Some(rel) = memchr(b'<', &bytes[i..]) else {
            // Trailing text: held until markup or finish() terminates it.
            return i;
        };
        let lt = i + rel;
        if lt > i {
            emit_text(&input[i..lt], sink);
            i = lt;
        }
        // Classification may need bytes that have not arrived yet.
        let Some(&next) = bytes.get(lt + 1) else {
            return lt;
        };
        let scanned = if next == b'!' {
            scan_declaration(input, lt, sink)
        } else if next == b'/' {
            scan_end_tag(input, lt, sink)
        } else if next.is_ascii_alphabetic() {
            scan_start_tag(input, lt, sink)
        } else {
            // Bare '<' in text.
            sink(Token::Text("<".to_string()));
            Some(lt + 1)
        };
        match scanned {
            Some(end) => i = end,
            None => return lt,
        }
    }
    i
}

/// `<!--comment-->`, `<!doctype ...>`, or a bogus declaration (skipped).
fn scan_declaration<F: FnMut(Token)>(input: &str, lt: usize, sink: &mut F) -> Option<usize> {
    let rest = &input[lt..];
    if rest.starts_with("<!--") {
        let body = &rest[4..];
        let end = body.find("-->")?;
        sink(Token::Comment(body[..end].to_string()));
        return Some(lt + 4 + end + 3);
    }
    if rest.len() < 4 && "<!--".starts_with(rest) {
        // Could still become a comment opener.
        return None;
    }
    let end = memchr(b'>', rest.as_bytes())?;
    let body = rest[2..end].trim();
    if body.get(..7).is_some_and(|p| p.eq_ignore_ascii_case("doctype")) {
        sink(Token::Doctype(body.to_string()));
    } else {
        log::trace!(target: "richtext.tokenizer", "skipping declaration: {body:?}");
    }
    Some(lt + end + 1)
}

fn scan_end_tag<F: FnMut(Token)>(input: &str, lt: usize, sink: &mut F) -> Option<usize> {
    let bytes = input.as_bytes();
    let mut j = lt + 2;
    while j < bytes.len() && is_name_byte(bytes[j]) {
        j += 1;
    }
    let name_end = j;
    // Anything between the name and '>' is discarded (end tags carry no
    // attributes in this dialect).
    while j < bytes.len() && bytes[j] != b'>' {
        j += 1;
    }
    if j == bytes.len() {
        return None;
    }
    let name = input[lt + 2..name_end].to_ascii_lowercase();
    if !name.is_empty() {
        sink(Token::EndTag(name));
    }
    Some(j + 1)
}

fn scan_start_tag<F: FnMut(Token)>(input: &str, lt: usize, sink: &mut F) -> Option<usize> {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut j = lt + 1;
    while j < len && is_name_byte(bytes[j]) {
        j += 1;
    }
    if j == len {
        // The name may continue in the next chunk.
        return None;
    }
    let name = input[lt + 1..j].to_ascii_lowercase();
    let mut attributes = Vec::new();
    let mut explicit_self_close = false;
    loop {
        while j < len && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if j == len {
            return None;
        }
        match bytes[j] {
            b'>' => {
                j += 1;
                break;
            }
            b'/' => {
                if j + 1 == len {
                    return None;
                }
                if bytes[j + 1] == b'>' {
                    explicit_self_close = true;
                    j += 2;
                    break;
                }
                // Stray slash inside the tag.
                j += 1;
            }
            _ => {
                let name_start = j;
                while j < len && is_name_byte(bytes[j]) {
                    j += 1;
                }
                if j == len {
                    return None;
                }
                if name_start == j {
                    // Junk byte, not a name character.
                    j += 1;
                    continue;
                }
                let attr_name = input[name_start..j].to_ascii_lowercase();
                while j < len && bytes[j].is_ascii_whitespace() {
                    j += 1;
                }
                if j == len {
                    return None;
                }
                let value = if bytes[j] == b'=' {
                    j += 1;
                    while j < len && bytes[j].is_ascii_whitespace() {
                        j += 1;
                    }
                    if j == len {
                        return None;
                    }
                    if bytes[j] == b'"' || bytes[j] == b'\'' {
                        let quote = bytes[j];
                        j += 1;
                        let value_start = j;
                        while j < len && bytes[j] != quote {
                            j += 1;
                        }
                        if j == len {
                            return None;
                        }
                        let raw = &input[value_start..j];
                        j += 1;
                        Some(decode_entities(raw))
                    } else {
                        let value_start = j;
                        while j < len
                            && !bytes[j].is_ascii_whitespace()
                            && bytes[j] != b'>'
                            && !(bytes[j] == b'/' && j + 1 < len && bytes[j + 1] == b'>')
                        {
                            j += 1;
                        }
                        if j == len {
                            return None;
                        }
                        Some(decode_entities(&input[value_start..j]))
                    }
                } else {
                    None
                };
                attributes.push((attr_name, value));
            }
        }
    }
    let self_closing = explicit_self_close || is_void_element(&name);
    sink(Token::StartTag {
        name,
        attributes,
        self_closing,
    });
    Some(j)
}
