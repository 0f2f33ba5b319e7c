//! Strict text decoding and encoding between named character encodings.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};

/// Decodes `bytes` as `encoding`, returning `None` on any malformed input.
///
/// The WHATWG tables map the holes of the `windows-125x` code pages to C1
/// controls instead of failing; those are treated as malformed here.
pub fn decode_strict<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> Option<Cow<'a, str>> {
    let text = encoding.decode_without_bom_handling_and_without_replacement(bytes)?;
    if is_windows_code_page(encoding) && text.chars().any(is_c1_control) {
        return None;
    }
    Some(text)
}

/// Encodes `text` as `encoding`, returning `None` if a character has no
/// mapping or the encoding cannot be written at all.
pub fn encode_strict<'a>(text: &'a str, encoding: &'static Encoding) -> Option<Cow<'a, [u8]>> {
    if encoding == UTF_16LE {
        return Some(Cow::Owned(text.encode_utf16().flat_map(u16::to_le_bytes).collect()));
    }
    if encoding == UTF_16BE {
        return Some(Cow::Owned(text.encode_utf16().flat_map(u16::to_be_bytes).collect()));
    }
    if !can_encode(encoding) {
        return None;
    }
    let (bytes, used, had_unmappable) = encoding.encode(text);
    if had_unmappable || used != encoding {
        None
    } else {
        Some(bytes)
    }
}

/// `encoding_rs` substitutes UTF-8 when asked to write UTF-16 or the
/// replacement encoding; only UTF-16 is written by hand here.
pub fn can_encode(encoding: &'static Encoding) -> bool {
    encoding == UTF_16LE || encoding == UTF_16BE || encoding.output_encoding() == encoding
}

fn is_windows_code_page(encoding: &'static Encoding) -> bool {
    encoding.name().starts_with("windows-125")
}

fn is_c1_control(c: char) -> bool {
    ('\u{80}'..='\u{9f}').contains(&c)
}
