//! Quoting policy, escaping, and UTF-8 decode-to-scalar (spec §4.6).
//!
//! The teacher precompiles a battery of `Regex` objects once and matches
//! scalar text against them to resolve implicit tags
//! (`resolver.rs::AdvancedResolver::initialize_patterns`). We keep that
//! idiom for the two checks that are genuinely regex-shaped and rare
//! (the reserved-IVM-form check and the `$digit` SID-shaped check), but the
//! general identifier-quoting predicate below runs on every field name and
//! annotation — a much hotter path — so it is a direct byte scan instead.
//!
//! Escaped output is built as raw bytes, not `String`: the UTF-8-preserving
//! driver must pass non-ASCII bytes through verbatim, and re-interpreting
//! an arbitrary byte as a `char` would silently re-encode it.

use crate::error::{IonWriterError, IonWriterResult};
use regex::Regex;
use std::sync::OnceLock;

pub const RESERVED_KEYWORDS: &[&str] = &[
    "null", "true", "false", "nan",
    "null.bool", "null.int", "null.float", "null.decimal", "null.timestamp",
    "null.symbol", "null.string", "null.blob", "null.clob", "null.sexp",
    "null.list", "null.struct",
];

fn ivm_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\$ion_[0-9]+_[0-9]+$").unwrap())
}

fn sid_shaped_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\$[0-9]+$").unwrap())
}

/// True iff `text` is the reserved `$ion_M_m` IVM form (spec §4.3, §9).
pub fn is_reserved_ivm_form(text: &str) -> bool {
    ivm_pattern().is_match(text)
}

fn is_sid_shaped(text: &str) -> bool {
    sid_shaped_pattern().is_match(text)
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Quoting predicate (spec §4.6): returns true when the symbol text needs
/// quotes to round-trip as an Ion identifier-shaped symbol.
pub fn needs_quotes(text: &str, json_downconvert: bool, sid_forms_need_quotes: bool) -> bool {
    if json_downconvert {
        return true;
    }
    if text.is_empty() {
        return true;
    }
    let mut chars = text.chars();
    let first = chars.next().unwrap();
    if !is_identifier_start(first) {
        return true;
    }
    if !chars.all(is_identifier_continue) {
        return true;
    }
    if RESERVED_KEYWORDS.contains(&text) {
        return true;
    }
    if sid_forms_need_quotes && first == '$' && is_sid_shaped(text) {
        return true;
    }
    false
}

/// A control byte's Ion and JSON escape spellings (spec §4.6 table), for
/// the bytes that have a named escape (as opposed to the generic
/// `\xNN`/`\u00NN` "other <0x20" fallback).
fn named_control_escape(byte: u8) -> Option<(&'static [u8], &'static [u8])> {
    Some(match byte {
        0x00 => (b"\\0" as &[u8], b"\\u0000" as &[u8]),
        0x07 => (b"\\a", b"\\u0007"),
        0x08 => (b"\\b", b"\\b"),
        0x09 => (b"\\t", b"\\t"),
        0x0A => (b"\\n", b"\\n"),
        0x0B => (b"\\v", b"\\u000b"),
        0x0C => (b"\\f", b"\\f"),
        0x0D => (b"\\r", b"\\r"),
        0x1B => (b"\\e", b"\\u001b"),
        0x7F => (b"\\x7f", b"\\u007f"),
        _ => return None,
    })
}

fn other_control_escape(byte: u8, out: &mut Vec<u8>, json_mode: bool) {
    if json_mode {
        out.extend_from_slice(format!("\\u{byte:04x}").as_bytes());
    } else {
        out.extend_from_slice(format!("\\x{byte:02x}").as_bytes());
    }
}

fn quote_and_backslash_escape(byte: u8, quote: u8, json_mode: bool, out: &mut Vec<u8>) -> bool {
    match byte {
        b if b == quote => {
            out.push(b'\\');
            out.push(quote);
            true
        }
        b'\'' if !json_mode && quote != b'\'' => {
            out.extend_from_slice(b"\\'");
            true
        }
        b'/' if json_mode => {
            out.extend_from_slice(b"\\/");
            true
        }
        b'\\' => {
            out.extend_from_slice(b"\\\\");
            true
        }
        _ => false,
    }
}

/// Emits the control/quote/backslash escape for `byte` if it needs one,
/// returning whether it was handled. Bytes < 0x20, DEL, the active quote
/// char, and backslash are escaped; everything else is the caller's job.
pub(crate) fn emit_ascii_escape(byte: u8, quote: u8, json_mode: bool, out: &mut Vec<u8>) -> bool {
    if quote_and_backslash_escape(byte, quote, json_mode, out) {
        return true;
    }
    if byte < 0x20 || byte == 0x7F {
        if let Some((ion, json)) = named_control_escape(byte) {
            out.extend_from_slice(if json_mode { json } else { ion });
        } else {
            other_control_escape(byte, out, json_mode);
        }
        true
    } else {
        false
    }
}

/// Decodes one UTF-8 scalar value starting at `bytes[0]`, per spec §4.6:
/// reject overlongs implicitly via range, reject surrogates decoded from a
/// 3-byte sequence, reject scalars > U+10FFFF, continuation bytes must
/// match `10xxxxxx`. Returns (scalar, bytes consumed).
pub fn decode_utf8_scalar(bytes: &[u8]) -> IonWriterResult<(u32, usize)> {
    let b0 = *bytes
        .first()
        .ok_or_else(|| IonWriterError::InvalidUnicodeSequence("empty input".into()))?;

    let invalid = || IonWriterError::InvalidUnicodeSequence("malformed UTF-8 sequence".into());

    if b0 < 0x80 {
        return Ok((b0 as u32, 1));
    }

    let (len, init) = if b0 & 0xE0 == 0xC0 {
        (2usize, (b0 & 0x1F) as u32)
    } else if b0 & 0xF0 == 0xE0 {
        (3usize, (b0 & 0x0F) as u32)
    } else if b0 & 0xF8 == 0xF0 {
        (4usize, (b0 & 0x07) as u32)
    } else {
        return Err(invalid());
    };

    if bytes.len() < len {
        return Err(invalid());
    }

    let mut scalar = init;
    for &b in &bytes[1..len] {
        if b & 0xC0 != 0x80 {
            return Err(invalid());
        }
        scalar = (scalar << 6) | (b & 0x3F) as u32;
    }

    if (0xD800..=0xDFFF).contains(&scalar) {
        return Err(IonWriterError::InvalidUnicodeSequence(
            "surrogate code point is not a valid scalar".into(),
        ));
    }
    if scalar > 0x10FFFF {
        return Err(IonWriterError::InvalidUnicodeSequence(
            "scalar exceeds U+10FFFF".into(),
        ));
    }

    Ok((scalar, len))
}

/// Scalar -> escape emission (spec §4.6). The `< 0x100` bound is the
/// spec-corrected reading of the source's `< 0x256` (almost certainly a
/// typo for `0x100`; see spec §9 "Open question").
pub fn emit_unicode_escape(scalar: u32, json_mode: bool, out: &mut Vec<u8>) -> IonWriterResult<()> {
    if scalar < 0x80 {
        out.push(scalar as u8);
    } else if scalar < 0x100 && !json_mode {
        out.extend_from_slice(format!("\\x{scalar:02x}").as_bytes());
    } else if scalar < 0x10000 || json_mode {
        out.extend_from_slice(format!("\\u{scalar:04x}").as_bytes());
    } else if scalar <= 0x10FFFF {
        out.extend_from_slice(format!("\\U{scalar:08x}").as_bytes());
    } else {
        return Err(IonWriterError::InvalidUnicodeSequence(
            "invalid unicode".into(),
        ));
    }
    Ok(())
}

/// UTF-8-preserving escape driver: only escapes control bytes, the quote
/// char, and backslash; every other byte (including high multi-byte UTF-8
/// continuations) passes through verbatim.
pub fn escape_utf8_preserving(text: &[u8], quote: u8, json_mode: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for &b in text {
        if !emit_ascii_escape(b, quote, json_mode, &mut out) {
            out.push(b);
        }
    }
    out
}

/// Full escaping driver: additionally escapes every byte >= 0x80 via the
/// UTF-8 decoder and scalar-emission rules. JSON mode always uses this.
pub fn escape_full(text: &[u8], quote: u8, json_mode: bool) -> IonWriterResult<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len());
    let mut i = 0;
    while i < text.len() {
        let b = text[i];
        if b < 0x80 {
            if !emit_ascii_escape(b, quote, json_mode, &mut out) {
                out.push(b);
            }
            i += 1;
        } else {
            let (scalar, consumed) = decode_utf8_scalar(&text[i..])?;
            emit_unicode_escape(scalar, json_mode, &mut out)?;
            i += consumed;
        }
    }
    Ok(out)
}

/// Chooses the escape driver per spec §4.3: UTF-8-preserving when the
/// source is valid UTF-8 and non-ASCII escaping was not requested; full
/// escaping otherwise. JSON mode always forces full escaping.
pub fn escape_string_bytes(
    text: &[u8],
    quote: u8,
    json_mode: bool,
    escape_all_non_ascii: bool,
) -> IonWriterResult<Vec<u8>> {
    if json_mode || escape_all_non_ascii {
        escape_full(text, quote, json_mode)
    } else {
        Ok(escape_utf8_preserving(text, quote, json_mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting_minimality_matches_identifier_shape() {
        assert!(!needs_quotes("abc_123", false, true));
        assert!(!needs_quotes("$foo", false, true));
        assert!(needs_quotes("", false, true));
        assert!(needs_quotes("a b", false, true));
        assert!(needs_quotes("null", false, true));
        assert!(needs_quotes("true", false, true));
        assert!(needs_quotes("$10", false, true));
        assert!(!needs_quotes("$10", false, false));
        assert!(needs_quotes("abc", true, true));
    }

    #[test]
    fn reserved_ivm_form_is_recognized() {
        assert!(is_reserved_ivm_form("$ion_1_0"));
        assert!(is_reserved_ivm_form("$ion_2_15"));
        assert!(!is_reserved_ivm_form("$ion_symbol_table"));
        assert!(!is_reserved_ivm_form("ion_1_0"));
    }

    #[test]
    fn control_escapes_match_the_table_for_both_modes() {
        let mut out = Vec::new();
        assert!(emit_ascii_escape(0x00, b'"', false, &mut out));
        assert_eq!(out, b"\\0");

        let mut out = Vec::new();
        assert!(emit_ascii_escape(0x00, b'"', true, &mut out));
        assert_eq!(out, b"\\u0000");

        let mut out = Vec::new();
        assert!(emit_ascii_escape(b'/', b'"', true, &mut out));
        assert_eq!(out, b"\\/");

        let mut out = Vec::new();
        assert!(!emit_ascii_escape(b'/', b'"', false, &mut out));
    }

    #[test]
    fn utf8_decode_rejects_surrogates_and_overlong_scalars() {
        // U+D800 encoded as a (technically ill-formed) 3-byte sequence.
        let bytes = [0xED, 0xA0, 0x80];
        assert!(decode_utf8_scalar(&bytes).is_err());
    }

    #[test]
    fn utf8_decode_accepts_four_byte_scalar() {
        // U+1F600 (grinning face) = F0 9F 98 80
        let bytes = [0xF0, 0x9F, 0x98, 0x80];
        let (scalar, len) = decode_utf8_scalar(&bytes).unwrap();
        assert_eq!(scalar, 0x1F600);
        assert_eq!(len, 4);
    }

    #[test]
    fn escape_threshold_is_0x100_not_the_source_typo_0x256() {
        let mut out = Vec::new();
        emit_unicode_escape(0xFF, false, &mut out).unwrap();
        assert_eq!(out, b"\\xff");

        let mut out = Vec::new();
        emit_unicode_escape(0x100, false, &mut out).unwrap();
        assert_eq!(out, b"\\u0100");
    }

    #[test]
    fn full_escaping_handles_multibyte_utf8() {
        let text = "a\u{00e9}b".as_bytes(); // a é b
        let escaped = escape_full(text, b'"', false).unwrap();
        assert_eq!(escaped, b"a\\xe9b");
    }

    #[test]
    fn utf8_preserving_passes_through_high_bytes_verbatim() {
        let text = "caf\u{00e9}".as_bytes();
        let escaped = escape_utf8_preserving(text, b'"', false);
        assert_eq!(escaped, text);
    }

    #[test]
    fn escape_fidelity_every_ascii_byte_is_ascii_safe() {
        for b in 0u16..0x80 {
            let b = b as u8;
            let escaped = escape_full(&[b], b'"', false).unwrap();
            assert!(escaped.is_ascii());
        }
    }
}
