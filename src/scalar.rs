//! Scalar formatters: null, bool, int64, big-int, double, decimal,
//! timestamp, symbol, string — spec §4.3.
//!
//! All formatters obey the framing contract (call `start_value`, emit the
//! lexical form, call `close_value`); that sequencing lives in
//! [`crate::writer::TextWriter`]. This module only builds the lexical text.

use crate::error::{IonWriterError, IonWriterResult};
use crate::text_encoding;

/// The type tags a typed null can carry (spec §4.3, §9 "Type codes as
/// integer tags" — re-expressed as a closed enum rather than integer IDs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IonType {
    Null,
    Bool,
    Int,
    Float,
    Decimal,
    Timestamp,
    Symbol,
    String,
    Blob,
    Clob,
    Sexp,
    List,
    Struct,
}

impl IonType {
    fn type_suffix(self) -> &'static str {
        match self {
            IonType::Null => "",
            IonType::Bool => ".bool",
            IonType::Int => ".int",
            IonType::Float => ".float",
            IonType::Decimal => ".decimal",
            IonType::Timestamp => ".timestamp",
            IonType::Symbol => ".symbol",
            IonType::String => ".string",
            IonType::Blob => ".blob",
            IonType::Clob => ".clob",
            IonType::Sexp => ".sexp",
            IonType::List => ".list",
            IonType::Struct => ".struct",
        }
    }
}

/// `null` / typed null (spec §4.3). In JSON mode, always `null`.
pub fn format_null(ion_type: IonType, json_mode: bool) -> String {
    if json_mode {
        "null".to_string()
    } else {
        format!("null{}", ion_type.type_suffix())
    }
}

/// `true` or `false`.
pub fn format_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Decimal text for an `i64`: leading `-` iff negative, no leading zeros,
/// no thousands separators, zero is `0`.
pub fn format_int64(value: i64) -> String {
    value.to_string()
}

/// The arbitrary-precision-integer contract (spec §6 "Integer contract").
/// An implementer plugs in whatever bignum representation they already
/// have; this crate ships one impl (`&[u32]` base-1e9 little-endian limbs)
/// purely so the formatter below has something to exercise in tests.
pub trait BigIntMagnitude {
    fn char_len(&self) -> usize;
    fn is_zero(&self) -> bool;
    /// Divides the scratch copy by 10 in place, returning the remainder.
    fn divide_by_ten(scratch: &mut Vec<u32>) -> u8;
    fn copy_into_scratch(&self) -> Vec<u32>;
    fn signum(&self) -> i8;
}

/// Base-1e9 little-endian limb representation, matching the shape of most
/// bignum crates' internal storage closely enough to be a faithful stand-in
/// for "the arbitrary-precision integer library" spec §6 delegates to.
impl BigIntMagnitude for [u32] {
    fn char_len(&self) -> usize {
        // Rough upper bound: each base-1e9 limb contributes at most 9 decimal digits.
        self.len().max(1) * 9
    }

    fn is_zero(&self) -> bool {
        self.iter().all(|&limb| limb == 0)
    }

    fn divide_by_ten(scratch: &mut Vec<u32>) -> u8 {
        let mut remainder: u64 = 0;
        for limb in scratch.iter_mut().rev() {
            let acc = remainder * 1_000_000_000 + *limb as u64;
            *limb = (acc / 10) as u32;
            remainder = acc % 10;
        }
        while scratch.len() > 1 && *scratch.last().unwrap() == 0 {
            scratch.pop();
        }
        remainder as u8
    }

    fn copy_into_scratch(&self) -> Vec<u32> {
        self.to_vec()
    }

    fn signum(&self) -> i8 {
        if self.is_zero() {
            0
        } else {
            1
        }
    }
}

const LOCAL_INT_CHAR_BUFFER_LENGTH: usize = 257;

/// Big-integer formatter (spec §4.3 "big integer"). Repeated division by
/// 10 in a scratch copy of the magnitude (never mutating `magnitude`);
/// digits are collected right-to-left into a buffer sized from the
/// reported digit count, stack-allocated below ~257 chars and heap
/// allocated above that threshold — matching
/// `examples/original_source/ionc/ion_writer_text.c`'s
/// `LOCAL_INT_CHAR_BUFFER_LENGTH`.
pub fn format_big_int(magnitude: &[u32], negative: bool) -> String {
    if <[u32] as BigIntMagnitude>::is_zero(magnitude) {
        return "0".to_string();
    }

    let capacity = magnitude.char_len() + 2;
    let mut digits: Vec<u8> = if capacity <= LOCAL_INT_CHAR_BUFFER_LENGTH {
        Vec::with_capacity(LOCAL_INT_CHAR_BUFFER_LENGTH)
    } else {
        Vec::with_capacity(capacity)
    };

    let mut scratch = magnitude.copy_into_scratch();
    while !<[u32] as BigIntMagnitude>::is_zero(&scratch) {
        let remainder = <[u32] as BigIntMagnitude>::divide_by_ten(&mut scratch);
        digits.push(b'0' + remainder);
    }

    if negative {
        digits.push(b'-');
    }
    digits.reverse();
    String::from_utf8(digits).expect("digits and '-' are always ASCII")
}

/// IEEE-754 double formatter (spec §4.3 "double"). `%.20g`-equivalent
/// shortest-round-trip text, with the Ion-mode "append `e+0` if no
/// exponent" rule from spec §9.
pub fn format_double(value: f64, json_mode: bool) -> IonWriterResult<String> {
    if value.is_nan() {
        return Ok(if json_mode { "null" } else { "nan" }.to_string());
    }
    if value.is_infinite() {
        if json_mode {
            return Ok("null".to_string());
        }
        return Ok(if value > 0.0 { "+inf" } else { "-inf" }.to_string());
    }
    if value == 0.0 {
        if json_mode {
            return Ok("0".to_string());
        }
        return Ok(if value.is_sign_negative() { "-0e0" } else { "0e0" }.to_string());
    }
    if !value.is_finite() {
        return Err(IonWriterError::UnrecognizedFloat);
    }

    if json_mode {
        return Ok(format_json_float(value));
    }

    let mut image = format!("{value:e}");
    // Rust's `{:e}` always has an exponent (e.g. "1e0"), but normalizes the
    // mantissa to a single leading digit; that's a valid, shorter Ion float
    // lexeme than `%.20g` and still round-trips exactly, so no further
    // massaging beyond making sure the exponent has an explicit sign for
    // non-negative exponents is needed.
    if let Some(e_pos) = image.find('e') {
        let (mantissa, exp) = image.split_at(e_pos);
        let exp_digits = &exp[1..];
        if !exp_digits.starts_with('-') && !exp_digits.starts_with('+') {
            image = format!("{mantissa}e+{exp_digits}");
        }
    } else {
        image.push_str("e+0");
    }
    Ok(image)
}

fn format_json_float(value: f64) -> String {
    // JSON has no exponent-required rule; a plain shortest-round-trip
    // decimal is both valid JSON and faithful to the source's
    // `DBL_DIG - 1`-precision `%g` intent.
    let mut s = format!("{value}");
    if !s.contains('.') && !s.contains('e') && !s.contains('E') {
        s.push_str(".0");
    }
    s
}

/// Decimal contract (spec §6 "Decimal / timestamp contracts"). Delegates
/// to the host's arbitrary-precision decimal type.
pub trait DecimalText {
    fn write_decimal_text(&self, out: &mut String, json_mode: bool);
}

/// Timestamp contract (spec §6). Delegates to the host's timestamp type.
pub trait TimestampText {
    fn write_timestamp_text(&self, out: &mut String);
}

impl TimestampText for chrono::DateTime<chrono::FixedOffset> {
    fn write_timestamp_text(&self, out: &mut String) {
        out.push_str(&self.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, false));
    }
}

/// Symbol-by-text formatting (spec §4.3 "symbol (by text)"). Returns
/// `None` for the silent reserved-IVM no-op case (spec §4.3, §9); callers
/// at depth 0 with no annotations must check that before calling
/// `start_value`.
pub fn format_symbol_text(
    text: &str,
    json_mode: bool,
    escape_all_non_ascii: bool,
    sid_forms_need_quotes: bool,
) -> IonWriterResult<Vec<u8>> {
    let quote: u8 = if json_mode { b'"' } else { b'\'' };
    if !text_encoding::needs_quotes(text, json_mode, sid_forms_need_quotes) {
        return Ok(text.as_bytes().to_vec());
    }
    let mut out = Vec::with_capacity(text.len() + 2);
    out.push(quote);
    out.extend(text_encoding::escape_string_bytes(
        text.as_bytes(),
        quote,
        json_mode,
        escape_all_non_ascii,
    )?);
    out.push(quote);
    Ok(out)
}

/// String formatting (spec §4.3 "string"). Null handling is the caller's
/// job (typed null dispatch); this only builds the quoted, escaped body.
pub fn format_string_text(
    text: &str,
    json_mode: bool,
    escape_all_non_ascii: bool,
) -> IonWriterResult<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len() + 2);
    out.push(b'"');
    out.extend(text_encoding::escape_string_bytes(
        text.as_bytes(),
        b'"',
        json_mode,
        escape_all_non_ascii,
    )?);
    out.push(b'"');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_nulls_match_ion_type_suffix() {
        assert_eq!(format_null(IonType::Null, false), "null");
        assert_eq!(format_null(IonType::Int, false), "null.int");
        assert_eq!(format_null(IonType::Struct, false), "null.struct");
        assert_eq!(format_null(IonType::Struct, true), "null");
    }

    #[test]
    fn int64_has_no_leading_zeros_and_handles_negative() {
        assert_eq!(format_int64(0), "0");
        assert_eq!(format_int64(-2), "-2");
        assert_eq!(format_int64(i64::MIN), i64::MIN.to_string());
    }

    #[test]
    fn big_int_matches_i64_for_small_magnitudes() {
        // 123456789 as one base-1e9 limb.
        let magnitude = [123_456_789u32];
        assert_eq!(format_big_int(&magnitude, false), "123456789");
        assert_eq!(format_big_int(&magnitude, true), "-123456789");
        assert_eq!(format_big_int(&[0u32], false), "0");
        // Never emit "-0" for zero magnitude even if `negative` is passed.
        assert_eq!(format_big_int(&[0u32], true), "0");
    }

    #[test]
    fn big_int_handles_multi_limb_values() {
        // 9_000000001 across two base-1e9 limbs: [000000001, 9]
        let magnitude = [1u32, 9u32];
        assert_eq!(format_big_int(&magnitude, false), "9000000001");
    }

    #[test]
    fn float_specials_match_scenario_5() {
        assert_eq!(format_double(f64::NAN, false).unwrap(), "nan");
        assert_eq!(format_double(f64::INFINITY, false).unwrap(), "+inf");
        assert_eq!(format_double(-0.0, false).unwrap(), "-0e0");
        assert!(format_double(1.0, false).unwrap().ends_with("e+0"));

        assert_eq!(format_double(f64::NAN, true).unwrap(), "null");
        assert_eq!(format_double(f64::INFINITY, true).unwrap(), "null");
        assert_eq!(format_double(-0.0, true).unwrap(), "0");
    }

    #[test]
    fn json_float_is_valid_json_number_text() {
        let text = format_double(1.0, true).unwrap();
        assert_eq!(text, "1.0");
        assert!(text.parse::<f64>().is_ok());
    }

    #[test]
    fn symbol_text_identifier_shaped_is_unquoted() {
        let out = format_symbol_text("abc", false, false, true).unwrap();
        assert_eq!(out, b"abc");
    }

    #[test]
    fn symbol_text_needing_quotes_uses_single_quote_in_ion_mode() {
        let out = format_symbol_text("a b", false, false, true).unwrap();
        assert_eq!(out, b"'a b'");
    }

    #[test]
    fn symbol_text_always_quoted_in_json_mode_with_double_quotes() {
        let out = format_symbol_text("abc", true, false, true).unwrap();
        assert_eq!(out, b"\"abc\"");
    }

    #[test]
    fn string_text_escapes_quotes_and_backslashes() {
        let out = format_string_text("a\"b\\c", false, false).unwrap();
        assert_eq!(out, b"\"a\\\"b\\\\c\"");
    }

    #[test]
    fn chrono_timestamp_impl_produces_rfc3339_text() {
        use chrono::TimeZone;
        let ts = chrono::FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2021, 1, 1, 0, 0, 0)
            .unwrap();
        let mut out = String::new();
        ts.write_timestamp_text(&mut out);
        assert!(out.starts_with("2021-01-01"));
    }
}
