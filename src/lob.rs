//! Lob streaming: blob (base-64 with cross-chunk carry) and clob (escaped
//! byte content) — spec §4.4.
//!
//! Streaming means byte boundaries can land anywhere, not just on base-64
//! triplets. The carry state machine below is a direct port of the
//! algorithm in `examples/original_source/ionc/ion_writer_text.c`
//! (`_ion_writer_text_append_blob` / `_ion_writer_text_close_blob_contents`),
//! re-expressed as ordinary Rust state rather than packed C ints.

const BASE64_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const BASE64_PAD: u8 = b'=';

fn base64_image(triple: u32) -> [u8; 4] {
    [
        BASE64_ALPHABET[((triple >> 18) & 0x3F) as usize],
        BASE64_ALPHABET[((triple >> 12) & 0x3F) as usize],
        BASE64_ALPHABET[((triple >> 6) & 0x3F) as usize],
        BASE64_ALPHABET[(triple & 0x3F) as usize],
    ]
}

/// Encodes `input` into `out` as base-64, consuming and updating the
/// writer's carry state (`pending_blob_bytes`/`pending_triple`) so chunk
/// boundaries never have to align to multiples of 3 bytes.
///
/// Base-64 chunking invariance (spec §8): calling this repeatedly with any
/// partition of a blob produces byte-identical output to calling it once
/// with the whole blob.
pub fn append_blob_chunk(
    input: &[u8],
    pending_bytes: &mut u8,
    pending_triple: &mut u32,
    out: &mut Vec<u8>,
) {
    let mut input = input;

    if *pending_bytes > 0 {
        let mut triple = *pending_triple;
        while *pending_bytes < 3 && !input.is_empty() {
            triple = (triple << 8) | input[0] as u32;
            input = &input[1..];
            *pending_bytes += 1;
        }
        if *pending_bytes < 3 {
            *pending_triple = triple;
            return;
        }
        out.extend_from_slice(&base64_image(triple));
        *pending_bytes = 0;
    }

    while input.len() > 2 {
        let triple = (input[0] as u32) << 16 | (input[1] as u32) << 8 | input[2] as u32;
        out.extend_from_slice(&base64_image(triple));
        input = &input[3..];
    }

    *pending_bytes = input.len() as u8;
    *pending_triple = match input.len() {
        0 => 0,
        1 => input[0] as u32,
        2 => (input[0] as u32) << 8 | input[1] as u32,
        _ => unreachable!("at most 2 bytes can remain after the whole-triplet loop"),
    };
}

/// Flushes the carry at blob finish (spec §4.4 *Finish*).
pub fn finish_blob(pending_bytes: u8, pending_triple: u32, out: &mut Vec<u8>) {
    match pending_bytes {
        0 => {}
        1 => {
            let triple = pending_triple << 16;
            let mut image = base64_image(triple);
            image[2] = BASE64_PAD;
            image[3] = BASE64_PAD;
            out.extend_from_slice(&image);
        }
        2 => {
            let triple = pending_triple << 8;
            let mut image = base64_image(triple);
            image[3] = BASE64_PAD;
            out.extend_from_slice(&image);
        }
        _ => unreachable!("pending_blob_bytes is always 0, 1, or 2"),
    }
}

/// Escapes one clob byte per spec §4.4: control bytes use the Ion/JSON
/// escape table, the quote char (always `"` for clob payloads, in both
/// modes) is backslash-escaped, everything else — including high bytes,
/// since clobs are *not* UTF-8-decoded — is literal.
pub fn escape_clob_byte(byte: u8, json_mode: bool, out: &mut Vec<u8>) {
    if !crate::text_encoding::emit_ascii_escape(byte, b'"', json_mode, out) {
        out.push(byte);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_in_one_call(data: &[u8]) -> Vec<u8> {
        let mut pending_bytes = 0u8;
        let mut pending_triple = 0u32;
        let mut out = Vec::new();
        append_blob_chunk(data, &mut pending_bytes, &mut pending_triple, &mut out);
        finish_blob(pending_bytes, pending_triple, &mut out);
        out
    }

    fn encode_chunked(data: &[u8], splits: &[usize]) -> Vec<u8> {
        let mut pending_bytes = 0u8;
        let mut pending_triple = 0u32;
        let mut out = Vec::new();
        let mut start = 0;
        for &split in splits {
            append_blob_chunk(
                &data[start..split],
                &mut pending_bytes,
                &mut pending_triple,
                &mut out,
            );
            start = split;
        }
        append_blob_chunk(
            &data[start..],
            &mut pending_bytes,
            &mut pending_triple,
            &mut out,
        );
        finish_blob(pending_bytes, pending_triple, &mut out);
        out
    }

    #[test]
    fn blob_across_chunks_matches_scenario_4() {
        let data = b"leasure.";
        let mut pending_bytes = 0u8;
        let mut pending_triple = 0u32;
        let mut out = Vec::new();
        append_blob_chunk(b"le", &mut pending_bytes, &mut pending_triple, &mut out);
        append_blob_chunk(b"asure.", &mut pending_bytes, &mut pending_triple, &mut out);
        finish_blob(pending_bytes, pending_triple, &mut out);
        assert_eq!(out, b"bGVhc3VyZS4=");
        assert_eq!(encode_in_one_call(data), out);
    }

    #[test]
    fn base64_chunking_invariance_across_many_partitions() {
        let data = b"The quick brown fox jumps over the lazy dog.";
        let whole = encode_in_one_call(data);
        assert_eq!(encode_chunked(data, &[1, 2, 3, 7, 7, 20]), whole);
        assert_eq!(encode_chunked(data, &[0, data.len()]), whole);
        // Byte-at-a-time chunking.
        let per_byte: Vec<usize> = (1..data.len()).collect();
        assert_eq!(encode_chunked(data, &per_byte), whole);
    }

    #[test]
    fn clob_escapes_quote_and_backslash_but_preserves_high_bytes() {
        let mut out = Vec::new();
        for &b in b"a\"b\\c\n\xffd" {
            escape_clob_byte(b, false, &mut out);
        }
        assert_eq!(out, b"a\\\"b\\\\c\\n\xffd");
    }

    #[test]
    fn known_rfc4648_vectors() {
        assert_eq!(encode_in_one_call(b""), b"");
        assert_eq!(encode_in_one_call(b"f"), b"Zg==");
        assert_eq!(encode_in_one_call(b"fo"), b"Zm8=");
        assert_eq!(encode_in_one_call(b"foo"), b"Zm9v");
        assert_eq!(encode_in_one_call(b"foob"), b"Zm9vYg==");
        assert_eq!(encode_in_one_call(b"fooba"), b"Zm9vYmE=");
        assert_eq!(encode_in_one_call(b"foobar"), b"Zm9vYmFy");
    }
}
