//! Text encoding detection for subtitle files
//!
//! Subtitle files in the wild come in many legacy code pages. Detection
//! follows a fixed order: a byte order mark wins, then strict UTF-8, then a
//! list of common CJK and Western legacy encodings. A legacy candidate is
//! only accepted when it decodes without errors and the result looks like an
//! ASS/SSA script.
//!
//! # Examples
//!
//! ```rust
//! use ass_fonts::utils::encoding::decode_document;
//!
//! let (text, encoding) = decode_document(b"[Script Info]\nTitle: x\n", None)?;
//! assert_eq!(encoding, encoding_rs::UTF_8);
//! assert!(text.starts_with("[Script Info]"));
//! # Ok::<(), ass_fonts::parser::ParseError>(())
//! ```

use encoding_rs::{Encoding, BIG5, EUC_KR, GB18030, SHIFT_JIS, UTF_8, WINDOWS_1252};

use crate::parser::ParseError;

/// Legacy encodings tried after UTF-8, in order
fn legacy_candidates() -> [&'static Encoding; 5] {
    [GB18030, BIG5, SHIFT_JIS, EUC_KR, WINDOWS_1252]
}

/// Resolve an encoding label such as `"utf-8"` or `"gbk"`
///
/// # Errors
///
/// Returns [`ParseError::UnknownEncoding`] when the label is not recognised.
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding, ParseError> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| ParseError::UnknownEncoding {
        label: label.to_string(),
    })
}

/// Check whether decoded text plausibly belongs to an ASS/SSA script
#[must_use]
pub fn looks_like_ass(text: &str) -> bool {
    text.lines().take(64).any(|line| {
        let line = line.trim_start_matches('\u{feff}').trim();
        line.eq_ignore_ascii_case("[script info]")
            || line.eq_ignore_ascii_case("[v4+ styles]")
            || line.eq_ignore_ascii_case("[v4 styles]")
            || line.eq_ignore_ascii_case("[events]")
    })
}

/// Guess the encoding of raw subtitle bytes
///
/// Returns `None` when no candidate decodes cleanly into ASS-looking text.
#[must_use]
pub fn detect_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return Some(encoding);
    }

    if core::str::from_utf8(bytes).is_ok() {
        return Some(UTF_8);
    }

    legacy_candidates().into_iter().find(|encoding| {
        encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .is_some_and(|text| looks_like_ass(&text))
    })
}

/// Decode subtitle bytes into text
///
/// With an explicit `encoding` the bytes must decode without replacement
/// characters. Without one, [`detect_encoding`] picks the encoding. A byte
/// order mark is always stripped.
///
/// # Errors
///
/// Returns [`ParseError::EncodingError`] when the bytes cannot be decoded.
pub fn decode_document(
    bytes: &[u8],
    encoding: Option<&'static Encoding>,
) -> Result<(String, &'static Encoding), ParseError> {
    let encoding = match encoding {
        Some(encoding) => encoding,
        None => detect_encoding(bytes).ok_or_else(|| ParseError::EncodingError {
            encoding: "auto".to_string(),
            reason: "no candidate encoding produced a valid script".to_string(),
        })?,
    };

    let (text, actual, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(ParseError::EncodingError {
            encoding: actual.name().to_string(),
            reason: "input contains byte sequences invalid for this encoding".to_string(),
        });
    }

    Ok((text.into_owned(), actual))
}

/// Encode text for writing, failing on unmappable characters
///
/// # Errors
///
/// Returns [`ParseError::EncodingError`] when a character has no
/// representation in `encoding`.
pub fn encode_document(text: &str, encoding: &'static Encoding) -> Result<Vec<u8>, ParseError> {
    let (bytes, actual, had_errors) = encoding.encode(text);
    if had_errors {
        return Err(ParseError::EncodingError {
            encoding: actual.name().to_string(),
            reason: "text contains characters this encoding cannot represent".to_string(),
        });
    }
    Ok(bytes.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_bom_first() {
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend("[Script Info]".encode_utf16().flat_map(u16::to_le_bytes));
        assert_eq!(detect_encoding(&bytes), Some(encoding_rs::UTF_16LE));
    }

    #[test]
    fn detect_plain_utf8() {
        assert_eq!(detect_encoding("[Events]\n中文".as_bytes()), Some(UTF_8));
    }

    #[test]
    fn detect_gb18030_script() {
        let (bytes, _, _) = GB18030.encode("[Script Info]\nTitle: 字幕\n");
        assert_eq!(detect_encoding(&bytes), Some(GB18030));
    }

    #[test]
    fn detect_rejects_non_script_binary() {
        assert_eq!(detect_encoding(&[0x81, 0x20, 0xFF, 0xFE, 0x00]), None);
    }

    #[test]
    fn decode_strips_bom() {
        let (text, encoding) = decode_document(b"\xEF\xBB\xBF[Events]", None).unwrap();
        assert_eq!(text, "[Events]");
        assert_eq!(encoding, UTF_8);
    }

    #[test]
    fn decode_with_explicit_encoding_rejects_garbage() {
        let err = decode_document(&[0xFF, 0xFF], Some(UTF_8)).unwrap_err();
        assert!(matches!(err, ParseError::EncodingError { .. }));
    }

    #[test]
    fn encode_reports_unmappable_characters() {
        assert!(encode_document("字", WINDOWS_1252).is_err());
        assert_eq!(encode_document("abc", UTF_8).unwrap(), b"abc");
    }

    #[test]
    fn label_lookup() {
        assert_eq!(encoding_for_label(" UTF-8 ").unwrap(), UTF_8);
        assert!(matches!(
            encoding_for_label("klingon"),
            Err(ParseError::UnknownEncoding { .. })
        ));
    }
}
