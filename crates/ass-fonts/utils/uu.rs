//! Binary-to-text codec used by the `[Fonts]` and `[Graphics]` sections
//!
//! ASS embeds binary attachments with a uuencode variant that has no length
//! prefix and no `begin`/`end` framing. Every group of three input bytes is
//! split into four 6-bit values, each stored as the printable character
//! `value + 33`. A trailing group of one byte yields two characters and a
//! trailing group of two bytes yields three.
//!
//! # Examples
//!
//! ```rust
//! use ass_fonts::utils::uu::{decode, encode};
//!
//! let text = encode(b"font");
//! assert_eq!(decode(&text)?, b"font");
//! # Ok::<(), ass_fonts::utils::uu::CodecError>(())
//! ```

use thiserror::Error;

/// Offset added to every 6-bit value to make it printable
const OFFSET: u8 = 33;

/// Highest character the encoder can produce (`63 + 33`)
const MAX_CHAR: u8 = 63 + OFFSET;

/// Failure while decoding embedded attachment text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Input length leaves a single dangling character, which cannot carry a byte
    #[error("malformed attachment data: {length} characters leave a dangling character")]
    DanglingCharacter {
        /// Total number of encoded characters
        length: usize,
    },

    /// Character outside the `!`..=`` ` `` alphabet
    #[error("malformed attachment data: character {found:?} at offset {offset} is out of range")]
    OutOfRange {
        /// Byte offset within the encoded text
        offset: usize,
        /// Offending character
        found: char,
    },
}

/// Encode binary data into attachment text
///
/// The result contains no line breaks; use [`wrap_lines`] to split it into
/// section lines.
#[must_use]
pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(3) * 4);

    for chunk in data.chunks(3) {
        let b0 = chunk[0];
        let b1 = chunk.get(1).copied().unwrap_or(0);
        let b2 = chunk.get(2).copied().unwrap_or(0);

        let codes = [
            b0 >> 2,
            ((b0 & 0x03) << 4) | (b1 >> 4),
            ((b1 & 0x0F) << 2) | (b2 >> 6),
            b2 & 0x3F,
        ];

        for &code in &codes[..=chunk.len()] {
            out.push(char::from(code + OFFSET));
        }
    }

    out
}

/// Decode attachment text back into bytes
///
/// # Errors
///
/// Returns [`CodecError::DanglingCharacter`] when the length leaves a lone
/// trailing character and [`CodecError::OutOfRange`] for characters the
/// encoder never produces.
pub fn decode(text: &str) -> Result<Vec<u8>, CodecError> {
    let bytes = text.as_bytes();
    if bytes.len() % 4 == 1 {
        return Err(CodecError::DanglingCharacter {
            length: bytes.len(),
        });
    }

    let mut out = Vec::with_capacity(bytes.len() / 4 * 3 + 2);

    for (chunk_index, chunk) in bytes.chunks(4).enumerate() {
        let mut codes = [0u8; 4];
        for (i, &byte) in chunk.iter().enumerate() {
            if !(OFFSET..=MAX_CHAR).contains(&byte) {
                let offset = chunk_index * 4 + i;
                return Err(CodecError::OutOfRange {
                    offset,
                    found: text[offset..].chars().next().unwrap_or(char::from(byte)),
                });
            }
            codes[i] = byte - OFFSET;
        }

        out.push((codes[0] << 2) | (codes[1] >> 4));
        if chunk.len() > 2 {
            out.push(((codes[1] & 0x0F) << 4) | (codes[2] >> 2));
        }
        if chunk.len() > 3 {
            out.push(((codes[2] & 0x03) << 6) | codes[3]);
        }
    }

    Ok(out)
}

/// Split encoded text into lines of at most `width` characters
///
/// A zero width yields the whole text as a single line.
pub fn wrap_lines(encoded: &str, width: usize) -> impl Iterator<Item = &str> {
    let width = if width == 0 { encoded.len().max(1) } else { width };
    // The alphabet is ASCII, so byte offsets are character offsets.
    encoded
        .as_bytes()
        .chunks(width)
        .map(|chunk| core::str::from_utf8(chunk).unwrap_or_default())
}
