//! Font file backends
//!
//! [`FontBackend`] is the seam between the embedding logic and real font
//! parsing. [`TtfBackend`] reads names with `ttf-parser`, extracts faces from
//! collections with `write-fonts` and, with the `harfbuzz` feature, subsets
//! with HarfBuzz.

use std::{borrow::Cow, collections::BTreeSet};

use encoding_rs::{Encoding, BIG5, EUC_KR, GBK, MACINTOSH, SHIFT_JIS};
use ttf_parser::{name::Name, name_id, PlatformId};
use write_fonts::{
    read::{FontRef, ReadError},
    types::Tag,
    FontBuilder,
};

use super::{FaceNames, FontError, StyleFlag};

/// Tag of the naming table
const NAME_TAG: Tag = Tag::new(b"name");

/// Font parsing, extraction and subsetting operations
pub trait FontBackend: Send + Sync {
    /// Names and style attributes of every face in `data`
    ///
    /// # Errors
    ///
    /// Fails when any face cannot be parsed.
    fn read_faces(&self, data: &[u8]) -> Result<Vec<FaceNames>, FontError>;

    /// Whether `data` is a font collection
    fn is_collection(&self, data: &[u8]) -> bool {
        data.starts_with(b"ttcf")
    }

    /// Copy face `index` of a collection into a standalone font
    ///
    /// # Errors
    ///
    /// Fails when the face does not exist or cannot be copied.
    fn extract_face(&self, data: &[u8], index: u32) -> Result<Vec<u8>, FontError>;

    /// Reduce face `index` to the glyphs needed for `chars`
    ///
    /// Names in `preserve_names` (lower-case) must still be present in the
    /// result so the subset font keeps matching the references to it.
    ///
    /// # Errors
    ///
    /// Fails when the font cannot be subset.
    fn subset(
        &self,
        data: &[u8],
        index: u32,
        chars: &BTreeSet<char>,
        preserve_names: &BTreeSet<String>,
    ) -> Result<Vec<u8>, FontError>;
}

/// Backend built on `ttf-parser`, `write-fonts` and optionally HarfBuzz
#[derive(Debug, Clone, Copy, Default)]
pub struct TtfBackend;

impl TtfBackend {
    /// Create the backend
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Put the original naming table back when subsetting dropped a name
    /// that references rely on
    #[cfg_attr(not(feature = "harfbuzz"), allow(dead_code))]
    fn restore_names(
        &self,
        original: &[u8],
        subset: Vec<u8>,
        preserve_names: &BTreeSet<String>,
    ) -> Result<Vec<u8>, FontError> {
        if preserve_names.is_empty() {
            return Ok(subset);
        }
        let kept = self.read_faces(&subset)?;
        let Some(names) = kept.first() else {
            return Err(FontError::subset_failed("subset produced no face"));
        };
        if preserve_names.iter().all(|name| names.has_name(name)) {
            return Ok(subset);
        }

        let source = FontRef::new(original).map_err(FontError::malformed)?;
        let Some(name_table) = source.table_data(NAME_TAG) else {
            return Ok(subset);
        };
        let name_bytes: &[u8] = name_table.as_ref();
        let target = FontRef::new(&subset).map_err(FontError::subset_failed)?;
        log::debug!("restoring naming table dropped by subsetting");
        Ok(FontBuilder::new()
            .add_raw(NAME_TAG, name_bytes)
            .copy_missing_tables(target)
            .build())
    }
}

/// Decode a naming table record, including legacy CJK and Mac encodings
fn decode_name(record: &Name<'_>) -> Option<String> {
    if let Some(text) = record.to_string() {
        return Some(text);
    }

    let encoding: &'static Encoding = match (record.platform_id, record.encoding_id) {
        (PlatformId::Macintosh, 0) => MACINTOSH,
        (PlatformId::Macintosh, 1) | (PlatformId::Windows, 2) => SHIFT_JIS,
        (PlatformId::Macintosh, 2) | (PlatformId::Windows, 4) => BIG5,
        (PlatformId::Macintosh, 3) | (PlatformId::Windows, 5) => EUC_KR,
        (PlatformId::Macintosh, 25) | (PlatformId::Windows, 3) => GBK,
        _ => return None,
    };

    // Windows stores these code pages in 16-bit units with zero padding.
    let bytes: Cow<'_, [u8]> = if record.platform_id == PlatformId::Windows {
        Cow::Owned(record.name.iter().copied().filter(|&b| b != 0).collect())
    } else {
        Cow::Borrowed(record.name)
    };
    let (text, _) = encoding.decode_without_bom_handling(&bytes);
    let text = text.trim_end_matches('\0');
    (!text.is_empty()).then(|| text.to_string())
}

fn face_names(face: &ttf_parser::Face<'_>) -> FaceNames {
    let mut names = FaceNames {
        weight: face.weight().to_number(),
        style: if face.is_italic() {
            StyleFlag::Italic
        } else if face.is_oblique() {
            StyleFlag::Oblique
        } else {
            StyleFlag::Normal
        },
        ..FaceNames::default()
    };

    for record in face.names() {
        let Some(text) = decode_name(&record) else {
            continue;
        };
        match record.name_id {
            name_id::FAMILY => {
                names.family_names.insert(text);
            }
            name_id::FULL_NAME => {
                names.full_names.insert(text);
            }
            name_id::POST_SCRIPT_NAME if names.postscript_name.is_empty() => {
                names.postscript_name = text;
            }
            _ => {}
        }
    }
    names
}

impl FontBackend for TtfBackend {
    fn read_faces(&self, data: &[u8]) -> Result<Vec<FaceNames>, FontError> {
        let count = ttf_parser::fonts_in_collection(data).unwrap_or(1);
        (0..count)
            .map(|index| {
                ttf_parser::Face::parse(data, index)
                    .map(|face| face_names(&face))
                    .map_err(FontError::malformed)
            })
            .collect()
    }

    fn extract_face(&self, data: &[u8], index: u32) -> Result<Vec<u8>, FontError> {
        let font = FontRef::from_index(data, index).map_err(|err| match err {
            ReadError::InvalidCollectionIndex(index) => FontError::FaceNotFound {
                origin: String::new(),
                index,
            },
            other => FontError::malformed(other),
        })?;
        Ok(FontBuilder::new().copy_missing_tables(font).build())
    }

    #[cfg(feature = "harfbuzz")]
    fn subset(
        &self,
        data: &[u8],
        index: u32,
        chars: &BTreeSet<char>,
        preserve_names: &BTreeSet<String>,
    ) -> Result<Vec<u8>, FontError> {
        use hb_subset::{Blob, FontFace, SubsetInput};

        let standalone = if self.is_collection(data) {
            self.extract_face(data, index)?
        } else if index == 0 {
            data.to_vec()
        } else {
            return Err(FontError::FaceNotFound {
                origin: String::new(),
                index,
            });
        };

        let mut subset_input = SubsetInput::new().map_err(FontError::subset_failed)?;
        {
            let mut unicode_set = subset_input.unicode_set();
            for &c in chars {
                unicode_set.insert(c);
            }
        }

        let font = FontFace::new(Blob::from_bytes(&standalone).map_err(FontError::subset_failed)?)
            .map_err(FontError::subset_failed)?;
        let subset_font = subset_input
            .subset_font(&font)
            .map_err(FontError::subset_failed)?;
        let bytes = subset_font.underlying_blob().to_vec();
        log::debug!(
            "subset {} chars: {} -> {} bytes",
            chars.len(),
            standalone.len(),
            bytes.len()
        );

        self.restore_names(&standalone, bytes, preserve_names)
    }

    #[cfg(not(feature = "harfbuzz"))]
    fn subset(
        &self,
        _data: &[u8],
        _index: u32,
        _chars: &BTreeSet<char>,
        _preserve_names: &BTreeSet<String>,
    ) -> Result<Vec<u8>, FontError> {
        Err(FontError::SubsetUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_is_malformed() {
        let err = TtfBackend::new().read_faces(b"not a font").unwrap_err();
        assert!(matches!(err, FontError::Malformed { .. }));
    }

    #[test]
    fn extract_from_garbage_fails() {
        assert!(TtfBackend::new().extract_face(b"garbage", 0).is_err());
    }

    #[test]
    fn collection_magic() {
        let backend = TtfBackend::new();
        assert!(backend.is_collection(b"ttcf\x00\x01"));
        assert!(!backend.is_collection(b"\x00\x01\x00\x00"));
    }

    #[cfg(not(feature = "harfbuzz"))]
    #[test]
    fn subset_unavailable_without_harfbuzz() {
        let err = TtfBackend::new()
            .subset(b"", 0, &BTreeSet::new(), &BTreeSet::new())
            .unwrap_err();
        assert_eq!(err, FontError::SubsetUnavailable);
    }
}
