//! Writing embedded fonts back to disk

use std::{fs, path::Path};

use crate::{
    parser::Document,
    utils::errors::{CoreError, Result},
};

/// Decode attachment `(name, index)` and write it to `path`
///
/// # Errors
///
/// Returns [`CoreError::MissingAttachment`] when the document has no such
/// attachment, a codec error for malformed data and [`CoreError::Io`] when
/// the file cannot be written.
pub fn extract_embedded_font(document: &Document, name: &str, index: usize, path: &Path) -> Result<()> {
    let fonts = document.fonts().ok_or_else(|| CoreError::MissingAttachment {
        name: name.to_string(),
        index,
    })?;
    let data = fonts.decode(name, index)?;
    fs::write(path, &data).map_err(|err| CoreError::io(path, &err))?;
    log::info!("extracted {name} #{index} ({} bytes) to {}", data.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_decoded_bytes() {
        let mut document = Document::default();
        document.fonts_mut().add(b"font bytes", "a.ttf", 0, false);
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a.ttf");

        extract_embedded_font(&document, "a.ttf", 0, &out).unwrap();
        assert_eq!(fs::read(&out).unwrap(), b"font bytes");
    }

    #[test]
    fn missing_attachment_and_bad_target() {
        let mut document = Document::default();
        let dir = tempfile::tempdir().unwrap();
        let err = extract_embedded_font(&document, "a.ttf", 0, &dir.path().join("x")).unwrap_err();
        assert!(matches!(err, CoreError::MissingAttachment { .. }));

        document.fonts_mut().add(b"x", "a.ttf", 0, false);
        let err = extract_embedded_font(&document, "a.ttf", 0, &dir.path().join("no/such/dir/x"))
            .unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
    }
}
