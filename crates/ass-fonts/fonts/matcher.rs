//! Font lookup across the embedded, local and system scopes
//!
//! Scopes are searched in a fixed order: fonts embedded in the document,
//! then font files next to the document, then installed fonts. The system
//! scope only yields a file path; that file is indexed on demand and matched
//! again with the same rules as the other scopes.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use ass_fonts::{fonts::{FontMatcher, Scope, TtfBackend}, EmbedConfig};
//!
//! let matcher = FontMatcher::new(Arc::new(TtfBackend::new()), None, EmbedConfig::default());
//! assert!(matcher.match_font("Arial", false, false, Scope::all()).is_none());
//! ```

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use ahash::AHashMap;
use bitflags::bitflags;
use parking_lot::Mutex;

use super::{
    scan::scan_font_files, FontBackend, FontDescriptor, FontError, FontIndex, SystemFontCatalog,
};
use crate::{config::EmbedConfig, parser::FontTable, utils::uu};

bitflags! {
    /// Where to look for a font
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Scope: u8 {
        /// Fonts embedded in the document
        const EMBEDDED = 1;
        /// Font files in the document's directory
        const LOCAL = 1 << 1;
        /// Installed fonts
        const SYSTEM = 1 << 2;
    }
}

/// An attachment in `[Fonts]` that is not a usable font
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidEmbed {
    /// Embed name
    pub name: String,
    /// Position within the embed name's blob list
    pub index: usize,
    /// Why it could not be used
    pub reason: String,
}

/// Font lookup over the three scopes
pub struct FontMatcher {
    backend: Arc<dyn FontBackend>,
    system: Option<Arc<dyn SystemFontCatalog>>,
    config: EmbedConfig,
    embedded: FontIndex,
    invalid_embedded: Vec<InvalidEmbed>,
    local: FontIndex,
    file_cache: Mutex<AHashMap<PathBuf, Arc<FontIndex>>>,
}

impl std::fmt::Debug for FontMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontMatcher")
            .field("embedded", &self.embedded.len())
            .field("invalid_embedded", &self.invalid_embedded.len())
            .field("local", &self.local.len())
            .field("system", &self.system.is_some())
            .finish_non_exhaustive()
    }
}

impl FontMatcher {
    /// Create a matcher with empty embedded and local scopes
    #[must_use]
    pub fn new(
        backend: Arc<dyn FontBackend>,
        system: Option<Arc<dyn SystemFontCatalog>>,
        config: EmbedConfig,
    ) -> Self {
        Self {
            backend,
            system,
            config,
            embedded: FontIndex::new(),
            invalid_embedded: Vec::new(),
            local: FontIndex::new(),
            file_cache: Mutex::new(AHashMap::new()),
        }
    }

    /// Rebuild the embedded scope from a document's font table
    ///
    /// Attachments that fail to decode or parse are recorded as invalid
    /// instead of being indexed.
    pub fn load_embedded(&mut self, fonts: Option<&FontTable>) {
        self.embedded = FontIndex::new();
        self.invalid_embedded.clear();

        let Some(fonts) = fonts else {
            return;
        };
        for (name, blobs) in fonts.entries() {
            for (index, blob) in blobs.iter().enumerate() {
                let face = uu::decode(blob)
                    .map_err(|err| err.to_string())
                    .and_then(|data| {
                        FontDescriptor::from_embedded(name, index, data, self.backend.as_ref())
                            .map_err(|err| err.to_string())
                    });
                match face {
                    Ok(face) => self.embedded.push(face),
                    Err(reason) => {
                        log::warn!("embedded font {name} #{index} is invalid: {reason}");
                        self.invalid_embedded.push(InvalidEmbed {
                            name: name.to_string(),
                            index,
                            reason,
                        });
                    }
                }
            }
        }
    }

    /// Rebuild the local scope from the font files in `dir`
    pub fn load_local(&mut self, dir: &Path) {
        let files = scan_font_files(dir, &self.config);
        self.local = FontIndex::from_files(&files, self.backend.as_ref());
        log::debug!(
            "indexed {} local faces from {} files in {}",
            self.local.len(),
            files.len(),
            dir.display()
        );
    }

    /// Find the best face for a request within `scope`
    #[must_use]
    pub fn match_font(
        &self,
        name: &str,
        bold: bool,
        italic: bool,
        scope: Scope,
    ) -> Option<Arc<FontDescriptor>> {
        if scope.contains(Scope::EMBEDDED) {
            if let Some(face) = self.embedded.find(name, bold, italic) {
                return Some(Arc::clone(face));
            }
        }
        if scope.contains(Scope::LOCAL) {
            if let Some(face) = self.local.find(name, bold, italic) {
                return Some(Arc::clone(face));
            }
        }
        if scope.contains(Scope::SYSTEM) {
            return self.match_system(name, bold, italic);
        }
        None
    }

    fn match_system(&self, name: &str, bold: bool, italic: bool) -> Option<Arc<FontDescriptor>> {
        let path = self.system.as_ref()?.match_font(name, bold, italic)?;
        if !self.config.is_font_file(&path) {
            return None;
        }
        match self.file_index(&path) {
            // The catalog already decided on this file; fall back to its first face.
            Ok(index) => index
                .find(name, bold, italic)
                .or_else(|| index.faces().first())
                .cloned(),
            Err(err) => {
                log::warn!("system font {} is unusable: {err}", path.display());
                None
            }
        }
    }

    /// Index of a single file, cached for the matcher's lifetime
    fn file_index(&self, path: &Path) -> Result<Arc<FontIndex>, FontError> {
        let mut cache = self.file_cache.lock();
        if let Some(index) = cache.get(path) {
            return Ok(Arc::clone(index));
        }
        let faces = FontDescriptor::from_file(path, self.backend.as_ref())?;
        let index = Arc::new(FontIndex::from_faces(faces));
        cache.insert(path.to_path_buf(), Arc::clone(&index));
        Ok(index)
    }

    /// Match a request against the faces of one specific file
    ///
    /// # Errors
    ///
    /// Returns the error from reading the file.
    pub fn match_in_file(
        &self,
        path: &Path,
        name: &str,
        bold: bool,
        italic: bool,
    ) -> Result<Option<Arc<FontDescriptor>>, FontError> {
        let index = self.file_index(path)?;
        Ok(index.find(name, bold, italic).cloned())
    }

    /// Fonts of the embedded scope
    #[must_use]
    pub const fn embedded(&self) -> &FontIndex {
        &self.embedded
    }

    /// Attachments that could not be loaded
    #[must_use]
    pub fn invalid_embedded(&self) -> &[InvalidEmbed] {
        &self.invalid_embedded
    }

    /// Fonts of the local scope
    #[must_use]
    pub const fn local(&self) -> &FontIndex {
        &self.local
    }

    /// Backend used to read fonts
    #[must_use]
    pub fn backend(&self) -> &dyn FontBackend {
        self.backend.as_ref()
    }

    /// Shared handle to the backend
    #[must_use]
    pub fn backend_handle(&self) -> Arc<dyn FontBackend> {
        Arc::clone(&self.backend)
    }

    /// Settings in use
    #[must_use]
    pub const fn config(&self) -> &EmbedConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::{FaceNames, StyleFlag};
    use std::collections::BTreeSet;

    /// Reads a face from `ps|family|weight|italic` text
    struct TextBackend;

    impl FontBackend for TextBackend {
        fn read_faces(&self, data: &[u8]) -> Result<Vec<FaceNames>, FontError> {
            let text = std::str::from_utf8(data).map_err(FontError::malformed)?;
            let parts: Vec<&str> = text.split('|').collect();
            if parts.len() != 4 {
                return Err(FontError::malformed("expected 4 fields"));
            }
            Ok(vec![FaceNames {
                postscript_name: parts[0].to_string(),
                family_names: BTreeSet::from([parts[1].to_string()]),
                full_names: BTreeSet::new(),
                weight: parts[2].parse().map_err(FontError::malformed)?,
                style: if parts[3] == "1" {
                    StyleFlag::Italic
                } else {
                    StyleFlag::Normal
                },
            }])
        }

        fn extract_face(&self, data: &[u8], _index: u32) -> Result<Vec<u8>, FontError> {
            Ok(data.to_vec())
        }

        fn subset(
            &self,
            data: &[u8],
            _index: u32,
            _chars: &BTreeSet<char>,
            _preserve_names: &BTreeSet<String>,
        ) -> Result<Vec<u8>, FontError> {
            Ok(data.to_vec())
        }
    }

    struct FixedCatalog(PathBuf);

    impl SystemFontCatalog for FixedCatalog {
        fn match_font(&self, _name: &str, _bold: bool, _italic: bool) -> Option<PathBuf> {
            Some(self.0.clone())
        }
    }

    fn table(fonts: &[(&str, &[u8])]) -> FontTable {
        let mut table = FontTable::new();
        for (name, data) in fonts {
            table.add(data, name, 0, false);
        }
        table
    }

    #[test]
    fn embedded_scope_comes_first() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("local.ttf"), b"Local-Regular|Demo|400|0").unwrap();

        let mut matcher = FontMatcher::new(Arc::new(TextBackend), None, EmbedConfig::default());
        matcher.load_embedded(Some(&table(&[("demo.ttf", b"Embedded-Regular|Demo|400|0")])));
        matcher.load_local(dir.path());

        let found = matcher.match_font("demo", false, false, Scope::all()).unwrap();
        assert!(found.is_in_memory());
        let local = matcher.match_font("demo", false, false, Scope::LOCAL).unwrap();
        assert_eq!(local.postscript_name(), "Local-Regular");
    }

    #[test]
    fn invalid_embeds_are_recorded() {
        let mut fonts = table(&[("ok.ttf", b"Ok|Ok|400|0"), ("bad.ttf", b"junk")]);
        let mut open = None;
        fonts.append("fontname: broken.ttf", &mut open);
        fonts.append("!!!!!", &mut open);

        let mut matcher = FontMatcher::new(Arc::new(TextBackend), None, EmbedConfig::default());
        matcher.load_embedded(Some(&fonts));
        assert_eq!(matcher.embedded().len(), 1);
        let invalid: Vec<&str> = matcher
            .invalid_embedded()
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(invalid, vec!["bad.ttf", "broken.ttf"]);
    }

    #[test]
    fn system_scope_falls_back_to_first_face_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sys.ttf");
        std::fs::write(&path, b"Sys-Regular|Sys|400|0").unwrap();

        let matcher = FontMatcher::new(
            Arc::new(TextBackend),
            Some(Arc::new(FixedCatalog(path.clone()))),
            EmbedConfig::default(),
        );
        let found = matcher.match_font("Alias Name", true, false, Scope::all()).unwrap();
        assert_eq!(found.path(), Some(path));
        assert!(matcher.match_font("Alias Name", true, false, Scope::LOCAL).is_none());
    }

    #[test]
    fn match_in_file_requires_a_name_match() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.ttf");
        std::fs::write(&path, b"F-Bold|F|700|0").unwrap();

        let matcher = FontMatcher::new(Arc::new(TextBackend), None, EmbedConfig::default());
        assert!(matcher.match_in_file(&path, "f", false, false).unwrap().is_some());
        assert!(matcher.match_in_file(&path, "g", false, false).unwrap().is_none());
        assert!(matcher
            .match_in_file(&dir.path().join("missing.ttf"), "f", false, false)
            .is_err());
    }
}
