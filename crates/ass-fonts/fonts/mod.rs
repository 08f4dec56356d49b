//! Font faces, font backends and name matching
//!
//! A [`FontDescriptor`] describes one face: where it lives (a file path, or
//! an embed name for fonts decoded from the document), its names, weight and
//! slant. Descriptors are produced by a [`FontBackend`] and indexed by name
//! in a [`FontIndex`]; a [`FontMatcher`] searches embedded, local and system
//! scopes in turn.
//!
//! # Scopes
//!
//! - [`Scope::EMBEDDED`]: attachments of the document's `[Fonts]` section.
//!   Entries that fail to decode or parse are kept aside as invalid.
//! - [`Scope::LOCAL`]: font files in the subtitle's directory, found by
//!   [`scan::scan_font_files`].
//! - [`Scope::SYSTEM`]: a [`SystemFontCatalog`] names a file, which is then
//!   indexed and matched with the same rules as the other scopes.
//!
//! The first scope with a match wins, so a document's own attachment
//! shadows an installed font of the same name.
//!
//! # Matching
//!
//! Names are compared without case. Within one index the PostScript name is
//! tried first, then the family name, preferring the face whose weight and
//! slant match the request. A full name only matches a face of exactly the
//! requested style. Weights of [`WEIGHT_BOLD`] and above are bold; italic
//! and oblique faces both count as italic.
//!
//! # Backends
//!
//! [`TtfBackend`] reads names with `ttf-parser`, decoding legacy Mac and CJK
//! records, and copies faces out of collections with `write-fonts`.
//! Subsetting needs the default `harfbuzz` feature and otherwise fails with
//! [`FontError::SubsetUnavailable`]. Tests and alternative toolchains can
//! plug in their own [`FontBackend`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::{path::Path, sync::Arc};
//! use ass_fonts::{
//!     fonts::{FontMatcher, FontdbCatalog, Scope, SystemFontCatalog, TtfBackend},
//!     EmbedConfig,
//! };
//!
//! let catalog: Arc<dyn SystemFontCatalog> = Arc::new(FontdbCatalog::with_system_fonts());
//! let mut matcher = FontMatcher::new(
//!     Arc::new(TtfBackend::new()),
//!     Some(catalog),
//!     EmbedConfig::default(),
//! );
//! matcher.load_local(Path::new("subs"));
//!
//! if let Some(face) = matcher.match_font("Arial", true, false, Scope::all()) {
//!     println!("{} from {}", face.display_name(), face.origin());
//! }
//! ```

pub mod backend;
pub mod errors;
pub mod index;
pub mod matcher;
pub mod scan;
pub mod system;

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

pub use backend::{FontBackend, TtfBackend};
pub use errors::FontError;
pub use index::FontIndex;
pub use matcher::{FontMatcher, Scope};
pub use system::{CatalogRefresher, FontdbCatalog, RefreshOutcome, SystemFontCatalog};

/// Weight the matcher treats as bold; other weights are not bold
pub const WEIGHT_BOLD: u16 = 700;

/// Slant of a face as declared by its `OS/2` table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StyleFlag {
    /// Upright
    #[default]
    Normal,
    /// Slanted upright design
    Oblique,
    /// True italic design
    Italic,
}

/// Names and style attributes read from one face
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaceNames {
    /// PostScript name (name ID 6)
    pub postscript_name: String,
    /// Family names in every language (name ID 1)
    pub family_names: BTreeSet<String>,
    /// Full names in every language (name ID 4)
    pub full_names: BTreeSet<String>,
    /// `OS/2` weight class
    pub weight: u16,
    /// `OS/2` slant
    pub style: StyleFlag,
}

impl FaceNames {
    /// Check whether any PostScript, full or family name equals `name`,
    /// ignoring case
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.postscript_name.to_lowercase() == name
            || self
                .full_names
                .iter()
                .chain(&self.family_names)
                .any(|candidate| candidate.to_lowercase() == name)
    }
}

/// Identity of a face: origin, face index and whether it lives in memory
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceKey {
    /// File path or embed name
    pub origin: String,
    /// Face index in the file, or blob index for embedded fonts
    pub index: usize,
    /// Embedded fonts live in memory
    pub in_memory: bool,
}

/// One font face
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontDescriptor {
    origin: String,
    index: usize,
    names: FaceNames,
    data: Option<Arc<[u8]>>,
}

impl FontDescriptor {
    /// Describe face `index` of a font file
    pub fn new(path: impl Into<String>, index: usize, names: FaceNames) -> Self {
        Self {
            origin: path.into(),
            index,
            names,
            data: None,
        }
    }

    /// Describe an in-memory font stored as blob `index` under an embed name
    pub fn in_memory(name: impl Into<String>, index: usize, names: FaceNames, data: Arc<[u8]>) -> Self {
        Self {
            origin: name.into(),
            index,
            names,
            data: Some(data),
        }
    }

    /// Read every face of a font file
    ///
    /// # Errors
    ///
    /// Returns [`FontError::Unreadable`] when the file cannot be read and
    /// [`FontError::Malformed`] when any face fails to parse.
    pub fn from_file(path: &Path, backend: &dyn FontBackend) -> Result<Vec<Self>, FontError> {
        let data = fs::read(path).map_err(|err| FontError::Unreadable {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        let origin = path.to_string_lossy();
        let faces = backend
            .read_faces(&data)
            .map_err(|err| err.with_origin(&origin))?;
        Ok(faces
            .into_iter()
            .enumerate()
            .map(|(index, names)| Self::new(origin.as_ref(), index, names))
            .collect())
    }

    /// Describe decoded attachment bytes
    ///
    /// # Errors
    ///
    /// Returns [`FontError::Malformed`] when the bytes hold no readable face.
    pub fn from_embedded(
        name: &str,
        index: usize,
        data: Vec<u8>,
        backend: &dyn FontBackend,
    ) -> Result<Self, FontError> {
        let names = backend
            .read_faces(&data)
            .map_err(|err| err.with_origin(name))?
            .into_iter()
            .next()
            .ok_or_else(|| FontError::malformed("no font face found").with_origin(name))?;
        Ok(Self::in_memory(name, index, names, data.into()))
    }

    /// File path, or embed name for in-memory fonts
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// File path of a file-backed font
    #[must_use]
    pub fn path(&self) -> Option<PathBuf> {
        self.data.is_none().then(|| PathBuf::from(&self.origin))
    }

    /// Face index in the file, or blob index for embedded fonts
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Names and style attributes
    #[must_use]
    pub const fn names(&self) -> &FaceNames {
        &self.names
    }

    /// PostScript name
    #[must_use]
    pub fn postscript_name(&self) -> &str {
        &self.names.postscript_name
    }

    /// Name shown to users: first full name, else the PostScript name
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.names
            .full_names
            .iter()
            .next()
            .map_or(self.names.postscript_name.as_str(), String::as_str)
    }

    /// `OS/2` weight class
    #[must_use]
    pub const fn weight(&self) -> u16 {
        self.names.weight
    }

    /// Declared slant
    #[must_use]
    pub const fn style(&self) -> StyleFlag {
        self.names.style
    }

    /// Bold means exactly weight 700
    #[must_use]
    pub const fn is_bold(&self) -> bool {
        self.names.weight == WEIGHT_BOLD
    }

    /// Italic and oblique both count as italic
    #[must_use]
    pub const fn is_italic(&self) -> bool {
        matches!(self.names.style, StyleFlag::Italic | StyleFlag::Oblique)
    }

    /// Whether the font came from the document rather than disk
    #[must_use]
    pub const fn is_in_memory(&self) -> bool {
        self.data.is_some()
    }

    /// Identity used to merge plan rows and detect unreferenced fonts
    #[must_use]
    pub fn key(&self) -> FaceKey {
        FaceKey {
            origin: self.origin.clone(),
            index: self.index,
            in_memory: self.is_in_memory(),
        }
    }

    /// Face index to pass to the backend
    fn backend_face_index(&self) -> u32 {
        if self.is_in_memory() {
            0
        } else {
            u32::try_from(self.index).unwrap_or(u32::MAX)
        }
    }

    fn raw_data(&self) -> Result<Vec<u8>, FontError> {
        match &self.data {
            Some(data) => Ok(data.to_vec()),
            None => fs::read(&self.origin).map_err(|err| FontError::Unreadable {
                path: PathBuf::from(&self.origin),
                reason: err.to_string(),
            }),
        }
    }

    /// Bytes of this face as a standalone font
    ///
    /// Faces inside a collection are extracted into a single-face font.
    ///
    /// # Errors
    ///
    /// Returns the backend's error or [`FontError::Unreadable`].
    pub fn read_bytes(&self, backend: &dyn FontBackend) -> Result<Vec<u8>, FontError> {
        let data = self.raw_data()?;
        if backend.is_collection(&data) {
            backend
                .extract_face(&data, self.backend_face_index())
                .map_err(|err| err.with_origin(&self.origin))
        } else {
            Ok(data)
        }
    }

    /// Subset this face to `chars`, keeping `preserve_names` matchable
    ///
    /// # Errors
    ///
    /// Returns the backend's error or [`FontError::Unreadable`].
    pub fn subset(
        &self,
        backend: &dyn FontBackend,
        chars: &BTreeSet<char>,
        preserve_names: &BTreeSet<String>,
    ) -> Result<Vec<u8>, FontError> {
        let data = self.raw_data()?;
        backend
            .subset(&data, self.backend_face_index(), chars, preserve_names)
            .map_err(|err| err.with_origin(&self.origin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(weight: u16, style: StyleFlag) -> FaceNames {
        FaceNames {
            postscript_name: "Demo-Bold".to_string(),
            family_names: BTreeSet::from(["Demo".to_string()]),
            full_names: BTreeSet::from(["Demo Bold".to_string()]),
            weight,
            style,
        }
    }

    #[test]
    fn bold_is_exactly_700() {
        assert!(FontDescriptor::new("a.ttf", 0, names(700, StyleFlag::Normal)).is_bold());
        assert!(!FontDescriptor::new("a.ttf", 0, names(900, StyleFlag::Normal)).is_bold());
    }

    #[test]
    fn oblique_counts_as_italic() {
        assert!(FontDescriptor::new("a.ttf", 0, names(400, StyleFlag::Oblique)).is_italic());
        assert!(!FontDescriptor::new("a.ttf", 0, names(400, StyleFlag::Normal)).is_italic());
    }

    #[test]
    fn has_name_ignores_case() {
        let names = names(700, StyleFlag::Normal);
        assert!(names.has_name("demo-bold"));
        assert!(names.has_name("DEMO"));
        assert!(!names.has_name("Demo Italic"));
    }

    #[test]
    fn in_memory_key_differs_from_file_key() {
        let file = FontDescriptor::new("a.ttf", 0, names(400, StyleFlag::Normal));
        let memory =
            FontDescriptor::in_memory("a.ttf", 0, names(400, StyleFlag::Normal), Arc::from(&b"x"[..]));
        assert_ne!(file.key(), memory.key());
        assert_eq!(memory.path(), None);
        assert_eq!(file.path(), Some(PathBuf::from("a.ttf")));
        assert_eq!(file.display_name(), "Demo Bold");
    }
}
