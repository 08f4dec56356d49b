//! Name index over a set of font faces
//!
//! Lookups are case-insensitive and follow a fixed precedence:
//!
//! 1. PostScript name, which identifies a single face
//! 2. Family name: the face with matching bold and italic, else matching
//!    bold, else matching italic, else the family's first face
//! 3. Full name with matching bold and italic
//!
//! Faces keep their insertion order, so "first" means first added. When two
//! faces share a PostScript or full name the first one wins.

use std::{path::PathBuf, sync::Arc};

use ahash::AHashMap;

use super::{FaceKey, FontBackend, FontDescriptor};

/// Faces indexed by PostScript, family and full name
#[derive(Debug, Clone, Default)]
pub struct FontIndex {
    faces: Vec<Arc<FontDescriptor>>,
    by_postscript: AHashMap<String, usize>,
    by_family: AHashMap<String, Vec<usize>>,
    by_full_name: AHashMap<String, usize>,
}

impl FontIndex {
    /// Create an empty index
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the given faces in order
    pub fn from_faces(faces: impl IntoIterator<Item = FontDescriptor>) -> Self {
        let mut index = Self::new();
        for face in faces {
            index.push(face);
        }
        index
    }

    /// Index every face of every file, skipping files that fail to load
    #[must_use]
    pub fn from_files(files: &[PathBuf], backend: &dyn FontBackend) -> Self {
        let mut index = Self::new();
        for path in files {
            match FontDescriptor::from_file(path, backend) {
                Ok(faces) => faces.into_iter().for_each(|face| index.push(face)),
                Err(err) => log::warn!("skipping font {}: {err}", path.display()),
            }
        }
        index
    }

    /// Add a face
    pub fn push(&mut self, face: FontDescriptor) {
        let slot = self.faces.len();
        let names = face.names();

        if !names.postscript_name.is_empty() {
            self.by_postscript
                .entry(names.postscript_name.to_lowercase())
                .or_insert(slot);
        }
        for family in &names.family_names {
            let family_slots = self.by_family.entry(family.to_lowercase()).or_default();
            if !family_slots.contains(&slot) {
                family_slots.push(slot);
            }
        }
        for full in &names.full_names {
            self.by_full_name.entry(full.to_lowercase()).or_insert(slot);
        }

        self.faces.push(Arc::new(face));
    }

    /// Best face for a font name and style request
    #[must_use]
    pub fn find(&self, name: &str, bold: bool, italic: bool) -> Option<&Arc<FontDescriptor>> {
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }

        if let Some(&slot) = self.by_postscript.get(&key) {
            return Some(&self.faces[slot]);
        }

        let family: Vec<&Arc<FontDescriptor>> = self
            .by_family
            .get(&key)
            .map(|slots| slots.iter().map(|&slot| &self.faces[slot]).collect())
            .unwrap_or_default();

        let in_family = family
            .iter()
            .find(|face| face.is_bold() == bold && face.is_italic() == italic)
            .or_else(|| family.iter().find(|face| face.is_bold() == bold))
            .or_else(|| family.iter().find(|face| face.is_italic() == italic))
            .or_else(|| family.first());
        if let Some(&face) = in_family {
            return Some(face);
        }

        self.by_full_name
            .get(&key)
            .map(|&slot| &self.faces[slot])
            .filter(|face| face.is_bold() == bold && face.is_italic() == italic)
    }

    /// All faces in insertion order
    #[must_use]
    pub fn faces(&self) -> &[Arc<FontDescriptor>] {
        &self.faces
    }

    /// Check whether a face with this identity is indexed
    #[must_use]
    pub fn contains(&self, key: &FaceKey) -> bool {
        self.faces.iter().any(|face| &face.key() == key)
    }

    /// Number of faces
    #[must_use]
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Check whether the index is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}
