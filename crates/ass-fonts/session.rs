//! A loaded document together with its font scopes
//!
//! [`FontSession`] owns the document and the matcher built for it, so the
//! embedded and local scopes always describe the document being edited.
//! After a plan is applied the embedded scope is rebuilt from the new font
//! table.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    analysis::{collect_font_references, FontReference},
    config::EmbedConfig,
    embedding::{
        apply_plan, extract_embedded_font, ApplyReport, EmbedSelection, Plan, Planner,
        QuestionKind,
    },
    fonts::{FontBackend, FontMatcher, SystemFontCatalog},
    parser::Document,
    utils::errors::Result,
};

/// Document plus the font lookup built for it
#[derive(Debug)]
pub struct FontSession {
    document: Document,
    matcher: FontMatcher,
}

impl FontSession {
    /// Load a subtitle file and index its embedded and sibling fonts
    ///
    /// # Errors
    ///
    /// Returns the load error of [`Document::load`].
    pub fn open(
        path: &Path,
        encoding: Option<&str>,
        backend: Arc<dyn FontBackend>,
        system: Option<Arc<dyn SystemFontCatalog>>,
        config: EmbedConfig,
    ) -> Result<Self> {
        let document = Document::load(path, encoding)?;
        Ok(Self::from_document(document, backend, system, config))
    }

    /// Index the fonts of an already parsed document
    ///
    /// The local scope is only populated when the document has a path.
    #[must_use]
    pub fn from_document(
        document: Document,
        backend: Arc<dyn FontBackend>,
        system: Option<Arc<dyn SystemFontCatalog>>,
        config: EmbedConfig,
    ) -> Self {
        let mut matcher = FontMatcher::new(backend, system, config);
        matcher.load_embedded(document.fonts());
        if let Some(dir) = document.directory().map(Path::to_path_buf) {
            matcher.load_local(&dir);
        }
        Self { document, matcher }
    }

    /// The document
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// The matcher for this document
    #[must_use]
    pub const fn matcher(&self) -> &FontMatcher {
        &self.matcher
    }

    /// Settings in use
    #[must_use]
    pub const fn config(&self) -> &EmbedConfig {
        self.matcher.config()
    }

    /// Collect font references of the document
    #[must_use]
    pub fn collect_font_references(&self) -> Vec<FontReference> {
        collect_font_references(&self.document, &self.matcher)
    }

    /// Starting selections for `references`
    #[must_use]
    pub fn selections(&self, references: &[FontReference]) -> Vec<EmbedSelection> {
        EmbedSelection::defaults(references)
    }

    /// Check selections, accepting the question kinds in `confirmed`
    ///
    /// # Errors
    ///
    /// See [`Planner::check`].
    pub fn check_plan(
        &self,
        references: &[FontReference],
        selections: &[EmbedSelection],
        confirmed: &[QuestionKind],
    ) -> Result<Plan> {
        confirmed
            .iter()
            .fold(Planner::new(&self.matcher), |planner, &kind| planner.confirm(kind))
            .check(references, selections)
    }

    /// Apply a plan and save, to `save_to` or the document's own path
    ///
    /// # Errors
    ///
    /// See [`apply_plan`]. The embedded scope is rebuilt either way.
    pub fn apply_plan(&mut self, plan: &Plan, save_to: Option<&Path>) -> Result<ApplyReport> {
        let backend = self.matcher.backend_handle();
        let result = apply_plan(
            &mut self.document,
            plan,
            backend.as_ref(),
            self.matcher.config(),
            save_to,
        );
        self.matcher.load_embedded(self.document.fonts());
        result
    }

    /// Write one attachment to disk
    ///
    /// # Errors
    ///
    /// See [`extract_embedded_font`].
    pub fn extract(&self, name: &str, index: usize, path: &Path) -> Result<()> {
        extract_embedded_font(&self.document, name, index, path)
    }

    /// Give the document back
    #[must_use]
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Path the document was loaded from
    #[must_use]
    pub fn path(&self) -> Option<PathBuf> {
        self.document.path().map(Path::to_path_buf)
    }
}
