//! Installed-font lookup
//!
//! The matcher only needs one question answered by the operating system:
//! "which file holds the face for this name and style?". That question is
//! the [`SystemFontCatalog`] trait. [`FontdbCatalog`] answers it from a
//! `fontdb` database that a [`CatalogRefresher`] can rebuild on a background
//! thread and swap in atomically, so lookups never see a half-built catalog.

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use fontdb::Database as FontDatabase;
use parking_lot::RwLock;

use super::scan::walk_font_files;
use crate::config::EmbedConfig;

/// Resolves a font request to an installed font file
pub trait SystemFontCatalog: Send + Sync {
    /// Path of the file holding the best face for the request
    fn match_font(&self, name: &str, bold: bool, italic: bool) -> Option<PathBuf>;
}

/// Catalog backed by a swappable `fontdb` database
pub struct FontdbCatalog {
    database: RwLock<Arc<FontDatabase>>,
}

impl Default for FontdbCatalog {
    fn default() -> Self {
        Self::new(FontDatabase::new())
    }
}

impl std::fmt::Debug for FontdbCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontdbCatalog")
            .field("faces", &self.len())
            .finish()
    }
}

impl FontdbCatalog {
    /// Wrap an already populated database
    #[must_use]
    pub fn new(database: FontDatabase) -> Self {
        Self {
            database: RwLock::new(Arc::new(database)),
        }
    }

    /// Catalog of the fonts `fontdb` finds in the platform font directories
    #[must_use]
    pub fn with_system_fonts() -> Self {
        let mut database = FontDatabase::new();
        database.load_system_fonts();
        log::debug!("system font catalog loaded {} faces", database.len());
        Self::new(database)
    }

    /// Current database; later refreshes do not affect the snapshot
    #[must_use]
    pub fn snapshot(&self) -> Arc<FontDatabase> {
        Arc::clone(&self.database.read())
    }

    /// Swap in a new database
    pub fn replace(&self, database: FontDatabase) {
        *self.database.write() = Arc::new(database);
    }

    /// Number of faces in the current database
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Check whether the catalog has no faces
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SystemFontCatalog for FontdbCatalog {
    fn match_font(&self, name: &str, bold: bool, italic: bool) -> Option<PathBuf> {
        let database = self.snapshot();
        let wanted = name.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }

        let by_postscript = database
            .faces()
            .into_iter()
            .find(|face| face.post_script_name.to_lowercase() == wanted);

        let face = match by_postscript {
            Some(face) => face,
            None => {
                let family = database.faces().into_iter().find_map(|face| {
                    face.families
                        .iter()
                        .find(|(family, _)| family.to_lowercase() == wanted)
                        .map(|(family, _)| family.clone())
                })?;
                let query = fontdb::Query {
                    families: &[fontdb::Family::Name(&family)],
                    weight: if bold {
                        fontdb::Weight::BOLD
                    } else {
                        fontdb::Weight::NORMAL
                    },
                    stretch: fontdb::Stretch::Normal,
                    style: if italic {
                        fontdb::Style::Italic
                    } else {
                        fontdb::Style::Normal
                    },
                };
                database.face(database.query(&query)?)?
            }
        };

        match &face.source {
            fontdb::Source::File(path) | fontdb::Source::SharedFile(path, _) => Some(path.clone()),
            fontdb::Source::Binary(_) => None,
        }
    }
}

/// Platform font directories, user directories included
#[must_use]
pub fn system_font_dirs() -> Vec<PathBuf> {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let mut dirs = Vec::new();

    if cfg!(target_os = "windows") {
        if let Some(windir) = std::env::var_os("WINDIR") {
            dirs.push(PathBuf::from(windir).join("Fonts"));
        }
        if let Some(local) = std::env::var_os("LOCALAPPDATA") {
            dirs.push(PathBuf::from(local).join("Microsoft").join("Windows").join("Fonts"));
        }
    } else if cfg!(target_os = "macos") {
        dirs.push(PathBuf::from("/System/Library/Fonts"));
        dirs.push(PathBuf::from("/Library/Fonts"));
        if let Some(home) = &home {
            dirs.push(home.join("Library").join("Fonts"));
        }
    } else {
        dirs.push(PathBuf::from("/usr/share/fonts"));
        dirs.push(PathBuf::from("/usr/local/share/fonts"));
        if let Some(home) = &home {
            dirs.push(home.join(".fonts"));
            dirs.push(home.join(".local").join("share").join("fonts"));
        }
    }
    dirs
}

/// How a background refresh ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The new database was swapped in
    Completed {
        /// Faces in the new database
        faces: usize,
    },
    /// The refresh stopped early; the previous database stays in place
    Cancelled,
}

/// Background rebuild of a [`FontdbCatalog`]
///
/// Dropping the refresher cancels it without waiting for the thread.
#[derive(Debug)]
pub struct CatalogRefresher {
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<RefreshOutcome>>,
}

impl CatalogRefresher {
    /// Start rescanning `dirs` into a fresh database for `catalog`
    #[must_use]
    pub fn spawn(catalog: Arc<FontdbCatalog>, dirs: Vec<PathBuf>, config: EmbedConfig) -> Self {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);

        let handle = thread::spawn(move || {
            let cancelled = || flag.load(Ordering::Relaxed);
            let files = walk_font_files(&dirs, &config, || !cancelled());

            let mut database = FontDatabase::new();
            for path in &files {
                if cancelled() {
                    log::debug!("font catalog refresh cancelled");
                    return RefreshOutcome::Cancelled;
                }
                if let Err(err) = database.load_font_file(path) {
                    log::debug!("skipping {}: {err}", path.display());
                }
            }
            if cancelled() {
                return RefreshOutcome::Cancelled;
            }

            let faces = database.len();
            catalog.replace(database);
            log::info!("font catalog refreshed: {} files, {faces} faces", files.len());
            RefreshOutcome::Completed { faces }
        });

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Ask the refresh to stop at the next file
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Check whether the background thread has exited
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the refresh to end
    #[must_use]
    pub fn join(mut self) -> RefreshOutcome {
        self.handle
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or(RefreshOutcome::Cancelled)
    }
}

impl Drop for CatalogRefresher {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.cancel();
        }
    }
}
