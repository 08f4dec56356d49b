//! Directory scanning for font files

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::config::EmbedConfig;

/// Font files directly inside `dir`, sorted by file name
///
/// A path naming a single font file yields just that file. Unreadable or
/// missing directories yield nothing.
#[must_use]
pub fn scan_font_files(dir: &Path, config: &EmbedConfig) -> Vec<PathBuf> {
    if dir.is_file() {
        return if config.is_font_file(dir) {
            vec![dir.to_path_buf()]
        } else {
            Vec::new()
        };
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            log::warn!("cannot scan font directory {}: {err}", dir.display());
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file() && config.is_font_file(path))
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    files
}

/// Font files anywhere below the given roots, depth first
///
/// `keep_going` is consulted before each directory so long scans can be
/// cancelled; the files found so far are returned.
pub fn walk_font_files(
    roots: &[PathBuf],
    config: &EmbedConfig,
    mut keep_going: impl FnMut() -> bool,
) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut pending: Vec<PathBuf> = roots.iter().rev().cloned().collect();

    while let Some(dir) = pending.pop() {
        if !keep_going() {
            break;
        }
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        let mut subdirs = Vec::new();
        for path in entries.filter_map(|entry| entry.ok().map(|entry| entry.path())) {
            if path.is_dir() {
                subdirs.push(path);
            } else if config.is_font_file(&path) {
                found.push(path);
            }
        }
        subdirs.sort();
        pending.extend(subdirs.into_iter().rev());
    }
    found
}
