//! Transactional plan execution
//!
//! The font table is snapshotted before anything changes. Removals run
//! first, then every distinct source face is read or subset once and
//! written, then the document is saved. Embedded faces that are rewritten
//! in place are addressed by their position after the removals. If any step fails the snapshot is
//! put back, so the table is either fully updated and saved or unchanged.

use std::{
    cmp::Ordering,
    collections::BTreeSet,
    path::{Path, PathBuf},
    sync::Arc,
};

use indexmap::IndexMap;

use super::{
    naming::unique_embed_name,
    plan::{Plan, TaskType},
};
use crate::{
    config::EmbedConfig,
    fonts::{FaceKey, FontBackend, FontDescriptor},
    parser::Document,
    utils::errors::{CoreError, Result},
};

/// One attachment written by [`apply_plan`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedFont {
    /// Embed name
    pub name: String,
    /// Position within the embed name's blob list
    pub index: usize,
    /// Whether the data was subset
    pub subset: bool,
    /// Size of the font data before encoding
    pub bytes: usize,
}

/// What [`apply_plan`] changed
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApplyReport {
    /// Attachments removed, as `(name, index)` before removal
    pub removed: Vec<(String, usize)>,
    /// Attachments written
    pub embedded: Vec<EmbeddedFont>,
    /// Where the document was saved
    pub saved_to: Option<PathBuf>,
}

/// References sharing one source face
struct EmbedGroup {
    face: Arc<FontDescriptor>,
    preserve_names: BTreeSet<String>,
    chars: BTreeSet<char>,
    subset: bool,
}

/// Apply a checked plan to the document and save it
///
/// `save_to` defaults to the document's own path.
///
/// # Errors
///
/// Returns [`CoreError::Apply`] wrapping the first failure. The font table
/// is then identical to what it was before the call.
pub fn apply_plan(
    document: &mut Document,
    plan: &Plan,
    backend: &dyn FontBackend,
    config: &EmbedConfig,
    save_to: Option<&Path>,
) -> Result<ApplyReport> {
    let snapshot = document.fonts().cloned();
    match run(document, plan, backend, config, save_to) {
        Ok(report) => Ok(report),
        Err(err) => {
            log::warn!("embedding failed, restoring font table: {err}");
            document.restore_fonts(snapshot);
            Err(CoreError::apply(err))
        }
    }
}

/// Position of blob `index` under `name` once `removed` are gone
///
/// `removed` holds positions from before any removal. `None` when the blob
/// itself was removed.
fn index_after_removals(removed: &[(String, usize)], name: &str, index: usize) -> Option<usize> {
    let mut shift = 0;
    for (_, removed_index) in removed.iter().filter(|(removed_name, _)| removed_name == name) {
        match removed_index.cmp(&index) {
            Ordering::Less => shift += 1,
            Ordering::Equal => return None,
            Ordering::Greater => {}
        }
    }
    Some(index - shift)
}

fn run(
    document: &mut Document,
    plan: &Plan,
    backend: &dyn FontBackend,
    config: &EmbedConfig,
    save_to: Option<&Path>,
) -> Result<ApplyReport> {
    let mut report = ApplyReport::default();

    // Several references may share one attachment; remove it once, and from
    // the highest index down so earlier removals do not shift later ones.
    let removals: BTreeSet<(String, usize)> = plan
        .tasks()
        .iter()
        .filter(|task| task.task.contains(TaskType::UNEMBEDDING))
        .filter_map(|task| task.unembed.clone())
        .collect();
    if !removals.is_empty() {
        let fonts = document.fonts_mut();
        for (name, index) in removals.iter().rev() {
            if fonts.remove(name, *index).is_some() {
                log::debug!("removed attachment {name} #{index}");
                report.removed.push((name.clone(), *index));
            }
        }
    }

    let mut groups: IndexMap<FaceKey, EmbedGroup> = IndexMap::new();
    for task in plan.tasks() {
        if !task.task.contains(TaskType::EMBEDDING) {
            continue;
        }
        let Some(face) = &task.face else {
            continue;
        };
        let subset = task.task.contains(TaskType::SUBSETTING);
        let group = groups.entry(face.key()).or_insert_with(|| EmbedGroup {
            face: Arc::clone(face),
            preserve_names: BTreeSet::new(),
            chars: BTreeSet::new(),
            subset,
        });
        group.preserve_names.insert(task.name.to_lowercase());
        group.chars.extend(task.covered.iter().copied());
        group.subset &= subset;
    }

    let mut allocated: BTreeSet<String> = BTreeSet::new();
    for group in groups.values() {
        let data = if group.subset {
            group.face.subset(backend, &group.chars, &group.preserve_names)?
        } else {
            group.face.read_bytes(backend)?
        };

        let fonts = document.fonts_mut();
        let (name, index) = if group.face.is_in_memory() {
            let name = group.face.origin().to_string();
            let index = match index_after_removals(&report.removed, &name, group.face.index()) {
                Some(current) => fonts.add(&data, &name, current, true),
                None => fonts.add(&data, &name, 0, false),
            };
            (name, index)
        } else {
            let source = PathBuf::from(group.face.origin());
            let name = unique_embed_name(&source, group.subset, &config.subset_suffix, |candidate| {
                fonts.contains(candidate) || allocated.contains(candidate)
            });
            let index = fonts.add(&data, &name, 0, false);
            allocated.insert(name.clone());
            (name, index)
        };
        log::info!(
            "embedded {} as {name} #{index} ({} bytes{})",
            group.face.display_name(),
            data.len(),
            if group.subset { ", subset" } else { "" }
        );
        report.embedded.push(EmbeddedFont {
            name,
            index,
            subset: group.subset,
            bytes: data.len(),
        });
    }

    document.save(save_to, config)?;
    report.saved_to = save_to
        .map(Path::to_path_buf)
        .or_else(|| document.path().map(Path::to_path_buf));
    Ok(report)
}
