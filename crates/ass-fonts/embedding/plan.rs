//! Turning reference selections into a checked plan
//!
//! Every [`FontReference`] gets an [`EmbedSelection`]: whether it should end
//! up embedded, whether to subset, and where the font comes from. The
//! [`Planner`] checks the selections against the references without
//! touching the document and either returns a [`Plan`] or the full batch of
//! issues found.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use bitflags::bitflags;
use indexmap::IndexMap;

use super::issues::{MatchWarning, PlanIssue, PlanQuestion, QuestionKind};
use crate::{
    analysis::FontReference,
    fonts::{FontDescriptor, FontMatcher, Scope},
    utils::errors::{CoreError, Result},
};

bitflags! {
    /// What applying a plan does for one reference
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TaskType: u8 {
        /// Remove the reference's current attachment
        const UNEMBEDDING = 1;
        /// Write an attachment
        const EMBEDDING = 1 << 1;
        /// The attachment comes from a file on disk
        const EXTERNAL = 1 << 2;
        /// The attachment is subset to the covered characters
        const SUBSETTING = 1 << 3;
    }
}

/// Where the font of a selection comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// An attachment of the document
    Embedded {
        /// Embed name
        name: String,
        /// Position within the embed name's blob list
        index: usize,
    },
    /// A font file
    External(PathBuf),
    /// Nothing selected
    None,
}

fn own_entry(reference: &FontReference) -> Source {
    reference
        .embedded_entry()
        .map_or(Source::None, |(name, index)| Source::Embedded {
            name: name.to_string(),
            index,
        })
}

/// Shortcuts for picking a [`Source`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceChoice {
    /// The reference's own attachment
    UseEmbedded,
    /// The installed font the system catalog matches
    UseSystem,
    /// A font file next to the subtitle
    UseSameDirectory,
}

impl SourceChoice {
    /// Resolve the choice for one reference
    #[must_use]
    pub fn resolve(self, reference: &FontReference, matcher: &FontMatcher) -> Source {
        let scope = match self {
            Self::UseEmbedded => return own_entry(reference),
            Self::UseSystem => Scope::SYSTEM,
            Self::UseSameDirectory => Scope::LOCAL,
        };
        matcher
            .match_font(reference.name(), reference.bold(), reference.italic(), scope)
            .and_then(|face| face.path())
            .map_or(Source::None, Source::External)
    }
}

/// What the caller wants for one reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedSelection {
    /// Whether the font should be embedded after applying
    pub embed: bool,
    /// Whether to subset before embedding
    pub subset: bool,
    /// Where the font comes from
    pub source: Source,
}

impl EmbedSelection {
    /// Starting selection for a reference
    ///
    /// Embedded references stay embedded when valid and are not re-subset;
    /// other references are not embedded, subset by default and point at
    /// the face they matched.
    #[must_use]
    pub fn for_reference(reference: &FontReference) -> Self {
        if reference.is_from_embedded() {
            Self {
                embed: reference.is_valid(),
                subset: false,
                source: own_entry(reference),
            }
        } else {
            Self {
                embed: false,
                subset: true,
                source: reference
                    .descriptor()
                    .and_then(|face| face.path())
                    .map_or(Source::None, Source::External),
            }
        }
    }

    /// Starting selections for every reference, in order
    #[must_use]
    pub fn defaults(references: &[FontReference]) -> Vec<Self> {
        references.iter().map(Self::for_reference).collect()
    }
}

/// Work for one reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTask {
    /// Position of the reference in the checked list
    pub reference: usize,
    /// Font name of the reference
    pub name: String,
    /// What to do
    pub task: TaskType,
    /// Characters to keep when subsetting
    pub covered: BTreeSet<char>,
    /// Face to embed, for tasks with [`TaskType::EMBEDDING`]
    pub face: Option<Arc<FontDescriptor>>,
    /// Attachment to remove, for tasks with [`TaskType::UNEMBEDDING`]
    pub unembed: Option<(String, usize)>,
}

/// A checked set of tasks ready to apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    tasks: Vec<PlannedTask>,
}

impl Plan {
    /// Tasks in reference order
    #[must_use]
    pub fn tasks(&self) -> &[PlannedTask] {
        &self.tasks
    }

    /// Number of tasks
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Check if the plan has no tasks; checked plans never are
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Checks selections and builds plans
#[derive(Debug)]
pub struct Planner<'m> {
    matcher: &'m FontMatcher,
    confirmed: BTreeSet<QuestionKind>,
}

fn describe(reference: &FontReference) -> String {
    format!("{} {}", reference.name(), reference.style_label())
}

impl<'m> Planner<'m> {
    /// Create a planner resolving sources through `matcher`
    #[must_use]
    pub fn new(matcher: &'m FontMatcher) -> Self {
        Self {
            matcher,
            confirmed: BTreeSet::new(),
        }
    }

    /// Accept every question of `kind` without applying its fix
    #[must_use]
    pub fn confirm(mut self, kind: QuestionKind) -> Self {
        self.confirmed.insert(kind);
        self
    }

    /// Check selections and build the plan
    ///
    /// `selections[i]` belongs to `references[i]`. The check has no side
    /// effects and can be repeated after the caller changes selections.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Plan`] with every warning and unconfirmed
    /// question found, or [`CoreError::NoTask`] when nothing would change.
    /// Fails with [`CoreError::SelectionMismatch`] when the slices differ in
    /// length.
    pub fn check(&self, references: &[FontReference], selections: &[EmbedSelection]) -> Result<Plan> {
        if references.len() != selections.len() {
            return Err(CoreError::SelectionMismatch {
                references: references.len(),
                selections: selections.len(),
            });
        }
        let mut issues = Vec::new();

        if !self.confirmed.contains(&QuestionKind::IncompleteFamily) {
            if let Some(question) = incomplete_families(references, selections) {
                issues.push(PlanIssue::Question(question));
            }
        }

        let mut tasks = Vec::new();
        let mut warnings = Vec::new();
        for (position, (reference, selection)) in references.iter().zip(selections).enumerate() {
            match self.task_for(reference, selection) {
                Ok(Some(task)) => tasks.push(PlannedTask {
                    reference: position,
                    ..task
                }),
                Ok(None) => {}
                Err(warning) => warnings.push(PlanIssue::Warning(warning)),
            }
        }

        if !warnings.is_empty() {
            issues.extend(warnings);
            log::debug!("plan check found {} issue(s)", issues.len());
            return Err(CoreError::Plan(issues));
        }
        if tasks.is_empty() {
            return Err(CoreError::NoTask);
        }

        if !self.confirmed.contains(&QuestionKind::LargeUnsubsetted) {
            let threshold = self.matcher.config().large_font_threshold;
            if let Some(question) = large_unsubsetted(references, selections, &tasks, threshold) {
                issues.push(PlanIssue::Question(question));
            }
        }
        if !issues.is_empty() {
            return Err(CoreError::Plan(issues));
        }

        log::info!("plan ready with {} task(s)", tasks.len());
        Ok(Plan { tasks })
    }

    /// Task for one reference, `None` when it stays as it is
    fn task_for(
        &self,
        reference: &FontReference,
        selection: &EmbedSelection,
    ) -> core::result::Result<Option<PlannedTask>, MatchWarning> {
        let entry = reference
            .embedded_entry()
            .map(|(name, index)| (name.to_string(), index));
        let mut task = PlannedTask {
            reference: 0,
            name: reference.name().to_string(),
            task: TaskType::empty(),
            covered: reference.covered().clone(),
            face: None,
            unembed: None,
        };

        let path = if reference.is_from_embedded() {
            if !selection.embed {
                task.task = TaskType::UNEMBEDDING;
                task.unembed = entry;
                return Ok(Some(task));
            }
            match &selection.source {
                Source::Embedded { name, index } => {
                    if entry.as_ref() != Some(&(name.clone(), *index)) {
                        return Err(MatchWarning::EmbeddedSourceSwitch {
                            font: describe(reference),
                            source_name: name.clone(),
                        });
                    }
                    if !selection.subset {
                        return Ok(None);
                    }
                    task.task = TaskType::SUBSETTING | TaskType::EMBEDDING;
                    task.face = Some(reference.descriptor().cloned().ok_or_else(|| {
                        MatchWarning::MissingSource {
                            font: describe(reference),
                        }
                    })?);
                    return Ok(Some(task));
                }
                Source::External(path) => {
                    task.task = TaskType::UNEMBEDDING | TaskType::EMBEDDING | TaskType::EXTERNAL;
                    task.unembed = entry;
                    path
                }
                Source::None => {
                    return Err(MatchWarning::MissingSource {
                        font: describe(reference),
                    })
                }
            }
        } else {
            if !selection.embed {
                return Ok(None);
            }
            match &selection.source {
                Source::Embedded { name, .. } => {
                    return Err(MatchWarning::EmbeddedAsExternal {
                        font: describe(reference),
                        source_name: name.clone(),
                    })
                }
                Source::None => {
                    return Err(MatchWarning::MissingSource {
                        font: describe(reference),
                    })
                }
                Source::External(path) => {
                    task.task = TaskType::EMBEDDING | TaskType::EXTERNAL;
                    path
                }
            }
        };

        if selection.subset {
            task.task |= TaskType::SUBSETTING;
        }
        task.face = Some(self.verify_source(reference, path)?);
        Ok(Some(task))
    }

    /// Face of `reference` inside the file at `path`
    fn verify_source(
        &self,
        reference: &FontReference,
        path: &Path,
    ) -> core::result::Result<Arc<FontDescriptor>, MatchWarning> {
        if let Some(face) = reference
            .descriptor()
            .filter(|face| face.path().as_deref() == Some(path))
        {
            return Ok(Arc::clone(face));
        }

        let font = describe(reference);
        if !path.is_file() {
            return Err(MatchWarning::FileMissing {
                font,
                path: path.to_path_buf(),
            });
        }
        if let Err(err) = fs::File::open(path) {
            return Err(MatchWarning::FileUnreadable {
                font,
                path: path.to_path_buf(),
                reason: err.to_string(),
            });
        }
        match self
            .matcher
            .match_in_file(path, reference.name(), reference.bold(), reference.italic())
        {
            Ok(Some(face)) => Ok(face),
            Ok(None) => Err(MatchWarning::FaceNotFound {
                font,
                path: path.to_path_buf(),
            }),
            Err(err) => Err(MatchWarning::FileUnreadable {
                font,
                path: path.to_path_buf(),
                reason: err.to_string(),
            }),
        }
    }
}

/// Font names whose non-embedded references disagree on embedding
fn incomplete_families(
    references: &[FontReference],
    selections: &[EmbedSelection],
) -> Option<PlanQuestion> {
    let mut families: IndexMap<&str, Vec<usize>> = IndexMap::new();
    for (position, reference) in references.iter().enumerate() {
        if !reference.is_from_embedded() {
            families.entry(reference.name()).or_default().push(position);
        }
    }

    let mut names = Vec::new();
    let mut select = Vec::new();
    for (name, members) in families {
        let embed = |&i: &usize| selections.get(i).is_some_and(|s| s.embed);
        let mixed = members.len() > 1
            && members.iter().any(embed)
            && !members.iter().all(embed);
        if !mixed {
            continue;
        }
        names.push(name.to_string());
        select.extend(members.into_iter().filter(|&i| {
            selections
                .get(i)
                .is_some_and(|s| !s.embed && s.source != Source::None)
        }));
    }
    (!names.is_empty()).then_some(PlanQuestion::IncompleteFamily {
        families: names,
        select,
    })
}

/// External sources above the size threshold that are not subset
fn large_unsubsetted(
    references: &[FontReference],
    selections: &[EmbedSelection],
    tasks: &[PlannedTask],
    threshold: u64,
) -> Option<PlanQuestion> {
    let mut fonts = Vec::new();
    let mut subset = Vec::new();
    for task in tasks {
        if !task.task.contains(TaskType::EXTERNAL) || task.task.contains(TaskType::SUBSETTING) {
            continue;
        }
        let Some(Source::External(path)) = selections.get(task.reference).map(|s| &s.source) else {
            continue;
        };
        if fs::metadata(path).is_ok_and(|meta| meta.len() > threshold) {
            fonts.push(describe(&references[task.reference]));
            subset.push(task.reference);
        }
    }
    (!fonts.is_empty()).then_some(PlanQuestion::LargeUnsubsetted { fonts, subset })
}
