//! Problems found while checking an embedding plan
//!
//! Warnings describe selections that cannot work as given and must be
//! changed. Questions describe selections that work but probably are not
//! what the user wants; each carries the fix it would apply, and the caller
//! either applies it or confirms the plan as-is.

use std::path::PathBuf;

use thiserror::Error;

use super::plan::EmbedSelection;
use crate::{analysis::FontReference, config::EmbedConfig};

/// A selection that cannot be carried out
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchWarning {
    /// An embedded reference was pointed at a different embedded entry
    #[error("{font}: embedded source '{source_name}' is not this font's own entry")]
    EmbeddedSourceSwitch {
        /// Reference as `name style`
        font: String,
        /// Embed name that was selected
        source_name: String,
    },

    /// A reference from outside the document was pointed at an embedded entry
    #[error("{font}: embedded font '{source_name}' cannot be the source of an external embed")]
    EmbeddedAsExternal {
        /// Reference as `name style`
        font: String,
        /// Embed name that was selected
        source_name: String,
    },

    /// Embedding was requested without a source file
    #[error("{font}: no source selected")]
    MissingSource {
        /// Reference as `name style`
        font: String,
    },

    /// The source path is not an existing file
    #[error("file {} does not exist", .path.display())]
    FileMissing {
        /// Reference as `name style`
        font: String,
        /// Selected source
        path: PathBuf,
    },

    /// The source file exists but cannot be read
    #[error("unable to read file {}: {reason}", .path.display())]
    FileUnreadable {
        /// Reference as `name style`
        font: String,
        /// Selected source
        path: PathBuf,
        /// OS or font parser message
        reason: String,
    },

    /// The source file holds no face matching the reference
    #[error("file {} does not contain font \"{font}\"", .path.display())]
    FaceNotFound {
        /// Reference as `name style`
        font: String,
        /// Selected source
        path: PathBuf,
    },
}

/// Kind of a [`PlanQuestion`], used to confirm a plan without its fix
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QuestionKind {
    /// See [`PlanQuestion::IncompleteFamily`]
    IncompleteFamily,
    /// See [`PlanQuestion::LargeUnsubsetted`]
    LargeUnsubsetted,
}

/// A selection that probably needs adjusting
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanQuestion {
    /// Some but not all styles of a font are selected for embedding
    ///
    /// Players resolve the unselected styles to the embedded face, so those
    /// lines render with the wrong weight or slant.
    #[error(
        "fonts {} have several styles but only some are selected for embedding; embed the rest?",
        quoted(.families)
    )]
    IncompleteFamily {
        /// Font names with mixed selections
        families: Vec<String>,
        /// Selections the fix turns on
        select: Vec<usize>,
    },

    /// Large source files would be embedded without subsetting
    #[error(
        "sources of {} are large and not subset; subset them before embedding?",
        quoted(.fonts)
    )]
    LargeUnsubsetted {
        /// References as `name style`
        fonts: Vec<String>,
        /// Selections the fix switches to subsetting
        subset: Vec<usize>,
    },
}

fn quoted(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("\"{name}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

impl PlanQuestion {
    /// Kind of this question
    #[must_use]
    pub const fn kind(&self) -> QuestionKind {
        match self {
            Self::IncompleteFamily { .. } => QuestionKind::IncompleteFamily,
            Self::LargeUnsubsetted { .. } => QuestionKind::LargeUnsubsetted,
        }
    }

    /// Apply the suggested fix to the selections the plan was checked with
    pub fn apply(&self, selections: &mut [EmbedSelection]) {
        match self {
            Self::IncompleteFamily { select, .. } => {
                for &i in select {
                    if let Some(selection) = selections.get_mut(i) {
                        selection.embed = true;
                    }
                }
            }
            Self::LargeUnsubsetted { subset, .. } => {
                for &i in subset {
                    if let Some(selection) = selections.get_mut(i) {
                        selection.subset = true;
                    }
                }
            }
        }
    }
}

/// One item of the batch a failed check returns
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanIssue {
    /// Must be fixed before the plan can run
    #[error(transparent)]
    Warning(#[from] MatchWarning),
    /// Must be fixed or confirmed
    #[error(transparent)]
    Question(#[from] PlanQuestion),
}

impl PlanIssue {
    /// Whether this issue can be confirmed away
    #[must_use]
    pub const fn is_question(&self) -> bool {
        matches!(self, Self::Question(_))
    }
}

/// Confirmation worth asking before a reference is selected for embedding
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedAdvisory {
    /// The entry is a corrupted attachment
    #[error("embedded font file is corrupted; keep it in the subtitle file?")]
    Corrupted,
    /// No dialogue renders with this font
    #[error("font does not cover any character; embed it anyway?")]
    NoCoverage,
    /// Embedding would add many glyphs
    #[error("font covers {count} characters and may noticeably grow the subtitle file")]
    LargeCoverage {
        /// Distinct characters covered
        count: usize,
    },
}

/// Advice before turning on embedding for `reference`
#[must_use]
pub fn embed_advisory(reference: &FontReference, config: &EmbedConfig) -> Option<EmbedAdvisory> {
    let count = reference.covered().len();
    if !reference.is_valid() {
        Some(EmbedAdvisory::Corrupted)
    } else if count == 0 {
        Some(EmbedAdvisory::NoCoverage)
    } else if count >= config.max_char_warning {
        Some(EmbedAdvisory::LargeCoverage { count })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::plan::Source;

    fn selections() -> Vec<EmbedSelection> {
        vec![
            EmbedSelection {
                embed: false,
                subset: false,
                source: Source::None,
            };
            3
        ]
    }

    #[test]
    fn family_fix_selects_listed_rows() {
        let question = PlanQuestion::IncompleteFamily {
            families: vec!["A".into()],
            select: vec![0, 2, 9],
        };
        let mut rows = selections();
        question.apply(&mut rows);
        assert_eq!(
            rows.iter().map(|s| s.embed).collect::<Vec<_>>(),
            vec![true, false, true]
        );
        assert_eq!(question.kind(), QuestionKind::IncompleteFamily);
    }

    #[test]
    fn size_fix_turns_on_subsetting() {
        let question = PlanQuestion::LargeUnsubsetted {
            fonts: vec!["A Regular".into()],
            subset: vec![1],
        };
        let mut rows = selections();
        question.apply(&mut rows);
        assert!(rows[1].subset);
        assert!(!rows[0].subset);
    }

    #[test]
    fn messages_quote_names() {
        let question = PlanQuestion::IncompleteFamily {
            families: vec!["A".into(), "B".into()],
            select: Vec::new(),
        };
        assert!(question.to_string().contains("\"A\", \"B\""));
        let warning = PlanIssue::from(MatchWarning::FileMissing {
            font: "A Bold".into(),
            path: PathBuf::from("/nope.ttf"),
        });
        assert!(!warning.is_question());
        assert!(warning.to_string().contains("/nope.ttf"));
    }
}
