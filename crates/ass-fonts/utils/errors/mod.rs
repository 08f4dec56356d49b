//! Crate-wide error type
//!
//! `CoreError` wraps the module-specific errors so callers can propagate
//! any failure with `?` and still match on the part that went wrong.
//!
//! # Examples
//!
//! ```rust
//! use ass_fonts::utils::errors::{CoreError, ErrorCategory};
//! use ass_fonts::parser::ParseError;
//!
//! let err: CoreError = ParseError::format_error(3, "missing 'name' field").into();
//! assert_eq!(err.category(), ErrorCategory::Parsing);
//! assert!(err.is_recoverable());
//! ```

mod category;

pub use category::ErrorCategory;

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::{
    embedding::PlanIssue, fonts::FontError, parser::ParseError, utils::uu::CodecError,
};

/// Main error type for font embedding operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The document could not be parsed, decoded or encoded
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Attachment text in the `[Fonts]` section is malformed
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A font could not be read, extracted or subset
    #[error(transparent)]
    Font(#[from] FontError),

    /// File system failure
    #[error("I/O error on {}: {message}", .path.display())]
    Io {
        /// Path involved in the failed operation
        path: PathBuf,
        /// Error kind reported by the OS
        kind: io::ErrorKind,
        /// OS error message
        message: String,
    },

    /// The selections do not require any change to the document
    #[error("nothing to do: every selected font is already in the requested state")]
    NoTask,

    /// Plan check was given a different number of selections than references
    #[error("{selections} selection(s) given for {references} font reference(s)")]
    SelectionMismatch {
        /// Number of references
        references: usize,
        /// Number of selections
        selections: usize,
    },

    /// The plan has warnings or questions that must be resolved first
    #[error("embedding plan has {} unresolved issue(s)", .0.len())]
    Plan(Vec<PlanIssue>),

    /// No embedded font exists under the given name and index
    #[error("no embedded font '{name}' at index {index}")]
    MissingAttachment {
        /// Embed name
        name: String,
        /// Position within the embed name's blob list
        index: usize,
    },

    /// Applying a plan failed; the font table was restored before returning
    #[error("embedding aborted and font table restored: {source}")]
    Apply {
        /// Failure that triggered the rollback
        #[source]
        source: Box<CoreError>,
    },
}

impl CoreError {
    /// Wrap an I/O error together with the path it happened on
    pub fn io(path: impl Into<PathBuf>, err: &io::Error) -> Self {
        Self::Io {
            path: path.into(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    /// Wrap a failure that caused an apply rollback
    #[must_use]
    pub fn apply(source: Self) -> Self {
        Self::Apply {
            source: Box::new(source),
        }
    }

    /// Check if the user can fix the problem and retry
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Parse(_)
            | Self::Io { .. }
            | Self::NoTask
            | Self::Plan(_)
            | Self::MissingAttachment { .. } => true,
            Self::Codec(_) | Self::SelectionMismatch { .. } => false,
            Self::Font(err) => !matches!(err, FontError::SubsetUnavailable),
            Self::Apply { source } => source.is_recoverable(),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = core::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_keeps_kind_and_path() {
        let err = CoreError::io(
            "/tmp/x.ass",
            &io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(
            err,
            CoreError::Io {
                kind: io::ErrorKind::PermissionDenied,
                ..
            }
        ));
        assert!(err.to_string().contains("/tmp/x.ass"));
    }

    #[test]
    fn apply_wraps_source() {
        let err = CoreError::apply(FontError::SubsetUnavailable.into());
        assert!(!err.is_recoverable());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn selection_mismatch_reports_both_counts() {
        let err = CoreError::SelectionMismatch {
            references: 3,
            selections: 2,
        };
        assert!(!err.is_recoverable());
        assert_eq!(err.to_string(), "2 selection(s) given for 3 font reference(s)");
    }

    #[test]
    fn codec_errors_are_not_recoverable() {
        let err: CoreError = CodecError::DanglingCharacter { length: 1 }.into();
        assert!(!err.is_recoverable());
    }
}
