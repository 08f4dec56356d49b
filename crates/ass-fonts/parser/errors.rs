//! Parse error type for subtitle documents
//!
//! Every failure that prevents a document from loading carries enough
//! context to point the user at the problem: structural failures carry the
//! 1-based line number, encoding failures carry the encoding name.

use thiserror::Error;

/// Error raised while reading or writing a subtitle document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A line could not be interpreted by the section it belongs to
    #[error("line {line}: {reason}")]
    FormatError {
        /// 1-based line number in the source text
        line: usize,
        /// What was wrong with the line
        reason: String,
    },

    /// Bytes could not be decoded, or text could not be encoded
    #[error("text is not valid {encoding}: {reason}")]
    EncodingError {
        /// Name of the encoding that was attempted
        encoding: String,
        /// Failure detail
        reason: String,
    },

    /// An encoding label did not name any known encoding
    #[error("unknown text encoding '{label}'")]
    UnknownEncoding {
        /// The label as supplied by the caller
        label: String,
    },
}

impl ParseError {
    /// Create a format error for the given line
    pub fn format_error<T: core::fmt::Display>(line: usize, reason: T) -> Self {
        Self::FormatError {
            line,
            reason: reason.to_string(),
        }
    }

    /// Line number the error refers to, if it refers to one
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::FormatError { line, .. } => Some(*line),
            Self::EncodingError { .. } | Self::UnknownEncoding { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_error_display_includes_line() {
        let err = ParseError::format_error(12, "missing 'text' field");
        assert_eq!(err.to_string(), "line 12: missing 'text' field");
        assert_eq!(err.line(), Some(12));
    }

    #[test]
    fn encoding_error_has_no_line() {
        let err = ParseError::UnknownEncoding {
            label: "x".to_string(),
        };
        assert_eq!(err.line(), None);
        assert!(err.to_string().contains("'x'"));
    }
}
