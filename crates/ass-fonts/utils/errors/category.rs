//! Error categorization for grouping failures in user interfaces and logs

use core::fmt;

use super::CoreError;

/// Error category for filtering and user interface organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Document structure problems
    Parsing,

    /// Text or attachment encoding problems
    Encoding,

    /// Font file problems
    Font,

    /// File system problems
    Io,

    /// Embedding plan problems the user must resolve
    Planning,
}

impl ErrorCategory {
    /// Human-readable category name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Parsing => "parsing",
            Self::Encoding => "encoding",
            Self::Font => "font",
            Self::Io => "io",
            Self::Planning => "planning",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CoreError {
    /// Category this error belongs to
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Parse(crate::parser::ParseError::FormatError { .. }) => ErrorCategory::Parsing,
            Self::Parse(_) | Self::Codec(_) => ErrorCategory::Encoding,
            Self::Font(_) | Self::MissingAttachment { .. } => ErrorCategory::Font,
            Self::Io { .. } => ErrorCategory::Io,
            Self::NoTask | Self::Plan(_) | Self::SelectionMismatch { .. } => ErrorCategory::Planning,
            Self::Apply { source } => source.category(),
        }
    }

    /// Suggestion for resolving common errors
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Parse(crate::parser::ParseError::EncodingError { .. }) => {
                Some("pass the file's encoding explicitly")
            }
            Self::Font(crate::fonts::FontError::SubsetUnavailable) => {
                Some("build with the default `harfbuzz` feature or embed without subsetting")
            }
            Self::Plan(_) => Some("resolve the listed warnings or confirm the questions"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParseError;

    #[test]
    fn categories() {
        assert_eq!(
            CoreError::from(ParseError::format_error(1, "x")).category(),
            ErrorCategory::Parsing
        );
        assert_eq!(CoreError::NoTask.category(), ErrorCategory::Planning);
        assert_eq!(
            CoreError::apply(CoreError::NoTask).category(),
            ErrorCategory::Planning
        );
        assert_eq!(ErrorCategory::Font.to_string(), "font");
    }

    #[test]
    fn suggestions() {
        assert!(CoreError::Plan(Vec::new()).suggestion().is_some());
        assert!(CoreError::NoTask.suggestion().is_none());
    }
}
