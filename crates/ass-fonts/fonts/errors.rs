//! Errors raised while reading, extracting or subsetting font files

use std::path::PathBuf;

use thiserror::Error;

/// Font backend failure
///
/// Backends do not know where font bytes came from, so they report an empty
/// `origin`; [`FontError::with_origin`] fills it in at the call site.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FontError {
    /// The font file could not be read from disk
    #[error("cannot read font file {}: {reason}", .path.display())]
    Unreadable {
        /// Path of the font file
        path: PathBuf,
        /// I/O failure detail
        reason: String,
    },

    /// The data is not a usable font
    #[error("malformed font '{origin}': {reason}")]
    Malformed {
        /// File path or embed name
        origin: String,
        /// Parser failure detail
        reason: String,
    },

    /// The requested face index does not exist
    #[error("font '{origin}' has no face #{index}")]
    FaceNotFound {
        /// File path or embed name
        origin: String,
        /// Requested face index
        index: u32,
    },

    /// The subsetter rejected the font
    #[error("cannot subset font '{origin}': {reason}")]
    SubsetFailed {
        /// File path or embed name
        origin: String,
        /// Subsetter failure detail
        reason: String,
    },

    /// This build carries no subsetting backend
    #[error("font subsetting is not available in this build (enable the `harfbuzz` feature)")]
    SubsetUnavailable,
}

impl FontError {
    /// Create a malformed-font error from any displayable cause
    pub fn malformed<T: core::fmt::Display>(reason: T) -> Self {
        Self::Malformed {
            origin: String::new(),
            reason: reason.to_string(),
        }
    }

    /// Create a subsetting error from any displayable cause
    pub fn subset_failed<T: core::fmt::Display>(reason: T) -> Self {
        Self::SubsetFailed {
            origin: String::new(),
            reason: reason.to_string(),
        }
    }

    /// Attach the font's origin where the backend left it blank
    #[must_use]
    pub fn with_origin(self, name: &str) -> Self {
        match self {
            Self::Malformed { origin, reason } if origin.is_empty() => Self::Malformed {
                origin: name.to_string(),
                reason,
            },
            Self::FaceNotFound { origin, index } if origin.is_empty() => Self::FaceNotFound {
                origin: name.to_string(),
                index,
            },
            Self::SubsetFailed { origin, reason } if origin.is_empty() => Self::SubsetFailed {
                origin: name.to_string(),
                reason,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_origin_fills_blank_origin_only() {
        let err = FontError::malformed("bad header").with_origin("a.ttf");
        assert_eq!(err.to_string(), "malformed font 'a.ttf': bad header");

        let named = FontError::SubsetFailed {
            origin: "b.ttf".to_string(),
            reason: "x".to_string(),
        };
        assert_eq!(named.clone().with_origin("c.ttf"), named);
    }
}
