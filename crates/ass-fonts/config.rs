//! Tunable limits and defaults for embedding

use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::parser::sections::fonts::DEFAULT_LINE_WIDTH;

/// Settings shared by the collector, planner and executor
///
/// # Examples
///
/// ```rust
/// use ass_fonts::EmbedConfig;
///
/// let config = EmbedConfig {
///     large_font_threshold: 4 * 1024 * 1024,
///     ..EmbedConfig::default()
/// };
/// assert!(config.is_font_file(std::path::Path::new("a.OTF")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EmbedConfig {
    /// Width of encoded data lines in `[Fonts]`
    pub line_width: usize,

    /// Whole-font embeds above this size (bytes) raise a question
    pub large_font_threshold: u64,

    /// References covering more distinct characters than this get a
    /// subsetting advisory
    pub max_char_warning: usize,

    /// File extensions accepted as fonts, lower-case without dot
    pub font_extensions: Vec<String>,

    /// Suffix appended to the embed name of subset fonts
    pub subset_suffix: String,

    /// Encoding label used when saving documents
    pub output_encoding: String,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            line_width: DEFAULT_LINE_WIDTH,
            large_font_threshold: 1_024_000,
            max_char_warning: 500,
            font_extensions: ["ttf", "ttc", "otf", "otc"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            subset_suffix: "_subset".to_string(),
            output_encoding: "utf-8".to_string(),
        }
    }
}

impl EmbedConfig {
    /// Check whether a path has one of the accepted font extensions
    #[must_use]
    pub fn is_font_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.font_extensions
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EmbedConfig::default();
        assert_eq!(config.line_width, 80);
        assert_eq!(config.large_font_threshold, 1_024_000);
        assert_eq!(config.max_char_warning, 500);
    }

    #[test]
    fn font_extension_check() {
        let config = EmbedConfig::default();
        assert!(config.is_font_file(Path::new("/x/Font.TTC")));
        assert!(!config.is_font_file(Path::new("/x/readme.txt")));
        assert!(!config.is_font_file(Path::new("/x/noext")));
    }
}
