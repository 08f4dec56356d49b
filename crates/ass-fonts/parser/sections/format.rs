//! `Format:` line handling shared by the style and event tables

use crate::parser::ParseError;

/// Default V4+ style fields
pub const V4_PLUS_STYLE_FIELDS: [&str; 23] = [
    "Name",
    "Fontname",
    "Fontsize",
    "PrimaryColour",
    "SecondaryColour",
    "OutlineColour",
    "BackColour",
    "Bold",
    "Italic",
    "Underline",
    "StrikeOut",
    "ScaleX",
    "ScaleY",
    "Spacing",
    "Angle",
    "BorderStyle",
    "Outline",
    "Shadow",
    "Alignment",
    "MarginL",
    "MarginR",
    "MarginV",
    "Encoding",
];

/// Default V4 style fields
pub const V4_STYLE_FIELDS: [&str; 18] = [
    "Name",
    "Fontname",
    "Fontsize",
    "PrimaryColour",
    "SecondaryColour",
    "TertiaryColour",
    "BackColour",
    "Bold",
    "Italic",
    "BorderStyle",
    "Outline",
    "Shadow",
    "Alignment",
    "MarginL",
    "MarginR",
    "MarginV",
    "AlphaLevel",
    "Encoding",
];

/// Default event fields
pub const EVENT_FIELDS: [&str; 10] = [
    "Layer", "Start", "End", "Style", "Name", "MarginL", "MarginR", "MarginV", "Effect", "Text",
];

/// Canonical spelling for a lower-case field name, if it is a standard field
fn canonical_name(key: &str) -> Option<&'static str> {
    V4_PLUS_STYLE_FIELDS
        .iter()
        .chain(V4_STYLE_FIELDS.iter())
        .chain(EVENT_FIELDS.iter())
        .find(|name| name.eq_ignore_ascii_case(key))
        .copied()
}

/// Split `Key: value` at the first colon, trimming both halves
///
/// Lines without a colon yield an empty key and the whole line as value.
#[must_use]
pub fn split_descriptor(line: &str) -> (&str, &str) {
    match line.split_once(':') {
        Some((key, value)) => (key.trim(), value.trim()),
        None => ("", line),
    }
}

/// Ordered field names of a `Format:` line
///
/// Lookups are case-insensitive. Standard fields are written back with their
/// canonical capitalisation, unknown fields as they were read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFormat {
    /// Field names in canonical or original spelling
    names: Vec<String>,
    /// Lower-case lookup keys, parallel to `names`
    keys: Vec<String>,
}

impl FieldFormat {
    /// Build a format from field names, trimming each
    pub fn new<'a>(fields: impl IntoIterator<Item = &'a str>) -> Self {
        let mut names = Vec::new();
        let mut keys = Vec::new();
        for field in fields {
            let field = field.trim();
            let key = field.to_ascii_lowercase();
            names.push(canonical_name(&key).map_or_else(|| field.to_string(), str::to_string));
            keys.push(key);
        }
        Self { names, keys }
    }

    /// Parse the value part of a `Format:` line and check required fields
    ///
    /// # Errors
    ///
    /// Returns a format error naming the first missing required field.
    pub fn parse(value: &str, required: &[&str], line: usize) -> Result<Self, ParseError> {
        let format = Self::new(value.split(','));
        for field in required {
            if format.position(field).is_none() {
                return Err(ParseError::format_error(
                    line,
                    format!("format line lacks the required '{field}' field"),
                ));
            }
        }
        Ok(format)
    }

    /// Index of a field, case-insensitive
    #[must_use]
    pub fn position(&self, field: &str) -> Option<usize> {
        self.keys.iter().position(|key| key.eq_ignore_ascii_case(field))
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check whether the format has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Field names as written back to the document
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Render as a `Format:` line
    #[must_use]
    pub fn to_line(&self) -> String {
        format!("Format: {}", self.names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_capitalisation() {
        let format = FieldFormat::new("name, FONTNAME, primarycolour, MyField".split(','));
        assert_eq!(
            format.to_line(),
            "Format: Name, Fontname, PrimaryColour, MyField"
        );
        assert_eq!(format.position("FontName"), Some(1));
        assert_eq!(format.position("myfield"), Some(3));
    }

    #[test]
    fn parse_requires_fields() {
        let err = FieldFormat::parse("Layer, Start, Text", &["style", "text"], 7).unwrap_err();
        assert_eq!(err.line(), Some(7));
        assert!(FieldFormat::parse("Style, Text", &["style", "text"], 1).is_ok());
    }

    #[test]
    fn split_descriptor_trims() {
        assert_eq!(split_descriptor("Style:  Default,Arial"), ("Style", "Default,Arial"));
        assert_eq!(split_descriptor("no colon"), ("", "no colon"));
    }
}
