//! `[V4+ Styles]` / `[V4 Styles]` section
//!
//! Styles are keyed by name for lookup. Names are matched case-insensitively
//! and a leading `*` (the marker some editors use for styles not used by any
//! event) is ignored. Lines that are neither `Format:` nor `Style:` are kept
//! verbatim in place so they survive a save.
//!
//! # Examples
//!
//! ```rust
//! use ass_fonts::parser::{StyleTable, StyleVariant};
//!
//! let mut styles = StyleTable::new(StyleVariant::V4Plus);
//! styles.append("Format: Name, Fontname, Bold", 1)?;
//! styles.append("Style: *Default,Arial,-1", 2)?;
//! assert_eq!(styles.get("default", "fontname"), Some("Arial"));
//! assert_eq!(styles.get("Missing", "bold"), Some("-1"));
//! # Ok::<(), ass_fonts::parser::ParseError>(())
//! ```

use indexmap::IndexMap;

use super::format::{split_descriptor, FieldFormat, V4_PLUS_STYLE_FIELDS, V4_STYLE_FIELDS};
use crate::parser::ParseError;

/// Fields a style `Format:` line must name
const REQUIRED_FIELDS: [&str; 2] = ["name", "fontname"];

/// Style name used when a lookup misses
pub const DEFAULT_STYLE: &str = "Default";

/// Which style section header the document uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleVariant {
    /// SSA `[V4 Styles]`
    V4,
    /// ASS `[V4+ Styles]`
    V4Plus,
}

impl StyleVariant {
    /// Identify the variant from a header line, case-insensitive
    #[must_use]
    pub fn from_header(header: &str) -> Option<Self> {
        if header.eq_ignore_ascii_case("[v4+ styles]") {
            Some(Self::V4Plus)
        } else if header.eq_ignore_ascii_case("[v4 styles]") {
            Some(Self::V4)
        } else {
            None
        }
    }

    /// Header line in canonical spelling
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::V4 => "[V4 Styles]",
            Self::V4Plus => "[V4+ Styles]",
        }
    }

    /// Format assumed until the section gives its own
    #[must_use]
    pub fn default_format(self) -> FieldFormat {
        match self {
            Self::V4 => FieldFormat::new(V4_STYLE_FIELDS),
            Self::V4Plus => FieldFormat::new(V4_PLUS_STYLE_FIELDS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum StyleLine {
    Style { format: usize, values: Vec<String> },
    Format(usize),
    Verbatim(String),
}

/// Borrowed view of one style row
#[derive(Debug, Clone, Copy)]
pub struct StyleRef<'a> {
    format: &'a FieldFormat,
    values: &'a [String],
}

impl<'a> StyleRef<'a> {
    /// Value of a field, `None` when the format or row lacks it
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'a str> {
        let index = self.format.position(name)?;
        self.values.get(index).map(String::as_str)
    }

    /// Style name as written, including any leading `*`
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.field("name").unwrap_or_default()
    }
}

/// Style definitions of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleTable {
    variant: StyleVariant,
    formats: Vec<FieldFormat>,
    /// `formats[0]` came from a `Format:` line ahead of every other line
    leading_format: bool,
    lines: IndexMap<String, StyleLine>,
    extra_lines: usize,
}

impl StyleTable {
    /// Create an empty table with the variant's default format
    #[must_use]
    pub fn new(variant: StyleVariant) -> Self {
        Self {
            variant,
            formats: vec![variant.default_format()],
            leading_format: false,
            lines: IndexMap::new(),
            extra_lines: 0,
        }
    }

    /// Header variant
    #[must_use]
    pub const fn variant(&self) -> StyleVariant {
        self.variant
    }

    /// Switch header variant; the default format follows while no line was read
    pub fn set_variant(&mut self, variant: StyleVariant) {
        self.variant = variant;
        if self.lines.is_empty() {
            self.formats = vec![variant.default_format()];
            self.leading_format = false;
        }
    }

    /// Format in effect for the lines read so far
    #[must_use]
    pub fn format(&self) -> &FieldFormat {
        &self.formats[self.formats.len() - 1]
    }

    fn lookup_key(name: &str) -> String {
        name.trim().trim_start_matches('*').to_lowercase()
    }

    fn next_extra_key(&mut self) -> String {
        let key = format!(",{}", self.extra_lines);
        self.extra_lines += 1;
        key
    }

    /// Append a section line; style sections never continue past a line
    ///
    /// # Errors
    ///
    /// Returns a format error when a `Format:` line lacks `Name` or `Fontname`.
    pub fn append(&mut self, line: &str, line_number: usize) -> Result<bool, ParseError> {
        if line.is_empty() {
            return Ok(false);
        }

        let (descriptor, value) = split_descriptor(line);
        if descriptor.eq_ignore_ascii_case("format") {
            let format = FieldFormat::parse(value, &REQUIRED_FIELDS, line_number)?;
            if self.lines.is_empty() {
                self.formats = vec![format];
                self.leading_format = true;
            } else {
                self.formats.push(format);
                let key = self.next_extra_key();
                self.lines
                    .insert(key, StyleLine::Format(self.formats.len() - 1));
            }
            return Ok(false);
        }

        if descriptor.eq_ignore_ascii_case("style") {
            let format = self.formats.len() - 1;
            let values: Vec<String> = value.split(',').map(|v| v.trim().to_string()).collect();
            let name = self.formats[format]
                .position("name")
                .and_then(|index| values.get(index));
            if let Some(name) = name {
                let key = Self::lookup_key(name);
                self.lines.insert(key, StyleLine::Style { format, values });
                return Ok(false);
            }
        }

        let key = self.next_extra_key();
        self.lines.insert(key, StyleLine::Verbatim(line.to_string()));
        Ok(false)
    }

    fn style(&self, name: &str) -> Option<StyleRef<'_>> {
        match self.lines.get(&Self::lookup_key(name))? {
            StyleLine::Style { format, values } => Some(StyleRef {
                format: &self.formats[*format],
                values,
            }),
            StyleLine::Format(_) | StyleLine::Verbatim(_) => None,
        }
    }

    /// Field of a named style, falling back to the `Default` style
    #[must_use]
    pub fn get(&self, style: &str, field: &str) -> Option<&str> {
        self.style(style)
            .or_else(|| self.style(DEFAULT_STYLE))?
            .field(field)
    }

    /// Field of the first style in `styles` that exists, without fallback
    #[must_use]
    pub fn get_chain(&self, styles: &[&str], field: &str) -> Option<&str> {
        styles
            .iter()
            .find_map(|name| self.style(name))?
            .field(field)
    }

    /// Iterate style rows in document order, skipping verbatim lines
    pub fn styles(&self) -> impl Iterator<Item = StyleRef<'_>> {
        self.lines.values().filter_map(|line| match line {
            StyleLine::Style { format, values } => Some(StyleRef {
                format: &self.formats[*format],
                values,
            }),
            StyleLine::Format(_) | StyleLine::Verbatim(_) => None,
        })
    }

    /// Number of style rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.styles().count()
    }

    /// Check whether the section has no lines at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Write the section, or nothing when it is empty
    ///
    /// The default `Format:` line is only added for rows that never had one.
    pub fn write_to(&self, out: &mut Vec<String>) {
        if self.lines.is_empty() {
            return;
        }
        out.push(self.variant.header().to_string());
        let has_format_line = self
            .lines
            .values()
            .any(|line| matches!(line, StyleLine::Format(_)));
        if self.leading_format || (!has_format_line && self.styles().next().is_some()) {
            out.push(self.formats[0].to_line());
        }
        for line in self.lines.values() {
            out.push(match line {
                StyleLine::Style { values, .. } => format!("Style: {}", values.join(",")),
                StyleLine::Format(index) => self.formats[*index].to_line(),
                StyleLine::Verbatim(text) => text.clone(),
            });
        }
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::new(StyleVariant::V4Plus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(lines: &[&str]) -> StyleTable {
        let mut styles = StyleTable::default();
        for (i, line) in lines.iter().enumerate() {
            styles.append(line, i + 1).unwrap();
        }
        styles
    }

    #[test]
    fn lookup_ignores_case_and_star() {
        let styles = table(&[
            "Format: Name, Fontname, Bold, Italic",
            "Style: *Sign,Arial,0,1",
        ]);
        assert_eq!(styles.get("SIGN", "fontname"), Some("Arial"));
        assert_eq!(styles.get("*sign", "Italic"), Some("1"));
    }

    #[test]
    fn missing_style_falls_back_to_default() {
        let styles = table(&[
            "Format: Name, Fontname",
            "Style: Default,Default Font",
            "Style: Top,Other",
        ]);
        assert_eq!(styles.get("nope", "fontname"), Some("Default Font"));
        assert_eq!(styles.get_chain(&["nope"], "fontname"), None);
        assert_eq!(styles.get_chain(&["", "top"], "fontname"), Some("Other"));
    }

    #[test]
    fn lookup_without_default_returns_none() {
        let styles = table(&["Format: Name, Fontname", "Style: Top,Other"]);
        assert_eq!(styles.get("nope", "fontname"), None);
    }

    #[test]
    fn format_without_fontname_is_error() {
        let mut styles = StyleTable::default();
        let err = styles.append("Format: Name, Bold", 4).unwrap_err();
        assert_eq!(err.line(), Some(4));
    }

    #[test]
    fn style_before_format_uses_default_fields() {
        let styles = table(&[
            "Style: Default,Arial,20,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,-1,0,0,0,100,100,0,0,1,2,0,2,10,10,10,1",
        ]);
        assert_eq!(styles.get("Default", "bold"), Some("-1"));
        assert_eq!(styles.get("Default", "encoding"), Some("1"));
    }

    #[test]
    fn invalid_lines_round_trip_in_place() {
        let styles = table(&[
            "Format: name, fontname",
            "; comment",
            "Style: A,Arial",
            "garbage without colon",
        ]);
        let mut out = Vec::new();
        styles.write_to(&mut out);
        assert_eq!(
            out,
            vec![
                "[V4+ Styles]",
                "Format: Name, Fontname",
                "; comment",
                "Style: A,Arial",
                "garbage without colon",
            ]
        );
        assert_eq!(styles.len(), 1);
    }

    #[test]
    fn duplicate_style_replaces_in_place() {
        let styles = table(&[
            "Format: Name, Fontname",
            "Style: A,First",
            "Style: B,Other",
            "Style: a,Second",
        ]);
        let names: Vec<&str> = styles.styles().map(|s| s.name()).collect();
        assert_eq!(names, vec!["a", "B"]);
        assert_eq!(styles.get("A", "fontname"), Some("Second"));
    }

    #[test]
    fn later_format_applies_to_following_rows() {
        let styles = table(&[
            "Format: Name, Fontname",
            "Style: A,Arial",
            "Format: Fontname, Name",
            "Style: Verdana,B",
        ]);
        assert_eq!(styles.get("A", "fontname"), Some("Arial"));
        assert_eq!(styles.get("B", "fontname"), Some("Verdana"));

        let mut out = Vec::new();
        styles.write_to(&mut out);
        assert_eq!(out[3], "Format: Fontname, Name");
    }

    #[test]
    fn comment_before_first_format_adds_no_default() {
        let styles = table(&["; header", "Format: Name, Fontname", "Style: A,Arial"]);
        assert_eq!(styles.get("A", "fontname"), Some("Arial"));
        let mut out = Vec::new();
        styles.write_to(&mut out);
        assert_eq!(
            out,
            vec!["[V4+ Styles]", "; header", "Format: Name, Fontname", "Style: A,Arial"]
        );
    }

    #[test]
    fn rows_without_format_get_default_line() {
        let mut out = Vec::new();
        table(&["; only a comment"]).write_to(&mut out);
        assert_eq!(out, vec!["[V4+ Styles]", "; only a comment"]);

        out.clear();
        table(&["; header", "Style: A,Arial"]).write_to(&mut out);
        assert_eq!(out.len(), 4);
        assert_eq!(out[1], StyleVariant::V4Plus.default_format().to_line());
        assert_eq!(out[2], "; header");
    }

    #[test]
    fn variant_header() {
        let mut styles = StyleTable::new(StyleVariant::V4);
        styles.append("Style: Default,Arial", 1).unwrap();
        let mut out = Vec::new();
        styles.write_to(&mut out);
        assert_eq!(out[0], "[V4 Styles]");
        assert_eq!(StyleVariant::from_header("[V4+ STYLES]"), Some(StyleVariant::V4Plus));
    }
}
