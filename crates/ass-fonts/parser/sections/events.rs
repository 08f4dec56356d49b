//! `[Events]` section
//!
//! `Dialogue:` rows are split into fields according to the format in effect
//! when they were read. The last field (`Text`) may contain commas. Every
//! other line (`Comment:`, `Picture:`, editor noise) is kept verbatim.

use super::format::{split_descriptor, FieldFormat, EVENT_FIELDS};
use crate::parser::ParseError;

/// Fields an event `Format:` line must name
const REQUIRED_FIELDS: [&str; 2] = ["style", "text"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum EventLine {
    Dialogue { format: usize, fields: Vec<String> },
    Format(usize),
    Verbatim(String),
}

/// Borrowed view of one `Dialogue:` row
#[derive(Debug, Clone, Copy)]
pub struct DialogueRef<'a> {
    format: &'a FieldFormat,
    fields: &'a [String],
}

impl<'a> DialogueRef<'a> {
    /// Value of a field, `None` when the row is too short or lacks it
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'a str> {
        let index = self.format.position(name)?;
        self.fields.get(index).map(String::as_str)
    }

    /// Style name of the row
    #[must_use]
    pub fn style(&self) -> Option<&'a str> {
        self.field("style")
    }

    /// Text of the row including override blocks
    #[must_use]
    pub fn text(&self) -> Option<&'a str> {
        self.field("text")
    }
}

/// Event lines of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueTable {
    formats: Vec<FieldFormat>,
    leading_format: bool,
    lines: Vec<EventLine>,
}

impl DialogueTable {
    /// Create an empty table with the default event format
    #[must_use]
    pub fn new() -> Self {
        Self {
            formats: vec![FieldFormat::new(EVENT_FIELDS)],
            leading_format: false,
            lines: Vec::new(),
        }
    }

    /// Format in effect for the lines read so far
    #[must_use]
    pub fn format(&self) -> &FieldFormat {
        &self.formats[self.formats.len() - 1]
    }

    /// Append a section line; event sections never continue past a line
    ///
    /// # Errors
    ///
    /// Returns a format error when a `Format:` line lacks `Style` or `Text`.
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
                self.lines.push(EventLine::Format(self.formats.len() - 1));
            }
        } else if descriptor.eq_ignore_ascii_case("dialogue") {
            let format = self.formats.len() - 1;
            let fields = value
                .splitn(self.formats[format].len().max(1), ',')
                .map(|field| field.trim().to_string())
                .collect();
            self.lines.push(EventLine::Dialogue { format, fields });
        } else {
            self.lines.push(EventLine::Verbatim(line.to_string()));
        }
        Ok(false)
    }

    /// Iterate `Dialogue:` rows in document order
    pub fn dialogues(&self) -> impl Iterator<Item = DialogueRef<'_>> {
        self.lines.iter().filter_map(|line| match line {
            EventLine::Dialogue { format, fields } => Some(DialogueRef {
                format: &self.formats[*format],
                fields,
            }),
            EventLine::Format(_) | EventLine::Verbatim(_) => None,
        })
    }

    /// Number of stored lines, verbatim lines included
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check whether the section has no lines
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Write the section, or nothing when it is empty
    pub fn write_to(&self, out: &mut Vec<String>) {
        if self.lines.is_empty() {
            return;
        }
        out.push("[Events]".to_string());
        let has_format_line = self
            .lines
            .iter()
            .any(|line| matches!(line, EventLine::Format(_)));
        if self.leading_format || (!has_format_line && self.dialogues().next().is_some()) {
            out.push(self.formats[0].to_line());
        }
        for line in &self.lines {
            out.push(match line {
                EventLine::Dialogue { fields, .. } => format!("Dialogue: {}", fields.join(",")),
                EventLine::Format(index) => self.formats[*index].to_line(),
                EventLine::Verbatim(text) => text.clone(),
            });
        }
    }
}

impl Default for DialogueTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_keeps_commas() {
        let mut events = DialogueTable::new();
        events
            .append("Dialogue: 0,0:00:00.00,0:00:01.00,Default,,0,0,0,,Hello, world, again", 1)
            .unwrap();
        let row = events.dialogues().next().unwrap();
        assert_eq!(row.text(), Some("Hello, world, again"));
        assert_eq!(row.style(), Some("Default"));
    }

    #[test]
    fn comments_are_verbatim() {
        let mut events = DialogueTable::new();
        events.append("Comment: 0,0:00:00.00,0:00:01.00,Default,,0,0,0,,x", 1).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events.dialogues().count(), 0);
    }

    #[test]
    fn custom_format_changes_split() {
        let mut events = DialogueTable::new();
        events.append("Format: Style, Text", 1).unwrap();
        events.append("Dialogue: Sign,a,b", 2).unwrap();
        let row = events.dialogues().next().unwrap();
        assert_eq!(row.text(), Some("a,b"));
    }

    #[test]
    fn short_row_has_no_text() {
        let mut events = DialogueTable::new();
        events.append("Dialogue: 0,0:00:00.00", 1).unwrap();
        assert_eq!(events.dialogues().next().unwrap().text(), None);
    }

    #[test]
    fn format_without_text_is_error() {
        let mut events = DialogueTable::new();
        assert!(events.append("Format: Layer, Style", 9).is_err());
    }

    #[test]
    fn comment_before_first_format_adds_no_default() {
        let mut events = DialogueTable::new();
        events.append("; timed by someone", 1).unwrap();
        events.append("Format: Style, Text", 2).unwrap();
        events.append("Dialogue: Default,hi", 3).unwrap();
        assert_eq!(events.dialogues().next().unwrap().text(), Some("hi"));

        let mut out = Vec::new();
        events.write_to(&mut out);
        assert_eq!(
            out,
            vec!["[Events]", "; timed by someone", "Format: Style, Text", "Dialogue: Default,hi"]
        );
    }

    #[test]
    fn rows_without_format_get_default_line() {
        let mut events = DialogueTable::new();
        events.append("Dialogue: 0,0:00:00.00,0:00:01.00,Default,,0,0,0,,x", 1).unwrap();
        let mut out = Vec::new();
        events.write_to(&mut out);
        assert_eq!(out[1], FieldFormat::new(EVENT_FIELDS).to_line());
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn write_normalises_format_capitalisation() {
        let mut events = DialogueTable::new();
        events.append("Format: layer, style, text", 1).unwrap();
        events.append("Dialogue: 0,Default,hi", 2).unwrap();
        let mut out = Vec::new();
        events.write_to(&mut out);
        assert_eq!(
            out,
            vec!["[Events]", "Format: Layer, Style, Text", "Dialogue: 0,Default,hi"]
        );
    }
}
