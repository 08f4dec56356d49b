//! Sections kept as plain text lines
//!
//! `[Script Info]`, `[Graphics]` and any section this crate does not model
//! are stored verbatim. `[Graphics]` carries encoded attachment data, so it
//! is continuous: lines that look like headers are data until a blank line.

/// A section whose lines are preserved as-is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeTextSection {
    header: String,
    lines: Vec<String>,
    continuous: bool,
}

impl FreeTextSection {
    /// Create an empty section with the header it is written back with
    pub fn new(header: impl Into<String>, continuous: bool) -> Self {
        Self {
            header: header.into(),
            lines: Vec::new(),
            continuous,
        }
    }

    /// Header line, e.g. `[Script Info]`
    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Stored lines, blank lines excluded
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether following lines must stay in this section
    #[must_use]
    pub const fn is_continuous(&self) -> bool {
        self.continuous
    }

    /// Append a line; returns whether the next line continues this section
    pub fn append(&mut self, line: &str) -> bool {
        if line.is_empty() {
            return false;
        }
        self.lines.push(line.to_string());
        self.continuous
    }

    /// Check whether the section has any content to write
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Write the section, or nothing when it is empty
    pub fn write_to(&self, out: &mut Vec<String>) {
        if self.lines.is_empty() {
            return;
        }
        out.push(self.header.clone());
        out.extend(self.lines.iter().cloned());
    }
}
