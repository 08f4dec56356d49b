//! Subtitle document model with lossless load/save
//!
//! A [`Document`] is an ordered list of sections. Known sections that appear
//! more than once are merged into the first occurrence; unknown sections are
//! kept as separate verbatim blocks. Serialization writes sections in their
//! original order and leaves out sections with no content, which is how an
//! emptied `[Fonts]` section disappears from the output.
//!
//! # Examples
//!
//! ```rust
//! use ass_fonts::parser::Document;
//!
//! let doc = Document::parse_str("[Script Info]\nTitle: demo\n\n[Events]\nFormat: Style, Text\nDialogue: Default,hi\n")?;
//! assert_eq!(doc.events().map(|e| e.dialogues().count()), Some(1));
//! assert!(doc.to_text().starts_with("[Script Info]\nTitle: demo\n\n[Events]"));
//! # Ok::<(), ass_fonts::parser::ParseError>(())
//! ```

pub mod errors;
pub mod sections;

use std::{
    fs,
    path::{Path, PathBuf},
};

use encoding_rs::{Encoding, UTF_8};

pub use errors::ParseError;
pub use sections::{
    DialogueRef, DialogueTable, FieldFormat, FontTable, FreeTextSection, Section, SectionKind,
    StyleRef, StyleTable, StyleVariant,
};

use crate::{
    config::EmbedConfig,
    utils::{
        encoding::{decode_document, encode_document, encoding_for_label},
        errors::{CoreError, Result},
    },
};

/// Characters stripped from the start of every line besides control codes
fn is_invisible_format_char(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}' | '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2060}'..='\u{2064}' | '\u{FEFF}'
    )
}

/// Drop leading non-printable characters such as a stray BOM or tabs
fn strip_leading_unprintable(line: &str) -> &str {
    line.trim_start_matches(|c: char| {
        c != ' ' && (c.is_control() || c.is_whitespace() || is_invisible_format_char(c))
    })
}

/// Header text of a `[...]` line, up to its last closing bracket
fn section_header(line: &str) -> Option<&str> {
    if !line.starts_with('[') {
        return None;
    }
    line.rfind(']').map(|end| &line[..=end])
}

/// A parsed subtitle document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: Option<PathBuf>,
    encoding: &'static Encoding,
    sections: Vec<Section>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            path: None,
            encoding: UTF_8,
            sections: Vec::new(),
        }
    }
}

impl Document {
    /// Parse document text
    ///
    /// Lines are read with a two-state machine: outside a continuous
    /// section a `[...]` line switches sections; inside one (embedded data)
    /// every line is data until a blank line ends the run.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::FormatError`] with the 1-based line number when
    /// a line cannot be interpreted: a `Format:` line missing required
    /// fields, or content before the first header.
    pub fn parse_str(text: &str) -> core::result::Result<Self, ParseError> {
        let mut document = Self::default();
        let mut current: Option<usize> = None;
        let mut continuation = false;
        let mut open_font: Option<String> = None;

        for (index, raw) in text.lines().enumerate() {
            let line_number = index + 1;
            let line = strip_leading_unprintable(raw).trim_end_matches(['\r', '\n']);

            if !continuation {
                if let Some(header) = section_header(line) {
                    current = Some(document.enter_section(header));
                    open_font = None;
                    continue;
                }
            }

            let Some(section) = current else {
                if line.is_empty() {
                    continue;
                }
                return Err(ParseError::format_error(
                    line_number,
                    "content before the first section header",
                ));
            };

            continuation = match &mut document.sections[section] {
                Section::Text(_, text) => text.append(line),
                Section::Styles(styles) => styles.append(line, line_number)?,
                Section::Events(events) => events.append(line, line_number)?,
                Section::Fonts(fonts) => fonts.append(line, &mut open_font),
            };
        }

        Ok(document)
    }

    /// Index of the section a header opens, creating it on first sight
    fn enter_section(&mut self, header: &str) -> usize {
        let kind = SectionKind::from_header(header);
        if kind != SectionKind::Other {
            if let Some(index) = self.sections.iter().position(|s| s.kind() == kind) {
                if let (Section::Styles(styles), Some(variant)) =
                    (&mut self.sections[index], StyleVariant::from_header(header))
                {
                    styles.set_variant(variant);
                }
                return index;
            }
        }
        self.sections.push(Section::open(header));
        self.sections.len() - 1
    }

    /// Decode and parse raw bytes
    ///
    /// # Errors
    ///
    /// Returns an encoding error when the bytes cannot be decoded and a
    /// format error when the text cannot be parsed.
    pub fn from_bytes(bytes: &[u8], encoding: Option<&'static Encoding>) -> Result<Self> {
        let (text, encoding) = decode_document(bytes, encoding)?;
        let mut document = Self::parse_str(&text)?;
        document.encoding = encoding;
        Ok(document)
    }

    /// Load a document from disk
    ///
    /// `encoding` is an encoding label; `None` detects it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Io`] when the file cannot be read, plus any error
    /// of [`Document::from_bytes`].
    pub fn load(path: &Path, encoding: Option<&str>) -> Result<Self> {
        let bytes = fs::read(path).map_err(|err| CoreError::io(path, &err))?;
        let encoding = encoding.map(encoding_for_label).transpose()?;
        let mut document = Self::from_bytes(&bytes, encoding)?;
        document.path = Some(path.to_path_buf());
        log::debug!(
            "loaded {} as {} ({} sections)",
            path.display(),
            document.encoding.name(),
            document.sections.len()
        );
        Ok(document)
    }

    /// Path the document was loaded from
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Directory containing the document, used for local font lookup
    #[must_use]
    pub fn directory(&self) -> Option<&Path> {
        self.path.as_deref().and_then(Path::parent)
    }

    /// Encoding the document was decoded with
    #[must_use]
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Sections in document order
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// The style table, if the document has one
    #[must_use]
    pub fn styles(&self) -> Option<&StyleTable> {
        self.sections.iter().find_map(|section| match section {
            Section::Styles(styles) => Some(styles),
            _ => None,
        })
    }

    /// The event table, if the document has one
    #[must_use]
    pub fn events(&self) -> Option<&DialogueTable> {
        self.sections.iter().find_map(|section| match section {
            Section::Events(events) => Some(events),
            _ => None,
        })
    }

    /// The embedded font table, if the document has one
    #[must_use]
    pub fn fonts(&self) -> Option<&FontTable> {
        self.sections.iter().find_map(|section| match section {
            Section::Fonts(fonts) => Some(fonts),
            _ => None,
        })
    }

    /// Mutable font table, inserted right after the styles when missing
    pub fn fonts_mut(&mut self) -> &mut FontTable {
        let index = match self.sections.iter().position(|s| matches!(s, Section::Fonts(_))) {
            Some(index) => index,
            None => {
                let at = self
                    .sections
                    .iter()
                    .position(|s| matches!(s, Section::Styles(_)))
                    .map_or(self.sections.len(), |styles| styles + 1);
                self.sections.insert(at, Section::Fonts(FontTable::new()));
                at
            }
        };
        match &mut self.sections[index] {
            Section::Fonts(fonts) => fonts,
            _ => unreachable!("section at index was just checked to be the font table"),
        }
    }

    /// Put back a font table taken with [`Document::fonts`]
    ///
    /// `None` removes the section so the document compares equal to one
    /// that never had it.
    pub fn restore_fonts(&mut self, fonts: Option<FontTable>) {
        match fonts {
            Some(fonts) => *self.fonts_mut() = fonts,
            None => self
                .sections
                .retain(|section| !matches!(section, Section::Fonts(_))),
        }
    }

    /// Serialize with the given attachment line width
    #[must_use]
    pub fn to_text_with_width(&self, line_width: usize) -> String {
        let mut text = String::new();
        let mut lines = Vec::new();
        for section in &self.sections {
            lines.clear();
            section.write_to(&mut lines, line_width);
            if lines.is_empty() {
                continue;
            }
            text.push_str(&lines.join("\n"));
            text.push_str("\n\n");
        }
        text
    }

    /// Serialize with the default attachment line width
    #[must_use]
    pub fn to_text(&self) -> String {
        self.to_text_with_width(sections::fonts::DEFAULT_LINE_WIDTH)
    }

    /// Write the document
    ///
    /// `path` defaults to the path the document was loaded from. The text is
    /// fully encoded before the file is touched.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Io`] when there is no target path or the file
    /// cannot be written, and an encoding error when the text cannot be
    /// represented in the configured output encoding.
    pub fn save(&self, path: Option<&Path>, config: &EmbedConfig) -> Result<()> {
        let path = path.or(self.path.as_deref()).ok_or_else(|| CoreError::Io {
            path: PathBuf::new(),
            kind: std::io::ErrorKind::InvalidInput,
            message: "document has no path to save to".to_string(),
        })?;
        let encoding = encoding_for_label(&config.output_encoding)?;
        let bytes = encode_document(&self.to_text_with_width(config.line_width), encoding)?;
        fs::write(path, bytes).map_err(|err| CoreError::io(path, &err))?;
        log::info!("saved {}", path.display());
        Ok(())
    }
}
