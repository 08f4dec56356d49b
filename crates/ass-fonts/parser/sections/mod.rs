//! Section types of a subtitle document
//!
//! Four kinds of section are modelled: verbatim text sections, the style
//! table, the event table and the embedded font table. Header names are
//! resolved case-insensitively to one of these.

pub mod events;
pub mod fonts;
pub mod format;
pub mod free_text;
pub mod styles;

pub use events::{DialogueRef, DialogueTable};
pub use fonts::FontTable;
pub use format::FieldFormat;
pub use free_text::FreeTextSection;
pub use styles::{StyleRef, StyleTable, StyleVariant};

/// Identity used to merge repeated section headers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// `[Script Info]`
    ScriptInfo,
    /// `[V4+ Styles]` or `[V4 Styles]`
    Styles,
    /// `[Events]`
    Events,
    /// `[Fonts]`
    Fonts,
    /// `[Graphics]`
    Graphics,
    /// Any other header; every occurrence is a separate section
    Other,
}

impl SectionKind {
    /// Classify a header line such as `[script info]`
    #[must_use]
    pub fn from_header(header: &str) -> Self {
        let lower = header.to_lowercase();
        match lower.as_str() {
            "[script info]" => Self::ScriptInfo,
            "[v4+ styles]" | "[v4 styles]" => Self::Styles,
            "[events]" => Self::Events,
            "[fonts]" => Self::Fonts,
            "[graphics]" => Self::Graphics,
            _ => Self::Other,
        }
    }
}

/// Title-case a header the way unknown sections are written back
///
/// Every letter that follows a non-letter is upper-cased and every other
/// letter lower-cased: `[aegisub project GARBAGE]` becomes
/// `[Aegisub Project Garbage]`.
#[must_use]
pub fn title_case(header: &str) -> String {
    let mut out = String::with_capacity(header.len());
    let mut after_letter = false;
    for c in header.chars() {
        if c.is_alphabetic() {
            if after_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            after_letter = true;
        } else {
            out.push(c);
            after_letter = false;
        }
    }
    out
}

/// One section of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    /// Verbatim section with its kind
    Text(SectionKind, FreeTextSection),
    /// Style table
    Styles(StyleTable),
    /// Event table
    Events(DialogueTable),
    /// Embedded fonts
    Fonts(FontTable),
}

impl Section {
    /// Create the empty section a header opens
    #[must_use]
    pub fn open(header: &str) -> Self {
        match SectionKind::from_header(header) {
            SectionKind::ScriptInfo => Self::Text(
                SectionKind::ScriptInfo,
                FreeTextSection::new("[Script Info]", false),
            ),
            SectionKind::Graphics => Self::Text(
                SectionKind::Graphics,
                FreeTextSection::new("[Graphics]", true),
            ),
            SectionKind::Styles => Self::Styles(StyleTable::new(
                StyleVariant::from_header(header).unwrap_or(StyleVariant::V4Plus),
            )),
            SectionKind::Events => Self::Events(DialogueTable::new()),
            SectionKind::Fonts => Self::Fonts(FontTable::new()),
            SectionKind::Other => Self::Text(
                SectionKind::Other,
                FreeTextSection::new(title_case(header), false),
            ),
        }
    }

    /// Kind used for merging repeated headers
    #[must_use]
    pub fn kind(&self) -> SectionKind {
        match self {
            Self::Text(kind, _) => kind.clone(),
            Self::Styles(_) => SectionKind::Styles,
            Self::Events(_) => SectionKind::Events,
            Self::Fonts(_) => SectionKind::Fonts,
        }
    }

    /// Check whether the section would write no lines
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(_, section) => section.is_empty(),
            Self::Styles(styles) => styles.is_empty(),
            Self::Events(events) => events.is_empty(),
            Self::Fonts(fonts) => fonts.is_empty(),
        }
    }

    /// Write the section's lines
    pub fn write_to(&self, out: &mut Vec<String>, line_width: usize) {
        match self {
            Self::Text(_, section) => section.write_to(out),
            Self::Styles(styles) => styles.write_to(out),
            Self::Events(events) => events.write_to(out),
            Self::Fonts(fonts) => fonts.write_to(out, line_width),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_matches_header_style() {
        assert_eq!(title_case("[aegisub project garbage]"), "[Aegisub Project Garbage]");
        assert_eq!(title_case("[x-y z2a]"), "[X-Y Z2A]");
    }

    #[test]
    fn header_classification() {
        assert_eq!(SectionKind::from_header("[SCRIPT INFO]"), SectionKind::ScriptInfo);
        assert_eq!(SectionKind::from_header("[V4 Styles]"), SectionKind::Styles);
        assert_eq!(SectionKind::from_header("[Unknown]"), SectionKind::Other);
    }

    #[test]
    fn open_unknown_header_is_title_cased() {
        match Section::open("[aegisub project garbage]") {
            Section::Text(SectionKind::Other, text) => {
                assert_eq!(text.header(), "[Aegisub Project Garbage]");
            }
            other => panic!("unexpected section {other:?}"),
        }
    }

    #[test]
    fn graphics_is_continuous() {
        match Section::open("[graphics]") {
            Section::Text(SectionKind::Graphics, text) => assert!(text.is_continuous()),
            other => panic!("unexpected section {other:?}"),
        }
    }
}
