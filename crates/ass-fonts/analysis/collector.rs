//! Font reference collection
//!
//! Walks the style and event tables of a document and records, for every
//! distinct `(font name, bold, italic)` request, the characters rendered
//! with it. Each request is resolved once through the [`FontMatcher`].

use std::{collections::BTreeSet, sync::Arc};

use indexmap::IndexMap;

use super::tags::{normalize_text, split_overrides, Segment};
use crate::{
    fonts::{matcher::InvalidEmbed, FaceKey, FontDescriptor, FontMatcher, Scope},
    parser::{sections::styles::DEFAULT_STYLE, Document, StyleTable},
    utils::parse_flag,
};

/// One font request found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontReference {
    name: String,
    bold: bool,
    italic: bool,
    covered: BTreeSet<char>,
    from_embedded: bool,
    descriptor: Option<Arc<FontDescriptor>>,
    invalid: Option<InvalidEmbed>,
}

impl FontReference {
    /// Font name as written in the document, without a leading `@`
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Requested bold flag
    #[must_use]
    pub const fn bold(&self) -> bool {
        self.bold
    }

    /// Requested italic flag
    #[must_use]
    pub const fn italic(&self) -> bool {
        self.italic
    }

    /// Characters rendered with this font
    #[must_use]
    pub const fn covered(&self) -> &BTreeSet<char> {
        &self.covered
    }

    /// Whether the resolved face is stored in the document
    #[must_use]
    pub const fn is_from_embedded(&self) -> bool {
        self.from_embedded
    }

    /// Face the reference resolved to
    #[must_use]
    pub fn descriptor(&self) -> Option<&Arc<FontDescriptor>> {
        self.descriptor.as_ref()
    }

    /// `false` for a `[Fonts]` entry that could not be decoded or read
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.invalid.is_none()
    }

    /// Failure details of an invalid entry
    #[must_use]
    pub const fn invalid(&self) -> Option<&InvalidEmbed> {
        self.invalid.as_ref()
    }

    /// Embed name and blob index when the reference lives in the document
    #[must_use]
    pub fn embedded_entry(&self) -> Option<(&str, usize)> {
        if let Some(invalid) = &self.invalid {
            return Some((invalid.name.as_str(), invalid.index));
        }
        self.descriptor
            .as_ref()
            .filter(|face| face.is_in_memory())
            .map(|face| (face.origin(), face.index()))
    }

    /// `Regular`, `Bold`, `Italic` or `Bold Italic`
    #[must_use]
    pub const fn style_label(&self) -> &'static str {
        match (self.bold, self.italic) {
            (false, false) => "Regular",
            (true, false) => "Bold",
            (false, true) => "Italic",
            (true, true) => "Bold Italic",
        }
    }
}

/// How a newly seen request gets its face
enum Resolution {
    Match,
    Known(Arc<FontDescriptor>),
    Invalid(InvalidEmbed),
}

/// References keyed by lower-cased name and style, in first-seen order
struct ReferenceSet<'m> {
    matcher: &'m FontMatcher,
    references: IndexMap<(String, bool, bool), FontReference>,
}

impl<'m> ReferenceSet<'m> {
    fn new(matcher: &'m FontMatcher) -> Self {
        Self {
            matcher,
            references: IndexMap::new(),
        }
    }

    fn add(&mut self, name: &str, bold: bool, italic: bool, text: &str, resolution: Resolution) {
        let name = name.trim_start_matches('@');
        if name.is_empty() {
            return;
        }
        let chars = normalize_text(text);
        let key = (name.to_lowercase(), bold, italic);
        if let Some(reference) = self.references.get_mut(&key) {
            reference.covered.extend(chars.chars());
            return;
        }

        let (descriptor, invalid) = match resolution {
            Resolution::Match => (
                self.matcher.match_font(name, bold, italic, Scope::all()),
                None,
            ),
            Resolution::Known(face) => (Some(face), None),
            Resolution::Invalid(entry) => (None, Some(entry)),
        };
        let from_embedded =
            invalid.is_some() || descriptor.as_ref().is_some_and(|face| face.is_in_memory());
        self.references.insert(
            key,
            FontReference {
                name: name.to_string(),
                bold,
                italic,
                covered: chars.chars().collect(),
                from_embedded,
                descriptor,
                invalid,
            },
        );
    }

    fn resolved_faces(&self) -> BTreeSet<FaceKey> {
        self.references
            .values()
            .filter_map(|reference| reference.descriptor.as_ref().map(|face| face.key()))
            .collect()
    }
}

/// Font, bold and italic in effect at some point of a dialogue line
#[derive(Debug, Clone, Copy)]
struct ActiveFont<'d> {
    name: Option<&'d str>,
    bold: bool,
    italic: bool,
}

impl<'d> ActiveFont<'d> {
    fn of_style(styles: Option<&'d StyleTable>, style: &str) -> Self {
        let field = |name| styles.and_then(|table| table.get(style, name));
        Self {
            name: field("fontname"),
            bold: field("bold").is_some_and(parse_flag),
            italic: field("italic").is_some_and(parse_flag),
        }
    }

    fn of_chain(styles: Option<&'d StyleTable>, chain: &[&str]) -> Self {
        let field = |name| styles.and_then(|table| table.get_chain(chain, name));
        Self {
            name: field("fontname"),
            bold: field("bold").is_some_and(parse_flag),
            italic: field("italic").is_some_and(parse_flag),
        }
    }

    fn attribute(&self, set: &mut ReferenceSet<'_>, text: &str) {
        if let Some(name) = self.name {
            set.add(name, self.bold, self.italic, text, Resolution::Match);
        }
    }
}

/// Collect every font reference of a document
///
/// Style fonts are registered even when no dialogue uses them. Embedded
/// fonts that no reference resolved to, and `[Fonts]` entries the matcher
/// could not load, are appended as zero-coverage references. The result
/// lists references resolved outside the document first.
#[must_use]
pub fn collect_font_references(document: &Document, matcher: &FontMatcher) -> Vec<FontReference> {
    let mut set = ReferenceSet::new(matcher);
    let styles = document.styles();

    if let Some(table) = styles {
        for style in table.styles() {
            ActiveFont::of_style(styles, style.name()).attribute(&mut set, "");
        }
    }

    if let Some(events) = document.events() {
        for dialogue in events.dialogues() {
            let row_style = dialogue.style().unwrap_or_default();
            let mut active = ActiveFont::of_style(styles, row_style);
            for segment in split_overrides(dialogue.text().unwrap_or_default()) {
                match segment {
                    Segment::Text(text) => active.attribute(&mut set, text),
                    Segment::Override(block) => {
                        if let Some(reset) = block.reset {
                            active =
                                ActiveFont::of_chain(styles, &[reset, row_style, DEFAULT_STYLE]);
                        }
                        if let Some(font) = block.font_name {
                            active.name = Some(font);
                        }
                        if active.name.is_some_and(|name| !name.is_empty()) {
                            active.bold = block.bold.unwrap_or(active.bold);
                            active.italic = block.italic.unwrap_or(active.italic);
                        }
                    }
                }
            }
        }
    }

    let resolved = set.resolved_faces();
    for face in matcher.embedded().faces() {
        if !resolved.contains(&face.key()) {
            set.add(
                face.origin(),
                face.is_bold(),
                face.is_italic(),
                "",
                Resolution::Known(Arc::clone(face)),
            );
        }
    }
    for entry in matcher.invalid_embedded() {
        set.add(&entry.name, false, false, "", Resolution::Invalid(entry.clone()));
    }

    let mut references: Vec<FontReference> = set.references.into_values().collect();
    references.sort_by_key(FontReference::is_from_embedded);
    log::debug!("collected {} font references", references.len());
    references
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::EmbedConfig,
        fonts::{FaceNames, FontBackend, FontError},
    };

    struct NoFonts;

    impl FontBackend for NoFonts {
        fn read_faces(&self, _data: &[u8]) -> Result<Vec<FaceNames>, FontError> {
            Err(FontError::malformed("not a font"))
        }

        fn extract_face(&self, data: &[u8], _index: u32) -> Result<Vec<u8>, FontError> {
            Ok(data.to_vec())
        }

        fn subset(
            &self,
            data: &[u8],
            _index: u32,
            _chars: &BTreeSet<char>,
            _preserve_names: &BTreeSet<String>,
        ) -> Result<Vec<u8>, FontError> {
            Ok(data.to_vec())
        }
    }

    fn matcher() -> FontMatcher {
        FontMatcher::new(Arc::new(NoFonts), None, EmbedConfig::default())
    }

    fn document(styles: &str, events: &str) -> Document {
        let text = format!(
            "[V4+ Styles]\nFormat: Name, Fontname, Bold, Italic\n{styles}\n\n\
             [Events]\nFormat: Layer, Style, Text\n{events}\n"
        );
        Document::parse_str(&text).unwrap()
    }

    fn chars(reference: &FontReference) -> String {
        reference.covered().iter().collect()
    }

    fn find<'r>(refs: &'r [FontReference], name: &str, bold: bool) -> &'r FontReference {
        refs.iter()
            .find(|r| r.name() == name && r.bold() == bold)
            .unwrap()
    }

    #[test]
    fn override_blocks_switch_fonts() {
        let doc = document(
            "Style: Default,A,0,0",
            r"Dialogue: 0,Default,X{\fn B\b1}Y{\r}Z",
        );
        let refs = collect_font_references(&doc, &matcher());
        assert_eq!(chars(find(&refs, "A", false)), "XZ");
        assert_eq!(chars(find(&refs, "B", true)), "Y");
    }

    #[test]
    fn unused_styles_are_listed() {
        let doc = document("Style: Default,A,0,0\nStyle: Sign,Sign Font,-1,0", "");
        let refs = collect_font_references(&doc, &matcher());
        assert_eq!(refs.len(), 2);
        let sign = find(&refs, "Sign Font", true);
        assert!(sign.covered().is_empty());
        assert_eq!(sign.style_label(), "Bold");
    }

    #[test]
    fn coverage_is_a_set_and_names_fold_case() {
        let doc = document(
            "Style: Default,A,0,0",
            "Dialogue: 0,Default,aaa\nDialogue: 0,Default,{\\fna}ab",
        );
        let refs = collect_font_references(&doc, &matcher());
        assert_eq!(refs.len(), 1);
        assert_eq!(chars(&refs[0]), "ab");
    }

    #[test]
    fn reset_falls_back_to_row_style_then_default() {
        let doc = document(
            "Style: Default,A,0,0\nStyle: Alt,B,0,1",
            "Dialogue: 0,Alt,1{\\rMissing}2{\\rDefault}3",
        );
        let refs = collect_font_references(&doc, &matcher());
        let b = refs.iter().find(|r| r.name() == "B").unwrap();
        assert!(b.italic());
        assert_eq!(chars(b), "12");
        assert_eq!(chars(find(&refs, "A", false)), "3");
    }

    #[test]
    fn unknown_style_without_default_is_skipped() {
        let doc = document("Style: Alt,B,0,0", "Dialogue: 0,Nope,text");
        let refs = collect_font_references(&doc, &matcher());
        assert_eq!(refs.len(), 1);
        assert!(refs[0].covered().is_empty());
    }

    #[test]
    fn vertical_marker_and_escapes() {
        let doc = document("Style: Default,@A,0,0", r"Dialogue: 0,Default,a\Nb\hc");
        let refs = collect_font_references(&doc, &matcher());
        assert_eq!(refs[0].name(), "A");
        assert_eq!(chars(&refs[0]), " abc");
    }

    #[test]
    fn invalid_embeds_are_listed_last() {
        let text = "[V4+ Styles]\nFormat: Name, Fontname, Bold, Italic\nStyle: Default,A,0,0\n\n\
                    [Fonts]\nfontname: broken.ttf\n!!!!\n\n";
        let doc = Document::parse_str(text).unwrap();
        let mut matcher = matcher();
        matcher.load_embedded(doc.fonts());
        let refs = collect_font_references(&doc, &matcher);
        assert_eq!(refs.len(), 2);
        assert!(refs[0].is_valid());
        assert!(!refs[1].is_valid());
        assert!(refs[1].is_from_embedded());
        assert_eq!(refs[1].embedded_entry(), Some(("broken.ttf", 0)));
    }

    #[test]
    fn style_labels() {
        let doc = document("Style: Default,A,-1,-1", "");
        let refs = collect_font_references(&doc, &matcher());
        assert_eq!(refs[0].style_label(), "Bold Italic");
    }
}
