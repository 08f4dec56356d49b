//! Override block scanning for dialogue text
//!
//! Dialogue text interleaves plain text with `{...}` override blocks. Only
//! the tags that change which font renders the following text matter here:
//! `\r` (style reset), `\fn` (font name), `\b` and `\i` with a numeric
//! argument. Within one block the last tag of each kind wins, and a `\r`
//! discards every tag written before it in the same block.
//!
//! # Examples
//!
//! ```rust
//! use ass_fonts::analysis::tags::{split_overrides, Segment};
//!
//! let segments = split_overrides(r"A{\fnB\b1}C");
//! assert_eq!(segments.len(), 3);
//! assert!(matches!(segments[0], Segment::Text("A")));
//! if let Segment::Override(block) = &segments[1] {
//!     assert_eq!(block.font_name, Some("B"));
//!     assert_eq!(block.bold, Some(true));
//! }
//! ```

/// Font-relevant effects of one override block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockEffects<'a> {
    /// Style named by the last `\r`, empty for a bare `\r`
    pub reset: Option<&'a str>,
    /// Font named by the last `\fn` after the reset
    pub font_name: Option<&'a str>,
    /// Value of the last `\b<digits>` after the reset
    pub bold: Option<bool>,
    /// Value of the last `\i<digits>` after the reset
    pub italic: Option<bool>,
}

/// Piece of dialogue text in reading order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Plain text, possibly empty
    Text(&'a str),
    /// An override block
    Override(BlockEffects<'a>),
}

/// Split dialogue text into plain text and override blocks
///
/// Every block is preceded by a text segment and the result always ends
/// with one, so text before the first block and after the last block is
/// reported even when empty. A block needs at least one character between
/// its braces; an unmatched `{` is plain text.
#[must_use]
pub fn split_overrides(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find('{') {
        let open = search_from + offset;
        let Some((content, end)) = block_at(text, open) else {
            search_from = open + 1;
            continue;
        };
        segments.push(Segment::Text(&text[text_start..open]));
        segments.push(Segment::Override(scan_block(content)));
        text_start = end;
        search_from = end;
    }
    segments.push(Segment::Text(&text[text_start..]));
    segments
}

/// Content and end offset of the block opening at `open`
fn block_at(text: &str, open: usize) -> Option<(&str, usize)> {
    let body = &text[open + 1..];
    let first = body.chars().next()?;
    let close = first.len_utf8() + body[first.len_utf8()..].find('}')?;
    Some((&body[..close], open + 1 + close + 1))
}

/// Collect the effects of one block's content
#[must_use]
pub fn scan_block(content: &str) -> BlockEffects<'_> {
    let mut effects = BlockEffects::default();
    for tag in content.split('\\').skip(1) {
        let tag = tag.trim_start();
        if let Some(style) = tag.strip_prefix('r') {
            effects = BlockEffects {
                reset: Some(style.trim()),
                ..BlockEffects::default()
            };
        } else if let Some(font) = tag.strip_prefix("fn") {
            if !font.is_empty() {
                effects.font_name = Some(font.trim());
            }
        } else if let Some(value) = tag.strip_prefix('b').and_then(numeric_argument) {
            effects.bold = Some(value);
        } else if let Some(value) = tag.strip_prefix('i').and_then(numeric_argument) {
            effects.italic = Some(value);
        }
    }
    effects
}

/// Truth value of a tag argument made of digits, after optional whitespace
///
/// Tags such as `\bord2`, `\blur1` or `\iclip(...)` have no such argument.
fn numeric_argument(argument: &str) -> Option<bool> {
    let argument = argument.trim_start();
    let digits: &str = &argument[..argument
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(argument.len())];
    if digits.is_empty() {
        None
    } else {
        Some(digits.chars().any(|digit| digit != '0'))
    }
}

/// Remove the `\N` and `\n` line breaks and turn `\h` into a space
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.replace("\\N", "")
        .replace("\\n", "")
        .replace("\\h", " ")
}
