//! # ASS Fonts
//!
//! Font analysis and embedding for ASS/SSA subtitles: find every font a
//! script renders text with, resolve each one to a face in the document,
//! beside it or on the system, and embed, subset or remove fonts in the
//! script's `[Fonts]` section.
//!
//! ## Features
//!
//! - **Lossless documents**: section order, unknown sections and verbatim
//!   lines survive a load/save round trip
//! - **Override aware**: `\r`, `\fn`, `\b` and `\i` tags attribute every
//!   character to the font that renders it
//! - **Three scopes**: embedded, same-directory and system fonts, matched by
//!   PostScript, family or full name
//! - **Safe edits**: plans are checked without side effects and applied with
//!   rollback
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use ass_fonts::{analysis::collect_font_references, fonts::{FontMatcher, TtfBackend}};
//! use ass_fonts::{Document, EmbedConfig};
//!
//! let text = r"[V4+ Styles]
//! Format: Name, Fontname, Fontsize, Bold, Italic
//! Style: Default,Arial,20,0,0
//!
//! [Events]
//! Format: Layer, Start, End, Style, Text
//! Dialogue: 0,0:00:00.00,0:00:05.00,Default,Hello {\fnImpact\b1}World
//! ";
//!
//! let document = Document::parse_str(text)?;
//! let matcher = FontMatcher::new(Arc::new(TtfBackend::new()), None, EmbedConfig::default());
//! let references = collect_font_references(&document, &matcher);
//! assert_eq!(references.len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(clippy::all)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod config;
pub mod embedding;
pub mod fonts;
pub mod parser;
pub mod session;
pub mod utils;

pub use analysis::{collect_font_references, FontReference};
pub use config::EmbedConfig;
pub use embedding::{apply_plan, EmbedSelection, Plan, Planner};
pub use fonts::{FontDescriptor, FontMatcher, Scope};
pub use parser::{Document, ParseError};
pub use session::FontSession;
pub use utils::{CoreError, Result};

/// Crate version for runtime compatibility checks
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
