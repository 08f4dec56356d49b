//! Font usage analysis of a parsed document
//!
//! [`tags`] splits dialogue text into plain text and override blocks;
//! [`collector`] turns styles and dialogue into [`FontReference`]s, each
//! carrying the set of characters it renders and the face it resolved to.

pub mod collector;
pub mod tags;

pub use collector::{collect_font_references, FontReference};
pub use tags::{split_overrides, BlockEffects, Segment};
