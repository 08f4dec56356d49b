//! Embedding, unembedding and re-subsetting fonts
//!
//! Work happens in two phases. [`Planner::check`] validates the caller's
//! [`EmbedSelection`]s against the collected references and produces a
//! [`Plan`] without side effects; [`apply_plan`] then mutates the document's
//! font table and saves, restoring the table if anything fails.
//!
//! # Workflow
//!
//! 1. Collect references with [`crate::analysis::collect_font_references`].
//! 2. Start from [`EmbedSelection::defaults`]: embedded references stay
//!    embedded, everything else starts unchecked with subsetting on and the
//!    matched file as its [`Source`].
//! 3. Toggle `embed` and `subset`, or pick another source with
//!    [`SourceChoice`].
//! 4. Call [`Planner::check`]. A [`crate::CoreError::Plan`] carries every
//!    [`MatchWarning`] and [`PlanQuestion`] at once. Warnings need a new
//!    selection; a question can be answered with [`PlanQuestion::apply`]
//!    or accepted as is with [`Planner::confirm`].
//! 5. Hand the [`Plan`] to [`apply_plan`], which returns an [`ApplyReport`].
//!
//! # Tasks
//!
//! Each selection becomes at most one [`PlannedTask`], a [`TaskType`]
//! combination:
//!
//! - `EMBEDDING | EXTERNAL`: copy a font file into the document, with
//!   `SUBSETTING` when only the covered characters should be kept.
//! - `SUBSETTING | EMBEDDING`: re-subset an attachment in place.
//! - `UNEMBEDDING`: remove an attachment, also combined with an external
//!   embed when the selection switched to a file.
//!
//! Tasks that resolve to the same face are merged into one attachment. The
//! merged group is subset only when every member asked for it, and the
//! subset keeps every name the members refer to. Embed names come from
//! [`unique_embed_name`] and never collide with existing attachments.
//!
//! # Guarantees
//!
//! - Checking never touches the document and can be repeated freely.
//! - Removals run before additions, highest index first, so positions stay
//!   valid while the table shrinks.
//! - A failed apply returns [`crate::CoreError::Apply`] and leaves the font table
//!   exactly as it was.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::{path::Path, sync::Arc};
//! use ass_fonts::{
//!     analysis::collect_font_references,
//!     embedding::{apply_plan, EmbedSelection, Planner},
//!     fonts::{FontMatcher, TtfBackend},
//!     Document, EmbedConfig,
//! };
//!
//! let mut document = Document::load(Path::new("episode.ass"), None)?;
//! let config = EmbedConfig::default();
//! let backend = Arc::new(TtfBackend::new());
//! let mut matcher = FontMatcher::new(backend.clone(), None, config.clone());
//! matcher.load_embedded(document.fonts());
//!
//! let references = collect_font_references(&document, &matcher);
//! let mut selections = EmbedSelection::defaults(&references);
//! for selection in &mut selections {
//!     selection.embed = true;
//! }
//! let plan = Planner::new(&matcher).check(&references, &selections)?;
//! apply_plan(&mut document, &plan, backend.as_ref(), &config, None)?;
//! # Ok::<(), ass_fonts::CoreError>(())
//! ```

pub mod apply;
pub mod extract;
pub mod issues;
pub mod naming;
pub mod plan;

pub use apply::{apply_plan, ApplyReport, EmbeddedFont};
pub use extract::extract_embedded_font;
pub use issues::{embed_advisory, EmbedAdvisory, MatchWarning, PlanIssue, PlanQuestion, QuestionKind};
pub use naming::unique_embed_name;
pub use plan::{EmbedSelection, Plan, PlannedTask, Planner, Source, SourceChoice, TaskType};
