//! `ass-fonts`: list, embed, remove, subset and extract the fonts of ASS
//! subtitles from the command line.

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use ass_fonts::{
    embedding::{embed_advisory, ApplyReport, PlanIssue, QuestionKind, Source},
    fonts::{FontError, FontdbCatalog, SystemFontCatalog, TtfBackend},
    CoreError, EmbedConfig, EmbedSelection, FontReference, FontSession, Plan,
};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "ass-fonts", version, about = "Manage fonts embedded in ASS/SSA subtitles")]
struct Cli {
    /// Print debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show every font the subtitle renders text with
    List {
        #[command(flatten)]
        input: Input,
    },
    /// Embed fonts that are found beside the subtitle or on the system
    Embed {
        #[command(flatten)]
        input: Input,
        /// Embed whole font files instead of subsets
        #[arg(long)]
        no_subset: bool,
        /// Only embed these fonts (repeatable)
        #[arg(long, value_name = "NAME")]
        only: Vec<String>,
        #[command(flatten)]
        apply: ApplyArgs,
    },
    /// Remove embedded fonts
    Unembed {
        #[command(flatten)]
        input: Input,
        /// Only remove these fonts (repeatable)
        #[arg(long, value_name = "NAME")]
        only: Vec<String>,
        #[command(flatten)]
        apply: ApplyArgs,
    },
    /// Subset every embedded font to the characters it renders
    Subset {
        #[command(flatten)]
        input: Input,
        #[command(flatten)]
        apply: ApplyArgs,
    },
    /// Write one embedded font to a file
    Extract {
        #[command(flatten)]
        input: Input,
        /// Embed name as listed in the [Fonts] section
        name: String,
        /// Which font of that name, when several share it
        #[arg(long, default_value_t = 0)]
        index: usize,
        /// Destination file
        #[arg(long, value_name = "PATH")]
        to: PathBuf,
    },
}

#[derive(Debug, Args)]
struct Input {
    /// Subtitle file
    path: PathBuf,

    /// Text encoding of the subtitle file, detected when omitted
    #[arg(long)]
    encoding: Option<String>,

    /// Width of encoded lines in the [Fonts] section
    #[arg(long)]
    line_width: Option<usize>,

    /// Size in bytes above which whole-font embeds ask for subsetting
    #[arg(long)]
    large_font_threshold: Option<u64>,

    /// Suffix for the embed names of subset fonts
    #[arg(long)]
    subset_suffix: Option<String>,

    /// Encoding used when saving
    #[arg(long)]
    output_encoding: Option<String>,
}

impl Input {
    fn config(&self) -> EmbedConfig {
        let mut config = EmbedConfig::default();
        if let Some(width) = self.line_width {
            config.line_width = width;
        }
        if let Some(threshold) = self.large_font_threshold {
            config.large_font_threshold = threshold;
        }
        if let Some(suffix) = &self.subset_suffix {
            config.subset_suffix.clone_from(suffix);
        }
        if let Some(encoding) = &self.output_encoding {
            config.output_encoding.clone_from(encoding);
        }
        config
    }

    fn open(&self, with_system: bool) -> Result<FontSession> {
        let system = with_system.then(|| {
            Arc::new(FontdbCatalog::with_system_fonts()) as Arc<dyn SystemFontCatalog>
        });
        FontSession::open(
            &self.path,
            self.encoding.as_deref(),
            Arc::new(TtfBackend::new()),
            system,
            self.config(),
        )
        .with_context(|| format!("failed to load {}", self.path.display()))
    }
}

#[derive(Debug, Args)]
struct ApplyArgs {
    /// Accept the suggested fix for every question
    #[arg(short, long)]
    yes: bool,

    /// Save to this file instead of overwriting the input
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            if err
                .downcast_ref::<CoreError>()
                .is_some_and(is_subset_unavailable)
            {
                eprintln!(
                    "hint: this build lacks the default `harfbuzz` feature; pass `--no-subset` to embed whole fonts"
                );
            }
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::List { input } => {
            let session = input.open(true)?;
            list(&session.collect_font_references());
            Ok(())
        }
        Command::Embed {
            input,
            no_subset,
            only,
            apply,
        } => {
            let mut session = input.open(true)?;
            let references = session.collect_font_references();
            let mut selections = session.selections(&references);
            let config = session.config().clone();
            for (reference, selection) in references.iter().zip(selections.iter_mut()) {
                if reference.is_from_embedded()
                    || selection.source == Source::None
                    || !is_wanted(reference.name(), &only)
                {
                    continue;
                }
                if let Some(advisory) = embed_advisory(reference, &config) {
                    log::warn!("{}: {advisory}", label(reference));
                }
                selection.embed = true;
                selection.subset = !no_subset;
            }
            warn_unmatched(&references, &only);
            execute(&mut session, &references, selections, &apply)
        }
        Command::Unembed { input, only, apply } => {
            let mut session = input.open(false)?;
            let references = session.collect_font_references();
            let mut selections = session.selections(&references);
            for (reference, selection) in references.iter().zip(selections.iter_mut()) {
                if reference.is_from_embedded() && is_wanted(reference.name(), &only) {
                    selection.embed = false;
                }
            }
            warn_unmatched(&references, &only);
            execute(&mut session, &references, selections, &apply)
        }
        Command::Subset { input, apply } => {
            let mut session = input.open(false)?;
            let references = session.collect_font_references();
            let mut selections = session.selections(&references);
            for (reference, selection) in references.iter().zip(selections.iter_mut()) {
                if reference.is_from_embedded() && reference.is_valid() {
                    selection.subset = true;
                }
            }
            execute(&mut session, &references, selections, &apply)
        }
        Command::Extract {
            input,
            name,
            index,
            to,
        } => {
            let session = input.open(false)?;
            session.extract(&name, index, &to)?;
            println!("extracted {name} [{index}] to {}", to.display());
            Ok(())
        }
    }
}

fn list(references: &[FontReference]) {
    if references.is_empty() {
        println!("no fonts referenced");
        return;
    }
    for reference in references {
        let validity = if reference.is_valid() { "" } else { "  (corrupted)" };
        println!(
            "{}\t{}\t{} chars\t{}{validity}",
            reference.name(),
            reference.style_label(),
            reference.covered().len(),
            source_label(reference),
        );
    }
}

fn source_label(reference: &FontReference) -> String {
    if let Some((name, index)) = reference.embedded_entry() {
        format!("embedded {name} [{index}]")
    } else {
        reference
            .descriptor()
            .map_or_else(|| "not found".to_string(), |face| face.origin().to_string())
    }
}

fn label(reference: &FontReference) -> String {
    format!("{} {}", reference.name(), reference.style_label())
}

fn same_name(requested: &str, name: &str) -> bool {
    requested.trim().to_lowercase() == name.to_lowercase()
}

fn is_wanted(name: &str, only: &[String]) -> bool {
    only.is_empty() || only.iter().any(|requested| same_name(requested, name))
}

fn warn_unmatched(references: &[FontReference], only: &[String]) {
    for name in only {
        if !references
            .iter()
            .any(|reference| same_name(name, reference.name()))
        {
            log::warn!("no font named '{name}' is referenced by the subtitle");
        }
    }
}

fn execute(
    session: &mut FontSession,
    references: &[FontReference],
    mut selections: Vec<EmbedSelection>,
    apply: &ApplyArgs,
) -> Result<()> {
    let plan = check(session, references, &mut selections, apply.yes)?;
    log::info!("applying {} task(s)", plan.len());
    let report = session.apply_plan(&plan, apply.output.as_deref())?;
    summarize(&report, session.path().as_deref());
    Ok(())
}

/// Check the selections, applying suggested fixes when `yes` is set
fn check(
    session: &FontSession,
    references: &[FontReference],
    selections: &mut [EmbedSelection],
    yes: bool,
) -> Result<Plan> {
    let mut confirmed: Vec<QuestionKind> = Vec::new();
    loop {
        let issues = match session.check_plan(references, selections, &confirmed) {
            Ok(plan) => return Ok(plan),
            Err(CoreError::Plan(issues)) => issues,
            Err(err) => return Err(err.into()),
        };

        for issue in &issues {
            let prefix = if issue.is_question() { "question" } else { "warning" };
            eprintln!("{prefix}: {issue}");
        }
        if issues.iter().any(|issue| !issue.is_question()) {
            bail!("fix the warnings above and try again");
        }
        if !yes {
            bail!("pass --yes to accept the suggested fixes");
        }

        for issue in &issues {
            if let PlanIssue::Question(question) = issue {
                question.apply(selections);
                if !confirmed.contains(&question.kind()) {
                    confirmed.push(question.kind());
                }
            }
        }
    }
}

fn summarize(report: &ApplyReport, input: Option<&Path>) {
    for (name, index) in &report.removed {
        println!("removed {name} [{index}]");
    }
    for font in &report.embedded {
        let kind = if font.subset { "subset" } else { "full" };
        println!("embedded {} [{}] ({kind}, {} bytes)", font.name, font.index, font.bytes);
    }
    if let Some(path) = report.saved_to.as_deref().or(input) {
        println!("saved {}", path.display());
    }
}

fn is_subset_unavailable(err: &CoreError) -> bool {
    match err {
        CoreError::Font(FontError::SubsetUnavailable) => true,
        CoreError::Apply { source } => is_subset_unavailable(source),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn embed_collects_repeated_only() {
        let cli = Cli::try_parse_from([
            "ass-fonts", "embed", "sub.ass", "--only", "Arial", "--only", "Impact", "--no-subset",
            "-y",
        ])
        .unwrap();
        match cli.command {
            Command::Embed {
                input,
                no_subset,
                only,
                apply,
            } => {
                assert_eq!(input.path, PathBuf::from("sub.ass"));
                assert!(no_subset);
                assert_eq!(only, ["Arial", "Impact"]);
                assert!(apply.yes);
                assert!(apply.output.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn extract_requires_destination() {
        assert!(Cli::try_parse_from(["ass-fonts", "extract", "sub.ass", "font.ttf"]).is_err());
        let cli = Cli::try_parse_from([
            "ass-fonts", "extract", "sub.ass", "font.ttf", "--index", "2", "--to", "out.ttf",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Extract { index: 2, .. }));
    }

    #[test]
    fn flags_override_config_defaults() {
        let cli = Cli::try_parse_from([
            "ass-fonts",
            "list",
            "sub.ass",
            "--line-width",
            "60",
            "--subset-suffix",
            "_min",
        ])
        .unwrap();
        let Command::List { input } = cli.command else {
            panic!("expected list");
        };
        let config = input.config();
        assert_eq!(config.line_width, 60);
        assert_eq!(config.subset_suffix, "_min");
        assert_eq!(config.large_font_threshold, EmbedConfig::default().large_font_threshold);
    }

    #[test]
    fn only_matches_case_insensitively() {
        let only = vec![" Arial".to_string(), "微软雅黑".to_string()];
        assert!(is_wanted("arial", &only));
        assert!(is_wanted("微软雅黑", &only));
        assert!(!is_wanted("Impact", &only));
        assert!(is_wanted("Impact", &[]));
    }

    #[test]
    fn subset_unavailable_seen_through_rollback() {
        let err = CoreError::apply(FontError::SubsetUnavailable.into());
        assert!(is_subset_unavailable(&err));
        assert!(!is_subset_unavailable(&CoreError::NoTask));
    }
}
