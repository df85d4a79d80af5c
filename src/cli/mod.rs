//! Command line interface definition using clap.
//!
//! Every option can also come from a `PUBLISHER_*` environment variable. The
//! parsed [`Cli`] is turned into [`PublishOptions`] before anything runs.

use camino::Utf8PathBuf;
use clap::{ArgGroup, Parser};

use crate::render::ExportOptions;
use crate::report::ReportMode;

mod parsing;

use parsing::{parse_language, parse_utf8_path};

/// Publish test-management exports as test code for a target language.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("report").args([
        "show_actionwords_diff",
        "show_actionwords_deleted",
        "show_actionwords_created",
        "show_actionwords_renamed",
        "show_actionwords_signature_changed",
    ])
))]
pub struct Cli {
    /// Project export to publish (YAML or JSON).
    #[arg(short, long, value_name = "FILE", env = "PUBLISHER_INPUT", value_parser = parse_utf8_path)]
    pub input: Utf8PathBuf,

    /// Flattened tests export, used by `--leafless-export`.
    #[arg(long, value_name = "FILE", env = "PUBLISHER_TESTS_INPUT", value_parser = parse_utf8_path)]
    pub tests_input: Option<Utf8PathBuf>,

    /// Target language of the generated code.
    #[arg(
        short,
        long,
        value_name = "LANGUAGE",
        default_value = "ruby",
        env = "PUBLISHER_LANGUAGE",
        value_parser = parse_language
    )]
    pub language: String,

    /// Template catalogue to use instead of the built-in one.
    #[arg(long, value_name = "FILE", env = "PUBLISHER_TEMPLATES", value_parser = parse_utf8_path)]
    pub templates: Option<Utf8PathBuf>,

    /// Directory receiving the generated files and the signature store.
    #[arg(
        short,
        long,
        value_name = "DIR",
        default_value = ".",
        env = "PUBLISHER_OUTPUT_DIRECTORY",
        value_parser = parse_utf8_path
    )]
    pub output_directory: Utf8PathBuf,

    /// Write one file per scenario instead of a single file.
    #[arg(long, env = "PUBLISHER_SPLIT_SCENARIOS")]
    pub split_scenarios: bool,

    /// Publish the flattened tests instead of the scenarios.
    #[arg(long, requires = "tests_input", env = "PUBLISHER_LEAFLESS_EXPORT")]
    pub leafless_export: bool,

    /// Print a summary of action word changes since the last export.
    #[arg(long)]
    pub show_actionwords_diff: bool,

    /// Print the identifiers of deleted action words.
    #[arg(long)]
    pub show_actionwords_deleted: bool,

    /// Print stubs for created action words.
    #[arg(long)]
    pub show_actionwords_created: bool,

    /// Print old and new identifiers of renamed action words.
    #[arg(long)]
    pub show_actionwords_renamed: bool,

    /// Print stubs for action words whose parameters changed.
    #[arg(long)]
    pub show_actionwords_signature_changed: bool,

    /// Enable verbose diagnostic logging.
    #[arg(short, long, env = "PUBLISHER_VERBOSE")]
    pub verbose: bool,
}

/// Validated options for one publisher run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOptions {
    /// Project export to read.
    pub input: Utf8PathBuf,
    /// Flattened tests export, if supplied.
    pub tests_input: Option<Utf8PathBuf>,
    /// Normalised target language name.
    pub language: String,
    /// Custom template catalogue replacing the built-in one.
    pub templates: Option<Utf8PathBuf>,
    /// Root of every written file.
    pub output_directory: Utf8PathBuf,
    /// File layout switches.
    pub export: ExportOptions,
    /// Report to print instead of exporting, if any.
    pub report: Option<ReportMode>,
}

impl Cli {
    /// The report requested on the command line, if any.
    #[must_use]
    pub const fn report_mode(&self) -> Option<ReportMode> {
        if self.show_actionwords_diff {
            Some(ReportMode::Summary)
        } else if self.show_actionwords_deleted {
            Some(ReportMode::Deleted)
        } else if self.show_actionwords_created {
            Some(ReportMode::Created)
        } else if self.show_actionwords_renamed {
            Some(ReportMode::Renamed)
        } else if self.show_actionwords_signature_changed {
            Some(ReportMode::SignatureChanged)
        } else {
            None
        }
    }

    /// Options for [`crate::runner::run`].
    #[must_use]
    pub fn publish_options(&self) -> PublishOptions {
        PublishOptions {
            input: self.input.clone(),
            tests_input: self.tests_input.clone(),
            language: self.language.clone(),
            templates: self.templates.clone(),
            output_directory: self.output_directory.clone(),
            export: ExportOptions {
                leafless: self.leafless_export,
                split: self.split_scenarios,
            },
            report: self.report_mode(),
        }
    }
}
