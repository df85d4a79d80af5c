//! Error types for the runner module.
//!
//! This submodule isolates derive-macro-affected code to scope lint suppressions
//! narrowly. The `unused_assignments` lint fires in some Rust versions due to
//! thiserror/miette derive macro expansion.

// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

use crate::templates::TemplateSetError;

/// Errors that abort a publisher run.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// The template catalogue file could not be read.
    #[error("failed to read template catalogue {path}")]
    #[diagnostic(code(publisher::runner::templates_read))]
    TemplatesRead {
        /// Catalogue file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The template catalogue could not be loaded.
    #[error("failed to load templates for '{language}'")]
    #[diagnostic(
        code(publisher::runner::templates),
        help("built-in languages are ruby, python and seleniumide; use --templates for others")
    )]
    Templates {
        /// Requested language.
        language: String,
        /// Loader error.
        #[source]
        source: TemplateSetError,
    },

    /// A generated file or the signature store could not be written.
    #[error("failed to write {path}")]
    #[diagnostic(
        code(publisher::runner::write),
        help("check that the output directory exists or can be created and is writable")
    )]
    Write {
        /// Destination path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The report could not be written to standard output.
    #[error("failed to print the report")]
    #[diagnostic(code(publisher::runner::report))]
    Report {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
