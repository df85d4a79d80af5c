//! Run orchestration.
//!
//! This module keeps `main` minimal by providing a single entry point: load
//! the templates and the export documents, build the model, then either print
//! an action word report or render and write the artifacts followed by the
//! new signature store.

mod error;
mod output;

pub use error::RunnerError;

use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result};
use camino::Utf8Path;
use tracing::{debug, info};

use crate::cli::PublishOptions;
use crate::diagnostics::Diagnostics;
use crate::document;
use crate::model::Project;
use crate::render::Renderer;
use crate::report;
use crate::signature::{self, SignatureStore, diff::diff, store};
use crate::templates::TemplateSet;

/// Execute a publisher run, printing reports to standard output.
///
/// # Errors
///
/// Returns an error when an input cannot be loaded or an output cannot be
/// written. Non-fatal issues are logged and do not fail the run.
pub fn run(options: &PublishOptions) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    run_with_output(options, &mut handle)
}

/// Execute a publisher run, printing reports to `out`.
///
/// # Errors
///
/// See [`run`].
pub fn run_with_output(options: &PublishOptions, out: &mut impl Write) -> Result<()> {
    let templates = load_templates(options)?;
    let mut diagnostics = Diagnostics::default();
    let project = load_project(options, &mut diagnostics)?;
    let renderer = Renderer::new(&templates);

    if let Some(mode) = options.report {
        let store_path = options.output_directory.join(store::FILE_NAME);
        let stored = SignatureStore::from_path(&store_path, &mut diagnostics);
        let current = signature::current_signatures(&project);
        let changes = diff(stored.signatures(), &current);
        debug!(?mode, unchanged = changes.is_empty(), "reporting action word changes");
        let text = report::report(mode, &changes, &project, renderer, &mut diagnostics);
        out.write_all(text.as_bytes())
            .and_then(|()| out.flush())
            .map_err(|source| RunnerError::Report { source })?;
    } else {
        export(options, &project, renderer, &mut diagnostics)?;
    }

    log_issues(&diagnostics);
    Ok(())
}

fn load_templates(options: &PublishOptions) -> Result<TemplateSet> {
    let loaded = match &options.templates {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|source| RunnerError::TemplatesRead {
                path: path.clone(),
                source,
            })?;
            TemplateSet::from_yaml(&text)
        }
        None => TemplateSet::builtin(&options.language),
    };
    let templates = loaded.map_err(|source| RunnerError::Templates {
        language: options.language.clone(),
        source,
    })?;
    debug!(language = templates.language(), "templates ready");
    Ok(templates)
}

fn load_project(options: &PublishOptions, diagnostics: &mut Diagnostics) -> Result<Project> {
    let doc = document::project_from_path(&options.input, diagnostics)
        .with_context(|| format!("loading project export {}", options.input))?;
    let tests = options
        .tests_input
        .as_deref()
        .map(|path| {
            document::tests_from_path(path, diagnostics)
                .with_context(|| format!("loading tests export {path}"))
        })
        .transpose()?;
    let project = Project::build(&doc, tests.as_ref(), diagnostics);
    if tracing::enabled!(tracing::Level::DEBUG) {
        let model_json =
            serde_json::to_string_pretty(&project).context("serialising project model")?;
        debug!("Model:\n{model_json}");
    }
    Ok(project)
}

fn export(
    options: &PublishOptions,
    project: &Project,
    renderer: Renderer<'_>,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    let artifacts = renderer.render_project(project, options.export, diagnostics);
    let root = &options.output_directory;
    let dir = output::open_output_dir(root)?;
    let written = output::write_artifacts(&dir, root, &artifacts)?;

    let signatures = signature::current_signatures(project);
    info!("Exporting actionword signature");
    let store_text = SignatureStore::dump(&signatures).context("serialising signature store")?;
    output::write_file(&dir, root, Utf8Path::new(store::FILE_NAME), &store_text)?;
    info!(
        files = written.len(),
        actionwords = signatures.len(),
        output = %root,
        "export complete"
    );
    Ok(())
}

fn log_issues(diagnostics: &Diagnostics) {
    if diagnostics.is_empty() {
        return;
    }
    info!(
        issues = diagnostics.len(),
        data_errors = diagnostics.data_errors().count(),
        template_misses = diagnostics.template_misses().count(),
        store_notes = diagnostics.store_notes().count(),
        "completed with non-fatal issues"
    );
}
