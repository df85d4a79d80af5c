//! Output Planner & Renderer.
//!
//! Rendering walks the read-only [`Project`] and applies a [`TemplateSet`].
//! Step and expression trees are recursed here, in Rust, while every piece of
//! emitted text comes from the catalogue: nested bodies are rendered first and
//! handed to the enclosing template as plain strings, which indent them with
//! the `indent_block` filter.
//!
//! Nothing in this module fails the run. Template misses and render failures
//! are recorded in [`Diagnostics`] and the affected entity is skipped.

mod planner;
mod steps;

use serde::Serialize;

use crate::diagnostics::{Diagnostics, Issue};
use crate::model::{ActionWord, Project};
use crate::templates::{EntityKind, Flavor, RenderError, TemplateKey, TemplateSet};

pub use planner::{Artifact, ExportOptions};

use steps::StepWriter;

/// Renders model entities with one language's templates.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    templates: &'a TemplateSet,
}

#[derive(Serialize)]
struct ParameterContext {
    name: String,
    default: Option<String>,
}

#[derive(Serialize)]
struct ActionWordContext<'m> {
    name: &'m str,
    uid: &'m str,
    tags: Vec<String>,
    parameters: Vec<ParameterContext>,
    parameter_names: Vec<&'m str>,
    body: String,
    with_body: bool,
}

impl<'a> Renderer<'a> {
    /// Renderer over a loaded template set.
    #[must_use]
    pub const fn new(templates: &'a TemplateSet) -> Self {
        Self { templates }
    }

    /// Templates in use.
    #[must_use]
    pub const fn templates(&self) -> &'a TemplateSet {
        self.templates
    }

    /// Plan and render every output file for `project`.
    ///
    /// Artifacts come back in a fixed order: the scenario or test files first,
    /// in model order, then the action word file. Rendering the same project
    /// with the same options always yields identical artifacts.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scenario_publisher::{
    ///     diagnostics::Diagnostics, document, model::Project,
    ///     render::{ExportOptions, Renderer}, templates::TemplateSet,
    /// };
    ///
    /// let yaml = "project:\n  name: demo\n  scenarios:\n    - uid: S1\n      name: empty\n";
    /// let mut diagnostics = Diagnostics::default();
    /// let doc = document::project_from_str(yaml, "export.yaml", &mut diagnostics).expect("parse");
    /// let project = Project::build(&doc, None, &mut diagnostics);
    /// let templates = TemplateSet::builtin("ruby").expect("ruby");
    /// let artifacts = Renderer::new(&templates).render_project(
    ///     &project,
    ///     ExportOptions::default(),
    ///     &mut diagnostics,
    /// );
    /// let paths: Vec<_> = artifacts.iter().map(|a| a.path.as_str()).collect();
    /// assert_eq!(paths, ["project_spec.rb", "actionwords.rb"]);
    /// ```
    #[must_use]
    pub fn render_project(
        &self,
        project: &Project,
        options: ExportOptions,
        diagnostics: &mut Diagnostics,
    ) -> Vec<Artifact> {
        planner::plan(*self, project, options, diagnostics)
    }

    /// Render the implementation stub of one action word.
    ///
    /// With `with_body` set, the action word's own steps are rendered inside
    /// the stub; otherwise the stub only carries the signature and a TODO.
    /// Returns `None` when the language has no stub template.
    pub fn render_actionword_stub(
        &self,
        actionword: &ActionWord,
        with_body: bool,
        diagnostics: &mut Diagnostics,
    ) -> Option<String> {
        self.render_actionword(actionword, Flavor::Stub, with_body, diagnostics)
    }

    fn render_actionword(
        &self,
        actionword: &ActionWord,
        flavor: Flavor,
        with_body: bool,
        diagnostics: &mut Diagnostics,
    ) -> Option<String> {
        let key = TemplateKey::new(EntityKind::ActionWord, flavor);
        if !self.templates.contains(key) {
            // Record the miss without paying for the body.
            return self.render(key, (), &actionword.name, diagnostics);
        }

        let mut writer = StepWriter::new(self.templates, &actionword.name, true, diagnostics);
        let parameters = actionword
            .parameters
            .iter()
            .map(|parameter| ParameterContext {
                name: parameter.name.clone(),
                default: parameter.default.as_ref().map(|value| writer.expr(value)),
            })
            .collect();
        let body = if with_body {
            writer.body(&actionword.steps)
        } else {
            String::new()
        };
        let ctx = ActionWordContext {
            name: &actionword.name,
            uid: &actionword.uid,
            tags: actionword.tags.iter().map(ToString::to_string).collect(),
            parameters,
            parameter_names: actionword
                .parameters
                .iter()
                .map(|parameter| parameter.name.as_str())
                .collect(),
            body,
            with_body,
        };
        self.render(key, ctx, &actionword.name, diagnostics)
    }

    fn render<S: Serialize>(
        &self,
        key: TemplateKey,
        ctx: S,
        entity: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<String> {
        render_or_record(self.templates, key, ctx, entity, diagnostics)
    }
}

/// Render `key`, recording a miss or failure against `entity` instead of
/// returning it.
fn render_or_record<S: Serialize>(
    templates: &TemplateSet,
    key: TemplateKey,
    ctx: S,
    entity: &str,
    diagnostics: &mut Diagnostics,
) -> Option<String> {
    match templates.render(key, ctx) {
        Ok(text) => Some(text),
        Err(RenderError::Missing(miss)) => {
            diagnostics.record(miss);
            None
        }
        Err(RenderError::Failed { source, .. }) => {
            diagnostics.record(Issue::RenderFailed {
                key: key.to_string(),
                entity: entity.to_owned(),
                message: source.to_string(),
            });
            None
        }
    }
}
