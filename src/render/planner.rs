//! File planning for export runs.
//!
//! Two independent switches decide the layout: `leafless` picks flattened
//! tests instead of scenarios as the rendered unit, and `split` emits one file
//! per unit instead of one aggregated file. The action word file is always
//! aggregated.

use std::collections::HashSet;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::{debug, info};

use crate::diagnostics::{DataError, Diagnostics};
use crate::identifier;
use crate::model::{Project, Scenario, ScenarioKind};
use crate::templates::{EntityKind, Flavor, TemplateKey};

use super::Renderer;
use super::steps::StepWriter;

/// Layout switches for an export run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Render flattened tests instead of scenarios.
    pub leafless: bool,
    /// One file per scenario or test.
    pub split: bool,
}

/// A generated file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Path relative to the output directory.
    pub path: Utf8PathBuf,
    /// Rendered text.
    pub content: String,
    /// Human readable origin, used in progress messages.
    pub description: String,
}

#[derive(Serialize)]
struct ProjectNameContext<'m> {
    project_name: &'m str,
}

#[derive(Serialize)]
struct CombinedContext<'m> {
    project_name: &'m str,
    items: Vec<String>,
}

#[derive(Serialize)]
struct EntityNameContext<'m> {
    name: &'m str,
    folder: &'m [String],
}

#[derive(Serialize)]
struct EntityFileContext<'m> {
    project_name: &'m str,
    name: &'m str,
    folder: &'m [String],
    item: String,
}

#[derive(Serialize)]
struct ScenarioContext<'m> {
    name: &'m str,
    uid: &'m str,
    tags: Vec<String>,
    folder: &'m [String],
    body: String,
    step_count: usize,
}

const fn entity_kind(kind: ScenarioKind) -> EntityKind {
    match kind {
        ScenarioKind::Scenario => EntityKind::Scenario,
        ScenarioKind::Test => EntityKind::Test,
    }
}

pub(super) fn plan(
    renderer: Renderer<'_>,
    project: &Project,
    options: ExportOptions,
    diagnostics: &mut Diagnostics,
) -> Vec<Artifact> {
    let (kind, entities) = if options.leafless {
        (ScenarioKind::Test, project.tests().unwrap_or_default())
    } else {
        (ScenarioKind::Scenario, project.scenarios())
    };
    debug!(?options, kind = kind.noun(), count = entities.len(), "planning export");

    let mut planner = Planner {
        renderer,
        project,
        diagnostics,
        seen: HashSet::new(),
        artifacts: Vec::new(),
    };
    if options.split {
        planner.split(kind, entities);
    } else {
        planner.combined(kind, entities);
    }
    planner.actionwords();
    planner.artifacts
}

struct Planner<'a, 'd> {
    renderer: Renderer<'a>,
    project: &'a Project,
    diagnostics: &'d mut Diagnostics,
    seen: HashSet<Utf8PathBuf>,
    artifacts: Vec<Artifact>,
}

impl Planner<'_, '_> {
    fn combined(&mut self, kind: ScenarioKind, entities: &[Scenario]) {
        info!("Exporting {}s", kind.noun());
        let project_name = self.project.name();
        let Some(file_name) = self.file_template(
            entity_kind(kind),
            Flavor::CombinedFileName,
            ProjectNameContext { project_name },
        ) else {
            return;
        };
        let items: Vec<String> = entities
            .iter()
            .filter_map(|entity| self.fragment(kind, entity))
            .collect();
        if items.is_empty() && !entities.is_empty() {
            debug!(kind = kind.noun(), "no fragment rendered; combined file skipped");
            return;
        }
        let Some(content) = self.file_template(
            entity_kind(kind),
            Flavor::CombinedFile,
            CombinedContext {
                project_name,
                items,
            },
        ) else {
            return;
        };
        self.push(
            project_name,
            Utf8Path::new(""),
            &file_name,
            content,
            format!("{}s", kind.noun()),
        );
    }

    fn split(&mut self, kind: ScenarioKind, entities: &[Scenario]) {
        info!("Exporting {}s", kind.noun());
        let project_name = self.project.name();
        for entity in entities {
            let Some(file_name) = self.renderer.render(
                TemplateKey::new(entity_kind(kind), Flavor::EntityFileName),
                EntityNameContext {
                    name: &entity.name,
                    folder: &entity.folder,
                },
                &entity.name,
                self.diagnostics,
            ) else {
                continue;
            };
            let Some(item) = self.fragment(kind, entity) else {
                continue;
            };
            let Some(content) = self.renderer.render(
                TemplateKey::new(entity_kind(kind), Flavor::EntityFile),
                EntityFileContext {
                    project_name,
                    name: &entity.name,
                    folder: &entity.folder,
                    item,
                },
                &entity.name,
                self.diagnostics,
            ) else {
                continue;
            };
            let directory = folder_directory(&entity.folder);
            let description = format!("{} \"{}\"", kind.noun(), entity.name);
            if self.push(&entity.name, &directory, &file_name, content, description) {
                info!("Exporting {} \"{}\"", kind.noun(), entity.name);
            }
        }
    }

    fn actionwords(&mut self) {
        info!("Exporting actionwords");
        let project_name = self.project.name();
        let Some(file_name) = self.file_template(
            EntityKind::ActionWord,
            Flavor::CombinedFileName,
            ProjectNameContext { project_name },
        ) else {
            return;
        };
        let actionwords = self.project.actionwords();
        let items: Vec<String> = actionwords
            .iter()
            .filter_map(|actionword| {
                self.renderer
                    .render_actionword(actionword, Flavor::Fragment, true, self.diagnostics)
            })
            .collect();
        if items.is_empty() && !actionwords.is_empty() {
            debug!("no action word rendered; action word file skipped");
            return;
        }
        let Some(content) = self.file_template(
            EntityKind::ActionWord,
            Flavor::CombinedFile,
            CombinedContext {
                project_name,
                items,
            },
        ) else {
            return;
        };
        self.push(
            project_name,
            Utf8Path::new(""),
            &file_name,
            content,
            "actionwords".to_owned(),
        );
    }

    fn fragment(&mut self, kind: ScenarioKind, entity: &Scenario) -> Option<String> {
        let body = StepWriter::new(
            self.renderer.templates(),
            &entity.name,
            false,
            self.diagnostics,
        )
        .body(&entity.steps);
        let ctx = ScenarioContext {
            name: &entity.name,
            uid: &entity.uid,
            tags: entity.tags.iter().map(ToString::to_string).collect(),
            folder: &entity.folder,
            body,
            step_count: entity.step_count(),
        };
        self.renderer.render(
            TemplateKey::fragment(entity_kind(kind)),
            ctx,
            &entity.name,
            self.diagnostics,
        )
    }

    fn file_template<S: Serialize>(
        &mut self,
        kind: EntityKind,
        flavor: Flavor,
        ctx: S,
    ) -> Option<String> {
        self.renderer.render(
            TemplateKey::new(kind, flavor),
            ctx,
            self.project.name(),
            self.diagnostics,
        )
    }

    /// Queue a file, refusing unusable and already planned paths. Returns
    /// whether the file was queued.
    fn push(
        &mut self,
        owner: &str,
        directory: &Utf8Path,
        rendered_name: &str,
        content: String,
        description: String,
    ) -> bool {
        let file_name = rendered_name.trim();
        let path = directory.join(file_name);
        if !is_plain_file_name(file_name) {
            self.diagnostics.record(DataError::InvalidOutputPath {
                name: owner.to_owned(),
                path: path.into_string(),
            });
            return false;
        }
        if !self.seen.insert(path.clone()) {
            self.diagnostics.record(DataError::DuplicateOutputPath {
                name: owner.to_owned(),
                path: path.into_string(),
            });
            return false;
        }
        debug!(%path, %description, "artifact planned");
        self.artifacts.push(Artifact {
            path,
            content,
            description,
        });
        true
    }
}

/// Parent directories of a split file: each folder segment as an identifier.
fn folder_directory(folder: &[String]) -> Utf8PathBuf {
    folder
        .iter()
        .map(|segment| identifier::underscore(segment))
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// A rendered file name must name a single file below the output directory.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Utf8Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Utf8Component::Normal(_)), None)
    ) && !name.contains('\\')
}
