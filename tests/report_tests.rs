//! End-to-end tests of the action word change reports.
//!
//! The stored signatures in `tests/data/actionwords_signature.yaml` describe
//! a previous export of `tests/data/project.yaml` in which one action word was
//! deleted, one created, one renamed and one given a new parameter.

use camino::Utf8Path;
use insta::assert_snapshot;
use rstest::{fixture, rstest};
use scenario_publisher::diagnostics::Diagnostics;
use scenario_publisher::document;
use scenario_publisher::model::Project;
use scenario_publisher::render::Renderer;
use scenario_publisher::report::{self, ReportMode};
use scenario_publisher::signature::{self, SignatureDiff, SignatureStore, diff::diff};
use scenario_publisher::templates::TemplateSet;

struct Fixture {
    project: Project,
    changes: SignatureDiff,
}

#[fixture]
fn published() -> Fixture {
    let mut diagnostics = Diagnostics::default();
    let doc = document::project_from_path(Utf8Path::new("tests/data/project.yaml"), &mut diagnostics)
        .expect("load project");
    let project = Project::build(&doc, None, &mut diagnostics);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.issues());
    let store = SignatureStore::from_path(
        Utf8Path::new("tests/data/actionwords_signature.yaml"),
        &mut diagnostics,
    );
    assert_eq!(store.signatures().len(), 3);
    let changes = diff(store.signatures(), &signature::current_signatures(&project));
    Fixture { project, changes }
}

fn render(fixture: &Fixture, mode: ReportMode, language: &str) -> String {
    let templates = TemplateSet::builtin(language).expect("builtin templates");
    let mut diagnostics = Diagnostics::default();
    report::report(
        mode,
        &fixture.changes,
        &fixture.project,
        Renderer::new(&templates),
        &mut diagnostics,
    )
}

#[rstest]
fn summary_lists_every_category(published: Fixture) {
    let summary = report::summary(&published.changes);
    assert_snapshot!("actionwords_summary", summary);
}

#[rstest]
fn deleted_report_lists_method_names(published: Fixture) {
    assert_eq!(
        render(&published, ReportMode::Deleted, "ruby"),
        "do_something\n"
    );
}

#[rstest]
fn renamed_report_is_a_table(published: Fixture) {
    assert_eq!(
        render(&published, ReportMode::Renamed, "ruby"),
        "parameters_and_assinements\tparameters_and_assignements\n"
    );
}

#[rstest]
fn created_report_has_ruby_stubs(published: Fixture) {
    let expected = concat!(
        "def start_publisher(options = {})\n",
        "  # TODO: Implement action: \"start publisher with options #{options}\"\n",
        "  raise NotImplementedError\n",
        "end\n",
    );
    assert_eq!(render(&published, ReportMode::Created, "ruby"), expected);
}

#[rstest]
fn signature_changed_report_renders_the_body(published: Fixture) {
    let expected = concat!(
        "def control_blocks(x)\n",
        "  # Tags: parameters dsltests\n",
        "  while ((x < 0))\n",
        "    x = x + 1\n",
        "  end\n",
        "  if ((x == 0))\n",
        "    # TODO: Implement result: \"#{x} is now equal to zero\"\n",
        "  else\n",
        "    control_blocks(x - 1)\n",
        "  end\n",
        "  raise NotImplementedError\n",
        "end\n",
    );
    assert_eq!(
        render(&published, ReportMode::SignatureChanged, "ruby"),
        expected
    );
}

#[rstest]
fn changed_stub_parameters_match_the_new_signature(published: Fixture) {
    let changed = &published.changes.signature_changed;
    assert_eq!(changed.len(), 1);
    let names: Vec<_> = changed
        .iter()
        .flat_map(|sig| sig.parameter_names())
        .collect();
    assert_eq!(names, ["x"]);
    let stub = render(&published, ReportMode::SignatureChanged, "python");
    assert!(stub.starts_with("def control_blocks(self, x):\n"), "{stub}");
}

#[rstest]
fn stub_reports_are_empty_without_stub_templates(published: Fixture) {
    let templates = TemplateSet::builtin("seleniumide").expect("builtin templates");
    let mut diagnostics = Diagnostics::default();
    let text = report::report(
        ReportMode::Created,
        &published.changes,
        &published.project,
        Renderer::new(&templates),
        &mut diagnostics,
    );
    assert_eq!(text, "");
    assert_eq!(diagnostics.template_misses().count(), 1);
}

#[rstest]
fn reports_are_deterministic(published: Fixture) {
    for mode in [
        ReportMode::Summary,
        ReportMode::Deleted,
        ReportMode::Created,
        ReportMode::Renamed,
        ReportMode::SignatureChanged,
    ] {
        assert_eq!(
            render(&published, mode, "ruby"),
            render(&published, mode, "ruby")
        );
    }
}
