//! Export document loading helpers.
//!
//! Exports are parsed in two stages, mirroring how manifests are handled
//! elsewhere: the YAML text is read into a [`serde_json::Value`] with
//! `serde_saphyr`, then converted into the typed [`crate::ast`] structures.
//! JSON exports are valid YAML and go through the same path.
//!
//! Only the document frame is strict. Scenarios, action words and tests are
//! converted one at a time; an entity that does not follow the schema is
//! skipped and recorded as [`DataError::MalformedEntity`] while its siblings
//! are kept.

mod diagnostics;

use camino::Utf8Path;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use tracing::debug;

use crate::ast::{ProjectDocument, ProjectNode, TagNode, TestsDocument};
use crate::diagnostics::{DataError, Diagnostics};

pub use diagnostics::DocumentError;

/// Project export with its entity lists left untyped.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProjectDocument {
    project: RawProject,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProject {
    name: String,
    #[serde(default)]
    tags: Vec<TagNode>,
    #[serde(default)]
    actionwords: Vec<Value>,
    #[serde(default)]
    scenarios: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTestsDocument {
    #[serde(default)]
    tests: Vec<Value>,
}

fn from_str_named<T: DeserializeOwned>(yaml: &str, name: &str) -> Result<T, DocumentError> {
    let value: Value = serde_saphyr::from_str(yaml)
        .map_err(|err| diagnostics::map_yaml_error(&err, yaml, name))?;
    serde_json::from_value(value).map_err(|source| DocumentError::Schema {
        name: name.to_owned(),
        source,
    })
}

/// Convert each raw entity on its own, keeping those that follow the schema.
fn entities<T: DeserializeOwned>(
    values: Vec<Value>,
    kind: &'static str,
    document: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<T> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(entity) => Some(entity),
            Err(err) => {
                diagnostics.record(DataError::MalformedEntity {
                    document: document.to_owned(),
                    kind,
                    index,
                    message: err.to_string(),
                });
                None
            }
        })
        .collect()
}

fn read(path: &Utf8Path) -> Result<String, DocumentError> {
    debug!(%path, "reading export document");
    fs::read_to_string(path).map_err(|source| DocumentError::Read {
        path: path.to_owned(),
        source,
    })
}

/// Parse a project export. `name` labels diagnostics.
///
/// Malformed scenarios and action words are skipped and recorded in
/// `diagnostics`.
///
/// # Errors
///
/// Returns [`DocumentError`] when the text is not YAML or the document frame
/// (the `project` mapping and its `name` and `tags`) does not follow the
/// export schema.
pub fn project_from_str(
    yaml: &str,
    name: &str,
    diagnostics: &mut Diagnostics,
) -> Result<ProjectDocument, DocumentError> {
    let raw: RawProjectDocument = from_str_named(yaml, name)?;
    let project = raw.project;
    Ok(ProjectDocument {
        project: ProjectNode {
            name: project.name,
            tags: project.tags,
            actionwords: entities(project.actionwords, "action word", name, diagnostics),
            scenarios: entities(project.scenarios, "scenario", name, diagnostics),
        },
    })
}

/// Parse a flattened tests export. `name` labels diagnostics.
///
/// Malformed tests are skipped and recorded in `diagnostics`.
///
/// # Errors
///
/// Returns [`DocumentError`] when the text is not YAML or is not a mapping
/// with an optional `tests` list.
pub fn tests_from_str(
    yaml: &str,
    name: &str,
    diagnostics: &mut Diagnostics,
) -> Result<TestsDocument, DocumentError> {
    let raw: RawTestsDocument = from_str_named(yaml, name)?;
    Ok(TestsDocument {
        tests: entities(raw.tests, "test", name, diagnostics),
    })
}

/// Load a project export from `path`.
///
/// # Errors
///
/// Returns [`DocumentError`] when the file cannot be read or parsed.
pub fn project_from_path(
    path: &Utf8Path,
    diagnostics: &mut Diagnostics,
) -> Result<ProjectDocument, DocumentError> {
    project_from_str(&read(path)?, path.as_str(), diagnostics)
}

/// Load a flattened tests export from `path`.
///
/// # Errors
///
/// Returns [`DocumentError`] when the file cannot be read or parsed.
pub fn tests_from_path(
    path: &Utf8Path,
    diagnostics: &mut Diagnostics,
) -> Result<TestsDocument, DocumentError> {
    tests_from_str(&read(path)?, path.as_str(), diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn json_exports_are_accepted() {
        let json = r#"{"project": {"name": "demo", "actionwords": [{"uid": "A", "name": "go"}]}}"#;
        let mut diagnostics = Diagnostics::default();
        let doc = project_from_str(json, "export.json", &mut diagnostics).expect("parse json");
        assert_eq!(doc.project.actionwords.len(), 1);
        assert!(diagnostics.is_empty());
    }

    #[rstest]
    fn malformed_entities_are_skipped_and_recorded() {
        let yaml = concat!(
            "project:\n",
            "  name: demo\n",
            "  scenarios:\n",
            "    - { uid: S1, name: good }\n",
            "    - uid: S2\n",
            "      name: bad\n",
            "      steps:\n",
            "        - jump: {}\n",
            "    - { name: no uid }\n",
            "    - { uid: S4, name: also good }\n",
        );
        let mut diagnostics = Diagnostics::default();
        let doc = project_from_str(yaml, "p.yaml", &mut diagnostics).expect("frame is valid");
        let names: Vec<_> = doc
            .project
            .scenarios
            .iter()
            .map(|scenario| scenario.name.as_str())
            .collect();
        assert_eq!(names, ["good", "also good"]);

        let skipped: Vec<_> = diagnostics
            .data_errors()
            .map(|err| match err {
                DataError::MalformedEntity {
                    document,
                    kind,
                    index,
                    ..
                } => (document.as_str(), *kind, *index),
                other => panic!("unexpected issue {other:?}"),
            })
            .collect();
        assert_eq!(skipped, [("p.yaml", "scenario", 1), ("p.yaml", "scenario", 2)]);
    }

    #[rstest]
    fn malformed_action_words_and_tests_are_skipped() {
        let mut diagnostics = Diagnostics::default();
        let project = project_from_str(
            "project:\n  name: d\n  actionwords:\n    - { uid: A, name: ok }\n    - { uid: B }\n",
            "p.yaml",
            &mut diagnostics,
        )
        .expect("parse project");
        assert_eq!(project.project.actionwords.len(), 1);
        let tests = tests_from_str("tests:\n  - 42\n  - { uid: T, name: t }\n", "t.yaml", &mut diagnostics)
            .expect("parse tests");
        assert_eq!(tests.tests.len(), 1);
        assert_eq!(diagnostics.data_errors().count(), 2);
    }

    #[rstest]
    #[case("scenarios: []\n")]
    #[case("project:\n  scenarios: []\n")]
    #[case("project:\n  name: d\n  colour: blue\n")]
    fn frame_errors_name_the_document(#[case] yaml: &str) {
        let mut diagnostics = Diagnostics::default();
        let err = project_from_str(yaml, "bad.yaml", &mut diagnostics).expect_err("broken frame");
        assert!(matches!(err, DocumentError::Schema { .. }), "{err:?}");
        assert!(err.to_string().starts_with("bad.yaml"), "{err}");
    }

    #[rstest]
    fn yaml_errors_report_a_location() {
        let yaml = "project:\n  name: [unclosed\n";
        let mut diagnostics = Diagnostics::default();
        let err = project_from_str(yaml, "broken.yaml", &mut diagnostics).expect_err("invalid yaml");
        assert!(matches!(err, DocumentError::Yaml { .. }), "{err:?}");
    }

    #[rstest]
    fn missing_files_are_read_errors() {
        let mut diagnostics = Diagnostics::default();
        let err = tests_from_path(Utf8Path::new("/nonexistent/tests.yaml"), &mut diagnostics)
            .expect_err("missing file");
        assert!(matches!(err, DocumentError::Read { .. }));
    }

    #[rstest]
    fn tests_documents_default_to_empty() {
        let mut diagnostics = Diagnostics::default();
        let doc = tests_from_str("tests: []\n", "tests.yaml", &mut diagnostics).expect("parse");
        assert!(doc.tests.is_empty());
    }
}
