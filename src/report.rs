//! Report Formatter.
//!
//! Turns a [`SignatureDiff`] into one of five texts. The summary, deleted
//! list and renamed table only depend on the diff; the stub reports render
//! action words of the current [`Project`] through the language's
//! `actionword.stub` template.

use crate::diagnostics::{Diagnostics, TemplateMissError};
use crate::identifier;
use crate::model::Project;
use crate::render::Renderer;
use crate::signature::{ActionWordSignature, SignatureDiff};
use crate::templates::{EntityKind, Flavor, TemplateKey};

/// Which report to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    /// Every category with counts and names.
    Summary,
    /// Identifiers of deleted action words.
    Deleted,
    /// Stubs for created action words.
    Created,
    /// `old<TAB>new` identifier pairs.
    Renamed,
    /// Stubs, with bodies, for action words whose parameters changed.
    SignatureChanged,
}

/// Produce the report selected by `mode`.
///
/// Stub reports need the current `project` to find action word bodies.
pub fn report(
    mode: ReportMode,
    diff: &SignatureDiff,
    project: &Project,
    renderer: Renderer<'_>,
    diagnostics: &mut Diagnostics,
) -> String {
    match mode {
        ReportMode::Summary => summary(diff),
        ReportMode::Deleted => deleted_list(diff),
        ReportMode::Renamed => renamed_table(diff),
        ReportMode::Created => stubs(&diff.created, false, project, renderer, diagnostics),
        ReportMode::SignatureChanged => {
            stubs(&diff.signature_changed, true, project, renderer, diagnostics)
        }
    }
}

fn header(count: usize, what: &str) -> String {
    let noun = if count == 1 {
        "action word"
    } else {
        "action words"
    };
    format!("{count} {noun} {what}:\n")
}

/// Human readable overview of every non-empty category.
///
/// # Examples
///
/// ```rust
/// use scenario_publisher::report::summary;
/// use scenario_publisher::signature::{ActionWordSignature, diff::diff};
///
/// let old = [ActionWordSignature::new("U1", "Do something", ["x"])];
/// let text = summary(&diff(&old, &[]));
/// assert_eq!(text, "1 action word deleted:\n- Do something\n\n");
/// ```
#[must_use]
pub fn summary(diff: &SignatureDiff) -> String {
    let mut out = String::new();
    let mut block = |what: &str, items: Vec<String>| {
        if items.is_empty() {
            return;
        }
        out.push_str(&header(items.len(), what));
        for item in items {
            out.push_str("- ");
            out.push_str(&item);
            out.push('\n');
        }
        out.push('\n');
    };
    block("deleted", names(&diff.deleted));
    block("created", names(&diff.created));
    block(
        "renamed",
        diff.renamed
            .iter()
            .map(|renamed| format!("{} => {}", renamed.old_name, renamed.new_name))
            .collect(),
    );
    block("which signature changed", names(&diff.signature_changed));
    out
}

fn names(signatures: &[ActionWordSignature]) -> Vec<String> {
    signatures.iter().map(|sig| sig.name.clone()).collect()
}

/// Method identifiers of deleted action words, one per line.
#[must_use]
pub fn deleted_list(diff: &SignatureDiff) -> String {
    diff.deleted
        .iter()
        .map(|sig| format!("{}\n", identifier::underscore(&sig.name)))
        .collect()
}

/// `old<TAB>new` method identifiers of renamed action words, one per line.
#[must_use]
pub fn renamed_table(diff: &SignatureDiff) -> String {
    diff.renamed
        .iter()
        .map(|renamed| {
            format!(
                "{}\t{}\n",
                identifier::underscore(&renamed.old_name),
                identifier::underscore(&renamed.new_name)
            )
        })
        .collect()
}

fn stubs(
    signatures: &[ActionWordSignature],
    with_body: bool,
    project: &Project,
    renderer: Renderer<'_>,
    diagnostics: &mut Diagnostics,
) -> String {
    let key = TemplateKey::new(EntityKind::ActionWord, Flavor::Stub);
    if !renderer.templates().contains(key) {
        diagnostics.record(TemplateMissError {
            language: renderer.templates().language().to_owned(),
            key: key.to_string(),
        });
        return String::new();
    }
    let rendered: Vec<String> = signatures
        .iter()
        .filter_map(|sig| project.actionword(&sig.uid))
        .filter_map(|actionword| {
            renderer.render_actionword_stub(actionword, with_body, diagnostics)
        })
        .collect();
    if rendered.is_empty() {
        return String::new();
    }
    let mut out = rendered.join("\n\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::Renamed;
    use rstest::{fixture, rstest};

    #[fixture]
    fn changes() -> SignatureDiff {
        SignatureDiff {
            deleted: vec![
                ActionWordSignature::new("U1", "Do something", ["x"]),
                ActionWordSignature::new("U2", "Open the page", Vec::<String>::new()),
            ],
            created: Vec::new(),
            renamed: vec![Renamed {
                uid: "U4".into(),
                old_name: "Parameters and assinements".into(),
                new_name: "Parameters and assignements".into(),
            }],
            signature_changed: Vec::new(),
        }
    }

    #[rstest]
    fn summary_pluralises_and_omits_empty_blocks(changes: SignatureDiff) {
        assert_eq!(
            summary(&changes),
            "2 action words deleted:\n- Do something\n- Open the page\n\n\
             1 action word renamed:\n- Parameters and assinements => Parameters and assignements\n\n"
        );
    }

    #[rstest]
    fn empty_diffs_summarise_to_nothing() {
        assert_eq!(summary(&SignatureDiff::default()), "");
    }

    #[rstest]
    fn deleted_list_uses_identifiers(changes: SignatureDiff) {
        assert_eq!(deleted_list(&changes), "do_something\nopen_the_page\n");
    }

    #[rstest]
    fn renamed_table_is_tab_separated(changes: SignatureDiff) {
        assert_eq!(
            renamed_table(&changes),
            "parameters_and_assinements\tparameters_and_assignements\n"
        );
    }
}
