//! Document-to-model conversion.
//!
//! Action word headers are indexed first so call sites anywhere in the
//! export, action word bodies included, can be resolved in a single pass.
//! Dangling references never abort the build: they are recorded as
//! [`DataError`]s and the step is kept as an unresolved call.

use std::collections::HashMap;

use tracing::debug;

use crate::ast::{
    ActionWordNode, ArgumentNode, CallNode, ExprNode, ParameterNode, ProjectDocument,
    ScenarioNode, StepNode, TagNode, TestsDocument,
};
use crate::diagnostics::{DataError, Diagnostics};

use super::{
    ActionWord, Argument, Call, CallTarget, Expr, Parameter, Project, Scenario, ScenarioKind,
    Step, Tag,
};

impl Project {
    /// Build the model from a project export and, for leafless publication,
    /// a flattened tests export.
    ///
    /// Dangling references are recorded in `diagnostics` and never fail the
    /// build.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scenario_publisher::{diagnostics::Diagnostics, document, model::Project};
    ///
    /// let yaml = "project:\n  name: demo\n  scenarios:\n    - uid: S1\n      name: empty\n";
    /// let mut diagnostics = Diagnostics::default();
    /// let doc = document::project_from_str(yaml, "export.yaml", &mut diagnostics).expect("parse");
    /// let project = Project::build(&doc, None, &mut diagnostics);
    /// assert_eq!(project.scenarios().len(), 1);
    /// assert!(diagnostics.is_empty());
    /// ```
    pub fn build(
        document: &ProjectDocument,
        tests: Option<&TestsDocument>,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let node = &document.project;
        let mut resolver = Resolver::new(&node.actionwords, diagnostics);

        let actionwords = node
            .actionwords
            .iter()
            .map(|aw| resolver.actionword(aw))
            .collect();
        let scenarios = node
            .scenarios
            .iter()
            .map(|scenario| resolver.scenario(scenario, ScenarioKind::Scenario))
            .collect();
        let flattened = tests.map(|doc| {
            doc.tests
                .iter()
                .map(|test| resolver.scenario(test, ScenarioKind::Test))
                .collect()
        });

        let project = Self {
            name: node.name.clone(),
            tags: tags(&node.tags),
            scenarios,
            tests: flattened,
            actionwords,
            by_uid: resolver.by_uid,
        };
        debug!(
            scenarios = project.scenarios.len(),
            tests = project.tests.as_ref().map_or(0, Vec::len),
            actionwords = project.actionwords.len(),
            "project model built"
        );
        project
    }
}

/// Declaration header of an action word, used to resolve call sites.
struct Header<'a> {
    uid: &'a str,
    name: &'a str,
    parameters: &'a [ParameterNode],
}

struct Resolver<'a, 'd> {
    headers: Vec<Header<'a>>,
    by_uid: HashMap<String, usize>,
    by_name: HashMap<&'a str, usize>,
    diagnostics: &'d mut Diagnostics,
}

impl<'a, 'd> Resolver<'a, 'd> {
    fn new(actionwords: &'a [ActionWordNode], diagnostics: &'d mut Diagnostics) -> Self {
        let mut by_uid = HashMap::new();
        let mut by_name = HashMap::new();
        let mut headers = Vec::with_capacity(actionwords.len());
        for (index, aw) in actionwords.iter().enumerate() {
            if by_uid.insert(aw.uid.clone(), index).is_some() {
                diagnostics.record(DataError::DuplicateUid {
                    uid: aw.uid.clone(),
                    name: aw.name.clone(),
                });
            }
            by_name.insert(aw.name.as_str(), index);
            headers.push(Header {
                uid: &aw.uid,
                name: &aw.name,
                parameters: &aw.parameters,
            });
        }
        Self {
            headers,
            by_uid,
            by_name,
            diagnostics,
        }
    }

    fn actionword(&mut self, node: &ActionWordNode) -> ActionWord {
        ActionWord {
            uid: node.uid.clone(),
            name: node.name.clone(),
            tags: tags(&node.tags),
            parameters: node.parameters.iter().map(parameter).collect(),
            steps: self.steps(&node.steps, &node.name),
        }
    }

    fn scenario(&mut self, node: &ScenarioNode, kind: ScenarioKind) -> Scenario {
        Scenario {
            kind,
            uid: node.uid.clone(),
            name: node.name.clone(),
            folder: node.folder.clone(),
            tags: tags(&node.tags),
            steps: self.steps(&node.steps, &node.name),
        }
    }

    fn steps(&mut self, nodes: &[StepNode], owner: &str) -> Vec<Step> {
        nodes.iter().map(|node| self.step(node, owner)).collect()
    }

    fn step(&mut self, node: &StepNode, owner: &str) -> Step {
        match node {
            StepNode::Call(call) => Step::Call(self.call(call, owner)),
            StepNode::If(branch) => Step::Conditional {
                condition: expr(&branch.condition),
                then_steps: self.steps(&branch.then_steps, owner),
                else_steps: self.steps(&branch.else_steps, owner),
            },
            StepNode::While(repeat) => Step::Loop {
                condition: expr(&repeat.condition),
                body: self.steps(&repeat.body, owner),
            },
            StepNode::Result(value) => Step::Result(expr(value)),
            StepNode::Comment(text) => Step::Comment(text.clone()),
            StepNode::Assign(assign) => Step::Assign {
                variable: assign.variable.clone(),
                value: expr(&assign.value),
            },
        }
    }

    fn lookup(&self, call: &CallNode) -> Option<&Header<'a>> {
        let index = match &call.uid {
            Some(uid) => self.by_uid.get(uid.as_str()),
            None => self.by_name.get(call.actionword.as_str()),
        };
        index.and_then(|i| self.headers.get(*i))
    }

    fn call(&mut self, node: &CallNode, owner: &str) -> Call {
        let Some(header) = self.lookup(node) else {
            self.diagnostics.record(DataError::UnresolvedCall {
                owner: owner.to_owned(),
                actionword: node.actionword.clone(),
            });
            return Call {
                target: CallTarget::Unresolved {
                    name: node.actionword.clone(),
                },
                arguments: node.arguments.iter().map(argument).collect(),
            };
        };

        let target = CallTarget::Resolved {
            uid: header.uid.to_owned(),
            name: header.name.to_owned(),
        };
        let arguments = bind_arguments(header.parameters, &node.arguments);
        let unknown: Vec<DataError> = node
            .arguments
            .iter()
            .filter(|arg| !header.parameters.iter().any(|p| p.name == arg.name))
            .map(|arg| DataError::UnknownArgument {
                owner: owner.to_owned(),
                actionword: header.name.to_owned(),
                argument: arg.name.clone(),
            })
            .collect();
        for err in unknown {
            self.diagnostics.record(err);
        }
        Call { target, arguments }
    }
}

/// Order arguments by parameter declaration, falling back to defaults and
/// omitting parameters that have neither.
fn bind_arguments(parameters: &[ParameterNode], written: &[ArgumentNode]) -> Vec<Argument> {
    parameters
        .iter()
        .filter_map(|param| {
            let value = written
                .iter()
                .rev()
                .find(|arg| arg.name == param.name)
                .map(|arg| &arg.value)
                .or(param.default.as_ref())?;
            Some(Argument {
                name: param.name.clone(),
                value: expr(value),
            })
        })
        .collect()
}

fn argument(node: &ArgumentNode) -> Argument {
    Argument {
        name: node.name.clone(),
        value: expr(&node.value),
    }
}

fn parameter(node: &ParameterNode) -> Parameter {
    Parameter {
        name: node.name.clone(),
        default: node.default.as_ref().map(expr),
    }
}

fn tags(nodes: &[TagNode]) -> Vec<Tag> {
    nodes
        .iter()
        .map(|tag| Tag {
            key: tag.key.clone(),
            value: tag.value.clone(),
        })
        .collect()
}

fn expr(node: &ExprNode) -> Expr {
    match node {
        ExprNode::Str(text) => Expr::String(text.clone()),
        ExprNode::Num(number) => Expr::Number(number.to_string()),
        ExprNode::Var(name) => Expr::Variable(name.clone()),
        ExprNode::Template(chunks) => Expr::Template(chunks.iter().map(expr).collect()),
        ExprNode::Op(op) => Expr::Operation {
            operator: op.operator.clone(),
            left: op.left.as_deref().map(|left| Box::new(expr(left))),
            right: Box::new(expr(&op.right)),
        },
        ExprNode::Parens(inner) => Expr::Parenthesis(Box::new(expr(inner))),
        ExprNode::List(items) => Expr::List(items.iter().map(expr).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document;
    use rstest::{fixture, rstest};

    const EXPORT: &str = r#"
project:
  name: demo
  actionwords:
    - uid: A1
      name: open page
      parameters:
        - name: url
        - name: timeout
          default: { num: 30 }
        - name: retries
    - uid: A2
      name: recurse
      steps:
        - call: { actionword: recurse, uid: A2 }
  scenarios:
    - uid: S1
      name: visit
      steps:
        - call:
            actionword: open page
            arguments:
              - { name: retries, value: { num: 2 } }
              - { name: url, value: { str: "https://example.test" } }
        - call: { actionword: missing word }
        - call:
            actionword: open page
            arguments:
              - { name: colour, value: { str: red } }
"#;

    #[fixture]
    fn export() -> ProjectDocument {
        let mut diagnostics = Diagnostics::default();
        document::project_from_str(EXPORT, "export.yaml", &mut diagnostics).expect("parse export")
    }

    fn call_at(project: &Project, index: usize) -> &Call {
        match &project.scenarios()[0].steps[index] {
            Step::Call(call) => call,
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[rstest]
    fn arguments_follow_declaration_order_with_defaults(export: ProjectDocument) {
        let mut diagnostics = Diagnostics::default();
        let project = Project::build(&export, None, &mut diagnostics);
        let call = call_at(&project, 0);
        assert!(call.is_resolved());
        let names: Vec<&str> = call.arguments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["url", "timeout", "retries"]);
        assert_eq!(call.arguments[1].value, Expr::Number("30".into()));
    }

    #[rstest]
    fn unresolved_calls_are_kept_and_reported(export: ProjectDocument) {
        let mut diagnostics = Diagnostics::default();
        let project = Project::build(&export, None, &mut diagnostics);
        let call = call_at(&project, 1);
        assert!(!call.is_resolved());
        assert_eq!(call.name(), "missing word");
        assert!(diagnostics.data_errors().any(|err| matches!(
            err,
            DataError::UnresolvedCall { actionword, .. } if actionword == "missing word"
        )));
    }

    #[rstest]
    fn undeclared_arguments_are_dropped(export: ProjectDocument) {
        let mut diagnostics = Diagnostics::default();
        let project = Project::build(&export, None, &mut diagnostics);
        let call = call_at(&project, 2);
        let names: Vec<&str> = call.arguments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["timeout"]);
        assert_eq!(diagnostics.len(), 2);
    }

    #[rstest]
    fn action_word_bodies_resolve_calls(export: ProjectDocument) {
        let mut diagnostics = Diagnostics::default();
        let project = Project::build(&export, None, &mut diagnostics);
        let recurse = project.actionword("A2").expect("A2 present");
        assert!(matches!(&recurse.steps[0], Step::Call(call) if call.is_resolved()));
    }

    #[rstest]
    fn tests_document_is_kept_separately(export: ProjectDocument) {
        let tests = TestsDocument {
            tests: export.project.scenarios.clone(),
        };
        let mut diagnostics = Diagnostics::default();
        let project = Project::build(&export, Some(&tests), &mut diagnostics);
        let built = project.tests().expect("tests present");
        assert_eq!(built.len(), 1);
        assert_eq!(built[0].kind, ScenarioKind::Test);
        assert_eq!(project.scenarios()[0].kind, ScenarioKind::Scenario);
    }

    #[rstest]
    fn duplicate_uids_keep_the_last_declaration() {
        let yaml = "project:\n  name: d\n  actionwords:\n    - { uid: A, name: first }\n    - { uid: A, name: second }\n";
        let mut diagnostics = Diagnostics::default();
        let doc = document::project_from_str(yaml, "dup.yaml", &mut diagnostics).expect("parse");
        let project = Project::build(&doc, None, &mut diagnostics);
        assert_eq!(project.actionwords().len(), 2);
        assert_eq!(project.actionword("A").map(|aw| aw.name.as_str()), Some("second"));
        assert_eq!(diagnostics.data_errors().count(), 1);
    }
}
