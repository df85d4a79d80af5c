//! Exported project document structures.
//!
//! This module defines the data structures used to represent a parsed
//! project export. They mirror the YAML schema produced by the test
//! management platform and are deserialised with `serde`. The YAML text is
//! first read into a [`serde_json::Value`] and then converted, so JSON
//! exports are accepted as well.
//!
//! The following example shows how to parse a minimal export:
//!
//! ```rust
//! use scenario_publisher::ast::{ProjectDocument, StepNode};
//!
//! let json = r#"{"project": {"name": "demo", "scenarios": [
//!     {"uid": "S1", "name": "login", "steps": [{"comment": "hello"}]}
//! ]}}"#;
//! let doc: ProjectDocument = serde_json::from_str(json).expect("parse");
//! assert!(matches!(doc.project.scenarios[0].steps[0], StepNode::Comment(_)));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level project export.
///
/// ```yaml
/// project:
///   name: My project
///   actionwords: []
///   scenarios: []
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectDocument {
    /// The exported project.
    pub project: ProjectNode,
}

/// Project contents: scenarios, action words and project-level tags.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectNode {
    /// Human readable project name.
    pub name: String,

    /// Tags attached to the whole project.
    #[serde(default)]
    pub tags: Vec<TagNode>,

    /// Reusable parameterised steps.
    #[serde(default)]
    pub actionwords: Vec<ActionWordNode>,

    /// Authored scenarios in export order.
    #[serde(default)]
    pub scenarios: Vec<ScenarioNode>,
}

/// Flattened test export used by leafless publication.
///
/// Tests share the scenario shape but only ever call action words directly.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TestsDocument {
    /// Flattened tests in export order.
    #[serde(default)]
    pub tests: Vec<ScenarioNode>,
}

/// A scenario or flattened test.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioNode {
    /// Stable identifier.
    pub uid: String,
    /// Display name, also the source of the generated file name.
    pub name: String,
    /// Folder path from the outermost folder inwards.
    #[serde(default)]
    pub folder: Vec<String>,
    /// Tags attached to the scenario.
    #[serde(default)]
    pub tags: Vec<TagNode>,
    /// Steps in execution order.
    #[serde(default)]
    pub steps: Vec<StepNode>,
}

/// An action word definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ActionWordNode {
    /// Stable identifier, the join key between publisher runs.
    pub uid: String,
    /// Display name; the only field a rename changes.
    pub name: String,
    /// Tags attached to the action word.
    #[serde(default)]
    pub tags: Vec<TagNode>,
    /// Declared parameters in order.
    #[serde(default)]
    pub parameters: Vec<ParameterNode>,
    /// Implementation steps; empty for a leaf action word.
    #[serde(default)]
    pub steps: Vec<StepNode>,
}

/// A declared action word parameter.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterNode {
    /// Parameter name as referenced by variables and call arguments.
    pub name: String,
    /// Value used when a call binds no argument to this parameter.
    #[serde(default)]
    pub default: Option<ExprNode>,
}

/// A `key` or `key:value` tag.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TagNode {
    /// Tag key.
    pub key: String,
    /// Optional value for `key:value` tags.
    #[serde(default)]
    pub value: Option<String>,
}

/// A single step, written as a one-key mapping naming its variant.
///
/// ```yaml
/// - call: { actionword: start publisher }
/// - comment: check the output
/// - result: { str: the help is displayed }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum StepNode {
    /// Invoke an action word.
    Call(CallNode),
    /// Branch on a condition.
    If(IfNode),
    /// Repeat a body while a condition holds.
    While(WhileNode),
    /// Expected outcome.
    Result(ExprNode),
    /// Free text comment.
    Comment(String),
    /// Bind a value to a variable.
    Assign(AssignNode),
}

/// Action word invocation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CallNode {
    /// Name of the called action word as written by the author.
    pub actionword: String,
    /// Identifier of the called action word, preferred over the name when set.
    #[serde(default)]
    pub uid: Option<String>,
    /// Arguments as written, matched to parameters by name.
    #[serde(default)]
    pub arguments: Vec<ArgumentNode>,
}

/// A named argument bound at a call site.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ArgumentNode {
    /// Name of the bound parameter.
    pub name: String,
    /// Bound value.
    pub value: ExprNode,
}

/// Conditional step with an optional `else` branch.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IfNode {
    /// Branch condition.
    pub condition: ExprNode,
    /// Steps run when the condition holds.
    #[serde(rename = "then", default)]
    pub then_steps: Vec<StepNode>,
    /// Steps run otherwise.
    #[serde(rename = "else", default)]
    pub else_steps: Vec<StepNode>,
}

/// Loop step.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhileNode {
    /// Loop condition.
    pub condition: ExprNode,
    /// Repeated steps.
    #[serde(default)]
    pub body: Vec<StepNode>,
}

/// Assignment step.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssignNode {
    /// Assigned variable.
    pub variable: String,
    /// Assigned value.
    pub value: ExprNode,
}

/// Expressions used by conditions, arguments, assignments and results.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum ExprNode {
    /// String literal.
    Str(String),
    /// Numeric literal, kept verbatim.
    Num(NumberLiteral),
    /// Variable or parameter reference.
    Var(String),
    /// String with interpolated chunks.
    Template(Vec<ExprNode>),
    /// Binary operation, or unary when `left` is absent.
    Op(OperationNode),
    /// Parenthesised expression.
    Parens(Box<ExprNode>),
    /// List literal.
    List(Vec<ExprNode>),
}

/// Operator application, e.g. `x + 1` or `!done`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OperationNode {
    /// Operator as written in the target language.
    pub operator: String,
    /// Left operand; absent for unary operators.
    #[serde(default)]
    pub left: Option<Box<ExprNode>>,
    /// Right operand.
    pub right: Box<ExprNode>,
}

/// A number written either as a YAML number or as text.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum NumberLiteral {
    /// A YAML number.
    Number(serde_json::Number),
    /// A number quoted as text, rendered as is.
    Text(String),
}

impl fmt::Display for NumberLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}
