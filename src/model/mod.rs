//! In-memory project model.
//!
//! The model is built once per run from the parsed export documents by
//! [`Project::build`] and is read-only afterwards: every field is private and
//! only exposed through shared references. Rendering, signature extraction
//! and reporting all borrow the same [`Project`].
//!
//! Step trees are a closed set of variants so renderers dispatch with an
//! exhaustive `match`.

mod builder;

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Whether an entity was exported as an authored scenario or a flattened
/// test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Authored scenario from the project export.
    Scenario,
    /// Flattened test from the tests export.
    Test,
}

impl ScenarioKind {
    /// Singular noun used in progress messages.
    #[must_use]
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Scenario => "scenario",
            Self::Test => "test",
        }
    }
}

/// Root of the model.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    name: String,
    tags: Vec<Tag>,
    scenarios: Vec<Scenario>,
    tests: Option<Vec<Scenario>>,
    actionwords: Vec<ActionWord>,
    #[serde(skip)]
    by_uid: HashMap<String, usize>,
}

impl Project {
    /// Project name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Project-level tags.
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Scenarios in export order.
    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Flattened tests, present only when a tests document was supplied.
    #[must_use]
    pub fn tests(&self) -> Option<&[Scenario]> {
        self.tests.as_deref()
    }

    /// Action words in export order.
    #[must_use]
    pub fn actionwords(&self) -> &[ActionWord] {
        &self.actionwords
    }

    /// Look up an action word by uid. When a uid is duplicated the last
    /// declaration wins.
    #[must_use]
    pub fn actionword(&self, uid: &str) -> Option<&ActionWord> {
        self.by_uid
            .get(uid)
            .and_then(|index| self.actionwords.get(*index))
    }
}

/// A scenario or a flattened test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    /// Source document kind.
    pub kind: ScenarioKind,
    /// Stable identifier.
    pub uid: String,
    /// Display name.
    pub name: String,
    /// Folder path from the root, outermost first.
    pub folder: Vec<String>,
    /// Tags in export order.
    pub tags: Vec<Tag>,
    /// Step tree.
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Number of steps in the whole tree, nested branches included.
    #[must_use]
    pub fn step_count(&self) -> usize {
        count_steps(&self.steps)
    }
}

/// A reusable parameterised step definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionWord {
    /// Stable identifier referenced by calls.
    pub uid: String,
    /// Display name.
    pub name: String,
    /// Tags in export order.
    pub tags: Vec<Tag>,
    /// Declared parameters in order.
    pub parameters: Vec<Parameter>,
    /// Step tree.
    pub steps: Vec<Step>,
}

/// Declared action word parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Value used when a call omits the argument.
    pub default: Option<Expr>,
}

/// A `key` or `key:value` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    /// Tag key.
    pub key: String,
    /// Value after the colon, if any.
    pub value: Option<String>,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}:{value}", self.key),
            None => f.write_str(&self.key),
        }
    }
}

/// One node of a step tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Step {
    /// Action word call.
    Call(Call),
    /// `if` with optional `else` branch.
    Conditional {
        /// Tested expression.
        condition: Expr,
        /// Steps run when the condition holds.
        then_steps: Vec<Step>,
        /// Steps run otherwise.
        else_steps: Vec<Step>,
    },
    /// `while` loop.
    Loop {
        /// Tested expression.
        condition: Expr,
        /// Loop body.
        body: Vec<Step>,
    },
    /// Expected outcome.
    Result(Expr),
    /// Free-text comment.
    Comment(String),
    /// Variable assignment.
    Assign {
        /// Assigned variable name.
        variable: String,
        /// Assigned expression.
        value: Expr,
    },
}

/// Call site of an action word.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Call {
    /// Called action word.
    pub target: CallTarget,
    /// Arguments in the order they are rendered: declaration order for
    /// resolved calls, written order otherwise.
    pub arguments: Vec<Argument>,
}

impl Call {
    /// Name of the called action word.
    #[must_use]
    pub fn name(&self) -> &str {
        match &self.target {
            CallTarget::Resolved { name, .. } | CallTarget::Unresolved { name } => name,
        }
    }

    /// Whether the callee exists in the project.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self.target, CallTarget::Resolved { .. })
    }
}

/// Callee of a [`Call`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CallTarget {
    /// Known action word.
    Resolved {
        /// Action word uid.
        uid: String,
        /// Action word name.
        name: String,
    },
    /// Name with no matching action word.
    Unresolved {
        /// Name as written in the export.
        name: String,
    },
}

/// Argument bound at a call site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Argument {
    /// Parameter name.
    pub name: String,
    /// Bound value.
    pub value: Expr,
}

/// Expression tree used in conditions, arguments and results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    /// String literal.
    String(String),
    /// Numeric literal kept as written.
    Number(String),
    /// Variable or parameter reference.
    Variable(String),
    /// Interpolated string made of literal and expression chunks.
    Template(Vec<Expr>),
    /// Unary or binary operation.
    Operation {
        /// Operator token.
        operator: String,
        /// Left operand, absent for unary operators.
        left: Option<Box<Expr>>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Parenthesised expression.
    Parenthesis(Box<Expr>),
    /// List literal.
    List(Vec<Expr>),
}

fn count_steps(steps: &[Step]) -> usize {
    steps
        .iter()
        .map(|step| match step {
            Step::Conditional {
                then_steps,
                else_steps,
                ..
            } => 1 + count_steps(then_steps) + count_steps(else_steps),
            Step::Loop { body, .. } => 1 + count_steps(body),
            Step::Call(_) | Step::Result(_) | Step::Comment(_) | Step::Assign { .. } => 1,
        })
        .sum()
}
