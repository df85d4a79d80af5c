//! Recursive rendering of step and expression trees.
//!
//! Every nested body is rendered at depth zero and passed to the enclosing
//! template as text. A step whose template is missing is dropped from its
//! body; an expression whose template is missing renders as empty text.

use itertools::Itertools;
use serde::Serialize;

use crate::diagnostics::Diagnostics;
use crate::model::{Call, Expr, Step};
use crate::templates::{EntityKind, TemplateKey, TemplateSet};

use super::render_or_record;

#[derive(Serialize)]
struct CallContext<'m> {
    name: &'m str,
    resolved: bool,
    in_actionword: bool,
    arguments: Vec<String>,
    argument_names: Vec<&'m str>,
}

#[derive(Serialize)]
struct ConditionalContext {
    condition: String,
    then_body: String,
    else_body: String,
}

#[derive(Serialize)]
struct LoopContext {
    condition: String,
    body: String,
}

#[derive(Serialize)]
struct ValueContext {
    value: String,
}

#[derive(Serialize)]
struct CommentContext<'m> {
    text: &'m str,
}

#[derive(Serialize)]
struct AssignContext<'m> {
    variable: &'m str,
    value: String,
}

#[derive(Serialize)]
struct VariableContext<'m> {
    name: &'m str,
}

#[derive(Serialize)]
struct Chunk<'m> {
    text: Option<&'m str>,
    variable: Option<String>,
}

#[derive(Serialize)]
struct TemplateContext<'m> {
    chunks: Vec<Chunk<'m>>,
    variables: Vec<String>,
}

#[derive(Serialize)]
struct OperationContext<'m> {
    operator: &'m str,
    left: Option<String>,
    right: String,
}

#[derive(Serialize)]
struct ParenthesisContext {
    content: String,
}

#[derive(Serialize)]
struct ListContext {
    items: Vec<String>,
}

/// Renders the steps owned by one scenario, test or action word.
pub(super) struct StepWriter<'a, 'd> {
    templates: &'a TemplateSet,
    owner: &'a str,
    in_actionword: bool,
    diagnostics: &'d mut Diagnostics,
}

impl<'a, 'd> StepWriter<'a, 'd> {
    pub(super) fn new(
        templates: &'a TemplateSet,
        owner: &'a str,
        in_actionword: bool,
        diagnostics: &'d mut Diagnostics,
    ) -> Self {
        Self {
            templates,
            owner,
            in_actionword,
            diagnostics,
        }
    }

    /// Render a step sequence, one statement per line group.
    pub(super) fn body(&mut self, steps: &[Step]) -> String {
        steps.iter().filter_map(|step| self.step(step)).join("\n")
    }

    fn step(&mut self, step: &Step) -> Option<String> {
        match step {
            Step::Call(call) => self.call(call),
            Step::Conditional {
                condition,
                then_steps,
                else_steps,
            } => {
                let ctx = ConditionalContext {
                    condition: self.expr(condition),
                    then_body: self.body(then_steps),
                    else_body: self.body(else_steps),
                };
                self.fragment(EntityKind::Conditional, ctx)
            }
            Step::Loop { condition, body } => {
                let ctx = LoopContext {
                    condition: self.expr(condition),
                    body: self.body(body),
                };
                self.fragment(EntityKind::Loop, ctx)
            }
            Step::Result(value) => {
                let ctx = ValueContext {
                    value: self.expr(value),
                };
                self.fragment(EntityKind::Result, ctx)
            }
            Step::Comment(text) => self.fragment(EntityKind::Comment, CommentContext { text }),
            Step::Assign { variable, value } => {
                let ctx = AssignContext {
                    variable,
                    value: self.expr(value),
                };
                self.fragment(EntityKind::Assign, ctx)
            }
        }
    }

    fn call(&mut self, call: &Call) -> Option<String> {
        let arguments = call
            .arguments
            .iter()
            .map(|argument| self.expr(&argument.value))
            .collect();
        let ctx = CallContext {
            name: call.name(),
            resolved: call.is_resolved(),
            in_actionword: self.in_actionword,
            arguments,
            argument_names: call
                .arguments
                .iter()
                .map(|argument| argument.name.as_str())
                .collect(),
        };
        self.fragment(EntityKind::Call, ctx)
    }

    /// Render an expression to inline text.
    pub(super) fn expr(&mut self, expr: &Expr) -> String {
        let rendered = match expr {
            Expr::String(value) => self.fragment(
                EntityKind::String,
                ValueContext {
                    value: value.clone(),
                },
            ),
            Expr::Number(value) => self.fragment(
                EntityKind::Number,
                ValueContext {
                    value: value.clone(),
                },
            ),
            Expr::Variable(name) => self.fragment(EntityKind::Variable, VariableContext { name }),
            Expr::Template(parts) => {
                let chunks: Vec<Chunk<'_>> = parts
                    .iter()
                    .map(|part| match part {
                        Expr::String(text) => Chunk {
                            text: Some(text.as_str()),
                            variable: None,
                        },
                        other => Chunk {
                            text: None,
                            variable: Some(self.expr(other)),
                        },
                    })
                    .collect();
                let variables = chunks
                    .iter()
                    .filter_map(|chunk| chunk.variable.clone())
                    .collect();
                self.fragment(EntityKind::Template, TemplateContext { chunks, variables })
            }
            Expr::Operation {
                operator,
                left,
                right,
            } => {
                let ctx = OperationContext {
                    operator,
                    left: left.as_deref().map(|lhs| self.expr(lhs)),
                    right: self.expr(right),
                };
                self.fragment(EntityKind::Operation, ctx)
            }
            Expr::Parenthesis(inner) => {
                let ctx = ParenthesisContext {
                    content: self.expr(inner),
                };
                self.fragment(EntityKind::Parenthesis, ctx)
            }
            Expr::List(items) => {
                let ctx = ListContext {
                    items: items.iter().map(|item| self.expr(item)).collect(),
                };
                self.fragment(EntityKind::List, ctx)
            }
        };
        rendered.unwrap_or_default()
    }

    fn fragment<S: Serialize>(&mut self, kind: EntityKind, ctx: S) -> Option<String> {
        render_or_record(
            self.templates,
            TemplateKey::fragment(kind),
            ctx,
            self.owner,
            self.diagnostics,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Argument, CallTarget};
    use rstest::rstest;

    fn var(name: &str) -> Expr {
        Expr::Variable(name.into())
    }

    fn num(value: &str) -> Expr {
        Expr::Number(value.into())
    }

    fn op(operator: &str, left: Expr, right: Expr) -> Expr {
        Expr::Operation {
            operator: operator.into(),
            left: Some(Box::new(left)),
            right: Box::new(right),
        }
    }

    fn render_body(language: &str, steps: &[Step], in_actionword: bool) -> (String, Diagnostics) {
        let templates = TemplateSet::builtin(language).expect("builtin");
        let mut diagnostics = Diagnostics::default();
        let body = StepWriter::new(&templates, "owner", in_actionword, &mut diagnostics).body(steps);
        (body, diagnostics)
    }

    #[rstest]
    #[case(op("<", var("x"), num("0")), "x < 0")]
    #[case(Expr::Parenthesis(Box::new(op("+", var("x"), num("1")))), "(x + 1)")]
    #[case(Expr::Operation { operator: "!".into(), left: None, right: Box::new(var("ok")) }, "!ok")]
    #[case(Expr::List(vec![num("1"), Expr::String("a\"b".into())]), r#"[1, "a\"b"]"#)]
    #[case(
        Expr::Template(vec![var("x"), Expr::String(" is now equal to zero".into())]),
        r##""#{x} is now equal to zero""##
    )]
    fn ruby_expressions(#[case] expr: Expr, #[case] expected: &str) {
        let templates = TemplateSet::builtin("ruby").expect("ruby");
        let mut diagnostics = Diagnostics::default();
        let rendered = StepWriter::new(&templates, "owner", false, &mut diagnostics).expr(&expr);
        assert_eq!(rendered, expected);
        assert!(diagnostics.is_empty());
    }

    #[rstest]
    fn python_templates_use_format() {
        let templates = TemplateSet::builtin("python").expect("python");
        let mut diagnostics = Diagnostics::default();
        let expr = Expr::Template(vec![Expr::String("x is ".into()), var("x")]);
        let rendered = StepWriter::new(&templates, "owner", false, &mut diagnostics).expr(&expr);
        assert_eq!(rendered, r#""x is {}".format(x)"#);
    }

    #[rstest]
    fn nested_blocks_are_indented_per_level() {
        let steps = vec![Step::Loop {
            condition: var("busy"),
            body: vec![Step::Conditional {
                condition: var("done"),
                then_steps: vec![Step::Comment("stop".into())],
                else_steps: Vec::new(),
            }],
        }];
        let (body, diagnostics) = render_body("ruby", &steps, false);
        assert_eq!(body, "while (busy)\n  if (done)\n    # stop\n  end\nend");
        assert!(diagnostics.is_empty());
    }

    #[rstest]
    #[case(false, "self.actionwords.open_page(\"home\")")]
    #[case(true, "self.open_page(\"home\")")]
    fn python_calls_depend_on_the_caller(#[case] in_actionword: bool, #[case] expected: &str) {
        let steps = vec![Step::Call(Call {
            target: CallTarget::Resolved {
                uid: "A1".into(),
                name: "Open page".into(),
            },
            arguments: vec![Argument {
                name: "page".into(),
                value: Expr::String("home".into()),
            }],
        })];
        let (body, _) = render_body("python", &steps, in_actionword);
        assert_eq!(body, expected);
    }

    #[rstest]
    fn missing_step_templates_skip_only_that_step() {
        let steps = vec![
            Step::Comment("not in selenium".into()),
            Step::Call(Call {
                target: CallTarget::Unresolved {
                    name: "open".into(),
                },
                arguments: vec![Argument {
                    name: "url".into(),
                    value: Expr::String("/".into()),
                }],
            }),
        ];
        let (body, diagnostics) = render_body("seleniumide", &steps, false);
        assert_eq!(body, "<tr><td>open</td><td>/</td><td></td></tr>");
        let misses: Vec<_> = diagnostics.template_misses().map(|m| m.key.as_str()).collect();
        assert_eq!(misses, ["comment.fragment"]);
    }
}
