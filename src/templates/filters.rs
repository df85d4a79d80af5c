//! Filters available to every catalogue.
//!
//! - `underscore`, `camelize`, `camelize_lower`: identifier conventions.
//! - `indent_block(level)`: prefix each non-empty line with `level` copies of
//!   the catalogue indent.
//! - `escape_string`: backslash-escape `\` and `"` for double-quoted literals.
//! - `quote_string`: `escape_string` wrapped in double quotes.

use minijinja::Environment;

use crate::identifier;

pub(super) fn register(env: &mut Environment<'static>, indent: &str) {
    env.add_filter("underscore", |value: String| identifier::underscore(&value));
    env.add_filter("camelize", |value: String| identifier::camelize(&value));
    env.add_filter("camelize_lower", |value: String| {
        identifier::camelize_lower(&value)
    });
    env.add_filter("escape_string", |value: String| escape_string(&value));
    env.add_filter("quote_string", |value: String| {
        format!("\"{}\"", escape_string(&value))
    });
    let unit = indent.to_owned();
    env.add_filter("indent_block", move |value: String, level: usize| {
        indent_block(&value, &unit.repeat(level))
    });
}

fn escape_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn indent_block(value: &str, prefix: &str) -> String {
    value
        .split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
