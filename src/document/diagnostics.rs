//! Translates export parsing errors into actionable diagnostics.
//!
//! YAML syntax errors carry a source span computed from the line and column
//! reported by `serde_saphyr`; schema errors name the document and the
//! offending field path as reported by `serde_json`.

// The unused_assignments lint fires in some Rust versions on fields written by
// the miette/thiserror derive expansions.
#![allow(clippy::allow_attributes, clippy::allow_attributes_without_reason)]

use camino::Utf8PathBuf;
use miette::{Diagnostic, NamedSource, SourceSpan};
use serde_saphyr::{Error as YamlError, Location};
use thiserror::Error;

/// Failure to turn an export document into its typed form.
#[allow(unused_assignments)]
#[derive(Debug, Error, Diagnostic)]
pub enum DocumentError {
    /// The document could not be read from disk.
    #[error("failed to read {path}")]
    #[diagnostic(code(publisher::document::read))]
    Read {
        /// Path that was opened.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not well-formed YAML.
    #[error("{name}: YAML parse error at line {line}, column {column}: {message}")]
    #[diagnostic(code(publisher::document::yaml))]
    Yaml {
        /// Document name used in messages.
        name: String,
        /// One-based line of the error.
        line: u64,
        /// One-based column of the error.
        column: u64,
        /// Parser message.
        message: String,
        /// Document text for the snippet.
        #[source_code]
        src: NamedSource<String>,
        /// Location of the error, when known.
        #[label("parse error here")]
        span: Option<SourceSpan>,
        /// Hint for common mistakes.
        #[help]
        help: Option<String>,
    },

    /// The document is YAML but its frame does not follow the export schema.
    #[error("{name} does not match the export schema: {source}")]
    #[diagnostic(
        code(publisher::document::schema),
        help("a project export is a `project:` mapping with a `name` and optional `tags`, `actionwords` and `scenarios`; a tests export is a mapping with a `tests` list")
    )]
    Schema {
        /// Document name used in messages.
        name: String,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
}

/// Reconstruct the byte offset for a `serde_saphyr::Location`.
///
/// Offsets past the end of a line are clamped to the line end and both `\n`
/// and `\r\n` line endings are tolerated.
fn byte_index(src: &str, line: u64, column: u64) -> usize {
    let target_line = usize::try_from(line.saturating_sub(1)).unwrap_or(usize::MAX);
    let target_column = usize::try_from(column.saturating_sub(1)).unwrap_or(usize::MAX);
    let mut offset = 0usize;
    for (idx, segment) in src.split_inclusive('\n').enumerate() {
        if idx == target_line {
            let without_newline = segment.strip_suffix('\n').unwrap_or(segment);
            let cleaned = without_newline
                .strip_suffix('\r')
                .unwrap_or(without_newline);
            let column_offset = cleaned
                .char_indices()
                .nth(target_column)
                .map_or(cleaned.len(), |(byte_idx, _)| byte_idx);
            return offset + column_offset;
        }
        offset += segment.len();
    }
    src.len()
}

fn to_span(src: &str, loc: Location) -> SourceSpan {
    let at = byte_index(src, loc.line(), loc.column());
    let len = usize::from(src.as_bytes().get(at).is_some_and(|b| *b != b'\n'));
    SourceSpan::new(at.into(), len)
}

fn has_tab_indent(src: &str, loc: Option<Location>) -> bool {
    let Some(loc) = loc else {
        return false;
    };
    let line_idx = usize::try_from(loc.line().saturating_sub(1)).unwrap_or(usize::MAX);
    src.lines()
        .nth(line_idx)
        .unwrap_or("")
        .chars()
        .take_while(|c| c.is_whitespace())
        .any(|c| c == '\t')
}

/// Map a `serde_saphyr` parse error into a [`DocumentError`].
pub(crate) fn map_yaml_error(err: &YamlError, src: &str, name: &str) -> DocumentError {
    let loc = err.location();
    let (line, column, span) = loc.map_or((1, 1, None), |l| {
        (l.line(), l.column(), Some(to_span(src, l)))
    });
    let help = has_tab_indent(src, loc)
        .then(|| "Use spaces for indentation; tabs are invalid in YAML.".to_owned());
    DocumentError::Yaml {
        name: name.to_owned(),
        line,
        column,
        message: err.to_string(),
        src: NamedSource::new(name, src.to_owned()),
        span,
        help,
    }
}
