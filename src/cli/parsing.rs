//! CLI parsing helpers for clap value parsers.

use camino::Utf8PathBuf;

pub(super) fn parse_utf8_path(s: &str) -> Result<Utf8PathBuf, String> {
    if s.trim().is_empty() {
        return Err("path must not be empty".to_owned());
    }
    Ok(Utf8PathBuf::from(s))
}

/// Normalise a language name: trimmed, lowercase ASCII letters, digits, `_`
/// or `-`.
pub(super) fn parse_language(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("language must not be empty".to_owned());
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
    {
        return Err(format!("invalid language '{s}'"));
    }
    Ok(trimmed.to_ascii_lowercase())
}
