//! Persisted signatures of the previous run.
//!
//! The store is a YAML sequence of `{name, uid, parameters: [{name}]}`
//! records kept beside the generated output. Records are read loosely: one
//! that lacks a string `uid` or `name`, or whose parameters are malformed, is
//! skipped with a [`StoreLoadError`] note and the rest of the store remains
//! usable.

use std::fmt;
use std::fs;
use std::io;

use camino::Utf8Path;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::diagnostics::{Diagnostics, StoreLoadError};

use super::{ActionWordSignature, SignatureParameter};

/// File name of the store inside the output directory.
pub const FILE_NAME: &str = "actionwords_signature.yaml";

/// Signatures recorded by the previous run, in stored order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureStore {
    signatures: Vec<ActionWordSignature>,
}

impl From<Vec<ActionWordSignature>> for SignatureStore {
    fn from(signatures: Vec<ActionWordSignature>) -> Self {
        Self { signatures }
    }
}

impl SignatureStore {
    /// A store for a first run.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            signatures: Vec::new(),
        }
    }

    /// Loaded signatures in file order.
    #[must_use]
    pub fn signatures(&self) -> &[ActionWordSignature] {
        &self.signatures
    }

    /// Parse store text. Unusable records are skipped and noted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scenario_publisher::{diagnostics::Diagnostics, signature::SignatureStore};
    ///
    /// let text = "- name: go\n  uid: U1\n  parameters: [{name: x}]\n- name: broken\n";
    /// let mut diagnostics = Diagnostics::default();
    /// let store = SignatureStore::load(text, &mut diagnostics);
    /// assert_eq!(store.signatures().len(), 1);
    /// assert_eq!(diagnostics.store_notes().count(), 1);
    /// ```
    pub fn load(text: &str, diagnostics: &mut Diagnostics) -> Self {
        if text.trim().is_empty() {
            return Self::empty();
        }
        let value: Value = match serde_saphyr::from_str(text) {
            Ok(value) => value,
            Err(err) => {
                diagnostics.record(StoreLoadError::Unparseable {
                    message: err.to_string(),
                });
                return Self::empty();
            }
        };
        let Value::Array(records) = value else {
            diagnostics.record(StoreLoadError::NotASequence);
            return Self::empty();
        };

        let signatures = records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| match signature(index, record) {
                Ok(signature) => Some(signature),
                Err(note) => {
                    diagnostics.record(note);
                    None
                }
            })
            .collect::<Vec<_>>();
        debug!(records = records.len(), loaded = signatures.len(), "signature store loaded");
        Self { signatures }
    }

    /// Read the store at `path`. A missing file is a first run and yields an
    /// empty store; an unreadable one is noted and treated the same way.
    pub fn from_path(path: &Utf8Path, diagnostics: &mut Diagnostics) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => Self::load(&text, diagnostics),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(%path, "no signature store; starting from an empty one");
                Self::empty()
            }
            Err(err) => {
                diagnostics.record(StoreLoadError::Unreadable {
                    message: format!("{path}: {err}"),
                });
                Self::empty()
            }
        }
    }

    /// Serialise `signatures` in store format.
    ///
    /// The store is block-style YAML. Should a name not survive the YAML
    /// emitter unchanged, the store is written as JSON instead, which is valid
    /// YAML too; either form reads back through [`SignatureStore::load`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreDumpError`] if serialisation fails.
    pub fn dump(signatures: &[ActionWordSignature]) -> Result<String, StoreDumpError> {
        let yaml = serde_saphyr::to_string(&signatures).map_err(StoreDumpError::new)?;
        if reads_back(&yaml, signatures) {
            return Ok(yaml);
        }
        debug!("signature store written as JSON to keep names verbatim");
        let mut json = serde_json::to_string_pretty(signatures).map_err(StoreDumpError::new)?;
        json.push('\n');
        Ok(json)
    }
}

/// The signature store could not be serialised.
#[derive(Debug, Error)]
#[error("failed to serialise the signature store: {message}")]
pub struct StoreDumpError {
    message: String,
}

impl StoreDumpError {
    fn new(err: impl fmt::Display) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

/// Whether `yaml` loads back as exactly `signatures`.
fn reads_back(yaml: &str, signatures: &[ActionWordSignature]) -> bool {
    if yaml.trim().is_empty() {
        return signatures.is_empty();
    }
    let Ok(Value::Array(records)) = serde_saphyr::from_str::<Value>(yaml) else {
        return false;
    };
    records.len() == signatures.len()
        && records
            .iter()
            .zip(signatures)
            .enumerate()
            .all(|(index, (record, expected))| {
                signature(index, record).is_ok_and(|parsed| &parsed == expected)
            })
}

fn signature(index: usize, record: &Value) -> Result<ActionWordSignature, StoreLoadError> {
    let field = |key: &'static str| {
        record
            .get(key)
            .and_then(Value::as_str)
            .ok_or(StoreLoadError::MissingField { index, field: key })
    };
    let uid = field("uid")?;
    let name = field("name")?;
    let parameters = match record.get("parameters") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.get("name")
                    .and_then(Value::as_str)
                    .map(|parameter| SignatureParameter {
                        name: parameter.to_owned(),
                    })
            })
            .collect::<Option<Vec<_>>>()
            .ok_or(StoreLoadError::InvalidParameters { index })?,
        Some(_) => return Err(StoreLoadError::InvalidParameters { index }),
    };
    Ok(ActionWordSignature {
        name: name.to_owned(),
        uid: uid.to_owned(),
        parameters,
    })
}
