//! Non-fatal issues raised while building, rendering and diffing.
//!
//! Processing continues past every condition in this module: the affected
//! entity, step or record is skipped and an [`Issue`] is recorded in the
//! run-wide [`Diagnostics`] collector. Only the runner decides whether the
//! collected issues are worth more than a log line.
//!
//! # Examples
//! ```rust
//! use scenario_publisher::diagnostics::{DataError, Diagnostics};
//!
//! let mut diagnostics = Diagnostics::default();
//! diagnostics.record(DataError::UnresolvedCall {
//!     owner: "login".into(),
//!     actionword: "open browser".into(),
//! });
//! assert_eq!(diagnostics.len(), 1);
//! ```

use thiserror::Error;
use tracing::{debug, warn};

/// Malformed or dangling references in the input documents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    /// An entity in an export could not be decoded and was left out.
    #[error("{document}: skipped malformed {kind} #{index}: {message}")]
    MalformedEntity {
        /// Document the entity came from.
        document: String,
        /// Entity kind, such as `scenario`.
        kind: &'static str,
        /// Position of the entity within its list.
        index: usize,
        /// Decoder message.
        message: String,
    },

    /// A call names an action word the project does not define.
    #[error("'{owner}' calls unknown action word '{actionword}'")]
    UnresolvedCall {
        /// Scenario or action word containing the call.
        owner: String,
        /// Name of the missing action word.
        actionword: String,
    },

    /// A call binds an argument the callee does not declare.
    #[error("'{owner}' binds '{argument}' which '{actionword}' does not declare")]
    UnknownArgument {
        /// Scenario or action word containing the call.
        owner: String,
        /// Called action word.
        actionword: String,
        /// Undeclared argument name.
        argument: String,
    },

    /// Two action words share a uid.
    #[error("action word uid '{uid}' is declared more than once (last: '{name}')")]
    DuplicateUid {
        /// Repeated uid.
        uid: String,
        /// Name of the action word that won.
        name: String,
    },

    /// Two entities map to the same output file.
    #[error("'{name}' would overwrite {path}, which is already generated")]
    DuplicateOutputPath {
        /// Entity whose file was dropped.
        name: String,
        /// Contested relative path.
        path: String,
    },

    /// An entity name produced an empty or escaping path.
    #[error("'{name}' yields unusable output path '{path}'")]
    InvalidOutputPath {
        /// Entity whose file was dropped.
        name: String,
        /// Rejected relative path.
        path: String,
    },
}

/// No template exists for an entity kind in the selected language.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no '{key}' template for language '{language}'")]
pub struct TemplateMissError {
    /// Language whose catalogue was consulted.
    pub language: String,
    /// Template key that was absent.
    pub key: String,
}

/// A persisted signature record could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreLoadError {
    /// The store file exists but could not be read.
    #[error("signature store could not be read: {message}")]
    Unreadable {
        /// I/O error text.
        message: String,
    },

    /// The store is not YAML.
    #[error("signature store is not valid YAML: {message}")]
    Unparseable {
        /// Parser error text.
        message: String,
    },

    /// The top-level value is not a sequence.
    #[error("signature store is not a list of records")]
    NotASequence,

    /// A record lacks a required field.
    #[error("signature record #{index} has no {field}")]
    MissingField {
        /// Position of the record.
        index: usize,
        /// Missing field name.
        field: &'static str,
    },

    /// A record's parameter list is not a list of named entries.
    #[error("signature record #{index} has malformed parameters")]
    InvalidParameters {
        /// Position of the record.
        index: usize,
    },
}

/// Any condition that was recorded instead of aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Issue {
    /// Problem in the input data.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Missing template for the selected language.
    #[error(transparent)]
    TemplateMiss(#[from] TemplateMissError),

    /// Unusable signature store content.
    #[error(transparent)]
    StoreLoad(#[from] StoreLoadError),

    /// A template failed while rendering one entity.
    #[error("failed to render '{key}' for '{entity}': {message}")]
    RenderFailed {
        /// Template key.
        key: String,
        /// Entity being rendered.
        entity: String,
        /// Template engine error text.
        message: String,
    },
}

/// Ordered collection of the issues raised during a run.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    issues: Vec<Issue>,
}

impl Diagnostics {
    /// Record an issue and log it.
    ///
    /// Template misses are expected for partial language catalogues and are
    /// only logged at debug level.
    pub fn record(&mut self, issue: impl Into<Issue>) {
        let recorded = issue.into();
        match &recorded {
            Issue::TemplateMiss(miss) => debug!(%miss, "template skipped"),
            other => warn!(issue = %other, "non-fatal issue"),
        }
        self.issues.push(recorded);
    }

    /// All recorded issues in order.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Number of recorded issues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Whether the run was clean.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Iterate over the recorded data errors.
    pub fn data_errors(&self) -> impl Iterator<Item = &DataError> {
        self.issues.iter().filter_map(|issue| match issue {
            Issue::Data(err) => Some(err),
            _ => None,
        })
    }

    /// Iterate over the recorded template misses.
    pub fn template_misses(&self) -> impl Iterator<Item = &TemplateMissError> {
        self.issues.iter().filter_map(|issue| match issue {
            Issue::TemplateMiss(miss) => Some(miss),
            _ => None,
        })
    }

    /// Iterate over the recorded signature store notes.
    pub fn store_notes(&self) -> impl Iterator<Item = &StoreLoadError> {
        self.issues.iter().filter_map(|issue| match issue {
            Issue::StoreLoad(note) => Some(note),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn issues_keep_recording_order() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.record(StoreLoadError::NotASequence);
        diagnostics.record(TemplateMissError {
            language: "ruby".into(),
            key: "loop.fragment".into(),
        });
        diagnostics.record(DataError::DuplicateUid {
            uid: "U1".into(),
            name: "open".into(),
        });
        assert_eq!(diagnostics.len(), 3);
        assert!(matches!(diagnostics.issues()[0], Issue::StoreLoad(_)));
        assert_eq!(diagnostics.template_misses().count(), 1);
        assert_eq!(diagnostics.data_errors().count(), 1);
        assert_eq!(diagnostics.store_notes().count(), 1);
    }

    #[rstest]
    fn messages_name_the_offender() {
        let err = DataError::UnresolvedCall {
            owner: "login".into(),
            actionword: "open browser".into(),
        };
        assert_eq!(
            Issue::from(err).to_string(),
            "'login' calls unknown action word 'open browser'"
        );
    }
}
