//! Action word signatures and their comparison across runs.
//!
//! A signature is the projection of an action word that survives between
//! publisher runs: its uid, its name and the ordered names of its parameters.
//! The [`store`] reads and writes the persisted projection and [`diff`]
//! classifies what changed.

pub mod diff;
pub mod store;

use serde::{Deserialize, Serialize};

use crate::model::{ActionWord, Project};

pub use diff::{Renamed, SignatureDiff};
pub use store::{SignatureStore, StoreDumpError};

/// Persisted projection of an action word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionWordSignature {
    /// Action word name.
    pub name: String,
    /// Action word uid.
    pub uid: String,
    /// Parameters in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<SignatureParameter>,
}

/// Persisted parameter entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureParameter {
    /// Parameter name.
    pub name: String,
}

impl ActionWordSignature {
    /// Build a signature from its parts.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scenario_publisher::signature::ActionWordSignature;
    ///
    /// let sig = ActionWordSignature::new("U5", "Control blocks", ["x"]);
    /// assert_eq!(sig.parameter_names().collect::<Vec<_>>(), ["x"]);
    /// ```
    #[must_use]
    pub fn new<I, S>(uid: &str, name: &str, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_owned(),
            uid: uid.to_owned(),
            parameters: parameters
                .into_iter()
                .map(|parameter| SignatureParameter {
                    name: parameter.into(),
                })
                .collect(),
        }
    }

    /// Project an action word onto its signature.
    #[must_use]
    pub fn from_actionword(actionword: &ActionWord) -> Self {
        Self::new(
            &actionword.uid,
            &actionword.name,
            actionword.parameters.iter().map(|p| p.name.as_str()),
        )
    }

    /// Parameter names in declaration order.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.name.as_str())
    }
}

/// Signatures of every action word of `project`, in model order.
#[must_use]
pub fn current_signatures(project: &Project) -> Vec<ActionWordSignature> {
    project
        .actionwords()
        .iter()
        .map(ActionWordSignature::from_actionword)
        .collect()
}
