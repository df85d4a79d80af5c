//! Classification of action word changes between two runs.
//!
//! Both snapshots are keyed by uid. Within one snapshot a repeated uid keeps
//! its first-seen position but takes the content of its last occurrence.

use indexmap::IndexMap;

use super::ActionWordSignature;

/// An action word whose name changed while its uid stayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renamed {
    /// Shared uid.
    pub uid: String,
    /// Stored name.
    pub old_name: String,
    /// Current name.
    pub new_name: String,
}

/// Result of comparing stored signatures with current ones.
///
/// `deleted` follows the stored order; the other categories follow the
/// current order. A uid whose name and parameters both changed appears in
/// `renamed` and in `signature_changed`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureDiff {
    /// Stored signatures with no current counterpart.
    pub deleted: Vec<ActionWordSignature>,
    /// Current signatures with no stored counterpart.
    pub created: Vec<ActionWordSignature>,
    /// Uids whose name changed.
    pub renamed: Vec<Renamed>,
    /// Current signatures whose ordered parameter names differ from the
    /// stored ones.
    pub signature_changed: Vec<ActionWordSignature>,
}

impl SignatureDiff {
    /// Whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty()
            && self.created.is_empty()
            && self.renamed.is_empty()
            && self.signature_changed.is_empty()
    }
}

fn by_uid(signatures: &[ActionWordSignature]) -> IndexMap<&str, &ActionWordSignature> {
    let mut index = IndexMap::with_capacity(signatures.len());
    for signature in signatures {
        index.insert(signature.uid.as_str(), signature);
    }
    index
}

/// Compare the stored snapshot `old` with the current snapshot `new`.
///
/// # Examples
///
/// ```rust
/// use scenario_publisher::signature::{ActionWordSignature, diff::diff};
///
/// let old = [ActionWordSignature::new("U1", "Do something", ["x"])];
/// let new = [ActionWordSignature::new("U1", "Do something else", ["x"])];
/// let changes = diff(&old, &new);
/// assert_eq!(changes.renamed[0].new_name, "Do something else");
/// assert!(changes.signature_changed.is_empty());
/// ```
#[must_use]
pub fn diff(old: &[ActionWordSignature], new: &[ActionWordSignature]) -> SignatureDiff {
    let stored_index = by_uid(old);
    let current_index = by_uid(new);
    let deleted = stored_index
        .iter()
        .filter(|(uid, _)| !current_index.contains_key(*uid))
        .map(|(_, signature)| (*signature).clone())
        .collect();
    let mut result = SignatureDiff {
        deleted,
        ..SignatureDiff::default()
    };

    for (uid, current) in &current_index {
        let Some(stored) = stored_index.get(uid) else {
            result.created.push((*current).clone());
            continue;
        };
        if stored.name != current.name {
            result.renamed.push(Renamed {
                uid: (*uid).to_owned(),
                old_name: stored.name.clone(),
                new_name: current.name.clone(),
            });
        }
        if !stored.parameter_names().eq(current.parameter_names()) {
            result.signature_changed.push((*current).clone());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sig(uid: &str, name: &str, parameters: &[&str]) -> ActionWordSignature {
        ActionWordSignature::new(uid, name, parameters.iter().copied())
    }

    #[rstest]
    fn unchanged_signatures_appear_nowhere() {
        let old = [sig("U1", "a", &["x", "y"])];
        let new = old.clone();
        assert!(diff(&old, &new).is_empty());
    }

    #[rstest]
    fn parameter_order_matters() {
        let old = [sig("U1", "a", &["x", "y"])];
        let new = [sig("U1", "a", &["y", "x"])];
        let changes = diff(&old, &new);
        assert_eq!(changes.signature_changed, new);
        assert!(changes.renamed.is_empty());
    }

    #[rstest]
    fn name_and_parameter_changes_are_both_reported() {
        let old = [sig("U1", "a", &["x"])];
        let new = [sig("U1", "b", &[])];
        let changes = diff(&old, &new);
        assert_eq!(changes.renamed.len(), 1);
        assert_eq!(changes.signature_changed.len(), 1);
        assert!(changes.deleted.is_empty() && changes.created.is_empty());
    }

    #[rstest]
    fn duplicate_uids_keep_first_position_and_last_content() {
        let old = [sig("U1", "a", &[]), sig("U2", "b", &[])];
        let new = [
            sig("U3", "first", &[]),
            sig("U4", "second", &[]),
            sig("U3", "third", &[]),
        ];
        let changes = diff(&old, &new);
        let created: Vec<_> = changes.created.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(created, ["third", "second"]);
        let deleted: Vec<_> = changes.deleted.iter().map(|s| s.uid.as_str()).collect();
        assert_eq!(deleted, ["U1", "U2"]);
    }
}
