use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One provider entry from the availability API that passed filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRecord {
    pub id: i64,
    pub name: String,
    pub availability: String,
    /// The full source object, kept for diagnostics.
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Provider identifiers the operator cares about. Membership is the only operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DesiredProviderSet(BTreeSet<i64>);

impl DesiredProviderSet {
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self(ids.into_iter().collect())
    }

    pub fn contains(&self, id: i64) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<i64> for DesiredProviderSet {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl From<Vec<i64>> for DesiredProviderSet {
    fn from(ids: Vec<i64>) -> Self {
        Self::new(ids)
    }
}
