use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedEstimateId(pub u64);

impl fmt::Display for SavedEstimateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user's bookmarked estimate. `estimate_data` is an opaque client document
/// (offer range, scenario values, notes) stored as a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedEstimate {
    pub id: SavedEstimateId,
    pub user_id: u64,
    pub property_address: String,
    pub estimate_data: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SavedEstimate {
    pub fn matches_address(&self, term: &str) -> bool {
        self.property_address
            .to_lowercase()
            .contains(&term.to_lowercase())
    }

    /// Top-level keys of `patch` replace the stored ones; nested objects are
    /// not merged.
    pub(crate) fn merge_data(&mut self, patch: Map<String, Value>) {
        for (key, value) in patch {
            self.estimate_data.insert(key, value);
        }
    }
}

/// Payload for saving an estimate. Every field is required; missing ones are
/// reported as validation errors rather than deserialization failures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewSavedEstimate {
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub property_address: Option<String>,
    #[serde(default)]
    pub estimate_data: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedEstimateUpdate {
    #[serde(default)]
    pub property_address: Option<String>,
    #[serde(default)]
    pub estimate_data: Option<Map<String, Value>>,
}
