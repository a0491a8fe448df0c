use serde::{Deserialize, Serialize};

use crate::data::GeoProperty;
use crate::workflows::comparables::{ComparableProperty, ComparableSearchResult};
use crate::workflows::underwrite::UnderwriteScenarios;

/// Address lookup request for a quick offer estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    #[serde(alias = "formattedAddress")]
    pub formatted_address: String,
    /// Self-reported condition used to size the rehab budget.
    #[serde(default)]
    pub condition: Option<String>,
}

impl EstimateRequest {
    pub fn new(formatted_address: impl Into<String>) -> Self {
        Self {
            formatted_address: formatted_address.into(),
            condition: None,
        }
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }
}

/// Subject property, its comparables, and the derived underwriting scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferEstimate {
    pub target_property: GeoProperty,
    pub comparables: Vec<ComparableProperty>,
    pub radius_used: f64,
    pub months_used: u32,
    pub underwrite: UnderwriteScenarios,
}

impl OfferEstimate {
    pub(crate) fn from_search(
        target_property: GeoProperty,
        search: ComparableSearchResult,
        underwrite: UnderwriteScenarios,
    ) -> Self {
        Self {
            target_property,
            comparables: search.properties,
            radius_used: search.radius_used,
            months_used: search.months_used,
            underwrite,
        }
    }

    pub fn comparable_count(&self) -> usize {
        self.comparables.len()
    }
}
