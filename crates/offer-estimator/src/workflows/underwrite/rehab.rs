use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::reference::ConditionCost;

pub const DEFAULT_LOW_REHAB: f64 = 50.0;
pub const DEFAULT_HIGH_REHAB: f64 = 75.0;

/// Low/high rehab budget for the subject property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RehabEstimate {
    pub low_rehab: f64,
    pub high_rehab: f64,
    pub condition: String,
}

impl RehabEstimate {
    pub fn fallback() -> Self {
        Self {
            low_rehab: DEFAULT_LOW_REHAB,
            high_rehab: DEFAULT_HIGH_REHAB,
            condition: "Default".to_string(),
        }
    }
}

/// Scales the per-square-foot cost band by the subject's size.
///
/// A requested `standard` condition uses flat per-unit costs returned as is.
/// Any other condition is scaled, including one that resolved to the
/// `Standard` row because it had no row of its own.
pub fn estimate_rehab(
    condition: &str,
    cost: &ConditionCost,
    square_footage: Option<f64>,
) -> RehabEstimate {
    let Some(square_footage) = square_footage.filter(|sqft| sqft.is_finite() && *sqft > 0.0)
    else {
        warn!(?square_footage, "invalid square footage, using default rehab costs");
        return RehabEstimate {
            condition: cost.condition.clone(),
            ..RehabEstimate::fallback()
        };
    };

    if condition.trim().eq_ignore_ascii_case("standard") {
        return RehabEstimate {
            low_rehab: cost.low_cost,
            high_rehab: cost.high_cost,
            condition: cost.condition.clone(),
        };
    }

    let estimate = RehabEstimate {
        low_rehab: (cost.low_cost * square_footage).round(),
        high_rehab: (cost.high_cost * square_footage).round(),
        condition: cost.condition.clone(),
    };
    debug!(
        condition = %estimate.condition,
        square_footage,
        low_per_sqft = cost.low_cost,
        high_per_sqft = cost.high_cost,
        "calculated rehab costs"
    );
    estimate
}
