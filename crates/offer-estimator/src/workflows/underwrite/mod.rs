//! Rent and flip underwriting over a comparable set.
//!
//! Reference data lookups fail open, so every call produces a complete pair of
//! scenarios even when the store is empty or unreachable.

mod calculator;
pub mod reference;
mod rehab;
pub mod router;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::data::GeoProperty;
use crate::workflows::comparables::ComparableProperty;

pub use calculator::{
    representative_price, FlipUnderwrite, RentUnderwrite, UnderwriteCalculator,
    UnderwriteDefaults, UnderwriteScenarios, RENT_RANK, SALE_RANK,
};
pub use reference::{
    CalculationReference, ConditionCost, ConditionCostRow, MarketReferenceRow,
    MarketUnderwriteInputs, ReferenceError, ReferenceLookup, ReferenceStore, ReferenceTables,
    StaticReferenceStore,
};
pub use rehab::{estimate_rehab, RehabEstimate, DEFAULT_HIGH_REHAB, DEFAULT_LOW_REHAB};
pub use router::{underwrite_router, UnderwriteRequest};

/// Subject attributes that drive reference lookups and rehab sizing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectProfile {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub square_footage: Option<f64>,
}

impl SubjectProfile {
    pub fn from_property(property: &GeoProperty, condition: Option<String>) -> Self {
        Self {
            state: property.state_abbreviation.clone(),
            county: property.county.clone(),
            condition,
            square_footage: property.square_footage,
        }
    }
}

/// Resolves reference data and runs the calculator.
pub struct UnderwriteService<S> {
    lookup: ReferenceLookup<S>,
    calculator: UnderwriteCalculator,
}

impl<S> Clone for UnderwriteService<S> {
    fn clone(&self) -> Self {
        Self {
            lookup: self.lookup.clone(),
            calculator: self.calculator.clone(),
        }
    }
}

impl<S: ReferenceStore> UnderwriteService<S> {
    pub fn new(store: Arc<S>, defaults: UnderwriteDefaults) -> Self {
        Self {
            lookup: ReferenceLookup::new(store),
            calculator: UnderwriteCalculator::new(defaults),
        }
    }

    pub fn defaults(&self) -> &UnderwriteDefaults {
        self.calculator.defaults()
    }

    pub fn rehab(&self, subject: &SubjectProfile) -> RehabEstimate {
        let condition = subject
            .condition
            .as_deref()
            .map(str::trim)
            .filter(|condition| !condition.is_empty());
        let Some(condition) = condition else {
            info!("no property condition supplied, using default rehab costs");
            return RehabEstimate::fallback();
        };

        let cost = self.lookup.condition_cost(condition);
        estimate_rehab(condition, &cost, subject.square_footage)
    }

    pub fn rent_scenario(
        &self,
        comparables: &[ComparableProperty],
        subject: &SubjectProfile,
        rehab: &RehabEstimate,
    ) -> RentUnderwrite {
        let market = self
            .lookup
            .market_inputs(subject.state.as_deref(), subject.county.as_deref());
        self.calculator.rent(comparables, &market, rehab)
    }

    pub fn flip_scenario(
        &self,
        comparables: &[ComparableProperty],
        rehab: &RehabEstimate,
    ) -> FlipUnderwrite {
        let reference = self.lookup.calculation_reference();
        self.calculator.flip(comparables, &reference, rehab)
    }

    /// Both scenarios sharing one rehab estimate.
    pub fn underwrite(
        &self,
        comparables: &[ComparableProperty],
        subject: &SubjectProfile,
    ) -> UnderwriteScenarios {
        let rehab = self.rehab(subject);
        UnderwriteScenarios {
            rent: self.rent_scenario(comparables, subject, &rehab),
            flip: self.flip_scenario(comparables, &rehab),
        }
    }
}
