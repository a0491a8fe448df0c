use serde::{Deserialize, Serialize};
use tracing::info;

use super::reference::{CalculationReference, MarketUnderwriteInputs};
use super::rehab::{RehabEstimate, DEFAULT_HIGH_REHAB, DEFAULT_LOW_REHAB};
use crate::data::{EventType, EVENT_LISTED_RENT, EVENT_SOLD};
use crate::workflows::comparables::ComparableProperty;

/// Rental comparables rank used as the representative rent.
pub const RENT_RANK: usize = 3;
/// Sale comparables rank used as the after-repair value.
pub const SALE_RANK: usize = 2;

/// Buy-and-hold scenario inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentUnderwrite {
    pub rent: f64,
    pub expense: f64,
    pub cap_rate: f64,
    pub low_rehab: f64,
    pub high_rehab: f64,
}

/// Renovate-and-resell scenario inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlipUnderwrite {
    pub selling_costs: f64,
    pub holding_costs: f64,
    pub margin: f64,
    pub low_rehab: f64,
    pub high_rehab: f64,
    pub after_repair_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderwriteScenarios {
    pub rent: RentUnderwrite,
    pub flip: FlipUnderwrite,
}

/// Values used whenever comparables or reference data are missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderwriteDefaults {
    pub rent: RentUnderwrite,
    pub flip: FlipUnderwrite,
}

impl UnderwriteDefaults {
    pub fn standard() -> Self {
        Self {
            rent: RentUnderwrite {
                rent: 2_500.0,
                expense: 40.0,
                cap_rate: 8.0,
                low_rehab: DEFAULT_LOW_REHAB,
                high_rehab: DEFAULT_HIGH_REHAB,
            },
            flip: FlipUnderwrite {
                selling_costs: 10.0,
                holding_costs: 6.0,
                margin: 25.0,
                low_rehab: DEFAULT_LOW_REHAB,
                high_rehab: DEFAULT_HIGH_REHAB,
                after_repair_value: 250_000.0,
            },
        }
    }

    pub fn scenarios(&self) -> UnderwriteScenarios {
        UnderwriteScenarios {
            rent: self.rent.clone(),
            flip: self.flip.clone(),
        }
    }
}

impl Default for UnderwriteDefaults {
    fn default() -> Self {
        Self::standard()
    }
}

/// Pure derivation of the rent and flip scenarios from resolved inputs.
#[derive(Debug, Clone, Default)]
pub struct UnderwriteCalculator {
    defaults: UnderwriteDefaults,
}

impl UnderwriteCalculator {
    pub fn new(defaults: UnderwriteDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &UnderwriteDefaults {
        &self.defaults
    }

    pub fn rent(
        &self,
        comparables: &[ComparableProperty],
        market: &MarketUnderwriteInputs,
        rehab: &RehabEstimate,
    ) -> RentUnderwrite {
        let rentals: Vec<&ComparableProperty> = comparables
            .iter()
            .filter(|comp| {
                comp.event.event_type == EventType::Rental
                    || comp.event.event_name == EVENT_LISTED_RENT
            })
            .collect();
        let rent = representative_price(rentals, RENT_RANK).unwrap_or(self.defaults.rent.rent);
        info!(
            rent,
            reference_market = %market.reference_market,
            "selected representative rent"
        );

        RentUnderwrite {
            rent,
            expense: market.operating_expense,
            cap_rate: market.cap_rate,
            low_rehab: rehab.low_rehab,
            high_rehab: rehab.high_rehab,
        }
    }

    pub fn flip(
        &self,
        comparables: &[ComparableProperty],
        reference: &CalculationReference,
        rehab: &RehabEstimate,
    ) -> FlipUnderwrite {
        let sales: Vec<&ComparableProperty> = comparables
            .iter()
            .filter(|comp| {
                comp.event.event_type == EventType::Sale || comp.event.event_name == EVENT_SOLD
            })
            .collect();
        let after_repair_value = representative_price(sales, SALE_RANK)
            .unwrap_or(self.defaults.flip.after_repair_value);
        info!(after_repair_value, "selected after-repair value");

        let defaults = &self.defaults.flip;
        FlipUnderwrite {
            selling_costs: positive_or(reference.commission_rate, defaults.selling_costs),
            holding_costs: positive_or(
                reference.total_closing_holding_costs,
                defaults.holding_costs,
            ),
            margin: positive_or(reference.margin_percentage, defaults.margin),
            low_rehab: rehab.low_rehab,
            high_rehab: rehab.high_rehab,
            after_repair_value,
        }
    }
}

/// Price at `rank` (1-based) after sorting by price descending; with fewer
/// comparables than `rank` the lowest available price is used. Keeping away
/// from the top of the list damps outlier listings.
pub fn representative_price(mut comparables: Vec<&ComparableProperty>, rank: usize) -> Option<f64> {
    comparables.sort_by(|a, b| b.event.price_or_zero().total_cmp(&a.event.price_or_zero()));
    comparables.truncate(rank);
    comparables
        .last()
        .and_then(|comp| comp.price())
        .filter(|price| price.is_finite() && *price > 0.0)
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}
