use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Cap rate and operating expense for a reference market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketUnderwriteInputs {
    pub cap_rate: f64,
    pub operating_expense: f64,
    pub reference_market: String,
}

impl MarketUnderwriteInputs {
    pub fn fallback() -> Self {
        Self {
            cap_rate: 8.0,
            operating_expense: 40.0,
            reference_market: "Default".to_string(),
        }
    }
}

/// Global flip calculation percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationReference {
    pub interest_rate: f64,
    pub total_closing_holding_costs: f64,
    pub margin_percentage: f64,
    pub commission_rate: f64,
}

impl CalculationReference {
    pub fn fallback() -> Self {
        Self {
            interest_rate: 7.0,
            total_closing_holding_costs: 4.0,
            margin_percentage: 20.0,
            commission_rate: 6.0,
        }
    }
}

/// Per-square-foot rehab cost band for a property condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionCost {
    pub condition: String,
    pub low_cost: f64,
    pub high_cost: f64,
}

impl ConditionCost {
    pub fn fallback() -> Self {
        Self {
            condition: "Default".to_string(),
            low_cost: 20.0,
            high_cost: 40.0,
        }
    }
}

/// Read access to the underwriting reference tables.
pub trait ReferenceStore: Send + Sync {
    fn market_inputs(
        &self,
        state: &str,
        county: &str,
    ) -> Result<Option<MarketUnderwriteInputs>, ReferenceError>;
    fn default_market_inputs(&self) -> Result<Option<MarketUnderwriteInputs>, ReferenceError>;
    fn calculation_reference(&self) -> Result<Option<CalculationReference>, ReferenceError>;
    fn condition_cost(&self, condition: &str) -> Result<Option<ConditionCost>, ReferenceError>;
    fn default_condition_cost(&self) -> Result<Option<ConditionCost>, ReferenceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("reference data unavailable: {0}")]
    Unavailable(String),
    #[error("failed to read reference tables: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid reference tables: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Resolves reference values with fallbacks so callers always get a number.
///
/// Resolution order is the specific row, then the store's default row, then
/// the hard-coded fallback. Store errors skip straight to the fallback.
pub struct ReferenceLookup<S> {
    store: Arc<S>,
}

impl<S> Clone for ReferenceLookup<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ReferenceStore> ReferenceLookup<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn market_inputs(&self, state: Option<&str>, county: Option<&str>) -> MarketUnderwriteInputs {
        let state = state.map(|state| state.trim().to_ascii_uppercase());
        let county = county.map(str::trim);
        let (Some(state), Some(county)) = (
            state.filter(|state| !state.is_empty()),
            county.filter(|county| !county.is_empty()),
        ) else {
            warn!("missing state or county, using default market inputs");
            return MarketUnderwriteInputs::fallback();
        };

        let resolved = self.store.market_inputs(&state, county).and_then(|found| match found {
            Some(inputs) => Ok(Some(inputs)),
            None => {
                info!(%state, county, "no market inputs for location, using store default");
                self.store.default_market_inputs()
            }
        });

        match resolved {
            Ok(Some(inputs)) => inputs,
            Ok(None) => MarketUnderwriteInputs::fallback(),
            Err(err) => {
                warn!(error = %err, %state, county, "market inputs lookup failed");
                MarketUnderwriteInputs::fallback()
            }
        }
    }

    pub fn calculation_reference(&self) -> CalculationReference {
        match self.store.calculation_reference() {
            Ok(Some(reference)) => reference,
            Ok(None) => {
                warn!("no active calculation reference, using defaults");
                CalculationReference::fallback()
            }
            Err(err) => {
                warn!(error = %err, "calculation reference lookup failed");
                CalculationReference::fallback()
            }
        }
    }

    pub fn condition_cost(&self, condition: &str) -> ConditionCost {
        let condition = condition.trim();
        let resolved = self.store.condition_cost(condition).and_then(|found| match found {
            Some(cost) => Ok(Some(cost)),
            None => {
                info!(condition, "no cost data for condition, using store default");
                self.store.default_condition_cost()
            }
        });

        match resolved {
            Ok(Some(cost)) => cost,
            Ok(None) => ConditionCost::fallback(),
            Err(err) => {
                warn!(error = %err, condition, "condition cost lookup failed");
                ConditionCost::fallback()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketReferenceRow {
    pub state: String,
    pub county: String,
    pub reference_market: String,
    pub cap_rate: f64,
    pub operating_expense: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionCostRow {
    pub condition: String,
    pub low_cost: f64,
    pub high_cost: f64,
    #[serde(default = "active_by_default")]
    pub active: bool,
}

fn active_by_default() -> bool {
    true
}

/// Reference tables as loaded from a JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTables {
    #[serde(default)]
    pub markets: Vec<MarketReferenceRow>,
    #[serde(default)]
    pub calculation_reference: Option<CalculationReference>,
    #[serde(default)]
    pub conditions: Vec<ConditionCostRow>,
}

/// Immutable in-process reference store.
#[derive(Debug, Clone, Default)]
pub struct StaticReferenceStore {
    tables: ReferenceTables,
}

const STANDARD_CONDITION: &str = "Standard";

impl StaticReferenceStore {
    pub fn new(tables: ReferenceTables) -> Self {
        Self { tables }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ReferenceError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ReferenceError> {
        let tables: ReferenceTables = serde_json::from_reader(reader)?;
        info!(
            markets = tables.markets.len(),
            conditions = tables.conditions.len(),
            "loaded underwriting reference tables"
        );
        Ok(Self::new(tables))
    }

    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    fn active_conditions(&self) -> impl Iterator<Item = &ConditionCostRow> {
        self.tables.conditions.iter().filter(|row| row.active)
    }
}

impl MarketReferenceRow {
    fn inputs(&self) -> MarketUnderwriteInputs {
        MarketUnderwriteInputs {
            cap_rate: self.cap_rate,
            operating_expense: self.operating_expense,
            reference_market: self.reference_market.clone(),
        }
    }
}

impl ConditionCostRow {
    fn cost(&self) -> ConditionCost {
        ConditionCost {
            condition: self.condition.clone(),
            low_cost: self.low_cost,
            high_cost: self.high_cost,
        }
    }
}

impl ReferenceStore for StaticReferenceStore {
    fn market_inputs(
        &self,
        state: &str,
        county: &str,
    ) -> Result<Option<MarketUnderwriteInputs>, ReferenceError> {
        Ok(self
            .tables
            .markets
            .iter()
            .find(|row| row.state.eq_ignore_ascii_case(state) && row.county.eq_ignore_ascii_case(county))
            .map(MarketReferenceRow::inputs))
    }

    fn default_market_inputs(&self) -> Result<Option<MarketUnderwriteInputs>, ReferenceError> {
        Ok(self.tables.markets.first().map(MarketReferenceRow::inputs))
    }

    fn calculation_reference(&self) -> Result<Option<CalculationReference>, ReferenceError> {
        Ok(self.tables.calculation_reference.clone())
    }

    fn condition_cost(&self, condition: &str) -> Result<Option<ConditionCost>, ReferenceError> {
        Ok(self
            .active_conditions()
            .find(|row| row.condition.eq_ignore_ascii_case(condition))
            .map(ConditionCostRow::cost))
    }

    fn default_condition_cost(&self) -> Result<Option<ConditionCost>, ReferenceError> {
        Ok(self
            .active_conditions()
            .find(|row| row.condition == STANDARD_CONDITION)
            .or_else(|| self.active_conditions().next())
            .map(ConditionCostRow::cost))
    }
}
