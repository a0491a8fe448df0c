use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Comparable count at which a tier is considered sufficient.
pub const DEFAULT_SUFFICIENT_COUNT: usize = 10;

/// One step of the adaptive search: how far and how far back to look.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyTier {
    pub radius_miles: f64,
    pub lookback_months: u32,
}

impl StrategyTier {
    pub const fn new(radius_miles: f64, lookback_months: u32) -> Self {
        Self {
            radius_miles,
            lookback_months,
        }
    }
}

impl FromStr for StrategyTier {
    type Err = StrategyError;

    /// Parses `"<radius>:<months>"`, e.g. `"0.75:6"`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (radius, months) = raw
            .trim()
            .split_once(':')
            .ok_or_else(|| StrategyError::Malformed(raw.to_string()))?;
        let radius_miles = radius
            .trim()
            .parse::<f64>()
            .map_err(|_| StrategyError::Malformed(raw.to_string()))?;
        let lookback_months = months
            .trim()
            .parse::<u32>()
            .map_err(|_| StrategyError::Malformed(raw.to_string()))?;
        Ok(Self::new(radius_miles, lookback_months))
    }
}

/// Ordered tiers tried from narrowest to widest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparableStrategy {
    tiers: Vec<StrategyTier>,
    sufficient_count: usize,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StrategyError {
    #[error("comparable strategy needs at least one tier")]
    Empty,
    #[error("tier '{0}' must look like <radius_miles>:<months>")]
    Malformed(String),
    #[error("tier radius {0} must be a positive, finite number of miles")]
    InvalidRadius(f64),
    #[error("tiers must widen monotonically; tier {index} narrows the search")]
    NotMonotonic { index: usize },
}

impl ComparableStrategy {
    pub fn standard() -> Self {
        Self {
            tiers: vec![
                StrategyTier::new(0.5, 3),
                StrategyTier::new(0.75, 6),
                StrategyTier::new(1.0, 6),
                StrategyTier::new(1.5, 6),
            ],
            sufficient_count: DEFAULT_SUFFICIENT_COUNT,
        }
    }

    pub fn new(tiers: Vec<StrategyTier>, sufficient_count: usize) -> Result<Self, StrategyError> {
        if tiers.is_empty() {
            return Err(StrategyError::Empty);
        }

        for (index, tier) in tiers.iter().enumerate() {
            if !tier.radius_miles.is_finite() || tier.radius_miles <= 0.0 {
                return Err(StrategyError::InvalidRadius(tier.radius_miles));
            }
            if let Some(previous) = index.checked_sub(1).map(|prev| tiers[prev]) {
                if tier.radius_miles < previous.radius_miles
                    || tier.lookback_months < previous.lookback_months
                {
                    return Err(StrategyError::NotMonotonic { index });
                }
            }
        }

        Ok(Self {
            tiers,
            sufficient_count,
        })
    }

    /// Parses a comma separated tier list such as `"0.5:3,0.75:6,1.0:6,1.5:6"`.
    pub fn parse(tiers: &str, sufficient_count: usize) -> Result<Self, StrategyError> {
        let tiers = tiers
            .split(',')
            .filter(|raw| !raw.trim().is_empty())
            .map(StrategyTier::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(tiers, sufficient_count)
    }

    pub fn tiers(&self) -> &[StrategyTier] {
        &self.tiers
    }

    pub fn sufficient_count(&self) -> usize {
        self.sufficient_count
    }

    /// The last tier; it bounds the neighborhood fetch and the event window.
    pub fn widest(&self) -> StrategyTier {
        self.tiers[self.tiers.len() - 1]
    }
}

impl Default for ComparableStrategy {
    fn default() -> Self {
        Self::standard()
    }
}
