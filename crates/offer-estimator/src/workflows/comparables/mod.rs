//! Adaptive comparable-property discovery.

mod domain;
mod finder;
mod strategy;

pub use domain::{ComparableProperty, ComparableSearchResult};
pub use finder::{search_tier, ComparableFinder};
pub(crate) use finder::lookback_cutoff;
pub use strategy::{ComparableStrategy, StrategyError, StrategyTier, DEFAULT_SUFFICIENT_COUNT};
