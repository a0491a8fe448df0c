//! Property and market data provider boundary.

mod domain;
mod parcl;
pub(crate) mod wire;

pub use domain::{
    AddressError, AddressQuery, EventHistoryItem, EventType, GeoProperty, MarketSummary,
    PropertyFilter, PropertyId, EVENT_LISTED_RENT, EVENT_SOLD, SINGLE_FAMILY,
};
pub use parcl::ParclLabsClient;

use async_trait::async_trait;
use chrono::NaiveDate;

/// Outbound lookups the estimator needs from the data provider.
///
/// Implementations report "not found" as an empty result, never as an error.
#[async_trait]
pub trait PropertyDataClient: Send + Sync {
    async fn search_address(
        &self,
        query: &AddressQuery,
    ) -> Result<Option<GeoProperty>, DataClientError>;

    async fn search_markets(
        &self,
        zip_code: &str,
        state_abbreviation: &str,
    ) -> Result<Option<MarketSummary>, DataClientError>;

    async fn search_properties(
        &self,
        parcl_id: &str,
        filter: &PropertyFilter,
    ) -> Result<Vec<GeoProperty>, DataClientError>;

    async fn event_history(
        &self,
        property_ids: &[PropertyId],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<EventHistoryItem>, DataClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DataClientError {
    #[error("property data API key is not configured")]
    MissingApiKey,
    #[error("{endpoint} request failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: &'static str,
        status: u16,
    },
}
