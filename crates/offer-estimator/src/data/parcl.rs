use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::domain::{
    AddressQuery, EventHistoryItem, GeoProperty, MarketSummary, PropertyFilter, PropertyId,
};
use super::{DataClientError, PropertyDataClient};
use crate::config::DataClientConfig;

const ADDRESS_SEARCH: &str = "search_address";
const MARKET_SEARCH: &str = "search_markets";
const PROPERTY_SEARCH: &str = "search_properties";
const EVENT_HISTORY: &str = "event_history";

/// HTTP client for the Parcl Labs property API.
#[derive(Debug, Clone)]
pub struct ParclLabsClient {
    http: reqwest::Client,
    base_url: String,
    page_size: usize,
    max_pages: usize,
}

#[derive(Debug, Default, Deserialize)]
struct ItemsPage {
    #[serde(default)]
    items: Vec<serde_json::Value>,
    #[serde(default)]
    total: Option<usize>,
}

#[derive(Debug, Serialize)]
struct PropertySearchParams<'a> {
    parcl_id: &'a str,
    property_type: &'a str,
    square_footage_min: u32,
    square_footage_max: u32,
    bedrooms_min: u32,
    bedrooms_max: u32,
    bathrooms_min: u32,
    bathrooms_max: u32,
    year_built_min: i32,
    year_built_max: i32,
    event_history_sale_flag: bool,
    limit: usize,
    offset: usize,
}

#[derive(Debug, Serialize)]
struct EventHistoryPayload<'a> {
    parcl_property_id: Vec<&'a str>,
    start_date: String,
    end_date: String,
}

impl ParclLabsClient {
    pub fn new(config: &DataClientConfig) -> Result<Self, DataClientError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(DataClientError::MissingApiKey)?;

        let mut headers = HeaderMap::new();
        let mut auth =
            HeaderValue::from_str(api_key.trim()).map_err(|_| DataClientError::MissingApiKey)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|source| DataClientError::Transport {
                endpoint: "client_builder",
                source,
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size.max(1),
            max_pages: config.max_pages.max(1),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn fetch_page(
        &self,
        request: RequestBuilder,
        endpoint: &'static str,
    ) -> Result<ItemsPage, DataClientError> {
        let response = request
            .send()
            .await
            .map_err(|source| DataClientError::Transport { endpoint, source })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            warn!(endpoint, "provider returned 404, treating as empty result");
            return Ok(ItemsPage::default());
        }
        if !status.is_success() {
            warn!(endpoint, status = status.as_u16(), "provider request failed");
            return Err(DataClientError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let page = response
            .json::<ItemsPage>()
            .await
            .map_err(|source| DataClientError::Transport { endpoint, source })?;
        debug!(endpoint, items = page.items.len(), "provider request succeeded");
        Ok(page)
    }
}

/// Decodes each item independently so one malformed record does not sink the page.
fn decode_items<T: DeserializeOwned>(items: Vec<serde_json::Value>, endpoint: &str) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warn!(endpoint, error = %err, "skipping malformed provider record");
                None
            }
        })
        .collect()
}

#[async_trait]
impl PropertyDataClient for ParclLabsClient {
    async fn search_address(
        &self,
        query: &AddressQuery,
    ) -> Result<Option<GeoProperty>, DataClientError> {
        let request = self
            .http
            .post(self.url("/v1/property/search_address"))
            .json(&[query]);
        let page = self.fetch_page(request, ADDRESS_SEARCH).await?;
        Ok(decode_items::<GeoProperty>(page.items, ADDRESS_SEARCH)
            .into_iter()
            .next())
    }

    async fn search_markets(
        &self,
        zip_code: &str,
        state_abbreviation: &str,
    ) -> Result<Option<MarketSummary>, DataClientError> {
        let request = self.http.get(self.url("/v1/search/markets")).query(&[
            ("query", zip_code),
            ("state_abbreviation", state_abbreviation),
            ("location_type", "ZIP5"),
        ]);
        let page = self.fetch_page(request, MARKET_SEARCH).await?;
        Ok(decode_items::<MarketSummary>(page.items, MARKET_SEARCH)
            .into_iter()
            .next())
    }

    async fn search_properties(
        &self,
        parcl_id: &str,
        filter: &PropertyFilter,
    ) -> Result<Vec<GeoProperty>, DataClientError> {
        let mut properties = Vec::new();
        let mut offset = 0usize;

        for _ in 0..self.max_pages {
            let params = PropertySearchParams {
                parcl_id,
                property_type: &filter.property_type,
                square_footage_min: filter.min_sqft,
                square_footage_max: filter.max_sqft,
                bedrooms_min: filter.min_beds,
                bedrooms_max: filter.max_beds,
                bathrooms_min: filter.min_baths,
                bathrooms_max: filter.max_baths,
                year_built_min: filter.min_year_built,
                year_built_max: filter.max_year_built,
                event_history_sale_flag: filter.event_history_sale_flag,
                limit: self.page_size,
                offset,
            };
            let request = self
                .http
                .get(self.url("/v1/property/search"))
                .query(&params);
            let page = self.fetch_page(request, PROPERTY_SEARCH).await?;

            let received = page.items.len();
            properties.extend(decode_items::<GeoProperty>(page.items, PROPERTY_SEARCH));
            offset += received;

            let exhausted = page.total.map(|total| offset >= total).unwrap_or(false);
            if received < self.page_size || exhausted {
                break;
            }
        }

        debug!(parcl_id, count = properties.len(), "property search complete");
        Ok(properties)
    }

    async fn event_history(
        &self,
        property_ids: &[PropertyId],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<EventHistoryItem>, DataClientError> {
        let mut events = Vec::new();

        for batch in property_ids.chunks(self.page_size) {
            let payload = EventHistoryPayload {
                parcl_property_id: batch.iter().map(PropertyId::as_str).collect(),
                start_date: start_date.format("%Y-%m-%d").to_string(),
                end_date: end_date.format("%Y-%m-%d").to_string(),
            };
            let request = self
                .http
                .post(self.url("/v1/property/event_history"))
                .json(&payload);
            let page = self.fetch_page(request, EVENT_HISTORY).await?;
            events.extend(decode_items::<EventHistoryItem>(page.items, EVENT_HISTORY));
        }

        debug!(
            properties = property_ids.len(),
            events = events.len(),
            "event history fetched"
        );
        Ok(events)
    }
}
