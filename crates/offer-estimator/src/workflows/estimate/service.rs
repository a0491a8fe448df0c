use std::collections::HashSet;
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use super::domain::{EstimateRequest, OfferEstimate};
use crate::data::{
    AddressError, AddressQuery, DataClientError, GeoProperty, PropertyDataClient, PropertyFilter,
    PropertyId,
};
use crate::geo::{self, Located};
use crate::workflows::comparables::{lookback_cutoff, ComparableFinder, ComparableSearchResult};
use crate::workflows::underwrite::{ReferenceStore, SubjectProfile, UnderwriteService};

/// End-to-end estimate: address lookup, neighborhood search, comparables and
/// underwriting.
pub struct EstimateService<C, S> {
    client: Arc<C>,
    finder: ComparableFinder,
    underwrite: UnderwriteService<S>,
}

impl<C, S> EstimateService<C, S>
where
    C: PropertyDataClient + 'static,
    S: ReferenceStore + 'static,
{
    pub fn new(client: Arc<C>, finder: ComparableFinder, underwrite: UnderwriteService<S>) -> Self {
        Self {
            client,
            finder,
            underwrite,
        }
    }

    pub fn finder(&self) -> &ComparableFinder {
        &self.finder
    }

    pub fn underwrite_service(&self) -> &UnderwriteService<S> {
        &self.underwrite
    }

    pub async fn estimate(&self, request: EstimateRequest) -> Result<OfferEstimate, EstimateError> {
        self.estimate_on(request, Local::now().date_naive()).await
    }

    /// Runs the pipeline as of `today`, which anchors every lookback window.
    pub async fn estimate_on(
        &self,
        request: EstimateRequest,
        today: NaiveDate,
    ) -> Result<OfferEstimate, EstimateError> {
        let query = AddressQuery::parse_formatted(&request.formatted_address)?;
        info!(
            address = %query.address,
            city = %query.city,
            state = %query.state_abbreviation,
            "processing estimate request"
        );

        let subject = self
            .client
            .search_address(&query)
            .await?
            .ok_or_else(|| EstimateError::PropertyNotFound(request.formatted_address.clone()))?;
        let profile = SubjectProfile::from_property(&subject, request.condition.clone());

        if !subject.is_single_family() {
            info!(
                property_id = %subject.parcl_property_id,
                property_type = subject.property_type.as_deref().unwrap_or_default(),
                "non single-family subject, skipping comparable search"
            );
            let underwrite = self.underwrite.underwrite(&[], &profile);
            return Ok(OfferEstimate::from_search(
                subject,
                ComparableSearchResult::empty(0.0, 0),
                underwrite,
            ));
        }

        let market = self
            .client
            .search_markets(&query.zip_code, &query.state_abbreviation)
            .await?
            .ok_or_else(|| EstimateError::MarketNotFound {
                zip_code: query.zip_code.clone(),
                state: query.state_abbreviation.clone(),
            })?;

        let filter = PropertyFilter::for_subject(&subject);
        let related = self
            .client
            .search_properties(&market.parcl_id, &filter)
            .await?;

        let widest = self.finder.strategy().widest();
        let neighborhood = neighborhood(&subject, &related, widest.radius_miles);
        info!(
            related = related.len(),
            neighborhood = neighborhood.len(),
            radius_miles = widest.radius_miles,
            "neighborhood properties collected"
        );

        let property_ids = unique_property_ids(&neighborhood);
        if property_ids.is_empty() {
            warn!(
                property_id = %subject.parcl_property_id,
                "no neighborhood properties for event history search"
            );
            let underwrite = self.underwrite.underwrite(&[], &profile);
            return Ok(OfferEstimate::from_search(
                subject,
                ComparableSearchResult::empty(widest.radius_miles, widest.lookback_months),
                underwrite,
            ));
        }

        let start_date = lookback_cutoff(today, widest.lookback_months);
        let events = self
            .client
            .event_history(&property_ids, start_date, today)
            .await?;

        let search = self.finder.find(&subject, &neighborhood, &events, today);
        info!(
            count = search.len(),
            radius_used = search.radius_used,
            months_used = search.months_used,
            "comparable properties analysis completed"
        );

        let underwrite = self.underwrite.underwrite(&search.properties, &profile);
        Ok(OfferEstimate::from_search(subject, search, underwrite))
    }
}

fn neighborhood(subject: &GeoProperty, related: &[GeoProperty], radius_miles: f64) -> Vec<GeoProperty> {
    match subject.location() {
        Some(origin) => geo::filter_within_radius(origin, related, radius_miles)
            .into_iter()
            .cloned()
            .collect(),
        None => Vec::new(),
    }
}

fn unique_property_ids(properties: &[GeoProperty]) -> Vec<PropertyId> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for property in properties {
        let id = &property.parcl_property_id;
        if !id.as_str().is_empty() && seen.insert(id.as_str()) {
            ids.push(id.clone());
        }
    }
    ids
}

#[derive(Debug, thiserror::Error)]
pub enum EstimateError {
    #[error("invalid address format: {0}")]
    InvalidAddress(#[from] AddressError),
    #[error("could not retrieve property data for '{0}'")]
    PropertyNotFound(String),
    #[error("could not retrieve market data for {state} {zip_code}")]
    MarketNotFound { zip_code: String, state: String },
    #[error("property data provider failed: {0}")]
    DataClient(#[from] DataClientError),
}

impl EstimateError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EstimateError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
            EstimateError::PropertyNotFound(_) | EstimateError::MarketNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            EstimateError::DataClient(DataClientError::MissingApiKey) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            EstimateError::DataClient(_) => StatusCode::BAD_GATEWAY,
        }
    }
}
