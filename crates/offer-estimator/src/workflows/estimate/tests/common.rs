use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{Duration, NaiveDate};
use serde_json::Value;

use crate::data::{
    AddressQuery, DataClientError, EventHistoryItem, EventType, GeoProperty, MarketSummary,
    PropertyDataClient, PropertyFilter, PropertyId, EVENT_LISTED_RENT, EVENT_SOLD,
};
use crate::workflows::comparables::ComparableFinder;
use crate::workflows::estimate::EstimateService;
use crate::workflows::underwrite::{
    ConditionCostRow, MarketReferenceRow, ReferenceTables, StaticReferenceStore, UnderwriteDefaults,
    UnderwriteService,
};

pub(super) const SUBJECT_ADDRESS: &str = "4107 Beaver Ave, Des Moines, IA 50310";
const SUBJECT_LAT: f64 = 41.6257;
const SUBJECT_LON: f64 = -93.6733;
const MILES_PER_DEGREE_LAT: f64 = 69.093;

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 1).expect("valid date")
}

pub(super) fn subject() -> GeoProperty {
    let mut property = GeoProperty::located("5387041", SUBJECT_LAT, SUBJECT_LON);
    property.address = Some("4107 BEAVER AVE".to_string());
    property.city = Some("DES MOINES".to_string());
    property.state_abbreviation = Some("IA".to_string());
    property.county = Some("Polk".to_string());
    property.zip_code = Some("50310".to_string());
    property.property_type = Some("SINGLE_FAMILY".to_string());
    property.bedrooms = Some(3);
    property.bathrooms = Some(2.0);
    property.square_footage = Some(1_500.0);
    property.year_built = Some(1948);
    property
}

/// Neighbor due north of the subject, `miles` away.
pub(super) fn neighbor(id: &str, miles: f64) -> GeoProperty {
    GeoProperty::located(id, SUBJECT_LAT + miles / MILES_PER_DEGREE_LAT, SUBJECT_LON)
}

pub(super) fn event(
    id: &str,
    kind: EventType,
    date: NaiveDate,
    price: f64,
) -> EventHistoryItem {
    let event_name = match kind {
        EventType::Rental => EVENT_LISTED_RENT,
        _ => EVENT_SOLD,
    };
    EventHistoryItem {
        parcl_property_id: PropertyId::from(id),
        event_type: kind,
        event_name: event_name.to_string(),
        event_date: date,
        price: Some(price),
    }
}

pub(super) fn market() -> MarketSummary {
    MarketSummary {
        parcl_id: "2899841".to_string(),
        name: Some("50310".to_string()),
        state_abbreviation: Some("IA".to_string()),
        location_type: Some("ZIP5".to_string()),
    }
}

/// Four neighbors inside half a mile, eight more inside three quarters of a
/// mile and one outside the neighborhood, each with a recent sale.
pub(super) fn neighborhood_client(today: NaiveDate) -> FakeDataClient {
    let distances = [
        0.2, 0.3, 0.35, 0.45, 0.55, 0.58, 0.6, 0.62, 0.65, 0.68, 0.7, 0.72,
    ];
    let mut related = Vec::new();
    let mut events = Vec::new();
    for (index, miles) in distances.iter().enumerate() {
        let id = format!("n{index}");
        related.push(neighbor(&id, *miles));
        events.push(event(
            &id,
            EventType::Sale,
            today - Duration::days(20 + index as i64),
            300_000.0 + 5_000.0 * index as f64,
        ));
    }
    related.push(neighbor("far", 2.0));
    events.push(event("far", EventType::Sale, today - Duration::days(5), 900_000.0));

    FakeDataClient {
        subject: Some(subject()),
        market: Some(market()),
        related,
        events,
        ..FakeDataClient::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum RecordedCall {
    SearchAddress(AddressQuery),
    SearchMarkets {
        zip_code: String,
        state: String,
    },
    SearchProperties {
        parcl_id: String,
        filter: PropertyFilter,
    },
    EventHistory {
        property_ids: Vec<PropertyId>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
}

#[derive(Default)]
pub(super) struct FakeDataClient {
    pub(super) subject: Option<GeoProperty>,
    pub(super) market: Option<MarketSummary>,
    pub(super) related: Vec<GeoProperty>,
    pub(super) events: Vec<EventHistoryItem>,
    pub(super) unavailable: bool,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeDataClient {
    pub(super) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    fn record(&self, call: RecordedCall) -> Result<(), DataClientError> {
        self.calls.lock().expect("calls mutex poisoned").push(call);
        if self.unavailable {
            return Err(DataClientError::Status {
                endpoint: "fake",
                status: 503,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PropertyDataClient for FakeDataClient {
    async fn search_address(
        &self,
        query: &AddressQuery,
    ) -> Result<Option<GeoProperty>, DataClientError> {
        self.record(RecordedCall::SearchAddress(query.clone()))?;
        Ok(self.subject.clone())
    }

    async fn search_markets(
        &self,
        zip_code: &str,
        state_abbreviation: &str,
    ) -> Result<Option<MarketSummary>, DataClientError> {
        self.record(RecordedCall::SearchMarkets {
            zip_code: zip_code.to_string(),
            state: state_abbreviation.to_string(),
        })?;
        Ok(self.market.clone())
    }

    async fn search_properties(
        &self,
        parcl_id: &str,
        filter: &PropertyFilter,
    ) -> Result<Vec<GeoProperty>, DataClientError> {
        self.record(RecordedCall::SearchProperties {
            parcl_id: parcl_id.to_string(),
            filter: filter.clone(),
        })?;
        Ok(self.related.clone())
    }

    async fn event_history(
        &self,
        property_ids: &[PropertyId],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<EventHistoryItem>, DataClientError> {
        self.record(RecordedCall::EventHistory {
            property_ids: property_ids.to_vec(),
            start_date,
            end_date,
        })?;
        Ok(self
            .events
            .iter()
            .filter(|event| property_ids.contains(&event.parcl_property_id))
            .filter(|event| event.event_date >= start_date && event.event_date <= end_date)
            .cloned()
            .collect())
    }
}

pub(super) fn reference_store() -> StaticReferenceStore {
    StaticReferenceStore::new(ReferenceTables {
        markets: vec![MarketReferenceRow {
            state: "IA".to_string(),
            county: "Polk".to_string(),
            reference_market: "Des Moines".to_string(),
            cap_rate: 7.5,
            operating_expense: 35.0,
        }],
        calculation_reference: None,
        conditions: vec![ConditionCostRow {
            condition: "Fixer".to_string(),
            low_cost: 30.0,
            high_cost: 50.0,
            active: true,
        }],
    })
}

pub(super) fn build_service(
    client: FakeDataClient,
) -> (
    EstimateService<FakeDataClient, StaticReferenceStore>,
    Arc<FakeDataClient>,
) {
    let client = Arc::new(client);
    let underwrite = UnderwriteService::new(Arc::new(reference_store()), UnderwriteDefaults::standard());
    let service = EstimateService::new(client.clone(), ComparableFinder::default(), underwrite);
    (service, client)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
