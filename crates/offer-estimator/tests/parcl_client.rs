use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use offer_estimator::config::DataClientConfig;
use offer_estimator::data::{
    AddressQuery, DataClientError, GeoProperty, ParclLabsClient, PropertyDataClient,
    PropertyFilter, PropertyId,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

const API_KEY: &str = "test-key";

/// Requests seen by the local provider, in arrival order.
#[derive(Clone, Default)]
struct Recorded(Arc<Mutex<Vec<Value>>>);

impl Recorded {
    fn push(&self, value: Value) {
        self.0.lock().expect("recorder lock").push(value);
    }

    fn take(&self) -> Vec<Value> {
        std::mem::take(&mut *self.0.lock().expect("recorder lock"))
    }
}

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local provider");
    let addr = listener.local_addr().expect("local provider address");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("local provider serves");
    });
    format!("http://{addr}")
}

fn client(base_url: &str, page_size: usize, max_pages: usize) -> ParclLabsClient {
    ParclLabsClient::new(&DataClientConfig {
        base_url: format!("{base_url}/"),
        api_key: Some(API_KEY.to_string()),
        timeout_secs: 5,
        page_size,
        max_pages,
    })
    .expect("client builds")
}

fn address() -> AddressQuery {
    AddressQuery::parse_formatted("123 Main St, Des Moines, IA 50309").expect("address parses")
}

fn filter() -> PropertyFilter {
    PropertyFilter::for_subject(&GeoProperty::located("subject", 41.6, -93.6))
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn property(id: usize) -> Value {
    json!({"parcl_property_id": id, "latitude": 41.6, "longitude": -93.6})
}

#[tokio::test]
async fn not_found_responses_are_empty_results() {
    let base_url = serve(Router::new()).await;
    let client = client(&base_url, 100, 3);

    let found = client
        .search_address(&address())
        .await
        .expect("404 is not an error");
    assert!(found.is_none());

    let market = client
        .search_markets("50309", "IA")
        .await
        .expect("404 is not an error");
    assert!(market.is_none());

    let properties = client
        .search_properties("5826765", &filter())
        .await
        .expect("404 is not an error");
    assert!(properties.is_empty());

    let events = client
        .event_history(&[PropertyId::from("1")], date(2025, 4, 1), date(2025, 10, 1))
        .await
        .expect("404 is not an error");
    assert!(events.is_empty());
}

#[tokio::test]
async fn server_errors_surface_as_status() {
    let router = Router::new().fallback(|| async { StatusCode::INTERNAL_SERVER_ERROR });
    let base_url = serve(router).await;
    let client = client(&base_url, 100, 3);

    match client.search_markets("50309", "IA").await {
        Err(DataClientError::Status { endpoint, status }) => {
            assert_eq!(endpoint, "search_markets");
            assert_eq!(status, 500);
        }
        other => panic!("expected status error, got {other:?}"),
    }

    match client.search_address(&address()).await {
        Err(DataClientError::Status { endpoint, status }) => {
            assert_eq!(endpoint, "search_address");
            assert_eq!(status, 500);
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn lookups_send_key_and_query_shapes() {
    async fn address_search(
        State(recorded): State<Recorded>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let auth = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        recorded.push(json!({"authorization": auth, "body": body}));
        Json(json!({"items": [property(42)]}))
    }

    async fn market_search(
        State(recorded): State<Recorded>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Json<Value> {
        recorded.push(json!(params));
        Json(json!({"items": [{"parcl_id": 5826765, "name": "50309"}]}))
    }

    let recorded = Recorded::default();
    let router = Router::new()
        .route("/v1/property/search_address", post(address_search))
        .route("/v1/search/markets", get(market_search))
        .with_state(recorded.clone());
    let base_url = serve(router).await;
    let client = client(&base_url, 100, 3);

    let found = client
        .search_address(&address())
        .await
        .expect("address search succeeds")
        .expect("address matched");
    assert_eq!(found.parcl_property_id.as_str(), "42");

    let market = client
        .search_markets("50309", "IA")
        .await
        .expect("market search succeeds")
        .expect("market matched");
    assert_eq!(market.parcl_id, "5826765");

    let calls = recorded.take();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0]["authorization"], API_KEY);
    assert_eq!(calls[0]["body"][0]["address"], "123 MAIN ST");
    assert_eq!(calls[0]["body"][0]["zip_code"], "50309");
    assert_eq!(
        calls[1],
        json!({"query": "50309", "state_abbreviation": "IA", "location_type": "ZIP5"})
    );
}

#[tokio::test]
async fn property_search_pages_until_a_short_page() {
    async fn property_search(
        State(recorded): State<Recorded>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Json<Value> {
        let offset: usize = params
            .get("offset")
            .and_then(|value| value.parse().ok())
            .unwrap_or_default();
        recorded.push(json!(params));
        let count = if offset < 4 { 2 } else { 1 };
        let items: Vec<Value> = (offset..offset + count).map(property).collect();
        Json(json!({"items": items}))
    }

    let recorded = Recorded::default();
    let router = Router::new()
        .route("/v1/property/search", get(property_search))
        .with_state(recorded.clone());
    let base_url = serve(router).await;

    let properties = client(&base_url, 2, 10)
        .search_properties("5826765", &filter())
        .await
        .expect("property search succeeds");

    let ids: Vec<&str> = properties
        .iter()
        .map(|property| property.parcl_property_id.as_str())
        .collect();
    assert_eq!(ids, vec!["0", "1", "2", "3", "4"]);

    let calls = recorded.take();
    let offsets: Vec<&Value> = calls.iter().map(|call| &call["offset"]).collect();
    assert_eq!(offsets, vec!["0", "2", "4"]);
    for call in &calls {
        assert_eq!(call["limit"], "2");
        assert_eq!(call["parcl_id"], "5826765");
        assert_eq!(call["property_type"], "SINGLE_FAMILY");
    }
}

#[tokio::test]
async fn property_search_stops_at_reported_total_or_page_cap() {
    async fn full_pages(
        State(recorded): State<Recorded>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Json<Value> {
        let offset: usize = params
            .get("offset")
            .and_then(|value| value.parse().ok())
            .unwrap_or_default();
        recorded.push(json!(params));
        let items: Vec<Value> = (offset..offset + 2).map(property).collect();
        Json(json!({"items": items, "total": 4}))
    }

    let recorded = Recorded::default();
    let router = Router::new()
        .route("/v1/property/search", get(full_pages))
        .with_state(recorded.clone());
    let base_url = serve(router).await;

    let properties = client(&base_url, 2, 10)
        .search_properties("5826765", &filter())
        .await
        .expect("property search succeeds");
    assert_eq!(properties.len(), 4);
    assert_eq!(recorded.take().len(), 2);

    let capped = client(&base_url, 2, 1)
        .search_properties("5826765", &filter())
        .await
        .expect("property search succeeds");
    assert_eq!(capped.len(), 2);
    assert_eq!(recorded.take().len(), 1);
}

#[tokio::test]
async fn event_history_posts_one_batch_per_page_of_ids() {
    async fn event_history(
        State(recorded): State<Recorded>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let items: Vec<Value> = body["parcl_property_id"]
            .as_array()
            .map(|ids| {
                ids.iter()
                    .map(|id| {
                        json!({"parcl_property_id": id, "event_type": "SALE",
                               "event_name": "SOLD", "event_date": "2025-06-01",
                               "price": 300000})
                    })
                    .collect()
            })
            .unwrap_or_default();
        recorded.push(body);
        Json(json!({"items": items}))
    }

    let recorded = Recorded::default();
    let router = Router::new()
        .route("/v1/property/event_history", post(event_history))
        .with_state(recorded.clone());
    let base_url = serve(router).await;

    let ids: Vec<PropertyId> = ["1", "2", "3", "4", "5"]
        .into_iter()
        .map(PropertyId::from)
        .collect();
    let events = client(&base_url, 2, 3)
        .event_history(&ids, date(2025, 4, 1), date(2025, 10, 1))
        .await
        .expect("event history succeeds");
    assert_eq!(events.len(), 5);
    assert!(events.iter().all(|event| event.is_completed_sale()));

    let calls = recorded.take();
    let batches: Vec<&Value> = calls.iter().map(|call| &call["parcl_property_id"]).collect();
    assert_eq!(
        batches,
        vec![&json!(["1", "2"]), &json!(["3", "4"]), &json!(["5"])]
    );
    for call in &calls {
        assert_eq!(call["start_date"], "2025-04-01");
        assert_eq!(call["end_date"], "2025-10-01");
    }
}
