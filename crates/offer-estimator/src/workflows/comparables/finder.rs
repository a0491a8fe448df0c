use chrono::{Months, NaiveDate};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::domain::{ComparableProperty, ComparableSearchResult};
use super::strategy::{ComparableStrategy, StrategyTier};
use crate::data::{EventHistoryItem, GeoProperty};
use crate::geo::{self, GeoPoint, Located};

/// Adaptive comparable search over an ordered list of radius/lookback tiers.
#[derive(Debug, Clone, Default)]
pub struct ComparableFinder {
    strategy: ComparableStrategy,
}

impl ComparableFinder {
    pub fn new(strategy: ComparableStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> &ComparableStrategy {
        &self.strategy
    }

    /// Walks the tiers and returns the first one with enough comparables,
    /// falling back to the widest tier's result.
    pub fn find(
        &self,
        target: &GeoProperty,
        candidates: &[GeoProperty],
        events: &[EventHistoryItem],
        today: NaiveDate,
    ) -> ComparableSearchResult {
        let widest = self.strategy.widest();
        let Some(origin) = target.location() else {
            warn!(
                property_id = %target.parcl_property_id,
                "target property has no usable coordinates, skipping comparable search"
            );
            return ComparableSearchResult::empty(widest.radius_miles, widest.lookback_months);
        };

        info!(
            candidates = candidates.len(),
            events = events.len(),
            "finding comparable properties with adaptive strategy"
        );

        let tiers = self.strategy.tiers();
        let mut fallback = None;
        for (index, tier) in tiers.iter().enumerate() {
            let result = search_tier(origin, candidates, events, *tier, today);

            if result.len() >= self.strategy.sufficient_count() {
                info!(
                    count = result.len(),
                    radius_miles = tier.radius_miles,
                    months = tier.lookback_months,
                    "found sufficient comparable properties"
                );
                return result;
            }

            info!(
                count = result.len(),
                radius_miles = tier.radius_miles,
                months = tier.lookback_months,
                next_tier = ?tiers.get(index + 1),
                "insufficient comparable properties, widening search"
            );
            fallback = Some(result);
        }

        fallback.unwrap_or_else(|| {
            ComparableSearchResult::empty(widest.radius_miles, widest.lookback_months)
        })
    }
}

/// Comparable set for a single tier: latest sale and latest rent listing per
/// property inside the radius and lookback window, merged so each property
/// appears once with its most recent event, ordered by distance.
pub fn search_tier(
    origin: GeoPoint,
    candidates: &[GeoProperty],
    events: &[EventHistoryItem],
    tier: StrategyTier,
    today: NaiveDate,
) -> ComparableSearchResult {
    let cutoff = lookback_cutoff(today, tier.lookback_months);

    let mut in_radius: HashMap<&str, (&GeoProperty, f64)> = HashMap::new();
    for property in geo::filter_within_radius(origin, candidates, tier.radius_miles) {
        if let Some(point) = property.location() {
            in_radius
                .entry(property.parcl_property_id.as_str())
                .or_insert((property, geo::distance_miles(origin, point)));
        }
    }

    let qualifies = |event: &&EventHistoryItem| -> bool {
        event.event_date >= cutoff && in_radius.contains_key(event.parcl_property_id.as_str())
    };

    let sales = latest_per_property(
        events
            .iter()
            .filter(|event| event.is_completed_sale())
            .filter(&qualifies),
    );
    let rentals = latest_per_property(
        events
            .iter()
            .filter(|event| event.is_rent_listing())
            .filter(&qualifies),
    );
    debug!(
        properties_in_radius = in_radius.len(),
        properties_with_sales = sales.len(),
        properties_with_rentals = rentals.len(),
        radius_miles = tier.radius_miles,
        %cutoff,
        "collected latest qualifying events"
    );

    let mut properties: Vec<ComparableProperty> =
        latest_per_property(sales.into_iter().chain(rentals))
            .into_iter()
            .filter_map(|event| {
                let (property, distance) = in_radius.get(event.parcl_property_id.as_str())?;
                Some(ComparableProperty {
                    property: (*property).clone(),
                    event: event.clone(),
                    distance_miles: *distance,
                })
            })
            .collect();
    properties.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));

    ComparableSearchResult {
        properties,
        radius_used: tier.radius_miles,
        months_used: tier.lookback_months,
    }
}

/// Keeps one event per property id: the later date wins, earlier insertion
/// wins ties, and each id keeps the position of its first appearance.
fn latest_per_property<'a>(
    events: impl IntoIterator<Item = &'a EventHistoryItem>,
) -> Vec<&'a EventHistoryItem> {
    let mut latest: Vec<&EventHistoryItem> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for event in events {
        match slots.get(event.parcl_property_id.as_str()) {
            Some(&slot) => {
                if event.event_date > latest[slot].event_date {
                    latest[slot] = event;
                }
            }
            None => {
                slots.insert(event.parcl_property_id.as_str(), latest.len());
                latest.push(event);
            }
        }
    }

    latest
}

pub(crate) fn lookback_cutoff(today: NaiveDate, months: u32) -> NaiveDate {
    today
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{EventType, PropertyId, EVENT_LISTED_RENT, EVENT_SOLD};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 1).expect("valid date")
    }

    fn event(id: &str, kind: EventType, name: &str, date: NaiveDate, price: f64) -> EventHistoryItem {
        EventHistoryItem {
            parcl_property_id: PropertyId::from(id),
            event_type: kind,
            event_name: name.to_string(),
            event_date: date,
            price: Some(price),
        }
    }

    fn days_ago(days: i64) -> NaiveDate {
        today() - chrono::Duration::days(days)
    }

    #[test]
    fn cutoff_uses_calendar_months() {
        assert_eq!(
            lookback_cutoff(today(), 3),
            NaiveDate::from_ymd_opt(2025, 7, 1).expect("valid date")
        );
        assert_eq!(
            lookback_cutoff(NaiveDate::from_ymd_opt(2025, 8, 31).expect("valid"), 6),
            NaiveDate::from_ymd_opt(2025, 2, 28).expect("valid")
        );
    }

    #[test]
    fn keeps_latest_sale_per_property() {
        let origin = GeoPoint::new(0.0, 0.0);
        let candidates = vec![GeoProperty::located("a", 0.0, 0.001)];
        let events = vec![
            event("a", EventType::Sale, EVENT_SOLD, days_ago(60), 200_000.0),
            event("a", EventType::Sale, EVENT_SOLD, days_ago(10), 215_000.0),
            event("a", EventType::Sale, EVENT_SOLD, days_ago(30), 210_000.0),
        ];

        let result = search_tier(origin, &candidates, &events, StrategyTier::new(0.5, 3), today());
        assert_eq!(result.len(), 1);
        assert_eq!(result.properties[0].price(), Some(215_000.0));
    }

    #[test]
    fn later_rental_replaces_earlier_sale() {
        let origin = GeoPoint::new(0.0, 0.0);
        let candidates = vec![GeoProperty::located("a", 0.0, 0.001)];
        let events = vec![
            event("a", EventType::Sale, EVENT_SOLD, days_ago(40), 200_000.0),
            event("a", EventType::Rental, EVENT_LISTED_RENT, days_ago(5), 1_800.0),
        ];

        let result = search_tier(origin, &candidates, &events, StrategyTier::new(0.5, 3), today());
        assert_eq!(result.len(), 1);
        assert_eq!(*result.properties[0].event_type(), EventType::Rental);
    }

    #[test]
    fn same_day_sale_and_rental_prefers_sale() {
        let origin = GeoPoint::new(0.0, 0.0);
        let candidates = vec![GeoProperty::located("a", 0.0, 0.001)];
        let events = vec![
            event("a", EventType::Rental, EVENT_LISTED_RENT, days_ago(5), 1_800.0),
            event("a", EventType::Sale, EVENT_SOLD, days_ago(5), 200_000.0),
        ];

        let result = search_tier(origin, &candidates, &events, StrategyTier::new(0.5, 3), today());
        assert_eq!(*result.properties[0].event_type(), EventType::Sale);
    }

    #[test]
    fn ignores_unqualified_events() {
        let origin = GeoPoint::new(0.0, 0.0);
        let candidates = vec![
            GeoProperty::located("near", 0.0, 0.001),
            GeoProperty::located("far", 0.0, 0.5),
        ];
        let events = vec![
            event("near", EventType::Sale, "LISTED_SALE", days_ago(5), 1.0),
            event("near", EventType::Rental, "LISTING_REMOVED", days_ago(5), 1.0),
            event("near", EventType::Sale, EVENT_SOLD, days_ago(200), 1.0),
            event("far", EventType::Sale, EVENT_SOLD, days_ago(5), 1.0),
            event("unknown", EventType::Sale, EVENT_SOLD, days_ago(5), 1.0),
        ];

        let result = search_tier(origin, &candidates, &events, StrategyTier::new(1.0, 6), today());
        assert!(result.is_empty());
    }

    #[test]
    fn target_without_coordinates_yields_widest_empty_result() {
        let mut target = GeoProperty::located("t", 0.0, 0.0);
        target.latitude = None;

        let result = ComparableFinder::default().find(&target, &[], &[], today());
        assert!(result.is_empty());
        assert_eq!((result.radius_used, result.months_used), (1.5, 6));
    }
}
