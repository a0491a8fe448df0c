use serde::{Deserialize, Serialize};

use crate::data::{EventHistoryItem, EventType, GeoProperty};

/// A neighboring property paired with the event that qualified it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparableProperty {
    pub property: GeoProperty,
    #[serde(rename = "event_details")]
    pub event: EventHistoryItem,
    #[serde(rename = "distance_in_miles")]
    pub distance_miles: f64,
}

impl ComparableProperty {
    pub fn event_type(&self) -> &EventType {
        &self.event.event_type
    }

    pub fn price(&self) -> Option<f64> {
        self.event.price
    }
}

/// Outcome of the adaptive search, including the tier that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparableSearchResult {
    pub properties: Vec<ComparableProperty>,
    pub radius_used: f64,
    pub months_used: u32,
}

impl ComparableSearchResult {
    pub fn empty(radius_used: f64, months_used: u32) -> Self {
        Self {
            properties: Vec::new(),
            radius_used,
            months_used,
        }
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn sales(&self) -> impl Iterator<Item = &ComparableProperty> {
        self.properties
            .iter()
            .filter(|comp| comp.event.event_type == EventType::Sale)
    }

    pub fn rentals(&self) -> impl Iterator<Item = &ComparableProperty> {
        self.properties
            .iter()
            .filter(|comp| comp.event.event_type == EventType::Rental)
    }
}
