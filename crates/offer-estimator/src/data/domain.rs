use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::wire;
use crate::geo::{GeoPoint, Located};

pub const SINGLE_FAMILY: &str = "SINGLE_FAMILY";

/// Property identifier assigned by the data provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PropertyId(pub String);

impl<'de> Deserialize<'de> for PropertyId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        wire::string_or_number(deserializer).map(|raw| PropertyId(raw.trim().to_string()))
    }
}

impl PropertyId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PropertyId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Snapshot of a property as returned by the data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoProperty {
    pub parcl_property_id: PropertyId,
    #[serde(default, deserialize_with = "wire::optional_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "wire::optional_f64")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub state_abbreviation: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub county: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub zip_code: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub property_type: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_u32")]
    pub bedrooms: Option<u32>,
    #[serde(default, deserialize_with = "wire::optional_f64")]
    pub bathrooms: Option<f64>,
    #[serde(default, deserialize_with = "wire::optional_f64")]
    pub square_footage: Option<f64>,
    #[serde(default, deserialize_with = "wire::optional_i32")]
    pub year_built: Option<i32>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub current_entity_owner_name: Option<String>,
}

impl GeoProperty {
    /// Minimal constructor for a located property; descriptive fields stay empty.
    pub fn located(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            parcl_property_id: PropertyId(id.into()),
            latitude: Some(latitude),
            longitude: Some(longitude),
            address: None,
            city: None,
            state_abbreviation: None,
            county: None,
            zip_code: None,
            property_type: None,
            bedrooms: None,
            bathrooms: None,
            square_footage: None,
            year_built: None,
            current_entity_owner_name: None,
        }
    }

    /// Properties without a declared type are treated as single family.
    pub fn is_single_family(&self) -> bool {
        self.property_type
            .as_deref()
            .map(|kind| kind.eq_ignore_ascii_case(SINGLE_FAMILY))
            .unwrap_or(true)
    }
}

impl Located for GeoProperty {
    fn location(&self) -> Option<GeoPoint> {
        GeoPoint::from_parts(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Sale,
    Rental,
    #[serde(other)]
    Other,
}

/// Event name the provider uses for a closed sale.
pub const EVENT_SOLD: &str = "SOLD";
/// Event name the provider uses for a rental listing.
pub const EVENT_LISTED_RENT: &str = "LISTED_RENT";

/// One entry from a property's sale/rental history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventHistoryItem {
    pub parcl_property_id: PropertyId,
    pub event_type: EventType,
    pub event_name: String,
    #[serde(deserialize_with = "wire::event_date")]
    pub event_date: NaiveDate,
    #[serde(default, deserialize_with = "wire::optional_f64")]
    pub price: Option<f64>,
}

impl EventHistoryItem {
    pub fn is_completed_sale(&self) -> bool {
        self.event_type == EventType::Sale && self.event_name == EVENT_SOLD
    }

    pub fn is_rent_listing(&self) -> bool {
        self.event_type == EventType::Rental && self.event_name == EVENT_LISTED_RENT
    }

    /// Price used for ordering; unpriced events sort as zero.
    pub fn price_or_zero(&self) -> f64 {
        self.price.unwrap_or(0.0)
    }
}

/// Market (ZIP-level) match returned by the market search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    #[serde(deserialize_with = "wire::string_or_number")]
    pub parcl_id: String,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub state_abbreviation: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub location_type: Option<String>,
}

/// Structured address used for the provider's address search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressQuery {
    pub address: String,
    pub city: String,
    pub state_abbreviation: String,
    pub zip_code: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address is missing the {0} component")]
    MissingComponent(&'static str),
}

impl AddressQuery {
    /// Parses `"123 Main St, Des Moines, IA 50309"` style strings.
    ///
    /// The street is upper-cased and whitespace is stripped from the city to
    /// match the provider's address index.
    pub fn parse_formatted(formatted: &str) -> Result<Self, AddressError> {
        let mut parts = formatted.split(',').map(str::trim);

        let address = parts
            .next()
            .filter(|street| !street.is_empty())
            .map(str::to_uppercase)
            .ok_or(AddressError::MissingComponent("street"))?;
        let city: String = parts
            .next()
            .unwrap_or_default()
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .collect();

        let mut state_zip = parts.next().unwrap_or_default().split_whitespace();
        let state_abbreviation = state_zip
            .next()
            .map(str::to_string)
            .ok_or(AddressError::MissingComponent("state"))?;
        let zip_code = state_zip
            .next()
            .map(str::to_string)
            .ok_or(AddressError::MissingComponent("zip code"))?;

        Ok(Self {
            address,
            city,
            state_abbreviation,
            zip_code,
        })
    }
}

/// Attribute filters for the neighborhood property search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyFilter {
    pub property_type: String,
    pub min_beds: u32,
    pub max_beds: u32,
    pub min_baths: u32,
    pub max_baths: u32,
    pub min_sqft: u32,
    pub max_sqft: u32,
    pub min_year_built: i32,
    pub max_year_built: i32,
    pub event_history_sale_flag: bool,
}

impl PropertyFilter {
    /// Builds the similarity window around a subject property.
    pub fn for_subject(subject: &GeoProperty) -> Self {
        let beds = subject.bedrooms.filter(|beds| *beds > 0).unwrap_or(3);
        let baths = subject
            .bathrooms
            .map(|baths| baths.floor())
            .filter(|baths| *baths >= 1.0)
            .map(|baths| baths as u32)
            .unwrap_or(1);
        let (min_sqft, max_sqft) = match subject.square_footage.filter(|sqft| *sqft > 0.0) {
            Some(sqft) => ((sqft * 0.8).floor() as u32, (sqft * 1.05).ceil() as u32),
            None => (800, 1050),
        };
        let (min_year_built, max_year_built) = subject
            .year_built
            .filter(|year| *year > 0)
            .and_then(|year| Some((year.checked_sub(20)?, year.checked_add(20)?)))
            .unwrap_or((1950, 1960));

        Self {
            property_type: subject
                .property_type
                .clone()
                .unwrap_or_else(|| SINGLE_FAMILY.to_string()),
            min_beds: beds,
            max_beds: beds,
            min_baths: baths,
            max_baths: baths,
            min_sqft,
            max_sqft,
            min_year_built,
            max_year_built,
            event_history_sale_flag: true,
        }
    }
}
