//! Lenient field decoders for the property data API.
//!
//! Identifiers and numeric attributes arrive either as JSON numbers or as
//! strings depending on the endpoint, so every decoder here accepts both.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Flag(bool),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(value) => value,
            Scalar::Integer(value) => value.to_string(),
            Scalar::Unsigned(value) => value.to_string(),
            Scalar::Float(value) => value.to_string(),
            Scalar::Flag(value) => value.to_string(),
        }
    }

    fn into_number(self) -> Option<f64> {
        match self {
            Scalar::Text(value) => value.trim().parse::<f64>().ok(),
            Scalar::Integer(value) => Some(value as f64),
            Scalar::Unsigned(value) => Some(value as f64),
            Scalar::Float(value) => Some(value),
            Scalar::Flag(_) => None,
        }
        .filter(|value| value.is_finite())
    }
}

pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Scalar::deserialize(deserializer).map(Scalar::into_text)
}

pub(crate) fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value
        .map(Scalar::into_text)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty()))
}

pub(crate) fn optional_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.and_then(Scalar::into_number))
}

pub(crate) fn optional_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = optional_f64(deserializer)?;
    Ok(value
        .filter(|number| *number >= 0.0 && *number <= u32::MAX as f64)
        .map(|number| number.floor() as u32))
}

pub(crate) fn optional_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = optional_f64(deserializer)?;
    Ok(value
        .filter(|number| *number >= i32::MIN as f64 && *number <= i32::MAX as f64)
        .map(|number| number.trunc() as i32))
}

/// Accepts `YYYY-MM-DD` as well as RFC 3339 timestamps by reading the date prefix.
pub(crate) fn parse_event_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as an event date ({err})"))
}

pub(crate) fn event_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_event_date(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Record {
        #[serde(deserialize_with = "string_or_number")]
        id: String,
        #[serde(default, deserialize_with = "optional_f64")]
        amount: Option<f64>,
        #[serde(default, deserialize_with = "optional_u32")]
        beds: Option<u32>,
    }

    #[test]
    fn accepts_numbers_and_strings() {
        let record: Record =
            serde_json::from_str(r#"{"id": 123456, "amount": "1500.5", "beds": 3}"#)
                .expect("record decodes");
        assert_eq!(record.id, "123456");
        assert_eq!(record.amount, Some(1500.5));
        assert_eq!(record.beds, Some(3));
    }

    #[test]
    fn blanks_and_nulls_become_none() {
        let record: Record =
            serde_json::from_str(r#"{"id": "abc", "amount": "", "beds": null}"#)
                .expect("record decodes");
        assert_eq!(record.amount, None);
        assert_eq!(record.beds, None);
    }

    #[test]
    fn event_dates_accept_timestamps() {
        let date = parse_event_date("2025-03-14T00:00:00Z").expect("timestamp parses");
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date"));
        assert!(parse_event_date("March 14").is_err());
    }
}
