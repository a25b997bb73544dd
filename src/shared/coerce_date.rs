//! Lenient date/time deserialization for request bodies.
//!
//! Clients send trip dates in several shapes: full RFC 3339 timestamps,
//! naive ISO datetimes, plain calendar dates or epoch milliseconds. Values
//! without an offset are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum DateInput {
  Millis(i64),
  Text(String),
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
  D: Deserializer<'de>,
{
  match DateInput::deserialize(deserializer)? {
    DateInput::Millis(millis) => DateTime::from_timestamp_millis(millis)
      .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {millis}"))),
    DateInput::Text(text) => parse_date(&text)
      .ok_or_else(|| de::Error::custom(format!("invalid date: {text:?}"))),
  }
}

pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
  let text = text.trim();
  DateTime::parse_from_rfc3339(text)
    .map(|date| date.with_timezone(&Utc))
    .ok()
    .or_else(|| {
      NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
    })
    .or_else(|| {
      NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
    })
}
