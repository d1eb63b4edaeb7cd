use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One bookable departure of a voyage, as read from `travel_dates`.
///
/// Columns this layer does not interpret are kept in `extra` and passed
/// through to clients unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelDate {
    pub id: i64,
    pub travel_slug: String,
    #[serde(deserialize_with = "utc_timestamp")]
    pub departure_date: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub published: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub custom_display: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub displayed_booked_seat: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub booked_dates: Vec<BookedDate>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A customer's booking or interest signal against a travel date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookedDate {
    pub id: i64,
    pub travel_date_id: i64,
    /// `0` means "interested, not yet paid". `None` contributes nothing.
    #[serde(default)]
    pub booked_places: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub deleted: bool,
}

/// A travel date as served to clients: bookings folded into `nbInterestedBy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelDateAvailability {
    pub id: i64,
    pub travel_slug: String,
    pub departure_date: DateTime<Utc>,
    pub published: bool,
    pub custom_display: bool,
    pub displayed_booked_seat: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(rename = "nbInterestedBy")]
    pub nb_interested_by: i64,
}

/// `timestamptz` columns render with an offset; plain `timestamp` columns
/// render without one and are taken as UTC.
fn utc_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(at) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
