use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::utils::{round_to_cents, title_case};

const DEFAULT_NAME: &str = "Unknown School";
const DEFAULT_ADDRESS: &str = "Address";
const DEFAULT_CITY: &str = "City";
const DEFAULT_STATE: &str = "State";
const DEFAULT_ZIP: &str = "Zip";

/// A test center exactly as the search endpoint returns it.
/// Every field is optional; missing values are defaulted by [`normalize_school`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSchool {
    pub name: Option<String>,
    pub distance: Option<f64>,
    pub address1: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    /// Sent as a bool, a number or a string depending on the record.
    #[serde(rename = "seatAvailability", default, deserialize_with = "deserialize_truthy")]
    pub seat_availability: Option<bool>,
}

/// Accept any JSON value for a flag: `null` is absent, booleans are taken
/// as-is, numbers are true unless zero, strings unless empty. Arrays and
/// objects count as true.
fn deserialize_truthy<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::Bool(b) => Some(b),
        Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan())),
        Value::String(s) => Some(!s.is_empty()),
        Value::Array(_) | Value::Object(_) => Some(true),
    })
}

/// A test center with open seats, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct School {
    pub name: String,
    pub address: String,
    /// Miles from the queried zip code, rounded to two decimals.
    pub distance: f64,
}

impl School {
    pub fn distance_display(&self) -> String {
        format!("{:.2}", self.distance)
    }
}

/// Only centers reporting open seats are kept.
pub fn is_eligible(raw: &RawSchool) -> bool {
    raw.seat_availability.unwrap_or(false)
}

/// Map a raw record to a [`School`], substituting placeholders for
/// missing fields. API-provided names and street/city are title-cased and
/// states upper-cased; placeholders are used as-is.
pub fn normalize_school(raw: &RawSchool) -> School {
    let name = raw
        .name
        .as_deref()
        .map(title_case)
        .unwrap_or_else(|| DEFAULT_NAME.to_string());
    let address1 = raw
        .address1
        .as_deref()
        .map(title_case)
        .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());
    let city = raw
        .city
        .as_deref()
        .map(title_case)
        .unwrap_or_else(|| DEFAULT_CITY.to_string());
    let state = raw
        .state
        .as_deref()
        .map(str::to_uppercase)
        .unwrap_or_else(|| DEFAULT_STATE.to_string());
    let zip = raw.zip.as_deref().unwrap_or(DEFAULT_ZIP);

    School {
        name,
        address: format!("{} {} {} {}", address1, city, state, zip),
        distance: round_to_cents(raw.distance.unwrap_or(0.0)),
    }
}
