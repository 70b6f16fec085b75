use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Format of `eventFormattedDate`, e.g. `2024-03-09`
const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Length of a `YYYY-MM-DD` prefix
const DATE_KEY_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Machine-readable date, passed back to the test-center search.
    #[serde(rename = "eventFormattedDate")]
    pub date_key: String,
    /// Human-readable date, e.g. "March 9, 2024".
    #[serde(rename = "eventDisplayDate")]
    pub display_date: String,
}

impl Session {
    pub fn new(date_key: impl Into<String>, display_date: impl Into<String>) -> Self {
        Self {
            date_key: date_key.into(),
            display_date: display_date.into(),
        }
    }

    /// Calendar date of the session. Accepts a trailing time component
    /// (`2024-03-09T00:00:00`); anything else unparseable yields `None`.
    pub fn date(&self) -> Option<NaiveDate> {
        let prefix = self.date_key.get(..DATE_KEY_LEN).unwrap_or(&self.date_key);
        NaiveDate::parse_from_str(prefix, DATE_KEY_FORMAT).ok()
    }
}
