//! Row model for the results table.
//!
//! Rows are a pure function of the cached groups and the distance
//! threshold, so front-ends only have to draw them.

use reqwest::Url;

use crate::models::DateGroup;
use crate::utils::format_miles;

/// Base of the external map search linked from each address.
pub const MAP_SEARCH_URL: &str = "https://www.google.com/maps/search/";

#[derive(Debug, Clone, PartialEq)]
pub enum ResultRow {
    /// Section header spanning every column.
    Date { display_date: String },
    School {
        name: String,
        address: String,
        map_url: String,
        /// Formatted, e.g. `3.14 mi`
        distance: String,
    },
}

impl ResultRow {
    pub fn is_school(&self) -> bool {
        matches!(self, ResultRow::School { .. })
    }
}

pub fn header_text(zip: &str) -> String {
    format!("Search results for {}", zip)
}

/// Map search for a free-form address, with the query percent-encoded.
pub fn map_search_url(address: &str) -> String {
    // Only the constant base is parsed, so this never fails in practice;
    // the bare base is still a working link if it ever did.
    match Url::parse_with_params(MAP_SEARCH_URL, &[("api", "1"), ("query", address)]) {
        Ok(url) => url.to_string(),
        Err(_) => MAP_SEARCH_URL.to_string(),
    }
}

/// Build table rows for every school within `max_distance` miles (inclusive).
/// Dates with no school in range produce no rows at all.
pub fn build_rows(groups: &[DateGroup], max_distance: f64) -> Vec<ResultRow> {
    let mut rows = Vec::new();
    for group in groups {
        let mut in_range = group
            .schools
            .iter()
            .filter(|s| s.distance <= max_distance)
            .peekable();
        if in_range.peek().is_none() {
            continue;
        }

        rows.push(ResultRow::Date {
            display_date: group.session.display_date.clone(),
        });
        rows.extend(in_range.map(|school| ResultRow::School {
            name: school.name.clone(),
            address: school.address.clone(),
            map_url: map_search_url(&school.address),
            distance: format_miles(school.distance),
        }));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{School, Session};

    fn school(name: &str, distance: f64) -> School {
        School {
            name: name.to_string(),
            address: format!("{} Rd Town ST 00000", name),
            distance,
        }
    }

    fn groups() -> Vec<DateGroup> {
        vec![
            DateGroup::new(
                Session::new("2024-03-09", "March 9, 2024"),
                vec![school("Far", 15.0)],
            ),
            DateGroup::new(
                Session::new("2024-05-04", "May 4, 2024"),
                vec![school("Near", 2.5), school("Edge", 10.0), school("Out", 10.01)],
            ),
        ]
    }

    #[test]
    fn test_date_with_no_school_in_range_is_skipped() {
        let rows = build_rows(&groups()[..1], 10.0);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_threshold_is_inclusive_and_order_preserved() {
        let rows = build_rows(&groups(), 10.0);
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            ResultRow::Date {
                display_date: "May 4, 2024".into()
            }
        );
        let names: Vec<&str> = rows
            .iter()
            .filter_map(|r| match r {
                ResultRow::School { name, .. } => Some(name.as_str()),
                ResultRow::Date { .. } => None,
            })
            .collect();
        assert_eq!(names, ["Near", "Edge"]);
    }

    #[test]
    fn test_every_rendered_school_is_within_threshold() {
        let groups = groups();
        for threshold in [0.0, 2.5, 10.0, 12.0, 100.0] {
            let rows = build_rows(&groups, threshold);
            let count = rows.iter().filter(|r| r.is_school()).count();
            let expected = groups
                .iter()
                .flat_map(|g| &g.schools)
                .filter(|s| s.distance <= threshold)
                .count();
            assert_eq!(count, expected, "threshold {}", threshold);
        }
    }

    #[test]
    fn test_rows_are_idempotent() {
        let groups = groups();
        assert_eq!(build_rows(&groups, 25.0), build_rows(&groups, 25.0));
    }

    #[test]
    fn test_school_row_formatting() {
        let rows = build_rows(&groups(), 3.0);
        match &rows[1] {
            ResultRow::School {
                address,
                map_url,
                distance,
                ..
            } => {
                assert_eq!(address, "Near Rd Town ST 00000");
                assert_eq!(distance, "2.50 mi");
                assert_eq!(
                    map_url,
                    "https://www.google.com/maps/search/?api=1&query=Near+Rd+Town+ST+00000"
                );
            }
            other => panic!("expected school row, got {:?}", other),
        }
    }

    #[test]
    fn test_map_search_url_encodes_query() {
        assert_eq!(
            map_search_url("1 Main St & Elm New York NY 10001"),
            "https://www.google.com/maps/search/?api=1&query=1+Main+St+%26+Elm+New+York+NY+10001"
        );
    }

    #[test]
    fn test_header_text() {
        assert_eq!(header_text("10001"), "Search results for 10001");
    }
}
