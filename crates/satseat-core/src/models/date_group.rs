use serde::{Deserialize, Serialize};

use super::{School, Session};

/// A test date paired with the schools that still have seats on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateGroup {
    pub session: Session,
    /// In the order the search endpoint returned them.
    pub schools: Vec<School>,
}

impl DateGroup {
    pub fn new(session: Session, schools: Vec<School>) -> Self {
        Self { session, schools }
    }
}

/// Sort groups ascending by calendar date. Stable; unparseable dates sort
/// first and ties fall back to the raw date key.
pub fn sort_by_date(groups: &mut [DateGroup]) {
    groups.sort_by(|a, b| {
        a.session
            .date()
            .cmp(&b.session.date())
            .then_with(|| a.session.date_key.cmp(&b.session.date_key))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(key: &str) -> DateGroup {
        DateGroup::new(Session::new(key, key), vec![])
    }

    #[test]
    fn test_sort_by_date_ascending() {
        let mut groups = vec![group("2024-06-01"), group("2024-03-09"), group("2024-05-04")];
        sort_by_date(&mut groups);
        let keys: Vec<&str> = groups.iter().map(|g| g.session.date_key.as_str()).collect();
        assert_eq!(keys, ["2024-03-09", "2024-05-04", "2024-06-01"]);
    }

    #[test]
    fn test_sort_crosses_year_boundary() {
        let mut groups = vec![group("2025-03-08"), group("2024-12-07")];
        sort_by_date(&mut groups);
        assert_eq!(groups[0].session.date_key, "2024-12-07");
    }
}
