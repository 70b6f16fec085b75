//! Small string and number helpers shared by the models and view.

/// Title-case a string: every word starts upper-case, the rest is lower-case.
/// A word is a run of alphanumerics or underscores, so `O'NEIL` becomes `O'Neil`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_word = false;
    for c in s.chars() {
        let is_word = c.is_alphanumeric() || c == '_';
        if is_word && !prev_is_word {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        prev_is_word = is_word;
    }
    out
}

/// Round to two decimal places.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a distance in miles for display, e.g. `3.14 mi`
pub fn format_miles(miles: f64) -> String {
    format!("{:.2} mi", miles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("LINCOLN HIGH SCHOOL"), "Lincoln High School");
        assert_eq!(title_case("o'neil academy"), "O'Neil Academy");
        assert_eq!(title_case("st.marys"), "St.Marys");
        assert_eq!(title_case("  12th ave  "), "  12th Ave  ");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_round_to_cents() {
        assert_eq!(round_to_cents(3.14159), 3.14);
        assert_eq!(round_to_cents(2.005 + 0.001), 2.01);
        assert_eq!(round_to_cents(0.0), 0.0);
    }

    #[test]
    fn test_format_miles() {
        assert_eq!(format_miles(3.1), "3.10 mi");
        assert_eq!(format_miles(25.0), "25.00 mi");
    }
}
