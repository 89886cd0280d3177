use chrono::{DateTime, ParseError, Utc};

/// Returns the current UTC time as a string formatted according to RFC 3339.
///
/// This format is chosen for its unambiguity and widespread support.
/// Example: "2025-09-13T03:49:58.123456789Z"
pub fn now_as_rfc3339_string() -> String {
    Utc::now().to_rfc3339()
}

/// Parses an RFC 3339 formatted string back into a `DateTime<Utc>` object.
pub fn parse_rfc3339_string(s: &str) -> Result<DateTime<Utc>, ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_conversion_roundtrip() {
        let now_string = now_as_rfc3339_string();
        let parsed = parse_rfc3339_string(&now_string).expect("Should parse successfully");
        assert_eq!(now_string, parsed.to_rfc3339());
    }

    #[test]
    fn test_parse_invalid_string() {
        assert!(parse_rfc3339_string("not-a-timestamp").is_err());
    }
}
