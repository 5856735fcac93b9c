//! Key derivation and default locations for persisted moderation state
//!
//! Cases are keyed by the decimal string of their case number, point
//! balances by the subject identifier.

/// Default file for case records
pub const DEFAULT_CASES_PATH: &str = "data/cases.json";

/// Default file for point balances
pub const DEFAULT_POINTS_PATH: &str = "data/points.json";

/// Suffix of the scratch file written before an atomic rename
pub const TEMP_SUFFIX: &str = ".tmp";

/// Suffix under which an unreadable store file is preserved
pub const CORRUPT_SUFFIX: &str = ".corrupt";

/// Key for a case record
pub fn case_key(case_number: u64) -> String {
    case_number.to_string()
}

/// Parse a case key. Only plain decimal keys are case numbers.
pub fn parse_case_key(key: &str) -> Option<u64> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

/// Key for a subject's point balance
pub fn balance_key(subject_id: &str) -> String {
    subject_id.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_key_roundtrip() {
        assert_eq!(case_key(42), "42");
        assert_eq!(parse_case_key("42"), Some(42));
    }

    #[test]
    fn test_non_decimal_keys_are_ignored() {
        assert_eq!(parse_case_key(""), None);
        assert_eq!(parse_case_key("-3"), None);
        assert_eq!(parse_case_key("case-7"), None);
        assert_eq!(parse_case_key(" 7"), None);
    }

    #[test]
    fn test_balance_key_is_subject_id() {
        assert_eq!(balance_key("1234"), "1234");
    }
}
