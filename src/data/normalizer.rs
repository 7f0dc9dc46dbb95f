//! Region Code Normalizer
//! Canonical textual form for the join key shared by the statistics table
//! and the boundary features.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Canonical region code.
///
/// Built once per loaded record; comparisons never re-cast. Numeric codes lose
/// their zero padding (`"01"` and `"1"` are the same region), alphanumeric
/// codes are uppercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RegionCode(String);

impl RegionCode {
    /// Normalize a raw code. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(digits) = Self::numeric_digits(trimmed) {
            let stripped = digits.trim_start_matches('0');
            let canonical = if stripped.is_empty() { "0" } else { stripped };
            return Some(Self(canonical.to_string()));
        }

        Some(Self(trimmed.to_uppercase()))
    }

    /// Normalize a JSON property value (string or number).
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Self::parse(s),
            serde_json::Value::Number(n) => Self::parse(&n.to_string()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Integer part of a numeric code such as `"11"` or `"11.0"`.
    fn numeric_digits(s: &str) -> Option<&str> {
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (s, None),
        };

        if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        match frac_part {
            None => Some(int_part),
            Some(f) if f.bytes().all(|b| b == b'0') => Some(int_part),
            Some(_) => None,
        }
    }

    fn numeric_value(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Ord for RegionCode {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric_value(), other.numeric_value()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for RegionCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> RegionCode {
        RegionCode::parse(s).unwrap()
    }

    #[test]
    fn leading_zero_padding_is_ignored() {
        assert_eq!(code("1"), code("01"));
        assert_eq!(code("001"), code("1"));
        assert_eq!(code("00").as_str(), "0");
    }

    #[test]
    fn float_cast_codes_match_integer_codes() {
        assert_eq!(code("11.0"), code("11"));
        assert_eq!(code("24.00"), code("24"));
        assert_eq!(code("11.5").as_str(), "11.5");
    }

    #[test]
    fn whitespace_and_quotes_are_stripped() {
        assert_eq!(code(" \"84\" "), code("84"));
    }

    #[test]
    fn alphanumeric_codes_are_uppercased() {
        assert_eq!(code("2a"), code("2A"));
        assert_eq!(code("2a").as_str(), "2A");
    }

    #[test]
    fn blank_codes_are_rejected() {
        assert!(RegionCode::parse("").is_none());
        assert!(RegionCode::parse("   ").is_none());
        assert!(RegionCode::parse("\"\"").is_none());
    }

    #[test]
    fn json_numbers_and_strings_agree() {
        let n = serde_json::json!(11);
        let s = serde_json::json!("11");
        let padded = serde_json::json!("011");
        assert_eq!(RegionCode::from_json(&n), RegionCode::from_json(&s));
        assert_eq!(RegionCode::from_json(&s), RegionCode::from_json(&padded));
        assert!(RegionCode::from_json(&serde_json::Value::Null).is_none());
    }

    #[test]
    fn numeric_codes_order_by_value() {
        let mut codes = vec![code("94"), code("2A"), code("11"), code("2")];
        codes.sort();
        let ordered: Vec<&str> = codes.iter().map(RegionCode::as_str).collect();
        assert_eq!(ordered, vec!["2", "11", "94", "2A"]);
    }
}
