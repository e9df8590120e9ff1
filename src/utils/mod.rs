//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod clock;
pub mod error;
pub mod retry;

/// Round to one decimal place
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Parse an upstream numeric string, tolerating surrounding whitespace
pub fn parse_number<T: std::str::FromStr>(raw: Option<&str>) -> Option<T> {
    raw.and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_one_decimal() {
        assert_eq!(round_one_decimal(4.25), 4.3);
        assert_eq!(round_one_decimal(7.0), 7.0);
        assert_eq!(round_one_decimal(3.333), 3.3);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number::<u32>(Some(" 12 ")), Some(12));
        assert_eq!(parse_number::<u32>(Some("?")), None);
        assert_eq!(parse_number::<f64>(Some("12.5")), Some(12.5));
        assert_eq!(parse_number::<u32>(None), None);
    }
}
