//! Numeric interpretation of display price strings.

use std::sync::LazyLock;

use arbscout_core::PRICE_SENTINEL;
use regex::Regex;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\d,]+\.?\d*").expect("valid regex"));

/// First number in a display price, thousands separators removed.
///
/// `"$1,299.99"` yields `1299.99`; for a range such as `"$2.10 - $3.40"` the
/// lower bound wins. The `"N/A"` sentinel and strings without digits yield
/// `None`.
#[must_use]
pub fn parse_price(display: &str) -> Option<f64> {
    let display = display.trim();
    if display.is_empty() || display == PRICE_SENTINEL {
        return None;
    }
    NUMBER
        .find_iter(display)
        .map(|m| m.as_str().replace(',', ""))
        .find(|digits| digits.chars().any(|c| c.is_ascii_digit()))
        .and_then(|digits| digits.parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_dollar_price() {
        assert_eq!(parse_price("$12.99"), Some(12.99));
    }

    #[test]
    fn thousands_separator_removed() {
        assert_eq!(parse_price("$1,299.99"), Some(1299.99));
    }

    #[test]
    fn range_takes_lower_bound() {
        assert_eq!(parse_price("US$2.10 - 3.40"), Some(2.10));
    }

    #[test]
    fn whole_number_with_trailing_dot() {
        assert_eq!(parse_price("$24."), Some(24.0));
    }

    #[test]
    fn sentinel_and_text_are_none() {
        assert_eq!(parse_price("N/A"), None);
        assert_eq!(parse_price("See options"), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn lone_comma_is_skipped() {
        assert_eq!(parse_price("Price, from 5"), Some(5.0));
    }
}
