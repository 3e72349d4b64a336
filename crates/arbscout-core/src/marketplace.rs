use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// A supported marketplace. The declaration order is the collection
/// priority order: wholesale listings are always gathered before retail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marketplace {
    /// Supplier-side marketplace (bulk pricing, MOQ, seller tenure).
    Wholesale,
    /// Consumer-side marketplace (competition / resale price).
    Retail,
}

impl Marketplace {
    /// Every marketplace, in collection priority order.
    pub const ALL: [Marketplace; 2] = [Marketplace::Wholesale, Marketplace::Retail];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Marketplace::Wholesale => "wholesale",
            Marketplace::Retail => "retail",
        }
    }
}

impl std::fmt::Display for Marketplace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Marketplace {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wholesale" => Ok(Marketplace::Wholesale),
            "retail" => Ok(Marketplace::Retail),
            other => Err(CoreError::UnknownMarketplace(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_order_is_wholesale_then_retail() {
        assert_eq!(
            Marketplace::ALL,
            [Marketplace::Wholesale, Marketplace::Retail]
        );
        assert!(Marketplace::Wholesale < Marketplace::Retail);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Retail".parse::<Marketplace>(), Ok(Marketplace::Retail));
        assert_eq!(
            " wholesale ".parse::<Marketplace>(),
            Ok(Marketplace::Wholesale)
        );
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert_eq!(
            "auction".parse::<Marketplace>(),
            Err(CoreError::UnknownMarketplace("auction".to_string()))
        );
    }

    #[test]
    fn display_matches_serde_name() {
        let json = serde_json::to_string(&Marketplace::Retail).unwrap();
        assert_eq!(json, "\"retail\"");
        assert_eq!(Marketplace::Retail.to_string(), "retail");
    }
}
