use serde::{Deserialize, Serialize};

use crate::Marketplace;

/// Per-run platform switches: one flag per supported marketplace plus the
/// advisory-only market research flag.
///
/// The set may legitimately be all-false. Requiring at least one marketplace
/// is the caller's job; the orchestrator simply collects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformToggleSet {
    pub wholesale: bool,
    pub retail: bool,
    pub market_research: bool,
}

impl Default for PlatformToggleSet {
    /// Both marketplaces on, market research off.
    fn default() -> Self {
        Self {
            wholesale: true,
            retail: true,
            market_research: false,
        }
    }
}

impl PlatformToggleSet {
    /// All switches off.
    #[must_use]
    pub fn none() -> Self {
        Self {
            wholesale: false,
            retail: false,
            market_research: false,
        }
    }

    #[must_use]
    pub fn is_enabled(&self, marketplace: Marketplace) -> bool {
        match marketplace {
            Marketplace::Wholesale => self.wholesale,
            Marketplace::Retail => self.retail,
        }
    }

    #[must_use]
    pub fn with_marketplace(mut self, marketplace: Marketplace, enabled: bool) -> Self {
        match marketplace {
            Marketplace::Wholesale => self.wholesale = enabled,
            Marketplace::Retail => self.retail = enabled,
        }
        self
    }

    #[must_use]
    pub fn with_market_research(mut self, enabled: bool) -> Self {
        self.market_research = enabled;
        self
    }

    /// `true` if at least one marketplace (not counting market research) is on.
    #[must_use]
    pub fn any_marketplace_enabled(&self) -> bool {
        Marketplace::ALL.iter().any(|m| self.is_enabled(*m))
    }

    /// Enabled marketplaces in collection priority order.
    #[must_use]
    pub fn enabled_marketplaces(&self) -> Vec<Marketplace> {
        Marketplace::ALL
            .into_iter()
            .filter(|m| self.is_enabled(*m))
            .collect()
    }

    /// JSON form stored alongside each search in the history database,
    /// e.g. `{"wholesale":true,"retail":false,"market_research":false}`.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::json!({
            "wholesale": self.wholesale,
            "retail": self.retail,
            "market_research": self.market_research,
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_enables_both_marketplaces() {
        let toggles = PlatformToggleSet::default();
        assert!(toggles.any_marketplace_enabled());
        assert_eq!(
            toggles.enabled_marketplaces(),
            vec![Marketplace::Wholesale, Marketplace::Retail]
        );
        assert!(!toggles.market_research);
    }

    #[test]
    fn market_research_alone_does_not_count_as_marketplace() {
        let toggles = PlatformToggleSet::none().with_market_research(true);
        assert!(!toggles.any_marketplace_enabled());
        assert!(toggles.enabled_marketplaces().is_empty());
    }

    #[test]
    fn enabled_marketplaces_keep_priority_order() {
        let toggles = PlatformToggleSet::none()
            .with_marketplace(Marketplace::Retail, true)
            .with_marketplace(Marketplace::Wholesale, true);
        assert_eq!(
            toggles.enabled_marketplaces(),
            vec![Marketplace::Wholesale, Marketplace::Retail]
        );
    }

    #[test]
    fn json_form_roundtrips() {
        let toggles = PlatformToggleSet::default().with_marketplace(Marketplace::Retail, false);
        let decoded: PlatformToggleSet = serde_json::from_str(&toggles.to_json()).unwrap();
        assert_eq!(decoded, toggles);
    }
}
