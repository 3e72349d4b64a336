//! Marketplace selector profiles.
//!
//! A profile is the data that drives a site extractor: where the search page
//! lives and, for every field, an ordered list of alternative locators. The
//! first locator that yields a non-empty value wins, so newer markup goes
//! first and older fallbacks trail behind. Built-in profiles cover both
//! marketplaces; a YAML file can replace either one without a rebuild when
//! a site changes its markup.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ConfigError, Marketplace};

/// One alternative way to read a field out of a result card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    /// CSS selector, evaluated relative to the card element.
    pub css: String,
    /// Read this attribute instead of the element's text.
    #[serde(default)]
    pub attr: Option<String>,
    /// Prepended to the extracted value (e.g. a currency symbol for sites
    /// that render only the numeric part).
    #[serde(default)]
    pub prefix: Option<String>,
}

impl FieldRule {
    #[must_use]
    pub fn text(css: &str) -> Self {
        Self {
            css: css.to_string(),
            attr: None,
            prefix: None,
        }
    }

    #[must_use]
    pub fn attr(css: &str, attr: &str) -> Self {
        Self {
            css: css.to_string(),
            attr: Some(attr.to_string()),
            prefix: None,
        }
    }

    #[must_use]
    pub fn prefixed(css: &str, prefix: &str) -> Self {
        Self {
            css: css.to_string(),
            attr: None,
            prefix: Some(prefix.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceProfile {
    pub marketplace: Marketplace,
    /// Absolute origin used for search URLs and to resolve relative links.
    pub base_url: String,
    pub search_path: String,
    /// Query parameter that carries the URL-encoded search term.
    pub query_param: String,
    /// Result-card container selectors, tried in order.
    pub cards: Vec<String>,
    pub title: Vec<FieldRule>,
    #[serde(default)]
    pub price: Vec<FieldRule>,
    #[serde(default)]
    pub link: Vec<FieldRule>,
    #[serde(default)]
    pub moq: Vec<FieldRule>,
    #[serde(default)]
    pub seller_name: Vec<FieldRule>,
    #[serde(default)]
    pub seller_years: Vec<FieldRule>,
}

impl MarketplaceProfile {
    /// Built-in profile for the wholesale marketplace.
    #[must_use]
    pub fn wholesale() -> Self {
        Self {
            marketplace: Marketplace::Wholesale,
            base_url: "https://www.alibaba.com".to_string(),
            search_path: "/trade/search".to_string(),
            query_param: "SearchText".to_string(),
            cards: strings(&[
                ".organic-list-offer",
                ".fy23-search-card",
                ".search-card-item",
                "[data-content='productItem']",
                ".J-offer-wrapper",
            ]),
            title: vec![
                FieldRule::text(".organic-list-offer-title"),
                FieldRule::text(".search-card-e-title"),
                FieldRule::text(".elements-title-normal__content"),
                FieldRule::attr("a[title]", "title"),
            ],
            price: vec![
                FieldRule::text(".organic-list-offer-price"),
                FieldRule::text(".search-card-e-price-main"),
                FieldRule::text(".elements-offer-price-normal__price"),
                FieldRule::text("[class*='price']"),
            ],
            link: vec![
                FieldRule::attr(".search-card-e-title a", "href"),
                FieldRule::attr("a.search-card-e-slider__link", "href"),
                FieldRule::attr("a[href*='product-detail']", "href"),
                FieldRule::attr("a[href]", "href"),
            ],
            moq: vec![
                FieldRule::text(".search-card-m-sale-features__item"),
                FieldRule::text(".element-offer-minorder-normal__value"),
                FieldRule::text("[class*='min-order']"),
            ],
            seller_name: vec![
                FieldRule::text(".search-card-e-company"),
                FieldRule::text(".organic-list-offer-company"),
                FieldRule::text("[class*='company-name']"),
            ],
            seller_years: vec![
                FieldRule::text(".search-card-e-supplier__year"),
                FieldRule::text(".seller-tag__year"),
                FieldRule::text("[class*='supplier-year']"),
            ],
        }
    }

    /// Built-in profile for the retail marketplace.
    #[must_use]
    pub fn retail() -> Self {
        Self {
            marketplace: Marketplace::Retail,
            base_url: "https://www.amazon.com".to_string(),
            search_path: "/s".to_string(),
            query_param: "k".to_string(),
            cards: strings(&[
                "[data-component-type='s-search-result']",
                "div.s-result-item[data-asin]:not([data-asin=''])",
                ".s-card-container",
                "[data-cel-widget^='search_result_']",
            ]),
            title: vec![
                FieldRule::text("h2 a span"),
                FieldRule::text("h2 span.a-text-normal"),
                FieldRule::text(".a-size-medium.a-text-normal"),
                FieldRule::text(".a-size-base-plus.a-text-normal"),
                FieldRule::text("h2"),
                FieldRule::attr("img.s-image", "alt"),
            ],
            price: vec![
                FieldRule::text(".a-price:not([data-a-strike]) .a-offscreen"),
                FieldRule::text(".a-price .a-offscreen"),
                FieldRule::prefixed(".a-price-whole", "$"),
                FieldRule::text(".a-color-price"),
            ],
            link: vec![
                FieldRule::attr("h2 a", "href"),
                FieldRule::attr("a.a-link-normal.s-no-outline", "href"),
                FieldRule::attr("a.a-link-normal[href]", "href"),
            ],
            moq: Vec::new(),
            seller_name: Vec::new(),
            seller_years: Vec::new(),
        }
    }

    /// Search results URL with the term form-encoded into the query parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the base URL or search path
    /// do not form a valid absolute URL.
    pub fn search_url(&self, term: &str) -> Result<Url, ConfigError> {
        let base = Url::parse(&self.base_url).map_err(|e| {
            ConfigError::Validation(format!(
                "{} base_url '{}' is not a valid URL: {e}",
                self.marketplace, self.base_url
            ))
        })?;
        let mut url = base.join(&self.search_path).map_err(|e| {
            ConfigError::Validation(format!(
                "{} search_path '{}' cannot be joined to base_url: {e}",
                self.marketplace, self.search_path
            ))
        })?;
        url.query_pairs_mut().append_pair(&self.query_param, term);
        Ok(url)
    }
}

/// The active profile for every supported marketplace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSet {
    wholesale: MarketplaceProfile,
    retail: MarketplaceProfile,
}

impl Default for ProfileSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProfileSet {
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            wholesale: MarketplaceProfile::wholesale(),
            retail: MarketplaceProfile::retail(),
        }
    }

    #[must_use]
    pub fn get(&self, marketplace: Marketplace) -> &MarketplaceProfile {
        match marketplace {
            Marketplace::Wholesale => &self.wholesale,
            Marketplace::Retail => &self.retail,
        }
    }

    fn replace(&mut self, profile: MarketplaceProfile) {
        match profile.marketplace {
            Marketplace::Wholesale => self.wholesale = profile,
            Marketplace::Retail => self.retail = profile,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProfilesFile {
    pub marketplaces: Vec<MarketplaceProfile>,
}

/// Load marketplace profile overrides from a YAML file.
///
/// Marketplaces absent from the file keep their built-in profile.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_profiles(path: &Path) -> Result<ProfileSet, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ProfilesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: ProfilesFile = serde_yaml::from_str(&content)?;
    validate_profiles(&file)?;

    let mut set = ProfileSet::builtin();
    for profile in file.marketplaces {
        set.replace(profile);
    }
    Ok(set)
}

fn validate_profiles(file: &ProfilesFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for profile in &file.marketplaces {
        let name = profile.marketplace;
        if !seen.insert(name) {
            return Err(ConfigError::Validation(format!(
                "duplicate profile for marketplace '{name}'"
            )));
        }

        match Url::parse(&profile.base_url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            _ => {
                return Err(ConfigError::Validation(format!(
                    "'{name}' base_url must be an absolute http(s) URL, got '{}'",
                    profile.base_url
                )));
            }
        }

        if profile.query_param.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "'{name}' query_param must be non-empty"
            )));
        }

        if profile.cards.is_empty() || profile.cards.iter().any(|c| c.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "'{name}' needs at least one card selector and no blank entries"
            )));
        }

        if profile.title.is_empty() {
            return Err(ConfigError::Validation(format!(
                "'{name}' needs at least one title rule"
            )));
        }

        let rules = profile
            .title
            .iter()
            .chain(&profile.price)
            .chain(&profile.link)
            .chain(&profile.moq)
            .chain(&profile.seller_name)
            .chain(&profile.seller_years);
        for rule in rules {
            if rule.css.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "'{name}' has a field rule with a blank selector"
                )));
            }
        }
    }

    Ok(())
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
#[path = "profiles_test.rs"]
mod tests;
