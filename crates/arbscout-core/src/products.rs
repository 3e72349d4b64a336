use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{CoreError, Marketplace};

/// Display price used when no price locator matched on a card.
pub const PRICE_SENTINEL: &str = "N/A";

/// Parameters that bound a single research run. Constructed once and never
/// mutated; every extractor receives the same value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchCriteria {
    search_term: String,
    min_moq: u32,
    min_seller_years: u32,
    max_results: usize,
}

impl SearchCriteria {
    /// Builds criteria for one run.
    ///
    /// The search term is trimmed; surrounding whitespace never reaches a
    /// marketplace query string.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptySearchTerm`] for a blank term and
    /// [`CoreError::InvalidMaxResults`] when `max_results` is zero.
    pub fn new(
        search_term: &str,
        min_moq: u32,
        min_seller_years: u32,
        max_results: usize,
    ) -> Result<Self, CoreError> {
        let search_term = search_term.trim();
        if search_term.is_empty() {
            return Err(CoreError::EmptySearchTerm);
        }
        if max_results == 0 {
            return Err(CoreError::InvalidMaxResults(max_results));
        }
        Ok(Self {
            search_term: search_term.to_string(),
            min_moq,
            min_seller_years,
            max_results,
        })
    }

    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Minimum-order-quantity floor.
    #[must_use]
    pub fn min_moq(&self) -> u32 {
        self.min_moq
    }

    /// Minimum seller tenure in years.
    #[must_use]
    pub fn min_seller_years(&self) -> u32 {
        self.min_seller_years
    }

    /// Upper bound on records returned by each marketplace.
    #[must_use]
    pub fn max_results(&self) -> usize {
        self.max_results
    }
}

impl std::fmt::Display for SearchCriteria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchCriteria(term='{}', moq>={}, seller_years>={}, max={})",
            self.search_term, self.min_moq, self.min_seller_years, self.max_results
        )
    }
}

/// A single listing extracted from a marketplace search page.
///
/// Fields are private: a record is assembled by a site extractor through the
/// `with_*` builders and is read-only from then on. The capture timestamp is
/// assigned by [`ProductRecord::new`] and cannot be changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    source: Marketplace,
    title: String,
    /// Display string exactly as shown on the page, or [`PRICE_SENTINEL`].
    price: String,
    url: Option<String>,
    moq: Option<String>,
    seller_name: Option<String>,
    seller_years: Option<String>,
    captured_at: DateTime<Utc>,
}

impl ProductRecord {
    /// Creates a record with the current time as its capture timestamp.
    ///
    /// The title is trimmed and inner whitespace runs are collapsed. A blank
    /// price becomes [`PRICE_SENTINEL`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyTitle`] if the title is empty after trimming.
    pub fn new(source: Marketplace, title: &str, price: &str) -> Result<Self, CoreError> {
        let title = collapse_whitespace(title);
        if title.is_empty() {
            return Err(CoreError::EmptyTitle);
        }
        let price = collapse_whitespace(price);
        let price = if price.is_empty() {
            PRICE_SENTINEL.to_string()
        } else {
            price
        };

        Ok(Self {
            source,
            title,
            price,
            url: None,
            moq: None,
            seller_name: None,
            seller_years: None,
            captured_at: Utc::now(),
        })
    }

    /// Sets the canonical listing URL. Callers are expected to pass an
    /// absolute URL; relative links are resolved by the extractor.
    #[must_use]
    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url = non_blank(url);
        self
    }

    #[must_use]
    pub fn with_moq(mut self, moq: Option<String>) -> Self {
        self.moq = non_blank(moq);
        self
    }

    #[must_use]
    pub fn with_seller_name(mut self, seller_name: Option<String>) -> Self {
        self.seller_name = non_blank(seller_name);
        self
    }

    #[must_use]
    pub fn with_seller_years(mut self, seller_years: Option<String>) -> Self {
        self.seller_years = non_blank(seller_years);
        self
    }

    #[must_use]
    pub fn source(&self) -> Marketplace {
        self.source
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn price(&self) -> &str {
        &self.price
    }

    /// `true` when no price locator matched for this card.
    #[must_use]
    pub fn has_price(&self) -> bool {
        self.price != PRICE_SENTINEL
    }

    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    #[must_use]
    pub fn moq(&self) -> Option<&str> {
        self.moq.as_deref()
    }

    #[must_use]
    pub fn seller_name(&self) -> Option<&str> {
        self.seller_name.as_deref()
    }

    #[must_use]
    pub fn seller_years(&self) -> Option<&str> {
        self.seller_years.as_deref()
    }

    #[must_use]
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}

/// Trims and collapses every run of whitespace to a single space.
#[must_use]
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| collapse_whitespace(&v))
        .filter(|v| !v.is_empty())
}
