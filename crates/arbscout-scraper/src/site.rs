//! Site extractors: one per marketplace, all sharing a single `execute`
//! contract.

use std::time::Duration;

use arbscout_core::{AppConfig, Marketplace, MarketplaceProfile, ProductRecord, ProfileSet, SearchCriteria};
use async_trait::async_trait;
use url::Url;

use crate::error::ScraperError;
use crate::extract::extract_cards;
use crate::navigator::{HeaderProfile, Navigator, WaitOutcome};

/// What one extractor invocation produced.
///
/// `success` is `false` only when the search page itself could not be
/// reached. An exhausted card chain or an empty page is a success with no
/// products.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionEnvelope {
    pub success: bool,
    pub products: Vec<ProductRecord>,
    pub error: Option<String>,
}

impl ExtractionEnvelope {
    #[must_use]
    pub fn ok(products: Vec<ProductRecord>) -> Self {
        Self {
            success: true,
            products,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            products: Vec::new(),
            error: Some(error.into()),
        }
    }
}

#[async_trait]
pub trait SiteExtractor: Send + Sync {
    fn marketplace(&self) -> Marketplace;

    /// Runs a search and returns at most `criteria.max_results()` records.
    /// Never returns an error; failures are folded into the envelope.
    async fn execute(
        &self,
        navigator: &mut dyn Navigator,
        criteria: &SearchCriteria,
    ) -> ExtractionEnvelope;
}

#[derive(Debug, Clone)]
pub struct ExtractorSettings {
    pub headers: HeaderProfile,
    /// Bound on each card-selector wait in the fallback chain.
    pub selector_timeout: Duration,
}

impl ExtractorSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            headers: HeaderProfile::from_config(config),
            selector_timeout: config.selector_timeout(),
        }
    }
}

/// Profile-driven extractor. The marketplace tag, URLs, and every selector
/// chain come from its [`MarketplaceProfile`].
#[derive(Debug, Clone)]
pub struct MarketplaceExtractor {
    profile: MarketplaceProfile,
    settings: ExtractorSettings,
}

impl MarketplaceExtractor {
    #[must_use]
    pub fn new(profile: MarketplaceProfile, settings: ExtractorSettings) -> Self {
        Self { profile, settings }
    }

    #[must_use]
    pub fn profile(&self) -> &MarketplaceProfile {
        &self.profile
    }

    async fn run(
        &self,
        navigator: &mut dyn Navigator,
        criteria: &SearchCriteria,
    ) -> Result<Vec<ProductRecord>, ScraperError> {
        let marketplace = self.profile.marketplace;
        let search_url = self.profile.search_url(criteria.search_term())?;
        let base = Url::parse(&self.profile.base_url).map_err(|e| ScraperError::InvalidBaseUrl {
            url: self.profile.base_url.clone(),
            reason: e.to_string(),
        })?;

        navigator.apply_headers(&self.settings.headers).await?;
        navigator.navigate(search_url.as_str()).await?;
        if let Ok(location) = navigator.current_location().await {
            tracing::debug!(%marketplace, title = %location.title, url = %location.url, "search page loaded");
        }

        let Some(card_selector) = self.discover_cards(navigator).await else {
            tracing::warn!(
                %marketplace,
                candidates = self.profile.cards.len(),
                "no result-card selector matched; treating as zero results"
            );
            return Ok(Vec::new());
        };

        let html = navigator.content().await?;
        let extraction = extract_cards(
            &html,
            card_selector,
            &self.profile,
            &base,
            criteria.max_results(),
        );

        tracing::info!(
            %marketplace,
            selector = card_selector,
            cards = extraction.cards_seen,
            dropped = extraction.dropped,
            records = extraction.records.len(),
            "extraction finished"
        );
        Ok(extraction.records)
    }

    /// Awaits each card candidate in order and returns the first that
    /// appears. Later candidates are never tried once one matches.
    async fn discover_cards(&self, navigator: &mut dyn Navigator) -> Option<&str> {
        for candidate in &self.profile.cards {
            match navigator
                .await_selector(candidate, self.settings.selector_timeout)
                .await
            {
                WaitOutcome::Found => return Some(candidate.as_str()),
                WaitOutcome::TimedOut => {
                    tracing::debug!(selector = %candidate, "card selector timed out");
                }
                WaitOutcome::Failed(reason) => {
                    tracing::debug!(selector = %candidate, %reason, "card selector wait failed");
                }
            }
        }
        None
    }
}

#[async_trait]
impl SiteExtractor for MarketplaceExtractor {
    fn marketplace(&self) -> Marketplace {
        self.profile.marketplace
    }

    async fn execute(
        &self,
        navigator: &mut dyn Navigator,
        criteria: &SearchCriteria,
    ) -> ExtractionEnvelope {
        let marketplace = self.profile.marketplace;
        tracing::info!(%marketplace, term = criteria.search_term(), "searching");

        match self.run(navigator, criteria).await {
            Ok(products) => ExtractionEnvelope::ok(products),
            Err(e) => {
                tracing::warn!(%marketplace, error = %e, "search page unreachable");
                ExtractionEnvelope::failed(e.to_string())
            }
        }
    }
}

/// One extractor per marketplace, in collection priority order.
#[must_use]
pub fn default_extractors(
    profiles: &ProfileSet,
    settings: &ExtractorSettings,
) -> Vec<Box<dyn SiteExtractor>> {
    Marketplace::ALL
        .into_iter()
        .map(|m| {
            Box::new(MarketplaceExtractor::new(profiles.get(m).clone(), settings.clone()))
                as Box<dyn SiteExtractor>
        })
        .collect()
}
