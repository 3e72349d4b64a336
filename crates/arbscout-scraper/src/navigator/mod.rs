//! Page navigation against a single browser page.
//!
//! A [`Navigator`] wraps exactly one page for the lifetime of a run. Every
//! extractor drives the same instance in turn; nothing here is shared
//! across tasks, so the trait takes `&mut self` throughout.

mod chrome;
#[cfg(any(test, feature = "testing"))]
mod snapshot;

use std::time::Duration;

use arbscout_core::AppConfig;
use async_trait::async_trait;

use crate::error::NavigatorError;

pub use chrome::{ChromeNavigator, ChromeSessionProvider};
#[cfg(any(test, feature = "testing"))]
pub use snapshot::{NavigationLog, SnapshotSessionProvider, StaticNavigator};

/// Request header profile applied before each search navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderProfile {
    pub user_agent: String,
    pub accept_language: String,
}

impl HeaderProfile {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            accept_language: config.accept_language.clone(),
        }
    }
}

/// Result of waiting for a selector. Waiting never fails past the
/// navigator boundary; problems are reported here instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    Found,
    TimedOut,
    /// The wait could not be performed (bad selector, script error).
    Failed(String),
}

impl WaitOutcome {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, WaitOutcome::Found)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLocation {
    pub title: String,
    pub url: String,
}

/// Timing and window settings for a browser session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigatorSettings {
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub navigation_timeout: Duration,
    pub network_idle_timeout: Duration,
    /// Fixed pause after every navigation.
    pub request_delay: Duration,
}

impl NavigatorSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            headless: config.headless,
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            navigation_timeout: config.navigation_timeout(),
            network_idle_timeout: config.network_idle_timeout(),
            request_delay: config.request_delay(),
        }
    }
}

#[async_trait]
pub trait Navigator: Send {
    /// Sets the user agent and `Accept-Language` used by later requests.
    async fn apply_headers(&mut self, headers: &HeaderProfile) -> Result<(), NavigatorError>;

    /// Loads `url`, waits for network quiescence, then sleeps for the
    /// configured request delay.
    async fn navigate(&mut self, url: &str) -> Result<(), NavigatorError>;

    /// Waits until `selector` matches an element or `timeout` elapses.
    async fn await_selector(&mut self, selector: &str, timeout: Duration) -> WaitOutcome;

    async fn current_location(&mut self) -> Result<PageLocation, NavigatorError>;

    /// Serialized HTML of the current document.
    async fn content(&mut self) -> Result<String, NavigatorError>;

    /// Tears the session down. Safe to call more than once.
    async fn close(&mut self) -> Result<(), NavigatorError>;
}

/// Acquires the single navigator used by a run.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn Navigator>, NavigatorError>;
}
