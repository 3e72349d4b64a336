use arbscout_core::ConfigError;
use thiserror::Error;

/// Failures at the page-navigation boundary.
///
/// Selector waits never produce one of these; they report a
/// [`crate::WaitOutcome`] instead.
#[derive(Debug, Error)]
pub enum NavigatorError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("timed out after {secs}s loading {url}")]
    Timeout { url: String, secs: u64 },

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("page script failed: {0}")]
    Script(String),

    #[error("browser protocol error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    #[error("browser did not shut down within {secs}s")]
    CloseTimeout { secs: u64 },

    #[error("no page has been loaded yet")]
    NotLoaded,

    #[error("browser session is closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("cannot build search URL: {0}")]
    SearchUrl(#[from] ConfigError),

    #[error(transparent)]
    Navigator(#[from] NavigatorError),

    #[error("invalid marketplace base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
