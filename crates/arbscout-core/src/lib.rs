//! Shared data model and configuration for arbscout.
//!
//! Everything here is plain data: the search parameters that bound a run,
//! the normalized product record produced by the site extractors, the
//! platform toggles consulted by the orchestrator, and the run result handed
//! to the reporting sink.

pub mod app_config;
pub mod config;
pub mod marketplace;
pub mod platforms;
pub mod products;
pub mod profiles;
pub mod run;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, DEFAULT_USER_AGENT};
pub use marketplace::Marketplace;
pub use platforms::PlatformToggleSet;
pub use products::{collapse_whitespace, ProductRecord, SearchCriteria, PRICE_SENTINEL};
pub use profiles::{load_profiles, FieldRule, MarketplaceProfile, ProfileSet};
pub use run::{MarketplaceOutcome, RunAccumulator, RunResult, RunStatus};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read marketplace profiles file {path}: {source}")]
    ProfilesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse marketplace profiles file: {0}")]
    ProfilesFileParse(#[from] serde_yaml::Error),

    #[error("marketplace profile validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("search term must be non-empty")]
    EmptySearchTerm,

    #[error("max results per site must be at least 1, got {0}")]
    InvalidMaxResults(usize),

    #[error("product title must be non-empty after trimming")]
    EmptyTitle,

    #[error("unknown marketplace: {0}")]
    UnknownMarketplace(String),
}
