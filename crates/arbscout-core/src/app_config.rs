use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Immutable runtime configuration, built once at start-up and handed to
/// each component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub database_url: String,
    pub output_dir: PathBuf,
    pub marketplaces_path: Option<PathBuf>,

    pub llm_base_url: String,
    pub llm_timeout_secs: u64,
    pub llm_health_timeout_secs: u64,

    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub navigation_timeout_secs: u64,
    pub network_idle_timeout_secs: u64,
    pub selector_timeout_ms: u64,
    pub request_delay_ms: u64,
    pub user_agent: String,
    pub accept_language: String,

    pub max_products_per_site: usize,
    pub min_moq: u32,
    pub min_seller_years: u32,
}

impl AppConfig {
    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    #[must_use]
    pub fn network_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.network_idle_timeout_secs)
    }

    #[must_use]
    pub fn selector_timeout(&self) -> Duration {
        Duration::from_millis(self.selector_timeout_ms)
    }

    #[must_use]
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    #[must_use]
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    #[must_use]
    pub fn llm_health_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_health_timeout_secs)
    }
}
