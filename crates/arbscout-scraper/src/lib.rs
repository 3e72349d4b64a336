pub mod error;
pub mod extract;
pub mod navigator;
pub mod site;

pub use error::{NavigatorError, ScraperError};
pub use extract::{extract_cards, CardExtraction};
pub use navigator::{
    ChromeNavigator, ChromeSessionProvider, HeaderProfile, Navigator, NavigatorSettings,
    PageLocation, SessionProvider, WaitOutcome,
};
#[cfg(any(test, feature = "testing"))]
pub use navigator::{NavigationLog, SnapshotSessionProvider, StaticNavigator};
pub use site::{
    default_extractors, ExtractionEnvelope, ExtractorSettings, MarketplaceExtractor, SiteExtractor,
};
