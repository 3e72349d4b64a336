//! Offline navigator that serves saved HTML snapshots.
//!
//! Routes are matched by URL prefix in insertion order. Selector waits are
//! answered immediately from the stored document, so extractor and
//! orchestrator behavior can be exercised without a browser.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};

use super::{HeaderProfile, Navigator, PageLocation, SessionProvider, WaitOutcome};
use crate::error::NavigatorError;

/// What a [`StaticNavigator`] was asked to do, shared by every clone.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NavigationLog {
    pub visited: Vec<String>,
    pub awaited: Vec<String>,
    pub headers: Vec<HeaderProfile>,
    pub closes: usize,
}

#[derive(Debug, Clone)]
enum Route {
    Page(String),
    Unreachable(String),
}

#[derive(Debug, Clone)]
struct Loaded {
    url: String,
    html: String,
}

#[derive(Debug, Clone, Default)]
pub struct StaticNavigator {
    routes: Vec<(String, Route)>,
    current: Option<Loaded>,
    log: Arc<Mutex<NavigationLog>>,
    closed: bool,
    fail_close: Option<String>,
}

impl StaticNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `html` for every URL starting with `prefix`.
    #[must_use]
    pub fn with_page(mut self, prefix: &str, html: &str) -> Self {
        self.routes
            .push((prefix.to_string(), Route::Page(html.to_string())));
        self
    }

    /// Fails navigation to every URL starting with `prefix`.
    #[must_use]
    pub fn with_unreachable(mut self, prefix: &str, reason: &str) -> Self {
        self.routes
            .push((prefix.to_string(), Route::Unreachable(reason.to_string())));
        self
    }

    /// Makes [`Navigator::close`] report an error (after marking closed).
    #[must_use]
    pub fn with_close_failure(mut self, reason: &str) -> Self {
        self.fail_close = Some(reason.to_string());
        self
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn log(&self) -> NavigationLog {
        self.lock_log().clone()
    }

    /// Handle to the shared log, still readable after the navigator has been
    /// boxed and moved into a run.
    #[must_use]
    pub fn log_handle(&self) -> Arc<Mutex<NavigationLog>> {
        Arc::clone(&self.log)
    }

    fn lock_log(&self) -> MutexGuard<'_, NavigationLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn route_for(&self, url: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|(prefix, _)| url.starts_with(prefix.as_str()))
            .map(|(_, route)| route)
    }
}

#[async_trait]
impl Navigator for StaticNavigator {
    async fn apply_headers(&mut self, headers: &HeaderProfile) -> Result<(), NavigatorError> {
        if self.closed {
            return Err(NavigatorError::Closed);
        }
        self.lock_log().headers.push(headers.clone());
        Ok(())
    }

    async fn navigate(&mut self, url: &str) -> Result<(), NavigatorError> {
        if self.closed {
            return Err(NavigatorError::Closed);
        }
        self.lock_log().visited.push(url.to_string());

        match self.route_for(url).cloned() {
            Some(Route::Page(html)) => {
                self.current = Some(Loaded {
                    url: url.to_string(),
                    html,
                });
                Ok(())
            }
            Some(Route::Unreachable(reason)) => Err(NavigatorError::Navigation {
                url: url.to_string(),
                reason,
            }),
            None => Err(NavigatorError::Navigation {
                url: url.to_string(),
                reason: "no snapshot for this URL".to_string(),
            }),
        }
    }

    async fn await_selector(&mut self, selector: &str, _timeout: Duration) -> WaitOutcome {
        self.lock_log().awaited.push(selector.to_string());
        let Some(page) = &self.current else {
            return WaitOutcome::Failed(NavigatorError::NotLoaded.to_string());
        };
        selector_present(&page.html, selector)
    }

    async fn current_location(&mut self) -> Result<PageLocation, NavigatorError> {
        let page = self.current.as_ref().ok_or(NavigatorError::NotLoaded)?;
        Ok(PageLocation {
            title: document_title(&page.html),
            url: page.url.clone(),
        })
    }

    async fn content(&mut self) -> Result<String, NavigatorError> {
        if self.closed {
            return Err(NavigatorError::Closed);
        }
        self.current
            .as_ref()
            .map(|page| page.html.clone())
            .ok_or(NavigatorError::NotLoaded)
    }

    async fn close(&mut self) -> Result<(), NavigatorError> {
        self.closed = true;
        self.lock_log().closes += 1;
        match &self.fail_close {
            Some(reason) => Err(NavigatorError::Script(reason.clone())),
            None => Ok(()),
        }
    }
}

fn selector_present(html: &str, selector: &str) -> WaitOutcome {
    let parsed = match Selector::parse(selector) {
        Ok(s) => s,
        Err(e) => return WaitOutcome::Failed(format!("invalid selector {selector}: {e}")),
    };
    let document = Html::parse_document(html);
    if document.select(&parsed).next().is_some() {
        WaitOutcome::Found
    } else {
        WaitOutcome::TimedOut
    }
}

fn document_title(html: &str) -> String {
    let document = Html::parse_document(html);
    Selector::parse("title")
        .ok()
        .and_then(|sel| {
            document
                .select(&sel)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
        })
        .unwrap_or_default()
}

/// Hands out clones of one [`StaticNavigator`], or refuses every acquisition.
#[derive(Debug, Default)]
pub struct SnapshotSessionProvider {
    template: StaticNavigator,
    refuse: Option<String>,
    acquired: AtomicUsize,
}

impl SnapshotSessionProvider {
    #[must_use]
    pub fn new(template: StaticNavigator) -> Self {
        Self {
            template,
            refuse: None,
            acquired: AtomicUsize::new(0),
        }
    }

    /// A provider whose `acquire` always fails with `reason`.
    #[must_use]
    pub fn refusing(reason: &str) -> Self {
        Self {
            template: StaticNavigator::new(),
            refuse: Some(reason.to_string()),
            acquired: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn log(&self) -> NavigationLog {
        self.template.log()
    }
}

#[async_trait]
impl SessionProvider for SnapshotSessionProvider {
    async fn acquire(&self) -> Result<Box<dyn Navigator>, NavigatorError> {
        if let Some(reason) = &self.refuse {
            return Err(NavigatorError::Launch(reason.clone()));
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.template.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head><title> Results </title></head>
        <body><div class="card"><h2>One</h2></div></body></html>"#;

    #[tokio::test]
    async fn serves_page_by_prefix_and_reports_location() {
        let mut nav = StaticNavigator::new().with_page("https://shop.example/s", PAGE);
        nav.navigate("https://shop.example/s?k=one").await.unwrap();

        let location = nav.current_location().await.unwrap();
        assert_eq!(location.title, "Results");
        assert_eq!(location.url, "https://shop.example/s?k=one");
        assert_eq!(nav.log().visited, vec!["https://shop.example/s?k=one"]);
    }

    #[tokio::test]
    async fn await_selector_reports_found_and_timeout() {
        let mut nav = StaticNavigator::new().with_page("https://shop.example", PAGE);
        nav.navigate("https://shop.example/").await.unwrap();

        let wait = Duration::from_millis(10);
        assert_eq!(nav.await_selector(".card", wait).await, WaitOutcome::Found);
        assert_eq!(nav.await_selector(".tile", wait).await, WaitOutcome::TimedOut);
        assert!(matches!(
            nav.await_selector("div[[", wait).await,
            WaitOutcome::Failed(_)
        ));
    }

    #[tokio::test]
    async fn await_before_navigation_fails_softly() {
        let mut nav = StaticNavigator::new();
        let outcome = nav.await_selector(".card", Duration::from_millis(1)).await;
        assert!(matches!(outcome, WaitOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn unreachable_route_is_navigation_error() {
        let mut nav = StaticNavigator::new().with_unreachable("https://down.example", "dns failure");
        let err = nav.navigate("https://down.example/s").await.unwrap_err();
        assert!(matches!(err, NavigatorError::Navigation { ref reason, .. } if reason == "dns failure"));
    }

    #[tokio::test]
    async fn clones_share_one_log() {
        let provider = SnapshotSessionProvider::new(StaticNavigator::new().with_page("https://a", PAGE));
        let mut nav = provider.acquire().await.unwrap();
        nav.navigate("https://a/x").await.unwrap();
        nav.close().await.unwrap();

        assert_eq!(provider.acquired(), 1);
        let log = provider.log();
        assert_eq!(log.visited, vec!["https://a/x"]);
        assert_eq!(log.closes, 1);
    }

    #[tokio::test]
    async fn refusing_provider_fails_acquire() {
        let provider = SnapshotSessionProvider::refusing("no chromium");
        let err = provider.acquire().await.err().unwrap();
        assert!(matches!(err, NavigatorError::Launch(_)));
    }
}
