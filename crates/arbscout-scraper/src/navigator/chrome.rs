//! Chromium navigator driven over the DevTools protocol.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{
    Headers, SetExtraHttpHeadersParams, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::{Browser, BrowserConfig, Handler, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;

use super::{HeaderProfile, Navigator, NavigatorSettings, PageLocation, SessionProvider, WaitOutcome};
use crate::error::NavigatorError;

/// Extra time granted to the in-page wait before the host-side timeout fires.
const SCRIPT_GRACE: Duration = Duration::from_secs(2);

/// How long the resource count must stay flat to count as idle.
const IDLE_WINDOW_MS: u64 = 1000;

pub struct ChromeNavigator {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    settings: NavigatorSettings,
    closed: bool,
}

impl ChromeNavigator {
    /// Launches a local Chromium and opens one blank tab.
    ///
    /// # Errors
    ///
    /// Returns [`NavigatorError::Launch`] if the browser binary cannot be
    /// started or the initial tab cannot be opened.
    pub async fn launch(settings: NavigatorSettings) -> Result<Self, NavigatorError> {
        let mut builder = BrowserConfig::builder()
            .window_size(settings.viewport_width, settings.viewport_height)
            .request_timeout(settings.navigation_timeout);
        if !settings.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(NavigatorError::Launch)?;

        let (browser, handler) = Browser::launch(config)
            .await
            .map_err(|e| NavigatorError::Launch(e.to_string()))?;
        let handler_task = spawn_handler_task(handler);

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(NavigatorError::Launch(format!("failed to open tab: {e}")));
            }
        };

        tracing::info!(
            headless = settings.headless,
            width = settings.viewport_width,
            height = settings.viewport_height,
            "browser session started"
        );

        Ok(Self {
            browser,
            page,
            handler_task,
            settings,
            closed: false,
        })
    }

    fn ensure_open(&self) -> Result<(), NavigatorError> {
        if self.closed {
            Err(NavigatorError::Closed)
        } else {
            Ok(())
        }
    }

    async fn evaluate(&self, js: String) -> Result<serde_json::Value, NavigatorError> {
        let params = EvaluateParams::builder()
            .expression(js)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(NavigatorError::Script)?;
        let result = self.page.evaluate_expression(params).await?;
        result
            .into_value::<serde_json::Value>()
            .map_err(|e| NavigatorError::Script(e.to_string()))
    }

    /// Waits until the document is complete and no new resource entries have
    /// appeared for [`IDLE_WINDOW_MS`]. Gives up quietly at the timeout.
    async fn wait_for_network_idle(&self) {
        let timeout = self.settings.network_idle_timeout;
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        let js = format!(
            r"(async () => {{
                const timeoutMs = {timeout_ms};
                const idleMs = {IDLE_WINDOW_MS};
                const interval = 250;
                const start = Date.now();
                let last = performance.getEntriesByType('resource').length;
                let stable = 0;
                while (Date.now() - start < timeoutMs) {{
                    await new Promise(r => setTimeout(r, interval));
                    const cur = performance.getEntriesByType('resource').length;
                    if (document.readyState === 'complete' && cur === last) {{
                        stable += interval;
                        if (stable >= idleMs) return true;
                    }} else {{
                        stable = 0;
                    }}
                    last = cur;
                }}
                return false;
            }})()"
        );

        match tokio::time::timeout(timeout + SCRIPT_GRACE, self.evaluate(js)).await {
            Ok(Ok(serde_json::Value::Bool(true))) => {
                tracing::debug!("network idle reached");
            }
            Ok(Ok(_)) | Err(_) => {
                tracing::debug!(timeout_secs = timeout.as_secs(), "network idle wait timed out");
            }
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "network idle probe failed");
            }
        }
    }
}

#[async_trait]
impl Navigator for ChromeNavigator {
    async fn apply_headers(&mut self, headers: &HeaderProfile) -> Result<(), NavigatorError> {
        self.ensure_open()?;
        let ua = SetUserAgentOverrideParams::builder()
            .user_agent(headers.user_agent.clone())
            .accept_language(headers.accept_language.clone())
            .build()
            .map_err(NavigatorError::Script)?;
        self.page.set_user_agent(ua).await?;

        let extra = SetExtraHttpHeadersParams::new(Headers::new(serde_json::json!({
            "Accept-Language": headers.accept_language,
        })));
        self.page.execute(extra).await?;
        Ok(())
    }

    async fn navigate(&mut self, url: &str) -> Result<(), NavigatorError> {
        self.ensure_open()?;
        tracing::info!(url, "navigating");

        let limit = self.settings.navigation_timeout;
        match tokio::time::timeout(limit, self.page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                return Err(NavigatorError::Navigation {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                return Err(NavigatorError::Timeout {
                    url: url.to_string(),
                    secs: limit.as_secs(),
                });
            }
        }

        self.wait_for_network_idle().await;
        tokio::time::sleep(self.settings.request_delay).await;
        Ok(())
    }

    async fn await_selector(&mut self, selector: &str, timeout: Duration) -> WaitOutcome {
        if self.closed {
            return WaitOutcome::Failed(NavigatorError::Closed.to_string());
        }
        let quoted = match serde_json::to_string(selector) {
            Ok(q) => q,
            Err(e) => return WaitOutcome::Failed(e.to_string()),
        };
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);

        // Resolves on the first DOM mutation that makes the selector match.
        let js = format!(
            r"new Promise((resolve) => {{
                const sel = {quoted};
                try {{ document.querySelector(sel); }} catch (e) {{ resolve('invalid'); return; }}
                if (document.querySelector(sel)) {{ resolve('found'); return; }}
                let timer = null;
                const obs = new MutationObserver(() => {{
                    if (document.querySelector(sel)) {{
                        obs.disconnect();
                        clearTimeout(timer);
                        resolve('found');
                    }}
                }});
                obs.observe(document.documentElement, {{ childList: true, subtree: true, attributes: true }});
                timer = setTimeout(() => {{ obs.disconnect(); resolve('timeout'); }}, {timeout_ms});
            }})"
        );

        match tokio::time::timeout(timeout + SCRIPT_GRACE, self.evaluate(js)).await {
            Ok(Ok(value)) => match value.as_str() {
                Some("found") => WaitOutcome::Found,
                Some("timeout") => WaitOutcome::TimedOut,
                Some("invalid") => WaitOutcome::Failed(format!("invalid selector: {selector}")),
                _ => WaitOutcome::Failed(format!("unexpected wait result: {value}")),
            },
            Ok(Err(e)) => WaitOutcome::Failed(e.to_string()),
            Err(_) => WaitOutcome::TimedOut,
        }
    }

    async fn current_location(&mut self) -> Result<PageLocation, NavigatorError> {
        self.ensure_open()?;
        let title = self.page.get_title().await?.unwrap_or_default();
        let url = self.page.url().await?.unwrap_or_default();
        Ok(PageLocation { title, url })
    }

    async fn content(&mut self) -> Result<String, NavigatorError> {
        self.ensure_open()?;
        Ok(self.page.content().await?)
    }

    async fn close(&mut self) -> Result<(), NavigatorError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let limit = self.settings.navigation_timeout;
        let browser = &mut self.browser;
        let shutdown = within_teardown_limit(limit, async {
            let closed = browser.close().await;
            if let Err(e) = browser.wait().await {
                tracing::warn!(error = %e, "browser process did not exit cleanly");
            }
            closed
        })
        .await;

        let outcome = match shutdown {
            Ok(closed) => closed.map(|_| ()).map_err(NavigatorError::from),
            Err(e) => {
                tracing::warn!(secs = limit.as_secs(), "browser did not shut down in time; killing it");
                if let Some(Err(kill_error)) = self.browser.kill().await {
                    tracing::warn!(error = %kill_error, "failed to kill browser process");
                }
                Err(e)
            }
        };
        self.handler_task.abort();
        outcome?;
        tracing::info!("browser session closed");
        Ok(())
    }
}

/// Runs one teardown step, giving up with [`NavigatorError::CloseTimeout`]
/// once `limit` has passed.
async fn within_teardown_limit<T>(
    limit: Duration,
    step: impl Future<Output = T>,
) -> Result<T, NavigatorError> {
    tokio::time::timeout(limit, step)
        .await
        .map_err(|_| NavigatorError::CloseTimeout {
            secs: limit.as_secs(),
        })
}

impl Drop for ChromeNavigator {
    fn drop(&mut self) {
        if !self.closed {
            self.handler_task.abort();
        }
    }
}

fn spawn_handler_task(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                tracing::warn!(error = %e, "browser handler event error");
            }
        }
    })
}

/// Launches a fresh Chromium for every run.
#[derive(Debug, Clone)]
pub struct ChromeSessionProvider {
    settings: NavigatorSettings,
}

impl ChromeSessionProvider {
    #[must_use]
    pub fn new(settings: NavigatorSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl SessionProvider for ChromeSessionProvider {
    async fn acquire(&self) -> Result<Box<dyn Navigator>, NavigatorError> {
        let navigator = ChromeNavigator::launch(self.settings.clone()).await?;
        Ok(Box::new(navigator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn teardown_step_that_finishes_passes_its_output_through() {
        let out = within_teardown_limit(Duration::from_secs(1), async { 7 }).await;
        assert_eq!(out.unwrap(), 7);
    }

    #[tokio::test]
    async fn hung_teardown_step_times_out() {
        let out = within_teardown_limit(
            Duration::from_millis(20),
            std::future::pending::<Result<(), NavigatorError>>(),
        )
        .await;
        assert!(matches!(out, Err(NavigatorError::CloseTimeout { .. })));
    }
}
