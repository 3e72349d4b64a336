//! Research run state machine.
//!
//! One run owns one navigator. Extractors execute strictly one after another
//! against it, in marketplace priority order. The navigator is closed on
//! every exit path once it has been acquired.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use arbscout_advisor::Advisor;
use arbscout_core::{
    AppConfig, MarketplaceOutcome, PlatformToggleSet, ProfileSet, RunAccumulator, RunResult,
    RunStatus, SearchCriteria,
};
use arbscout_scraper::{
    default_extractors, ChromeSessionProvider, ExtractionEnvelope, ExtractorSettings, Navigator,
    NavigatorSettings, SessionProvider, SiteExtractor,
};
use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::error::RunError;
use crate::events::{AdvisoryKind, EventSink, RunEvent};
use crate::phase::Phase;

const PROGRESS_INIT: u8 = 5;
const PROGRESS_ADVISOR_PROBED: u8 = 10;
const PROGRESS_SESSION_READY: u8 = 20;
const PROGRESS_MARKET_RESEARCH: u8 = 30;
const PROGRESS_COLLECTION_START: u8 = 40;
const PROGRESS_COLLECTION_END: u8 = 80;
const PROGRESS_ANALYSIS: u8 = 95;
const PROGRESS_DONE: u8 = 100;

/// Everything that varies between runs.
#[derive(Debug, Clone)]
pub struct ResearchRequest {
    pub criteria: SearchCriteria,
    pub toggles: PlatformToggleSet,
}

pub struct Orchestrator {
    sessions: Arc<dyn SessionProvider>,
    extractors: Vec<Box<dyn SiteExtractor>>,
    advisor: Arc<dyn Advisor>,
}

impl Orchestrator {
    /// Extractors are reordered into marketplace priority order.
    #[must_use]
    pub fn new(
        sessions: Arc<dyn SessionProvider>,
        mut extractors: Vec<Box<dyn SiteExtractor>>,
        advisor: Arc<dyn Advisor>,
    ) -> Self {
        extractors.sort_by_key(|e| e.marketplace());
        Self {
            sessions,
            extractors,
            advisor,
        }
    }

    /// Chromium sessions plus one profile-driven extractor per marketplace.
    #[must_use]
    pub fn from_config(config: &AppConfig, profiles: &ProfileSet, advisor: Arc<dyn Advisor>) -> Self {
        let sessions = Arc::new(ChromeSessionProvider::new(NavigatorSettings::from_config(config)));
        let extractors = default_extractors(profiles, &ExtractorSettings::from_config(config));
        Self::new(sessions, extractors, advisor)
    }

    /// Executes one research run.
    ///
    /// A run that finds nothing is `Ok` with an empty result. Cancellation is
    /// observed before each extractor and before each record is accepted;
    /// the result then carries [`RunStatus::Cancelled`] and whatever was
    /// collected so far.
    ///
    /// # Errors
    ///
    /// - [`RunError::SessionInit`] if no browser session can be acquired.
    /// - [`RunError::Teardown`] if the session fails to close; the error
    ///   carries the collected result.
    pub async fn run(
        &self,
        request: &ResearchRequest,
        events: &dyn EventSink,
        cancel: &CancellationToken,
    ) -> Result<RunResult, RunError> {
        let term = request.criteria.search_term();
        let mut run = RunState::new(events);
        tracing::info!(
            criteria = %request.criteria,
            toggles = %request.toggles.to_json(),
            "research run starting"
        );

        run.enter(Phase::Init);
        run.progress(PROGRESS_INIT);

        if self.advisor.is_available().await {
            run.log("Advisory service connected");
        } else {
            tracing::warn!("advisory service unavailable; continuing without advisory text");
            run.log("Advisory service not available. Continuing without advisory text.");
        }
        run.progress(PROGRESS_ADVISOR_PROBED);

        if cancel.is_cancelled() {
            return Ok(run.cancel(RunAccumulator::new(term)));
        }

        let mut navigator = match self.sessions.acquire().await {
            Ok(nav) => nav,
            Err(e) => {
                tracing::error!(error = %e, "browser session could not be started");
                run.error(format!("Browser session could not be started: {e}"));
                return Err(RunError::SessionInit(e));
            }
        };
        run.log("Browser ready");
        run.progress(PROGRESS_SESSION_READY);

        let result = self
            .drive(&mut run, navigator.as_mut(), request, cancel)
            .await;

        match navigator.close().await {
            Ok(()) => Ok(result),
            Err(source) => {
                tracing::error!(error = %source, "browser session teardown failed");
                run.error(format!("Browser session teardown failed: {source}"));
                Err(RunError::Teardown {
                    result: Box::new(result),
                    source,
                })
            }
        }
    }

    async fn drive(
        &self,
        run: &mut RunState<'_>,
        navigator: &mut dyn Navigator,
        request: &ResearchRequest,
        cancel: &CancellationToken,
    ) -> RunResult {
        let criteria = &request.criteria;
        let term = criteria.search_term();
        let mut acc = RunAccumulator::new(term);

        if request.toggles.market_research {
            run.enter(Phase::MarketResearch);
            run.log("Market research: not yet implemented, skipping");
            run.progress(PROGRESS_MARKET_RESEARCH);
            if cancel.is_cancelled() {
                return run.cancel(acc);
            }
        }

        run.enter(Phase::Collection);
        run.progress(PROGRESS_COLLECTION_START);

        let plan = self.advisor.plan(term).await;
        tracing::info!(goal = %plan.goal, steps = plan.steps.len(), "research plan");
        run.advisory(AdvisoryKind::Plan, plan.to_string());

        let enabled = self
            .extractors
            .iter()
            .filter(|e| request.toggles.is_enabled(e.marketplace()))
            .count();
        let mut finished = 0usize;

        for extractor in &self.extractors {
            let marketplace = extractor.marketplace();
            if !request.toggles.is_enabled(marketplace) {
                tracing::info!(%marketplace, "marketplace disabled; skipping");
                run.log(format!("{marketplace}: disabled, skipping"));
                continue;
            }
            if cancel.is_cancelled() {
                return run.cancel(acc);
            }

            acc.begin_marketplace(marketplace);
            let envelope = invoke(extractor.as_ref(), navigator, criteria).await;
            let offered = envelope.products.len();

            let mut accepted = 0usize;
            for record in envelope.products {
                if cancel.is_cancelled() {
                    break;
                }
                let stored = acc.push(record);
                run.emit(RunEvent::Record(stored.clone()));
                accepted += 1;
            }

            let outcome = MarketplaceOutcome {
                marketplace,
                success: envelope.success,
                records: accepted,
                error: envelope.error,
            };
            if outcome.success {
                run.log(format!("{marketplace}: found {accepted} products"));
            } else {
                run.log(format!(
                    "{marketplace}: search failed: {}",
                    outcome.error.as_deref().unwrap_or("unknown error")
                ));
            }
            acc.record_outcome(outcome.clone());
            run.emit(RunEvent::MarketplaceFinished(outcome));

            finished += 1;
            run.progress(collection_progress(finished, enabled));

            if accepted < offered {
                tracing::info!(%marketplace, accepted, offered, "cancelled mid-marketplace");
                return run.cancel(acc);
            }
        }

        if cancel.is_cancelled() {
            return run.cancel(acc);
        }

        if acc.is_empty() {
            run.log("No products found");
        } else {
            run.enter(Phase::Analysis);
            run.progress(PROGRESS_ANALYSIS);
            match self.advisor.analyze(term, acc.by_source()).await {
                Some(text) => run.advisory(AdvisoryKind::Analysis, text),
                None => tracing::warn!("no advisory analysis available"),
            }
        }

        run.finish(acc, RunStatus::Completed)
    }
}

/// Runs one extractor, turning a panic into a failed envelope.
async fn invoke(
    extractor: &dyn SiteExtractor,
    navigator: &mut dyn Navigator,
    criteria: &SearchCriteria,
) -> ExtractionEnvelope {
    let marketplace = extractor.marketplace();
    match AssertUnwindSafe(extractor.execute(navigator, criteria))
        .catch_unwind()
        .await
    {
        Ok(envelope) => envelope,
        Err(_) => {
            tracing::error!(%marketplace, "extractor panicked");
            ExtractionEnvelope::failed(format!("{marketplace} extractor panicked"))
        }
    }
}

fn collection_progress(finished: usize, enabled: usize) -> u8 {
    if enabled == 0 {
        return PROGRESS_COLLECTION_END;
    }
    let span = usize::from(PROGRESS_COLLECTION_END - PROGRESS_COLLECTION_START);
    let step = span * finished.min(enabled) / enabled;
    PROGRESS_COLLECTION_START + u8::try_from(step).unwrap_or(0)
}

/// Tracks the current phase and forwards events for one run.
struct RunState<'a> {
    phase: Phase,
    events: &'a dyn EventSink,
}

impl<'a> RunState<'a> {
    fn new(events: &'a dyn EventSink) -> Self {
        Self {
            phase: Phase::Init,
            events,
        }
    }

    fn enter(&mut self, next: Phase) {
        if next != self.phase {
            debug_assert!(
                self.phase.can_advance_to(next),
                "illegal phase transition {} -> {}",
                self.phase,
                next
            );
            self.phase = next;
        }
        tracing::info!(phase = %next, "phase");
        self.events.emit(RunEvent::Phase(next));
    }

    fn emit(&self, event: RunEvent) {
        self.events.emit(event);
    }

    fn progress(&self, percent: u8) {
        self.emit(RunEvent::Progress(percent));
    }

    fn log(&self, message: impl Into<String>) {
        self.emit(RunEvent::Log(message.into()));
    }

    fn error(&self, message: String) {
        self.emit(RunEvent::Error(message));
    }

    fn advisory(&self, kind: AdvisoryKind, text: String) {
        self.emit(RunEvent::Advisory { kind, text });
    }

    fn cancel(&mut self, acc: RunAccumulator) -> RunResult {
        tracing::info!(collected = acc.len(), "research run cancelled");
        self.log("Research cancelled");
        self.enter(Phase::Cancelled);
        self.done(acc.finish(RunStatus::Cancelled))
    }

    fn finish(&mut self, acc: RunAccumulator, status: RunStatus) -> RunResult {
        self.enter(Phase::Done);
        self.progress(PROGRESS_DONE);
        self.done(acc.finish(status))
    }

    fn done(&self, result: RunResult) -> RunResult {
        tracing::info!(
            status = %result.status(),
            total = result.len(),
            "research run finished"
        );
        self.emit(RunEvent::Done {
            status: result.status(),
            total: result.len(),
        });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_progress_spans_forty_to_eighty() {
        assert_eq!(collection_progress(0, 2), 40);
        assert_eq!(collection_progress(1, 2), 60);
        assert_eq!(collection_progress(2, 2), 80);
        assert_eq!(collection_progress(1, 1), 80);
        assert_eq!(collection_progress(0, 0), 80);
    }
}
