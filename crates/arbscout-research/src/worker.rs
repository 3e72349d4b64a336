//! Runs research off the caller's task.
//!
//! The caller keeps only the event receiver and a cancellation token; the
//! browser session lives entirely inside the spawned task.

use std::sync::Arc;

use arbscout_core::RunResult;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::RunError;
use crate::events::RunEvent;
use crate::orchestrator::{Orchestrator, ResearchRequest};

pub struct ResearchHandle {
    events: UnboundedReceiver<RunEvent>,
    cancel: CancellationToken,
    task: JoinHandle<Result<RunResult, RunError>>,
}

impl ResearchHandle {
    /// Next event, or `None` once the run has finished and every event has
    /// been drained.
    pub async fn next_event(&mut self) -> Option<RunEvent> {
        self.events.recv().await
    }

    /// Requests cooperative cancellation. The run stops at its next check
    /// point and still returns what it collected.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Stops the run immediately without waiting for a check point. The
    /// session is dropped rather than closed and nothing is returned;
    /// [`Self::wait`] then reports [`RunError::Worker`].
    pub fn abort(&self) {
        self.task.abort();
    }

    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Waits for the run to end.
    ///
    /// # Errors
    ///
    /// Returns the run's own [`RunError`], or [`RunError::Worker`] if the
    /// task panicked or was aborted.
    pub async fn wait(self) -> Result<RunResult, RunError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(RunError::Worker(e.to_string())),
        }
    }
}

/// Spawns `request` on the tokio runtime and returns immediately.
#[must_use]
pub fn spawn_research(orchestrator: Arc<Orchestrator>, request: ResearchRequest) -> ResearchHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        let result = orchestrator.run(&request, &tx, &token).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "research run failed");
        }
        result
    });

    ResearchHandle {
        events: rx,
        cancel,
        task,
    }
}
