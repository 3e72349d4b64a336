use arbscout_core::RunResult;
use arbscout_scraper::NavigatorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    /// No browser session could be acquired; nothing was collected.
    #[error("failed to start browser session: {0}")]
    SessionInit(#[source] NavigatorError),

    /// The run finished but the session could not be closed cleanly.
    /// The collected result is still available.
    #[error("browser session teardown failed: {source}")]
    Teardown {
        result: Box<RunResult>,
        #[source]
        source: NavigatorError,
    },

    #[error("research worker stopped unexpectedly: {0}")]
    Worker(String),
}

impl RunError {
    /// Records collected before the error, if any survived.
    #[must_use]
    pub fn partial_result(&self) -> Option<&RunResult> {
        match self {
            RunError::Teardown { result, .. } => Some(&**result),
            RunError::SessionInit(_) | RunError::Worker(_) => None,
        }
    }
}
