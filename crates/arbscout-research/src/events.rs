use arbscout_core::{MarketplaceOutcome, ProductRecord, RunStatus};
use tokio::sync::mpsc::UnboundedSender;

use crate::phase::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisoryKind {
    Plan,
    Analysis,
}

/// Progress stream from a running research job.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Phase(Phase),
    /// Overall completion, 0 to 100.
    Progress(u8),
    /// Operator-facing notice.
    Log(String),
    /// Emitted as soon as a record is accepted, before the next one is read.
    Record(ProductRecord),
    MarketplaceFinished(MarketplaceOutcome),
    Advisory { kind: AdvisoryKind, text: String },
    Error(String),
    Done { status: RunStatus, total: usize },
}

/// Receives run events. Emission must not block the run.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: RunEvent);
}

/// A dropped receiver just means nobody is listening any more.
impl EventSink for UnboundedSender<RunEvent> {
    fn emit(&self, event: RunEvent) {
        let _ = self.send(event);
    }
}

/// Adapts a closure into a sink.
pub struct FnSink<F>(pub F);

impl<F> EventSink for FnSink<F>
where
    F: Fn(RunEvent) + Send + Sync,
{
    fn emit(&self, event: RunEvent) {
        (self.0)(event);
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: RunEvent) {}
}
