//! Research orchestration: phases, the run accumulator, progress events,
//! and cooperative cancellation.

pub mod error;
pub mod events;
pub mod orchestrator;
pub mod phase;
pub mod worker;

pub use error::RunError;
pub use events::{AdvisoryKind, EventSink, FnSink, NullSink, RunEvent};
pub use orchestrator::{Orchestrator, ResearchRequest};
pub use phase::Phase;
pub use worker::{spawn_research, ResearchHandle};

pub use tokio_util::sync::CancellationToken;
