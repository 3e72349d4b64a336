//! Advisory planner/analyst backed by a local chat-completion service.
//!
//! The text produced here is shown to the operator and logged. It never
//! decides what a research run does.

pub mod advisor;
pub mod client;
pub mod error;
pub mod prompts;
pub mod types;

pub use advisor::{Advisor, SilentAdvisor};
pub use client::AdvisoryClient;
pub use error::AdvisorError;
pub use types::{ChatMessage, PlanStep, ResearchPlan};
