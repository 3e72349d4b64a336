use std::collections::BTreeMap;

use arbscout_core::Marketplace;
use async_trait::async_trait;

use crate::client::AdvisoryClient;
use crate::prompts::{
    analyst_prompt, default_plan, parse_plan, planner_prompt, ANALYST_MAX_TOKENS, ANALYST_SYSTEM,
    ANALYST_TEMPERATURE, PLANNER_MAX_TOKENS, PLANNER_SYSTEM, PLANNER_TEMPERATURE,
};
use crate::types::ResearchPlan;

/// Advisory planner and analyst consulted by a research run.
///
/// Nothing here can fail: an unreachable or misbehaving service yields the
/// default plan and no analysis text.
#[async_trait]
pub trait Advisor: Send + Sync {
    async fn is_available(&self) -> bool;

    async fn plan(&self, search_term: &str) -> ResearchPlan;

    /// A short insight about the collected counts, or `None` when the
    /// service produced nothing.
    async fn analyze(
        &self,
        search_term: &str,
        counts: &BTreeMap<Marketplace, usize>,
    ) -> Option<String>;
}

#[async_trait]
impl Advisor for AdvisoryClient {
    async fn is_available(&self) -> bool {
        AdvisoryClient::is_available(self).await
    }

    async fn plan(&self, search_term: &str) -> ResearchPlan {
        let response = self
            .query(
                PLANNER_SYSTEM,
                &planner_prompt(search_term),
                PLANNER_TEMPERATURE,
                PLANNER_MAX_TOKENS,
            )
            .await;

        parse_plan(&response).unwrap_or_else(|| {
            if !response.is_empty() {
                tracing::warn!("planner response was not a usable plan; using default");
            }
            default_plan(search_term)
        })
    }

    async fn analyze(
        &self,
        search_term: &str,
        counts: &BTreeMap<Marketplace, usize>,
    ) -> Option<String> {
        let text = self
            .query(
                ANALYST_SYSTEM,
                &analyst_prompt(search_term, counts),
                ANALYST_TEMPERATURE,
                ANALYST_MAX_TOKENS,
            )
            .await;
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Advisor that never contacts anything. Used when advisory text is
/// switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAdvisor;

#[async_trait]
impl Advisor for SilentAdvisor {
    async fn is_available(&self) -> bool {
        false
    }

    async fn plan(&self, search_term: &str) -> ResearchPlan {
        default_plan(search_term)
    }

    async fn analyze(
        &self,
        _search_term: &str,
        _counts: &BTreeMap<Marketplace, usize>,
    ) -> Option<String> {
        None
    }
}
