//! Planner and analyst prompts, and tolerant parsing of planner output.

use std::collections::BTreeMap;

use arbscout_core::Marketplace;

use crate::types::{PlanStep, ResearchPlan};

pub const PLANNER_SYSTEM: &str = "You are a research planner. Always respond with valid JSON.";
pub const PLANNER_TEMPERATURE: f32 = 0.3;
pub const PLANNER_MAX_TOKENS: u32 = 500;

pub const ANALYST_SYSTEM: &str = "You are a product analyst. Be concise.";
pub const ANALYST_TEMPERATURE: f32 = 0.7;
pub const ANALYST_MAX_TOKENS: u32 = 200;

fn collector_name(marketplace: Marketplace) -> &'static str {
    match marketplace {
        Marketplace::Wholesale => "wholesale_search",
        Marketplace::Retail => "retail_search",
    }
}

fn collector_purpose(marketplace: Marketplace) -> &'static str {
    match marketplace {
        Marketplace::Wholesale => "Search the wholesale marketplace for supplier listings",
        Marketplace::Retail => "Search the retail marketplace for resale prices",
    }
}

#[must_use]
pub fn planner_prompt(search_term: &str) -> String {
    let collectors: String = Marketplace::ALL
        .iter()
        .map(|m| format!("- {}: {}\n", collector_name(*m), collector_purpose(*m)))
        .collect();
    format!(
        "Create a research plan for: \"{search_term}\"\n\n\
         Available tools:\n{collectors}\n\
         Respond in JSON:\n\
         {{\n  \"goal\": \"research objective\",\n  \"steps\": [\n    \
         {{\"action\": \"tool_name\", \"reason\": \"why\"}}\n  ]\n}}"
    )
}

#[must_use]
pub fn analyst_prompt(search_term: &str, counts: &BTreeMap<Marketplace, usize>) -> String {
    let lines: String = Marketplace::ALL
        .iter()
        .map(|m| format!("{m}: {} products\n", counts.get(m).copied().unwrap_or(0)))
        .collect();
    format!(
        "Analyze these results:\n\nSearch: {search_term}\n{lines}\n\
         Provide 2-3 sentence analysis with one key insight."
    )
}

/// Plan used whenever the planner is unavailable or its output is unusable:
/// every collector, in priority order.
#[must_use]
pub fn default_plan(search_term: &str) -> ResearchPlan {
    ResearchPlan {
        goal: format!("Research {search_term}"),
        steps: Marketplace::ALL
            .iter()
            .map(|m| PlanStep {
                action: collector_name(*m).to_string(),
                reason: match m {
                    Marketplace::Wholesale => "Find wholesale".to_string(),
                    Marketplace::Retail => "Find retail".to_string(),
                },
            })
            .collect(),
    }
}

/// Parses planner output, accepting JSON wrapped in prose or code fences by
/// taking the span from the first `{` to the last `}`.
#[must_use]
pub fn parse_plan(response: &str) -> Option<ResearchPlan> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end < start {
        return None;
    }
    let plan: ResearchPlan = serde_json::from_str(&response[start..=end]).ok()?;
    (!plan.goal.trim().is_empty()).then_some(plan)
}
