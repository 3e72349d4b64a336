use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{Marketplace, ProductRecord};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Cancelled,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Result of invoking (or skipping) one marketplace's extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketplaceOutcome {
    pub marketplace: Marketplace,
    /// `false` only when the search page itself could not be reached.
    pub success: bool,
    pub records: usize,
    pub error: Option<String>,
}

/// Run-scoped accumulator owned by the orchestrator while a run is active.
///
/// Records are kept in discovery order. Finalizing with
/// [`RunAccumulator::finish`] consumes the accumulator, so nothing can be
/// appended to a finished run.
#[derive(Debug)]
pub struct RunAccumulator {
    run_id: Uuid,
    search_term: String,
    started_at: DateTime<Utc>,
    records: Vec<ProductRecord>,
    by_source: BTreeMap<Marketplace, usize>,
    outcomes: Vec<MarketplaceOutcome>,
}

impl RunAccumulator {
    #[must_use]
    pub fn new(search_term: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            search_term: search_term.to_string(),
            started_at: Utc::now(),
            records: Vec::new(),
            by_source: BTreeMap::new(),
            outcomes: Vec::new(),
        }
    }

    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Registers a marketplace whose extractor is about to run, so it shows
    /// up in the per-marketplace counts even if it yields nothing.
    pub fn begin_marketplace(&mut self, marketplace: Marketplace) {
        self.by_source.entry(marketplace).or_insert(0);
    }

    /// Appends a record and returns a reference to the stored copy.
    pub fn push(&mut self, record: ProductRecord) -> &ProductRecord {
        *self.by_source.entry(record.source()).or_insert(0) += 1;
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn record_outcome(&mut self, outcome: MarketplaceOutcome) {
        self.outcomes.push(outcome);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Per-marketplace counts collected so far.
    #[must_use]
    pub fn by_source(&self) -> &BTreeMap<Marketplace, usize> {
        &self.by_source
    }

    #[must_use]
    pub fn finish(self, status: RunStatus) -> RunResult {
        RunResult {
            run_id: self.run_id,
            search_term: self.search_term,
            status,
            started_at: self.started_at,
            finished_at: Utc::now(),
            records: self.records,
            by_source: self.by_source,
            outcomes: self.outcomes,
        }
    }
}

/// Final, immutable result of a research run.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    run_id: Uuid,
    search_term: String,
    status: RunStatus,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    records: Vec<ProductRecord>,
    by_source: BTreeMap<Marketplace, usize>,
    outcomes: Vec<MarketplaceOutcome>,
}

impl RunResult {
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    #[must_use]
    pub fn status(&self) -> RunStatus {
        self.status
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    /// Records in discovery order (all of one marketplace before the next).
    #[must_use]
    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    /// Hands the record list over by value, e.g. to a reporting sink.
    #[must_use]
    pub fn into_records(self) -> Vec<ProductRecord> {
        self.records
    }

    #[must_use]
    pub fn by_source(&self) -> &BTreeMap<Marketplace, usize> {
        &self.by_source
    }

    #[must_use]
    pub fn count_for(&self, marketplace: Marketplace) -> usize {
        self.by_source.get(&marketplace).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn outcomes(&self) -> &[MarketplaceOutcome] {
        &self.outcomes
    }

    #[must_use]
    pub fn outcome_for(&self, marketplace: Marketplace) -> Option<&MarketplaceOutcome> {
        self.outcomes.iter().find(|o| o.marketplace == marketplace)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A completed run that found nothing. This is a valid outcome, not an
    /// error; callers show a "no products found" notice.
    #[must_use]
    pub fn no_products_found(&self) -> bool {
        self.status == RunStatus::Completed && self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(source: Marketplace, title: &str) -> ProductRecord {
        ProductRecord::new(source, title, "$1.00").unwrap()
    }

    #[test]
    fn accumulator_counts_per_marketplace_in_order() {
        let mut acc = RunAccumulator::new("wireless earbuds");
        acc.begin_marketplace(Marketplace::Wholesale);
        for i in 0..3 {
            acc.push(record(Marketplace::Wholesale, &format!("w{i}")));
        }
        acc.begin_marketplace(Marketplace::Retail);
        for i in 0..5 {
            acc.push(record(Marketplace::Retail, &format!("r{i}")));
        }

        let result = acc.finish(RunStatus::Completed);
        assert_eq!(result.len(), 8);
        assert_eq!(result.count_for(Marketplace::Wholesale), 3);
        assert_eq!(result.count_for(Marketplace::Retail), 5);
        let sources: Vec<Marketplace> = result.records().iter().map(ProductRecord::source).collect();
        assert!(sources[..3].iter().all(|s| *s == Marketplace::Wholesale));
        assert!(sources[3..].iter().all(|s| *s == Marketplace::Retail));
    }

    #[test]
    fn begun_marketplace_with_no_records_reports_zero() {
        let mut acc = RunAccumulator::new("earbuds");
        acc.begin_marketplace(Marketplace::Retail);
        let result = acc.finish(RunStatus::Completed);
        assert_eq!(result.by_source().get(&Marketplace::Retail), Some(&0));
        assert!(result.no_products_found());
    }

    #[test]
    fn cancelled_empty_run_is_not_no_products_found() {
        let acc = RunAccumulator::new("earbuds");
        let result = acc.finish(RunStatus::Cancelled);
        assert!(result.is_empty());
        assert!(!result.no_products_found());
    }

    #[test]
    fn outcome_lookup_by_marketplace() {
        let mut acc = RunAccumulator::new("earbuds");
        acc.record_outcome(MarketplaceOutcome {
            marketplace: Marketplace::Wholesale,
            success: false,
            records: 0,
            error: Some("dns failure".to_string()),
        });
        let result = acc.finish(RunStatus::Completed);
        let outcome = result.outcome_for(Marketplace::Wholesale).unwrap();
        assert!(!outcome.success);
        assert!(result.outcome_for(Marketplace::Retail).is_none());
    }
}
