//! Wholesale-to-retail profitability estimates.
//!
//! Supplier cost is the median numeric wholesale price of the run. Each
//! retail record with a numeric price is then scored against that cost.

use arbscout_core::{Marketplace, ProductRecord};
use serde::Serialize;

use crate::price::parse_price;
use crate::stats::median_of_sorted;

/// Margin at or above which an opportunity counts as viable.
pub const VIABLE_MARGIN_PCT: f64 = 30.0;

const TOP_OPPORTUNITIES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Opportunity {
    pub title: String,
    pub url: Option<String>,
    pub retail_price: f64,
    pub supplier_cost: f64,
    pub profit: f64,
    /// Percentage of the retail price.
    pub margin: f64,
}

impl Opportunity {
    #[must_use]
    pub fn is_viable(&self) -> bool {
        self.margin >= VIABLE_MARGIN_PCT
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profitability {
    pub supplier_cost: f64,
    /// One per priced retail record, in discovery order.
    pub opportunities: Vec<Opportunity>,
}

impl Profitability {
    /// Positive margins only; a loss-making listing is not an opportunity.
    fn positive_margins(&self) -> impl Iterator<Item = f64> + '_ {
        self.opportunities
            .iter()
            .map(|o| o.margin)
            .filter(|m| *m > 0.0)
    }

    /// Mean of the positive margins, 0 when there are none.
    #[must_use]
    pub fn avg_margin(&self) -> f64 {
        let (sum, n) = self
            .positive_margins()
            .fold((0.0, 0u32), |(sum, n), m| (sum + m, n + 1));
        if n == 0 {
            0.0
        } else {
            sum / f64::from(n)
        }
    }

    /// Highest margin, 0 when no opportunity is profitable.
    #[must_use]
    pub fn best_margin(&self) -> f64 {
        self.positive_margins().fold(0.0, f64::max)
    }

    #[must_use]
    pub fn viable_count(&self) -> usize {
        self.opportunities.iter().filter(|o| o.is_viable()).count()
    }

    /// The three profitable opportunities with the highest margin.
    #[must_use]
    pub fn top(&self) -> Vec<&Opportunity> {
        let mut ranked: Vec<&Opportunity> =
            self.opportunities.iter().filter(|o| o.margin > 0.0).collect();
        ranked.sort_by(|a, b| b.margin.total_cmp(&a.margin));
        ranked.truncate(TOP_OPPORTUNITIES);
        ranked
    }

    /// Cost, profit and margin for one record, if it is a priced retail
    /// listing.
    #[must_use]
    pub fn score(&self, record: &ProductRecord) -> Option<Opportunity> {
        if record.source() != Marketplace::Retail {
            return None;
        }
        let retail_price = parse_price(record.price())?;
        Some(score(record, retail_price, self.supplier_cost))
    }
}

/// `None` when the run holds no wholesale record with a numeric price.
#[must_use]
pub fn estimate_profitability(records: &[ProductRecord]) -> Option<Profitability> {
    let mut wholesale: Vec<f64> = records
        .iter()
        .filter(|r| r.source() == Marketplace::Wholesale)
        .filter_map(|r| parse_price(r.price()))
        .collect();
    if wholesale.is_empty() {
        tracing::debug!("no priced wholesale records; skipping profitability");
        return None;
    }
    wholesale.sort_by(f64::total_cmp);
    let supplier_cost = median_of_sorted(&wholesale);

    let opportunities = records
        .iter()
        .filter(|r| r.source() == Marketplace::Retail)
        .filter_map(|r| parse_price(r.price()).map(|p| score(r, p, supplier_cost)))
        .collect();

    Some(Profitability {
        supplier_cost,
        opportunities,
    })
}

fn score(record: &ProductRecord, retail_price: f64, supplier_cost: f64) -> Opportunity {
    let profit = retail_price - supplier_cost;
    let margin = if retail_price > 0.0 {
        profit / retail_price * 100.0
    } else {
        0.0
    };
    Opportunity {
        title: record.title().to_string(),
        url: record.url().map(str::to_string),
        retail_price,
        supplier_cost,
        profit,
        margin,
    }
}
