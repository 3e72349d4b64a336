//! Summary statistics and the data behind the visual summary panels.
//!
//! Rendering is left to the caller; these types carry only numbers keyed by
//! marketplace.

use std::collections::BTreeMap;

use arbscout_core::{Marketplace, ProductRecord};
use serde::Serialize;

use crate::price::parse_price;

const TOP_PRODUCTS: usize = 10;
const TOP_TITLE_CHARS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceStats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl PriceStats {
    /// `None` for an empty slice.
    #[must_use]
    pub fn from_prices(prices: &[f64]) -> Option<Self> {
        if prices.is_empty() {
            return None;
        }
        let mut sorted = prices.to_vec();
        sorted.sort_by(f64::total_cmp);
        #[allow(clippy::cast_precision_loss)]
        let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;
        Some(Self {
            mean,
            median: median_of_sorted(&sorted),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total: usize,
    pub by_source: BTreeMap<Marketplace, usize>,
    /// Over records with a numeric price only.
    pub price: Option<PriceStats>,
}

#[must_use]
pub fn summarize(records: &[ProductRecord]) -> SummaryStats {
    let mut by_source = BTreeMap::new();
    for record in records {
        *by_source.entry(record.source()).or_insert(0) += 1;
    }
    let prices: Vec<f64> = records.iter().filter_map(|r| parse_price(r.price())).collect();
    SummaryStats {
        total: records.len(),
        by_source,
        price: PriceStats::from_prices(&prices),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopProduct {
    pub source: Marketplace,
    /// Truncated to 30 characters plus an ellipsis.
    pub label: String,
    pub price: f64,
}

/// Data for the four summary panels: price distribution, product counts,
/// average price, and the highest-priced products.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelData {
    pub distribution: BTreeMap<Marketplace, Vec<f64>>,
    pub counts: BTreeMap<Marketplace, usize>,
    pub average_price: BTreeMap<Marketplace, f64>,
    pub top_by_price: Vec<TopProduct>,
}

impl PanelData {
    /// A side-by-side distribution is only meaningful with priced records
    /// from more than one marketplace.
    #[must_use]
    pub fn distribution_comparable(&self) -> bool {
        self.distribution.len() > 1
    }
}

#[must_use]
pub fn panel_data(records: &[ProductRecord]) -> PanelData {
    let mut distribution: BTreeMap<Marketplace, Vec<f64>> = BTreeMap::new();
    let mut counts = BTreeMap::new();
    let mut priced = Vec::new();

    for record in records {
        *counts.entry(record.source()).or_insert(0) += 1;
        if let Some(price) = parse_price(record.price()) {
            distribution.entry(record.source()).or_default().push(price);
            priced.push((record, price));
        }
    }

    let average_price = distribution
        .iter()
        .filter_map(|(m, prices)| PriceStats::from_prices(prices).map(|s| (*m, s.mean)))
        .collect();

    // Stable sort keeps discovery order among equal prices.
    priced.sort_by(|a, b| b.1.total_cmp(&a.1));
    let top_by_price = priced
        .into_iter()
        .take(TOP_PRODUCTS)
        .map(|(record, price)| TopProduct {
            source: record.source(),
            label: truncate_label(record.title()),
            price,
        })
        .collect();

    PanelData {
        distribution,
        counts,
        average_price,
        top_by_price,
    }
}

pub(crate) fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn truncate_label(title: &str) -> String {
    if title.chars().count() > TOP_TITLE_CHARS {
        let head: String = title.chars().take(TOP_TITLE_CHARS).collect();
        format!("{head}...")
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(source: Marketplace, title: &str, price: &str) -> ProductRecord {
        ProductRecord::new(source, title, price).unwrap()
    }

    #[test]
    fn summary_counts_every_record_but_prices_only_numeric() {
        let records = vec![
            rec(Marketplace::Wholesale, "a", "$2.00"),
            rec(Marketplace::Wholesale, "b", "N/A"),
            rec(Marketplace::Retail, "c", "$10.00"),
            rec(Marketplace::Retail, "d", "$6.00"),
        ];
        let stats = summarize(&records);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_source[&Marketplace::Wholesale], 2);
        assert_eq!(stats.by_source[&Marketplace::Retail], 2);
        let price = stats.price.unwrap();
        assert!((price.mean - 6.0).abs() < 1e-9);
        assert!((price.median - 6.0).abs() < 1e-9);
        assert!((price.min - 2.0).abs() < 1e-9);
        assert!((price.max - 10.0).abs() < 1e-9);
    }

    #[test]
    fn summary_of_nothing() {
        let stats = summarize(&[]);
        assert_eq!(stats.total, 0);
        assert!(stats.by_source.is_empty());
        assert!(stats.price.is_none());
    }

    #[test]
    fn even_median_averages_the_middle_pair() {
        assert!((median_of_sorted(&[1.0, 2.0, 4.0, 8.0]) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn panels_rank_top_products_and_truncate_labels() {
        let long = "Bluetooth 5.3 Wireless Earbuds with Charging Case";
        let mut records: Vec<ProductRecord> = (1..=12)
            .map(|i| rec(Marketplace::Retail, &format!("item {i}"), &format!("${i}.00")))
            .collect();
        records.push(rec(Marketplace::Wholesale, long, "$99.00"));

        let panels = panel_data(&records);
        assert_eq!(panels.top_by_price.len(), 10);
        assert_eq!(panels.top_by_price[0].source, Marketplace::Wholesale);
        assert_eq!(panels.top_by_price[0].label, "Bluetooth 5.3 Wireless Earbuds...");
        assert_eq!(panels.top_by_price[1].label, "item 12");
        assert_eq!(panels.counts[&Marketplace::Retail], 12);
        assert!(panels.distribution_comparable());
        assert!((panels.average_price[&Marketplace::Retail] - 6.5).abs() < 1e-9);
    }

    #[test]
    fn single_marketplace_distribution_is_not_comparable() {
        let panels = panel_data(&[rec(Marketplace::Retail, "x", "$1.00")]);
        assert!(!panels.distribution_comparable());
    }
}
