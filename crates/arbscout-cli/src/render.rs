//! Terminal rendering of run events and the closing summary.

use std::path::Path;

use arbscout_core::{Marketplace, RunResult};
use arbscout_report::{Profitability, SummaryStats};
use arbscout_research::{AdvisoryKind, RunEvent};

#[derive(Debug, Default)]
pub(crate) struct Renderer {
    progress: u8,
    analysis: Option<String>,
}

impl Renderer {
    pub(crate) fn handle(&mut self, event: &RunEvent) {
        match event {
            RunEvent::Progress(p) => self.progress = *p,
            RunEvent::Advisory {
                kind: AdvisoryKind::Analysis,
                text,
            } => self.analysis = Some(text.clone()),
            RunEvent::Error(message) => eprintln!("[{:>3}%] error: {message}", self.progress),
            _ => {}
        }
        if let Some(line) = describe(event) {
            println!("[{:>3}%] {line}", self.progress);
        }
    }

    pub(crate) fn analysis(&self) -> Option<&str> {
        self.analysis.as_deref()
    }
}

/// One line for an event, or `None` for events that are folded into later
/// output.
pub(crate) fn describe(event: &RunEvent) -> Option<String> {
    match event {
        RunEvent::Phase(phase) => Some(format!("== {phase} ==")),
        RunEvent::Log(message) => Some(message.clone()),
        RunEvent::Record(record) => Some(format!(
            "  + {}: {} ({})",
            record.source(),
            record.title(),
            record.price()
        )),
        RunEvent::Advisory {
            kind: AdvisoryKind::Plan,
            text,
        } => Some(format!("Plan: {text}")),
        RunEvent::Done { status, total } => Some(format!("Run {status}: {total} products")),
        RunEvent::Progress(_)
        | RunEvent::MarketplaceFinished(_)
        | RunEvent::Advisory {
            kind: AdvisoryKind::Analysis,
            ..
        }
        | RunEvent::Error(_) => None,
    }
}

pub(crate) fn summary_lines(
    result: &RunResult,
    stats: &SummaryStats,
    profitability: Option<&Profitability>,
    analysis: Option<&str>,
    export: Option<&Path>,
) -> Vec<String> {
    let mut lines = vec![String::new(), format!("Summary for \"{}\"", result.search_term())];

    if result.no_products_found() {
        lines.push("  No products found".to_string());
        return lines;
    }

    lines.push(format!("  Total products: {}", stats.total));
    for marketplace in Marketplace::ALL {
        if let Some(count) = stats.by_source.get(&marketplace) {
            lines.push(format!("  {marketplace}: {count}"));
        }
    }
    if let Some(price) = &stats.price {
        lines.push(format!(
            "  Price: mean ${:.2}, median ${:.2}, range ${:.2} - ${:.2}",
            price.mean, price.median, price.min, price.max
        ));
    }

    match profitability {
        Some(p) => {
            lines.push(format!("  Supplier cost (median wholesale): ${:.2}", p.supplier_cost));
            lines.push(format!(
                "  Avg margin: {:.1}%  Best margin: {:.1}%  Viable: {}",
                p.avg_margin(),
                p.best_margin(),
                p.viable_count()
            ));
            for (i, o) in p.top().iter().enumerate() {
                lines.push(format!(
                    "  {}. {} - {:.1}% margin (${:.2} -> ${:.2})",
                    i + 1,
                    o.title,
                    o.margin,
                    o.supplier_cost,
                    o.retail_price
                ));
            }
        }
        None => lines.push("  Profitability: no priced wholesale listings".to_string()),
    }

    if let Some(text) = analysis {
        lines.push(format!("  Analysis: {text}"));
    }
    if let Some(path) = export {
        lines.push(format!("  Exported: {}", path.display()));
    }
    lines
}
