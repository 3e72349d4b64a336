//! History store wiring: one `searches` row per run plus its products.

use arbscout_core::{AppConfig, PlatformToggleSet, ProductRecord, RunResult, RunStatus, SearchCriteria};
use arbscout_db::{NewProduct, PoolConfig, SearchOutcome, SearchStatus};
use arbscout_report::{parse_price, Profitability};
use sqlx::SqlitePool;

/// Records one run. Failures are logged and never abort the run itself.
pub(crate) struct HistoryWriter {
    pool: SqlitePool,
    search_id: i64,
}

impl HistoryWriter {
    pub(crate) async fn open(
        config: &AppConfig,
        criteria: &SearchCriteria,
        toggles: PlatformToggleSet,
    ) -> Option<Self> {
        Self::open_at(&config.database_url, criteria, toggles).await
    }

    pub(crate) async fn open_at(
        database_url: &str,
        criteria: &SearchCriteria,
        toggles: PlatformToggleSet,
    ) -> Option<Self> {
        let pool = match arbscout_db::open_history(database_url, PoolConfig::default()).await {
            Ok(pool) => pool,
            Err(e) => {
                tracing::warn!(error = %e, "history store unavailable; run will not be recorded");
                return None;
            }
        };
        match arbscout_db::create_search(
            &pool,
            criteria.search_term(),
            toggles,
            criteria.max_results(),
        )
        .await
        {
            Ok(search_id) => Some(Self { pool, search_id }),
            Err(e) => {
                tracing::warn!(error = %e, "failed to record search");
                None
            }
        }
    }

    pub(crate) async fn complete(self, result: &RunResult, profitability: Option<&Profitability>) {
        let products = products_for_history(result.records(), profitability);
        if let Err(e) = arbscout_db::insert_products(&self.pool, self.search_id, &products).await {
            tracing::warn!(error = %e, search_id = self.search_id, "failed to record products");
        }
        self.close_with(search_outcome(result, profitability)).await;
    }

    pub(crate) async fn fail(self) {
        self.close_with(SearchOutcome {
            status: SearchStatus::Failed,
            total_results: 0,
            avg_margin: None,
            best_margin: None,
        })
        .await;
    }

    async fn close_with(self, outcome: SearchOutcome) {
        if let Err(e) = arbscout_db::complete_search(&self.pool, self.search_id, outcome).await {
            tracing::warn!(error = %e, search_id = self.search_id, "failed to close search record");
        }
        self.pool.close().await;
    }
}

/// Wholesale rows carry their own price as supplier cost; retail rows are
/// scored against the run's supplier cost when one exists.
pub(crate) fn products_for_history(
    records: &[ProductRecord],
    profitability: Option<&Profitability>,
) -> Vec<NewProduct> {
    records
        .iter()
        .map(|record| {
            let price = parse_price(record.price());
            let mut product = NewProduct {
                source: record.source(),
                title: record.title().to_string(),
                price,
                supplier_cost: None,
                profit: None,
                margin: None,
                url: record.url().map(str::to_string),
            };
            if let Some(scored) = profitability.and_then(|p| p.score(record)) {
                product.supplier_cost = Some(scored.supplier_cost);
                product.profit = Some(scored.profit);
                product.margin = Some(scored.margin);
            } else if record.source() == arbscout_core::Marketplace::Wholesale {
                product.supplier_cost = price;
            }
            product
        })
        .collect()
}

pub(crate) fn search_outcome(
    result: &RunResult,
    profitability: Option<&Profitability>,
) -> SearchOutcome {
    SearchOutcome {
        status: match result.status() {
            RunStatus::Completed => SearchStatus::Completed,
            RunStatus::Cancelled => SearchStatus::Cancelled,
        },
        total_results: result.len(),
        avg_margin: profitability.map(Profitability::avg_margin),
        best_margin: profitability.map(Profitability::best_margin),
    }
}

/// `arbscout history`: lists past runs, or the products of one.
pub(crate) async fn run_history(
    config: &AppConfig,
    term: Option<&str>,
    limit: i64,
    show: Option<i64>,
) -> anyhow::Result<()> {
    let pool = arbscout_db::open_history(&config.database_url, PoolConfig::default()).await?;

    if let Some(id) = show {
        let search = arbscout_db::get_search(&pool, id).await?;
        println!(
            "#{} \"{}\" {} ({})",
            search.id, search.search_term, search.timestamp, search.status
        );
        for p in arbscout_db::list_search_products(&pool, id).await? {
            println!(
                "  {:<9} {:>10} {:>8} {}",
                p.source,
                p.price.map_or_else(|| "N/A".to_string(), |v| format!("${v:.2}")),
                p.margin.map_or_else(String::new, |m| format!("{m:.1}%")),
                p.title
            );
        }
        return Ok(());
    }

    let searches = match term {
        Some(term) => arbscout_db::find_searches(&pool, term).await?,
        None => arbscout_db::list_recent_searches(&pool, limit).await?,
    };
    if searches.is_empty() {
        println!("No searches recorded");
    }
    for s in searches {
        println!(
            "{:>5}  {}  {:<11} {:>4} results  best {:>6}  {}",
            s.id,
            s.timestamp.format("%Y-%m-%d %H:%M"),
            s.status,
            s.total_results.unwrap_or(0),
            s.best_margin.map_or_else(|| "-".to_string(), |m| format!("{m:.1}%")),
            s.search_term
        );
    }
    Ok(())
}
