//! The default command: one research run from prompt to export.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use arbscout_advisor::{Advisor, AdvisoryClient, SilentAdvisor};
use arbscout_core::{load_profiles, AppConfig, PlatformToggleSet, ProfileSet, RunResult, SearchCriteria};
use arbscout_report::{estimate_profitability, export_csv, export_file_name, summarize};
use arbscout_research::{spawn_research, Orchestrator, ResearchRequest, RunError};

use crate::history::HistoryWriter;
use crate::render::{summary_lines, Renderer};
use crate::ResearchArgs;

pub(crate) async fn run_research(mut config: AppConfig, args: ResearchArgs) -> anyhow::Result<()> {
    apply_overrides(&mut config, &args);
    let toggles = toggles_from(&args);
    if !toggles.any_marketplace_enabled() {
        anyhow::bail!("no marketplace enabled; drop --no-wholesale or --no-retail");
    }

    let term = match args.search_term.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => term.to_string(),
        _ => prompt_search_term()?,
    };
    let criteria = SearchCriteria::new(
        &term,
        config.min_moq,
        config.min_seller_years,
        config.max_products_per_site,
    )
    .context("invalid search criteria")?;

    let profiles = match &config.marketplaces_path {
        Some(path) => load_profiles(path)
            .with_context(|| format!("failed to load marketplace profiles from {}", path.display()))?,
        None => ProfileSet::builtin(),
    };

    let advisor: Arc<dyn Advisor> = match AdvisoryClient::from_config(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::warn!(error = %e, "advisory client unavailable; running without it");
            Arc::new(SilentAdvisor)
        }
    };
    let orchestrator = Arc::new(Orchestrator::from_config(&config, &profiles, advisor));

    let history = if args.no_history {
        None
    } else {
        HistoryWriter::open(&config, &criteria, toggles).await
    };

    println!("Researching \"{term}\" ({criteria})");
    let mut handle = spawn_research(orchestrator, ResearchRequest { criteria, toggles });
    let cancel = handle.cancellation_token();
    let mut renderer = Renderer::default();
    let mut interrupts = Interrupts::default();
    let mut listening = true;

    loop {
        tokio::select! {
            event = handle.next_event() => match event {
                Some(event) => renderer.handle(&event),
                None => break,
            },
            signal = tokio::signal::ctrl_c(), if listening => match signal {
                Ok(()) => match interrupts.press() {
                    Interrupt::Cancel => {
                        eprintln!("Cancelling; the current step will finish first. Press Ctrl-C again to stop now.");
                        cancel.cancel();
                    }
                    Interrupt::Abort => {
                        eprintln!("Stopping now.");
                        handle.abort();
                        break;
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "ctrl-c handler unavailable");
                    listening = false;
                }
            },
        }
    }

    match handle.wait().await {
        Ok(result) => finish(&config.output_dir, &result, &renderer, history).await,
        Err(RunError::Teardown { result, source }) => {
            finish(&config.output_dir, &result, &renderer, history).await?;
            Err(anyhow::Error::new(source).context("browser session did not close cleanly"))
        }
        Err(e) => {
            if let Some(history) = history {
                history.fail().await;
            }
            Err(anyhow::Error::new(e).context("research run failed"))
        }
    }
}

/// Records the run in history, exports it and prints the summary. History is
/// written before the export so a failed export never leaves the search open.
pub(crate) async fn finish(
    output_dir: &Path,
    result: &RunResult,
    renderer: &Renderer,
    history: Option<HistoryWriter>,
) -> anyhow::Result<()> {
    let stats = summarize(result.records());
    let profitability = estimate_profitability(result.records());

    if let Some(history) = history {
        history.complete(result, profitability.as_ref()).await;
    }

    let export = export_csv(
        result.records(),
        output_dir,
        &export_file_name(result.search_term(), result.finished_at()),
    );
    let export_path = match &export {
        Ok(path) => path.as_deref(),
        Err(e) => {
            tracing::error!(error = %e, dir = %output_dir.display(), "export failed");
            None
        }
    };

    for line in summary_lines(
        result,
        &stats,
        profitability.as_ref(),
        renderer.analysis(),
        export_path,
    ) {
        println!("{line}");
    }

    export.map(|_| ()).context("failed to export results")
}

/// What a Ctrl-C press should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Interrupt {
    Cancel,
    Abort,
}

/// First press requests cooperative cancellation; any later press aborts.
#[derive(Debug, Default)]
pub(crate) struct Interrupts {
    presses: u32,
}

impl Interrupts {
    pub(crate) fn press(&mut self) -> Interrupt {
        self.presses = self.presses.saturating_add(1);
        if self.presses == 1 {
            Interrupt::Cancel
        } else {
            Interrupt::Abort
        }
    }
}

fn apply_overrides(config: &mut AppConfig, args: &ResearchArgs) {
    if args.headless {
        config.headless = true;
    }
    if let Some(max) = args.max_products {
        config.max_products_per_site = usize::try_from(max).unwrap_or(usize::MAX);
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir.clone_from(dir);
    }
}

pub(crate) fn toggles_from(args: &ResearchArgs) -> PlatformToggleSet {
    PlatformToggleSet {
        wholesale: !args.no_wholesale,
        retail: !args.no_retail,
        market_research: args.market_research,
    }
}

fn prompt_search_term() -> anyhow::Result<String> {
    let term: String = dialoguer::Input::new()
        .with_prompt("Product to research")
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("search term cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .context("failed to read search term")?;
    Ok(term.trim().to_string())
}
