mod history;
mod render;
mod research;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "arbscout")]
#[command(about = "Cross-marketplace product research: wholesale supply against retail demand")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    research: ResearchArgs,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show past research runs from the history store
    History {
        /// Only runs whose search term contains this text
        #[arg(long)]
        term: Option<String>,

        /// Number of recent runs to list
        #[arg(long, default_value_t = 20)]
        limit: i64,

        /// Print the stored products of one run
        #[arg(long, value_name = "ID")]
        show: Option<i64>,
    },
}

#[derive(Debug, Args)]
pub(crate) struct ResearchArgs {
    /// Product to research; prompted for when omitted
    pub(crate) search_term: Option<String>,

    /// Run the browser without a visible window
    #[arg(long)]
    pub(crate) headless: bool,

    /// Maximum products collected per marketplace
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub(crate) max_products: Option<u64>,

    /// Skip the wholesale marketplace
    #[arg(long)]
    pub(crate) no_wholesale: bool,

    /// Skip the retail marketplace
    #[arg(long)]
    pub(crate) no_retail: bool,

    /// Include the market research phase
    #[arg(long)]
    pub(crate) market_research: bool,

    /// Do not record this run in the history store
    #[arg(long)]
    pub(crate) no_history: bool,

    /// Directory for the CSV export
    #[arg(long, value_name = "DIR")]
    pub(crate) output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = arbscout_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(Commands::History { term, limit, show }) => {
            history::run_history(&config, term.as_deref(), limit, show).await
        }
        None => research::run_research(config, cli.research).await,
    }
}
