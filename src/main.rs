use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use siemdeck::application::config::AppConfig;
use siemdeck::application::services::{
    AlertConsole, AlertListStore, AlertQueryState, MetricsService, SelectionResolver,
};
use siemdeck::infrastructure::http::alert_api::HttpAlertSource;
use siemdeck::presentation::cli::app::{Cli, Commands, ListArgs};
use siemdeck::presentation::cli::commands::list::run_list;
use siemdeck::presentation::cli::commands::show::run_show;
use siemdeck::presentation::cli::commands::stats::run_stats;

fn setup_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    // Load configuration
    let config = if let Some(ref path) = cli.config {
        AppConfig::load_from(path)?
    } else {
        AppConfig::load()?
    };

    if !config.display.color {
        colored::control::set_override(false);
    }

    let command = cli
        .command
        .unwrap_or_else(|| Commands::List(ListArgs::default()));
    let requested_limit = match command {
        Commands::List(ref args) => args.limit,
        Commands::Show { .. } | Commands::Stats(_) => None,
    };
    let page_size = config.query.effective_page_size(requested_limit);

    // Manual DI: main.rs is the only place that knows concrete types
    let source = HttpAlertSource::new(
        &config.api.base_url,
        config.api.timeout(),
        config.query.search_fields.clone(),
    )
    .context("Failed to initialise alert backend client")?;
    tracing::debug!(base_url = %config.api.base_url, page_size, "alert backend configured");

    let query = AlertQueryState::new(page_size).context("Invalid page size")?;
    let list = AlertListStore::new(&source, &query);
    let selection = SelectionResolver::new(&source, &list);
    let console = AlertConsole::new(&query, &list, &selection);
    let metrics = MetricsService::new(&source);

    match command {
        Commands::List(ref args) => run_list(&console, args).await?,
        Commands::Show { ref id, json } => run_show(&console, id, json).await?,
        Commands::Stats(ref args) => run_stats(&metrics, args).await?,
    }

    Ok(())
}
