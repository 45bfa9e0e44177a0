use anyhow::Context;
use colored::Colorize;

use crate::application::services::MetricsService;
use crate::presentation::cli::app::StatsArgs;
use crate::presentation::cli::formatters::stats_fmt::format_distribution;

/// Prints the severity distribution for the requested window.
///
/// # Errors
///
/// Returns an error if the backend request fails or JSON serialization fails.
pub async fn run_stats(metrics: &MetricsService<'_>, args: &StatsArgs) -> anyhow::Result<()> {
    let distribution = metrics
        .severity_distribution(args.window())
        .await
        .context("Failed to fetch severity distribution")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&distribution)?);
    } else {
        println!("{}", "Alerts by severity".bold());
        println!("{}", format_distribution(&distribution));
    }
    Ok(())
}
