use anyhow::Context;
use colored::Colorize;

use crate::application::services::{AlertConsole, AlertListSnapshot};
use crate::domain::value_objects::query::AlertQuery;
use crate::presentation::cli::app::ListArgs;
use crate::presentation::cli::formatters::alert_fmt;
use crate::presentation::cli::formatters::table_fmt::{format_alert_table, format_page_footer};

/// Loads the page described by `args` through the console and prints it.
///
/// # Errors
///
/// Returns an error if the backend request fails or JSON serialization fails.
pub async fn run_list(console: &AlertConsole<'_>, args: &ListArgs) -> anyhow::Result<()> {
    let offset = console.query().pagination.offset_of_page(args.page_index());
    let outcome = console.set_view(args.filters(), offset).await;
    tracing::debug!(?outcome, offset, "alert page fetched");

    let state = console.state();
    if let Some(error) = state.error.clone() {
        return Err(error).context("Failed to fetch alerts");
    }

    println!("{}", render_list(&state, &console.query(), args.json)?);
    Ok(())
}

/// Renders the loaded page as JSON or as a table with a footer.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_list(
    state: &AlertListSnapshot,
    query: &AlertQuery,
    json: bool,
) -> anyhow::Result<String> {
    let pagination = query.pagination;
    if json {
        let body = serde_json::json!({
            "alerts": state.alerts,
            "total": state.total,
            "limit": pagination.limit(),
            "offset": pagination.offset,
        });
        return Ok(serde_json::to_string_pretty(&body)?);
    }

    if state.alerts.is_empty() {
        alert_fmt::print_no_alerts();
        return Ok(format_page_footer(pagination.offset, 0, state.total, pagination.limit())
            .dimmed()
            .to_string());
    }

    Ok(format!(
        "{}\n\n{}",
        format_alert_table(&state.alerts),
        format_page_footer(
            pagination.offset,
            state.alerts.len(),
            state.total,
            pagination.limit()
        )
        .dimmed()
    ))
}
