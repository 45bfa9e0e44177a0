use anyhow::{Context, bail};

use crate::application::services::{AlertConsole, Resolution};
use crate::domain::ports::data_source::DataSourceError;
use crate::presentation::cli::formatters::alert_fmt::format_alert_detail;

/// Resolves `id` through the console and prints the full alert.
///
/// # Errors
///
/// Returns an error if the alert does not exist, the backend request fails,
/// or JSON serialization fails.
pub async fn run_show(console: &AlertConsole<'_>, id: &str, json: bool) -> anyhow::Result<()> {
    let alert = match console.select_alert(Some(id)).await {
        Resolution::Found(alert) => alert,
        Resolution::Failed(DataSourceError::NotFound(_)) => bail!("Alert '{id}' not found"),
        Resolution::Failed(error) => {
            return Err(error).with_context(|| format!("Failed to fetch alert '{id}'"));
        }
        other => bail!("Alert '{id}' could not be resolved: {other:?}"),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&alert)?);
    } else {
        println!("{}", format_alert_detail(&alert));
    }
    Ok(())
}
