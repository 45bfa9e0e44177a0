use colored::Colorize;

use crate::domain::entities::alert::Alert;
use crate::domain::value_objects::severity::Severity;

use super::alert_fmt::sanitize_terminal;

const DESCRIPTION_WIDTH: usize = 48;

fn truncate(value: &str, width: usize) -> String {
    let clean = sanitize_terminal(value).replace(['\n', '\t'], " ");
    if clean.chars().count() <= width {
        return clean;
    }
    let mut cut: String = clean.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn colorize_severity(cell: &str, severity: Severity) -> String {
    match severity {
        Severity::Critical => cell.red().bold().to_string(),
        Severity::High => cell.red().to_string(),
        Severity::Medium => cell.yellow().to_string(),
        Severity::Low => cell.blue().to_string(),
    }
}

/// Formats alerts as an aligned table, one row per alert in the given order.
///
/// # Returns
///
/// A multi-line string with header, separator, and alert rows.
#[must_use]
pub fn format_alert_table(alerts: &[Alert]) -> String {
    let header = format!(
        "{:<20} {:<10} {:>5} {:<16} {:<8} {:<DESCRIPTION_WIDTH$} {}",
        "TIME", "SEVERITY", "LEVEL", "AGENT", "RULE", "DESCRIPTION", "ID"
    );
    let separator = "─".repeat(header.chars().count());

    let mut rows = vec![header, separator];

    for alert in alerts {
        let severity = alert.severity();
        // Pad before colouring so escape codes don't break alignment.
        let severity_cell = colorize_severity(&format!("{:<10}", severity.to_string()), severity);
        rows.push(format!(
            "{:<20} {} {:>5} {:<16} {:<8} {:<DESCRIPTION_WIDTH$} {}",
            alert.timestamp.format("%Y-%m-%d %H:%M:%S"),
            severity_cell,
            alert.rule.level,
            truncate(&alert.agent.name, 16),
            truncate(&alert.rule.id, 8),
            truncate(&alert.rule.description, DESCRIPTION_WIDTH),
            sanitize_terminal(&alert.id),
        ));
    }

    rows.join("\n")
}

/// One-line summary of the visible window, e.g. `Showing 11-20 of 42 (page 2/5)`.
#[must_use]
pub fn format_page_footer(offset: u32, shown: usize, total: u64, limit: u32) -> String {
    if shown == 0 {
        return format!("Showing 0 of {total}");
    }
    let first = u64::from(offset) + 1;
    let last = u64::from(offset).saturating_add(u64::try_from(shown).unwrap_or(u64::MAX));
    let limit = u64::from(limit.max(1));
    let page = u64::from(offset) / limit + 1;
    let pages = total.div_ceil(limit).max(page);
    format!("Showing {first}-{last} of {total} (page {page}/{pages})")
}
