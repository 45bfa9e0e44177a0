use colored::Colorize;

use crate::domain::value_objects::severity::Severity;
use crate::domain::value_objects::severity_distribution::SeverityDistribution;

const BAR_WIDTH: usize = 30;

/// Horizontal bar filled to `percent` of `width`, coloured by band.
#[must_use]
pub fn progress_bar(percent: f64, width: usize, severity: Severity) -> String {
    let ratio = (percent / 100.0).clamp(0.0, 1.0);
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);

    let bar_filled = "█".repeat(filled);
    let bar_empty = "░".repeat(empty);

    let colored_bar = match severity {
        Severity::Critical => bar_filled.red().bold(),
        Severity::High => bar_filled.yellow(),
        Severity::Medium => bar_filled.bright_yellow(),
        Severity::Low => bar_filled.blue(),
    };

    format!("{colored_bar}{}", bar_empty.dimmed())
}

/// One line per band plus a total line.
#[must_use]
pub fn format_distribution(distribution: &SeverityDistribution) -> String {
    let mut lines: Vec<String> = Severity::ALL
        .iter()
        .map(|&severity| {
            let percent = distribution.percent(severity);
            format!(
                "  {:<9} {} {:>7} {:>5.1}%",
                severity.to_string(),
                progress_bar(percent, BAR_WIDTH, severity),
                distribution.count(severity),
                percent
            )
        })
        .collect();
    lines.push(format!(
        "  {:<9} {} {:>7}",
        "TOTAL".bold(),
        " ".repeat(BAR_WIDTH),
        distribution.total()
    ));
    lines.join("\n")
}
