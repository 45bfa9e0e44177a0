use colored::Colorize;

use crate::domain::entities::alert::Alert;
use crate::domain::value_objects::severity::Severity;

/// Strips escape and other control characters to prevent terminal injection.
///
/// Newlines and tabs survive so multi-line logs stay readable.
#[must_use]
pub fn sanitize_terminal(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect()
}

#[must_use]
pub fn severity_badge(severity: Severity) -> String {
    let label = format!(" {severity} ");
    match severity {
        Severity::Critical => format!("{}", label.on_red().white().bold()),
        Severity::High => format!("{}", label.on_yellow().black().bold()),
        Severity::Medium => format!("{}", label.on_bright_yellow().black()),
        Severity::Low => format!("{}", label.on_blue().white()),
    }
}

fn field(label: &str, value: &str) -> String {
    format!("  {:<12} {}", format!("{label}:").dimmed(), sanitize_terminal(value))
}

/// Full, multi-line rendering of one alert.
#[must_use]
pub fn format_alert_detail(alert: &Alert) -> String {
    let severity = alert.severity();
    let mut lines = vec![format!(
        "{} {} {}",
        severity_badge(severity),
        severity.emoji(),
        sanitize_terminal(&alert.rule.description).bold()
    )];

    lines.push(field("ID", &alert.id));
    lines.push(field("Time", &alert.timestamp.to_rfc3339()));

    let agent = match alert.agent.ip {
        Some(ref ip) => format!("{} ({}, {ip})", alert.agent.name, alert.agent.id),
        None => format!("{} ({})", alert.agent.name, alert.agent.id),
    };
    lines.push(field("Agent", &agent));
    lines.push(field(
        "Rule",
        &format!("{} (level {})", alert.rule.id, alert.rule.level),
    ));
    if !alert.rule.groups.is_empty() {
        lines.push(field("Groups", &alert.rule.groups.join(", ")));
    }
    if let Some(fired) = alert.rule.firedtimes {
        lines.push(field("Fired", &format!("{fired} time(s)")));
    }
    if let Some(ref mitre) = alert.rule.mitre {
        if !mitre.id.is_empty() {
            lines.push(field("MITRE", &mitre.id.join(", ")));
        }
        if !mitre.tactic.is_empty() {
            lines.push(field("Tactics", &mitre.tactic.join(", ")));
        }
        if !mitre.technique.is_empty() {
            lines.push(field("Techniques", &mitre.technique.join(", ")));
        }
    }
    if let Some(ref location) = alert.location {
        lines.push(field("Location", location));
    }
    if let Some(ref log) = alert.full_log {
        lines.push(format!("  {}", "Full log:".dimmed()));
        for line in sanitize_terminal(log).lines() {
            lines.push(format!("    {}", line.cyan()));
        }
    }
    if let Some(ref data) = alert.data {
        lines.push(format!("  {}", "Data:".dimmed()));
        let pretty = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
        for line in sanitize_terminal(&pretty).lines() {
            lines.push(format!("    {line}"));
        }
    }

    lines.join("\n")
}

pub fn print_no_alerts() {
    println!();
    println!("{}", "No alerts match the current filters".green().bold());
    println!();
}
