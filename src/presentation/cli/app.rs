use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::value_objects::query::{AlertFilters, FilterUpdate};
use crate::domain::value_objects::severity::Severity;
use crate::domain::value_objects::severity_distribution::TimeWindow;

/// siemdeck: terminal console for SIEM alerts
///
/// Lists, filters and inspects alerts served by the dashboard backend.
#[derive(Parser, Debug)]
#[command(name = "siemdeck")]
#[command(version, about, long_about)]
pub struct Cli {
    /// Subcommand to execute (defaults to `list`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to custom config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List alerts matching the given filters
    #[command(alias = "l")]
    List(ListArgs),

    /// Show a single alert in full
    #[command(alias = "s")]
    Show {
        /// Alert id
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how alerts spread over severity bands
    #[command(alias = "st")]
    Stats(StatsArgs),
}

/// Time window for `stats`.
#[derive(Args, Debug, Default, Clone, PartialEq, Eq)]
pub struct StatsArgs {
    /// Only alerts at or after this time (RFC 3339)
    #[arg(long)]
    pub since: Option<DateTime<Utc>>,

    /// Only alerts at or before this time (RFC 3339)
    #[arg(long)]
    pub until: Option<DateTime<Utc>>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsArgs {
    #[must_use]
    pub const fn window(&self) -> TimeWindow {
        TimeWindow {
            start: self.since,
            end: self.until,
        }
    }
}

/// Filters and paging for `list`.
#[derive(Args, Debug, Default, Clone, PartialEq, Eq)]
pub struct ListArgs {
    /// Minimum severity band (low, medium, high, critical)
    #[arg(long, value_parser = parse_severity, conflicts_with = "level_min")]
    pub severity: Option<Severity>,

    /// Minimum rule level
    #[arg(long)]
    pub level_min: Option<u32>,

    /// Maximum rule level
    #[arg(long)]
    pub level_max: Option<u32>,

    /// Agent id
    #[arg(long)]
    pub agent_id: Option<String>,

    /// Agent name
    #[arg(long)]
    pub agent_name: Option<String>,

    /// Rule id
    #[arg(long)]
    pub rule_id: Option<String>,

    /// Rule group
    #[arg(long)]
    pub rule_group: Option<String>,

    /// MITRE ATT&CK technique id (e.g. T1110)
    #[arg(long)]
    pub mitre: Option<String>,

    /// Only alerts at or after this time (RFC 3339)
    #[arg(long)]
    pub since: Option<DateTime<Utc>>,

    /// Only alerts at or before this time (RFC 3339)
    #[arg(long)]
    pub until: Option<DateTime<Utc>>,

    /// Free-text search
    #[arg(short, long)]
    pub search: Option<String>,

    /// Page number, starting at 1
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: Option<u32>,

    /// Page size (defaults to config, capped by `max_page_size`)
    #[arg(short = 'n', long)]
    pub limit: Option<u32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_severity(value: &str) -> Result<Severity, String> {
    match value.to_lowercase().as_str() {
        "low" => Ok(Severity::Low),
        "medium" => Ok(Severity::Medium),
        "high" => Ok(Severity::High),
        "critical" => Ok(Severity::Critical),
        other => Err(format!(
            "unknown severity '{other}'. Valid values: low, medium, high, critical"
        )),
    }
}

impl ListArgs {
    /// Filter predicate described by these arguments.
    #[must_use]
    pub fn filters(&self) -> AlertFilters {
        let level_min = self
            .severity
            .map(|s| s.min_rule_level())
            .or(self.level_min);

        let mut filters = AlertFilters::default();
        for update in [
            FilterUpdate::SeverityMin(level_min),
            FilterUpdate::SeverityMax(self.level_max),
            FilterUpdate::AgentId(self.agent_id.clone()),
            FilterUpdate::AgentName(self.agent_name.clone()),
            FilterUpdate::RuleId(self.rule_id.clone()),
            FilterUpdate::RuleGroup(self.rule_group.clone()),
            FilterUpdate::MitreTechnique(self.mitre.clone()),
            FilterUpdate::StartTime(self.since),
            FilterUpdate::EndTime(self.until),
            FilterUpdate::Search(self.search.clone().unwrap_or_default()),
        ] {
            filters.apply(update);
        }
        filters
    }

    /// Zero-based page index.
    #[must_use]
    pub fn page_index(&self) -> u32 {
        self.page.unwrap_or(1).saturating_sub(1)
    }
}
