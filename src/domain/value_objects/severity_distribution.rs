use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::severity::Severity;

/// Alert counts per severity band, as served by the backend's metrics API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityDistribution {
    #[serde(default)]
    pub low: u64,
    #[serde(default)]
    pub medium: u64,
    #[serde(default)]
    pub high: u64,
    #[serde(default)]
    pub critical: u64,
}

impl SeverityDistribution {
    /// Count one alert in `severity`'s band.
    pub const fn record(&mut self, severity: Severity) {
        let slot = match severity {
            Severity::Low => &mut self.low,
            Severity::Medium => &mut self.medium,
            Severity::High => &mut self.high,
            Severity::Critical => &mut self.critical,
        };
        *slot = slot.saturating_add(1);
    }

    #[must_use]
    pub const fn count(&self, severity: Severity) -> u64 {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
            Severity::Critical => self.critical,
        }
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.low
            .saturating_add(self.medium)
            .saturating_add(self.high)
            .saturating_add(self.critical)
    }

    /// Share of `severity` in the whole distribution, in percent. Zero when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self, severity: Severity) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.count(severity) as f64 * 100.0 / total as f64
    }
}

/// Inclusive time bounds for a metrics query; `None` leaves a side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| at >= start) && self.end.is_none_or(|end| at <= end)
    }
}
