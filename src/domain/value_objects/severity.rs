use serde::{Deserialize, Serialize};

/// Display band derived from a rule level.
///
/// Never stored on an alert: always recompute it with [`Severity::from_rule_level`]
/// so that a change of boundaries cannot leave stale bands behind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl Severity {
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Map a backend rule level to its band.
    ///
    /// Bands are closed on their low end: `< 5` low, `5..10` medium,
    /// `10..13` high, `>= 13` critical. Negative levels are low.
    /// Must stay in step with the backend's own severity enumeration.
    #[must_use]
    pub const fn from_rule_level(level: i64) -> Self {
        if level < 5 {
            Self::Low
        } else if level < 10 {
            Self::Medium
        } else if level < 13 {
            Self::High
        } else {
            Self::Critical
        }
    }

    /// Lowest rule level that falls in this band.
    #[must_use]
    pub const fn min_rule_level(&self) -> u32 {
        match self {
            Self::Low => 0,
            Self::Medium => 5,
            Self::High => 10,
            Self::Critical => 13,
        }
    }

    #[must_use]
    pub const fn emoji(&self) -> &str {
        match self {
            Self::Low => "ℹ️",
            Self::Medium => "⚠️",
            Self::High => "🔶",
            Self::Critical => "🔴",
        }
    }
}
