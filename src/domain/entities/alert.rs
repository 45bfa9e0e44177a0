use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::value_objects::severity::Severity;

/// Agent (monitored endpoint) that reported the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ip: Option<String>,
}

/// MITRE ATT&CK mapping attached to a rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MitreInfo {
    #[serde(default)]
    pub id: Vec<String>,
    #[serde(default)]
    pub tactic: Vec<String>,
    #[serde(default)]
    pub technique: Vec<String>,
}

/// Detection rule that fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRef {
    pub id: String,
    pub level: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub mitre: Option<MitreInfo>,
    #[serde(default)]
    pub firedtimes: Option<u64>,
}

/// Alert record as served by the backend, consumed as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub agent: AgentRef,
    pub rule: RuleRef,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub full_log: Option<String>,
    #[serde(default)]
    pub decoder: Option<Value>,
}

impl Alert {
    /// Severity band, recomputed from the rule level on every call.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        Severity::from_rule_level(self.rule.level)
    }

    /// MITRE technique ids, empty when the rule carries no mapping.
    #[must_use]
    pub fn mitre_ids(&self) -> &[String] {
        self.rule
            .mitre
            .as_ref()
            .map(|m| m.id.as_slice())
            .unwrap_or_default()
    }
}
