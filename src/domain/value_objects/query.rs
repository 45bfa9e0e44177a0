use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page size used until the caller or the configuration picks another one.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("page size must be positive")]
    InvalidLimit,
}

/// Filter predicate sent to the backend.
///
/// Serializes to the backend's filter parameter object. `search` is carried
/// separately by the transport and is skipped here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity_min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity_max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mitre_technique: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub search: String,
}

/// Replacement of a single filter field.
///
/// `None` and empty strings both mean "no constraint".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterUpdate {
    SeverityMin(Option<u32>),
    SeverityMax(Option<u32>),
    AgentId(Option<String>),
    AgentName(Option<String>),
    RuleId(Option<String>),
    RuleGroup(Option<String>),
    MitreTechnique(Option<String>),
    StartTime(Option<DateTime<Utc>>),
    EndTime(Option<DateTime<Utc>>),
    Search(String),
}

impl FilterUpdate {
    /// Backend parameter name of the field this update touches.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::SeverityMin(_) => "severity_min",
            Self::SeverityMax(_) => "severity_max",
            Self::AgentId(_) => "agent_id",
            Self::AgentName(_) => "agent_name",
            Self::RuleId(_) => "rule_id",
            Self::RuleGroup(_) => "rule_group",
            Self::MitreTechnique(_) => "mitre_technique",
            Self::StartTime(_) => "start_time",
            Self::EndTime(_) => "end_time",
            Self::Search(_) => "search",
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl AlertFilters {
    pub fn apply(&mut self, update: FilterUpdate) {
        match update {
            FilterUpdate::SeverityMin(v) => self.severity_min = v,
            FilterUpdate::SeverityMax(v) => self.severity_max = v,
            FilterUpdate::AgentId(v) => self.agent_id = non_empty(v),
            FilterUpdate::AgentName(v) => self.agent_name = non_empty(v),
            FilterUpdate::RuleId(v) => self.rule_id = non_empty(v),
            FilterUpdate::RuleGroup(v) => self.rule_group = non_empty(v),
            FilterUpdate::MitreTechnique(v) => self.mitre_technique = non_empty(v),
            FilterUpdate::StartTime(v) => self.start_time = v,
            FilterUpdate::EndTime(v) => self.end_time = v,
            FilterUpdate::Search(v) => self.search = v,
        }
    }

    /// The search term, or `None` when searching is not constrained.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        let term = self.search.trim();
        (!term.is_empty()).then_some(term)
    }

    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.search_term().is_none()
            && Self {
                search: String::new(),
                ..self.clone()
            } == Self::default()
    }
}

/// Pagination window over the filtered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    limit: u32,
    pub offset: u32,
}

impl Pagination {
    /// # Errors
    ///
    /// Returns `QueryError::InvalidLimit` if `limit` is zero.
    pub const fn new(limit: u32, offset: u32) -> Result<Self, QueryError> {
        if limit == 0 {
            return Err(QueryError::InvalidLimit);
        }
        Ok(Self { limit, offset })
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// # Errors
    ///
    /// Returns `QueryError::InvalidLimit` if `limit` is zero.
    pub const fn set_limit(&mut self, limit: u32) -> Result<(), QueryError> {
        if limit == 0 {
            return Err(QueryError::InvalidLimit);
        }
        self.limit = limit;
        Ok(())
    }

    /// Zero-based index of the page the offset falls in.
    #[must_use]
    pub const fn page_index(&self) -> u32 {
        self.offset / self.limit
    }

    /// Offset of the first row of the zero-based `page`.
    #[must_use]
    pub const fn offset_of_page(&self, page: u32) -> u32 {
        page.saturating_mul(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

/// Filters merged with pagination: one request's worth of query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertQuery {
    pub filters: AlertFilters,
    pub pagination: Pagination,
}
