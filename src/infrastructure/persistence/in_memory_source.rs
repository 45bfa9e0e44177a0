use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::entities::alert::Alert;
use crate::domain::ports::data_source::{AlertDataSource, AlertPage, DataSourceError};
use crate::domain::value_objects::query::{AlertFilters, AlertQuery};
use crate::domain::value_objects::severity_distribution::{SeverityDistribution, TimeWindow};

/// In-memory alert source applying the backend's filter rules, for tests and demos.
///
/// Alerts are served newest first. Every list query is recorded.
pub struct InMemoryAlertSource {
    alerts: Vec<Alert>,
    queries: Mutex<Vec<AlertQuery>>,
    lookups: AtomicUsize,
}

impl InMemoryAlertSource {
    #[must_use]
    pub fn new(mut alerts: Vec<Alert>) -> Self {
        alerts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Self {
            alerts,
            queries: Mutex::new(Vec::new()),
            lookups: AtomicUsize::new(0),
        }
    }

    /// Queries received by `list_alerts`, oldest first.
    #[must_use]
    pub fn recorded_queries(&self) -> Vec<AlertQuery> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }

    /// Number of `get_alert_by_id` calls served.
    #[must_use]
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn matches_search(alert: &Alert, term: &str) -> bool {
    let needle = term.to_lowercase();
    contains_ignore_case(&alert.rule.description, &needle)
        || contains_ignore_case(&alert.rule.id, &needle)
        || contains_ignore_case(&alert.agent.name, &needle)
        || alert
            .full_log
            .as_deref()
            .is_some_and(|log| contains_ignore_case(log, &needle))
}

/// Whether `alert` satisfies every constraint in `filters`.
#[must_use]
pub fn matches_filters(alert: &Alert, filters: &AlertFilters) -> bool {
    let level = alert.rule.level;
    if filters.severity_min.is_some_and(|min| level < i64::from(min)) {
        return false;
    }
    if filters.severity_max.is_some_and(|max| level > i64::from(max)) {
        return false;
    }
    if filters
        .agent_id
        .as_deref()
        .is_some_and(|id| alert.agent.id != id)
    {
        return false;
    }
    if filters
        .agent_name
        .as_deref()
        .is_some_and(|name| alert.agent.name != name)
    {
        return false;
    }
    if filters
        .rule_id
        .as_deref()
        .is_some_and(|id| alert.rule.id != id)
    {
        return false;
    }
    if filters
        .rule_group
        .as_deref()
        .is_some_and(|group| !alert.rule.groups.iter().any(|g| g == group))
    {
        return false;
    }
    if filters
        .mitre_technique
        .as_deref()
        .is_some_and(|technique| !alert.mitre_ids().iter().any(|t| t == technique))
    {
        return false;
    }
    if filters.start_time.is_some_and(|start| alert.timestamp < start) {
        return false;
    }
    if filters.end_time.is_some_and(|end| alert.timestamp > end) {
        return false;
    }
    filters
        .search_term()
        .is_none_or(|term| matches_search(alert, term))
}

#[async_trait]
impl AlertDataSource for InMemoryAlertSource {
    async fn list_alerts(&self, query: &AlertQuery) -> Result<AlertPage, DataSourceError> {
        self.queries
            .lock()
            .map_err(|_| DataSourceError::Transport("lock poisoned".into()))?
            .push(query.clone());

        let matching: Vec<&Alert> = self
            .alerts
            .iter()
            .filter(|a| matches_filters(a, &query.filters))
            .collect();
        let total = matching.len() as u64;
        let alerts = matching
            .into_iter()
            .skip(query.pagination.offset as usize)
            .take(query.pagination.limit() as usize)
            .cloned()
            .collect();
        Ok(AlertPage { alerts, total })
    }

    async fn get_alert_by_id(&self, id: &str) -> Result<Alert, DataSourceError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.alerts
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| DataSourceError::NotFound(id.to_string()))
    }

    async fn severity_distribution(
        &self,
        window: &TimeWindow,
    ) -> Result<SeverityDistribution, DataSourceError> {
        let mut distribution = SeverityDistribution::default();
        self.alerts
            .iter()
            .filter(|a| window.contains(a.timestamp))
            .for_each(|a| distribution.record(a.severity()));
        Ok(distribution)
    }
}
