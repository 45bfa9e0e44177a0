use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::entities::alert::Alert;
use crate::domain::value_objects::query::AlertQuery;
use crate::domain::value_objects::severity_distribution::{SeverityDistribution, TimeWindow};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataSourceError {
    #[error("backend unreachable: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
    #[error("{}", server_message(.status, .detail))]
    Server {
        status: Option<u16>,
        detail: Option<String>,
    },
    #[error("alert not found: {0}")]
    NotFound(String),
    #[error("invalid response from backend: {0}")]
    InvalidResponse(String),
}

#[allow(clippy::ref_option)]
fn server_message(status: &Option<u16>, detail: &Option<String>) -> String {
    match (status, detail) {
        (Some(code), Some(detail)) => format!("backend error ({code}): {detail}"),
        (Some(code), None) => format!("backend error ({code})"),
        (None, Some(detail)) => format!("backend error: {detail}"),
        (None, None) => "backend error".to_string(),
    }
}

impl DataSourceError {
    /// Server failure without a known status code.
    #[must_use]
    pub fn server(detail: impl Into<String>) -> Self {
        Self::Server {
            status: None,
            detail: Some(detail.into()),
        }
    }
}

/// One page of alerts plus the total for the whole filtered set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertPage {
    pub alerts: Vec<Alert>,
    pub total: u64,
}

#[async_trait]
pub trait AlertDataSource: Send + Sync {
    /// Fetch the page of alerts matching `query`.
    ///
    /// # Errors
    ///
    /// Returns `DataSourceError` if the backend cannot be reached, times out,
    /// answers with a failure status, or sends an unreadable body.
    async fn list_alerts(&self, query: &AlertQuery) -> Result<AlertPage, DataSourceError>;

    /// Fetch a single alert by id.
    ///
    /// # Errors
    ///
    /// Returns `DataSourceError::NotFound` if the backend has no such alert,
    /// or any transport/server failure as for [`AlertDataSource::list_alerts`].
    async fn get_alert_by_id(&self, id: &str) -> Result<Alert, DataSourceError>;

    /// Count alerts per severity band within `window`.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`AlertDataSource::list_alerts`].
    async fn severity_distribution(
        &self,
        window: &TimeWindow,
    ) -> Result<SeverityDistribution, DataSourceError>;
}
