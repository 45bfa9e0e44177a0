use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::entities::alert::Alert;
use crate::domain::ports::data_source::{AlertDataSource, AlertPage, DataSourceError};
use crate::domain::value_objects::query::AlertQuery;
use crate::domain::value_objects::severity_distribution::{SeverityDistribution, TimeWindow};

/// Fields searched when the backend does not get an explicit list.
pub const DEFAULT_SEARCH_FIELDS: [&str; 3] = ["rule.description", "full_log", "agent.name"];

/// Maximum error-body bytes kept in a `Server` error detail.
const MAX_DETAIL_CHARS: usize = 512;

#[derive(Deserialize)]
struct AlertListResponse {
    alerts: Vec<Alert>,
    total: u64,
}

/// Envelope of the `/api/v1/metrics/*` endpoints.
#[derive(Deserialize)]
struct MetricResponse<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Value>,
}

/// Alert source backed by the dashboard backend's REST API.
///
/// Lists go to `GET /api/v1/alerts`, or `POST /api/v1/alerts/search` when a
/// search term is set; single alerts come from `GET /api/v1/alerts/{id}`.
pub struct HttpAlertSource {
    base_url: Url,
    client: reqwest::Client,
    search_fields: Vec<String>,
}

impl HttpAlertSource {
    /// Creates a source for the backend at `base_url`.
    ///
    /// `timeout` bounds each request end to end; an elapsed timeout surfaces
    /// as `DataSourceError::Timeout`.
    ///
    /// # Errors
    ///
    /// Returns `DataSourceError::Transport` if the URL is not an absolute
    /// http(s) URL or the HTTP client cannot be initialized.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        search_fields: Vec<String>,
    ) -> Result<Self, DataSourceError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| DataSourceError::Transport(format!("invalid base URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(DataSourceError::Transport(format!(
                "invalid base URL '{base_url}': expected http(s)"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DataSourceError::Transport(format!("failed to build HTTP client: {e}")))?;

        let search_fields = if search_fields.is_empty() {
            DEFAULT_SEARCH_FIELDS.iter().map(ToString::to_string).collect()
        } else {
            search_fields
        };

        Ok(Self {
            base_url,
            client,
            search_fields,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects URLs that cannot be a base, so segments are always available.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "v1"]).extend(segments);
        }
        url
    }
}

/// Query-string parameters for the list endpoint.
fn list_params(query: &AlertQuery) -> Vec<(&'static str, String)> {
    let filters = &query.filters;
    let mut params = vec![
        ("limit", query.pagination.limit().to_string()),
        ("offset", query.pagination.offset.to_string()),
    ];
    let optional = [
        ("severity_min", filters.severity_min.map(|v| v.to_string())),
        ("severity_max", filters.severity_max.map(|v| v.to_string())),
        ("agent_id", filters.agent_id.clone()),
        ("agent_name", filters.agent_name.clone()),
        ("rule_id", filters.rule_id.clone()),
        ("rule_group", filters.rule_group.clone()),
        ("mitre_technique", filters.mitre_technique.clone()),
        ("start_time", filters.start_time.map(|t| t.to_rfc3339())),
        ("end_time", filters.end_time.map(|t| t.to_rfc3339())),
    ];
    params.extend(
        optional
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v))),
    );
    params
}

fn window_params(window: &TimeWindow) -> Vec<(&'static str, String)> {
    [
        ("start_time", window.start.map(|t| t.to_rfc3339())),
        ("end_time", window.end.map(|t| t.to_rfc3339())),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.map(|v| (key, v)))
    .collect()
}

fn map_request_error(e: &reqwest::Error) -> DataSourceError {
    if e.is_timeout() {
        DataSourceError::Timeout
    } else if e.is_decode() {
        DataSourceError::InvalidResponse(e.to_string())
    } else {
        DataSourceError::Transport(e.to_string())
    }
}

fn detail_text(detail: Value) -> String {
    let text = match detail {
        Value::String(s) => s,
        other => other.to_string(),
    };
    text.chars().take(MAX_DETAIL_CHARS).collect()
}

async fn server_error(response: Response) -> DataSourceError {
    let status = response.status();
    let detail = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.detail)
        .map(detail_text)
        .or_else(|| status.canonical_reason().map(str::to_string));
    DataSourceError::Server {
        status: Some(status.as_u16()),
        detail,
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, DataSourceError> {
    response.json::<T>().await.map_err(|e| {
        if e.is_timeout() {
            DataSourceError::Timeout
        } else {
            DataSourceError::InvalidResponse(e.to_string())
        }
    })
}

#[async_trait]
impl AlertDataSource for HttpAlertSource {
    async fn list_alerts(&self, query: &AlertQuery) -> Result<AlertPage, DataSourceError> {
        tracing::debug!(
            limit = query.pagination.limit(),
            offset = query.pagination.offset,
            search = query.filters.search_term().is_some(),
            "requesting alert page"
        );
        let request = match query.filters.search_term() {
            None => self
                .client
                .get(self.endpoint(&["alerts"]))
                .query(&list_params(query)),
            Some(term) => self
                .client
                .post(self.endpoint(&["alerts", "search"]))
                .query(&[
                    ("limit", query.pagination.limit()),
                    ("offset", query.pagination.offset),
                ])
                .json(&json!({
                    "query": term,
                    "fields": self.search_fields,
                    "filters": query.filters,
                })),
        };

        let response = request.send().await.map_err(|e| map_request_error(&e))?;
        if !response.status().is_success() {
            let error = server_error(response).await;
            tracing::warn!(%error, "alert list request rejected");
            return Err(error);
        }
        let body: AlertListResponse = read_json(response).await?;
        Ok(AlertPage {
            alerts: body.alerts,
            total: body.total,
        })
    }

    async fn get_alert_by_id(&self, id: &str) -> Result<Alert, DataSourceError> {
        tracing::debug!(alert_id = %id, "requesting alert");
        let response = self
            .client
            .get(self.endpoint(&["alerts", id]))
            .send()
            .await
            .map_err(|e| map_request_error(&e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(DataSourceError::NotFound(id.to_string())),
            status if status.is_success() => read_json(response).await,
            _ => Err(server_error(response).await),
        }
    }

    async fn severity_distribution(
        &self,
        window: &TimeWindow,
    ) -> Result<SeverityDistribution, DataSourceError> {
        tracing::debug!(
            start = ?window.start,
            end = ?window.end,
            "requesting severity distribution"
        );
        let response = self
            .client
            .get(self.endpoint(&["metrics", "severity"]))
            .query(&window_params(window))
            .send()
            .await
            .map_err(|e| map_request_error(&e))?;
        if !response.status().is_success() {
            let error = server_error(response).await;
            tracing::warn!(%error, "severity distribution request rejected");
            return Err(error);
        }
        let body: MetricResponse<SeverityDistribution> = read_json(response).await?;
        Ok(body.data)
    }
}
