use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::entities::alert::Alert;
use crate::domain::ports::data_source::{AlertDataSource, AlertPage, DataSourceError};
use crate::domain::value_objects::fetch_status::FetchStatus;

use super::query_state::AlertQueryState;

/// Everything a rendering layer reads from the list store.
///
/// `error` is `Some` exactly when `status` is `Errored`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertListSnapshot {
    pub alerts: Vec<Alert>,
    pub total: u64,
    pub status: FetchStatus,
    pub error: Option<DataSourceError>,
    pub selected_alert: Option<Alert>,
}

/// How a single `fetch_alerts` call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded,
    Failed,
    /// A newer fetch was issued before this one completed; its result was dropped.
    Superseded,
}

#[derive(Default)]
struct ListState {
    view: AlertListSnapshot,
    // Status and error as of the last finished request; restored when the
    // latest fetch is dropped before it finishes.
    settled_status: FetchStatus,
    settled_error: Option<DataSourceError>,
}

impl ListState {
    fn settle(&mut self, status: FetchStatus, error: Option<DataSourceError>) {
        self.view.status = status;
        self.view.error.clone_from(&error);
        self.settled_status = status;
        self.settled_error = error;
    }
}

/// Owns the alert list and drives its fetch lifecycle.
///
/// Every fetch carries a monotonically increasing token; only the response
/// to the latest token may touch the state.
pub struct AlertListStore<'a> {
    source: &'a dyn AlertDataSource,
    query: &'a AlertQueryState,
    state: Mutex<ListState>,
    latest_request: AtomicU64,
}

/// Travels inside a fetch future. Dropped unfinished, it hands the store
/// back its settled status so `Loading` never outlives the request.
struct PendingFetch<'s, 'a> {
    store: &'s AlertListStore<'a>,
    token: u64,
    finished: bool,
}

impl PendingFetch<'_, '_> {
    fn finish(mut self, result: Result<AlertPage, DataSourceError>) -> FetchOutcome {
        self.finished = true;
        self.store.complete_fetch(self.token, result)
    }
}

impl Drop for PendingFetch<'_, '_> {
    fn drop(&mut self) {
        if !self.finished {
            self.store.abandon_fetch(self.token);
        }
    }
}

impl<'a> AlertListStore<'a> {
    #[must_use]
    pub fn new(source: &'a dyn AlertDataSource, query: &'a AlertQueryState) -> Self {
        Self {
            source,
            query,
            state: Mutex::new(ListState::default()),
            latest_request: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ListState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the page described by the current query.
    ///
    /// The state switches to `Loading` (and the error is cleared) before this
    /// returns; the backend is only contacted once the future is polled.
    /// Dropping the future of the latest fetch before it finishes restores
    /// the status and error of the last finished request.
    /// Failures end up in the `error` field, never in the return value.
    pub fn fetch_alerts(&self) -> impl Future<Output = FetchOutcome> + Send + '_ {
        let query = self.query.snapshot();
        let token = {
            let mut state = self.lock();
            let token = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
            state.view.status = FetchStatus::Loading;
            state.view.error = None;
            token
        };
        tracing::debug!(
            token,
            offset = query.pagination.offset,
            limit = query.pagination.limit(),
            "fetching alerts"
        );
        let pending = PendingFetch {
            store: self,
            token,
            finished: false,
        };

        async move {
            let result = self.source.list_alerts(&query).await;
            pending.finish(result)
        }
    }

    fn complete_fetch(&self, token: u64, result: Result<AlertPage, DataSourceError>) -> FetchOutcome {
        let mut state = self.lock();
        if self.latest_request.load(Ordering::SeqCst) != token {
            tracing::debug!(token, "discarding stale alert list response");
            return FetchOutcome::Superseded;
        }
        match result {
            Ok(page) => {
                tracing::debug!(count = page.alerts.len(), total = page.total, "alerts loaded");
                state.view.alerts = page.alerts;
                state.view.total = page.total;
                state.settle(FetchStatus::Loaded, None);
                FetchOutcome::Loaded
            }
            Err(e) => {
                tracing::warn!("Alert list fetch failed: {e}");
                state.settle(FetchStatus::Errored, Some(e));
                FetchOutcome::Failed
            }
        }
    }

    fn abandon_fetch(&self, token: u64) {
        let mut state = self.lock();
        if self.latest_request.load(Ordering::SeqCst) != token
            || state.view.status != FetchStatus::Loading
        {
            return;
        }
        tracing::debug!(token, "alert fetch dropped before completion");
        state.view.status = state.settled_status;
        state.view.error = state.settled_error.clone();
    }

    /// Owned copy of the whole readable state.
    #[must_use]
    pub fn snapshot(&self) -> AlertListSnapshot {
        self.lock().view.clone()
    }

    #[must_use]
    pub fn alerts(&self) -> Vec<Alert> {
        self.lock().view.alerts.clone()
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.lock().view.total
    }

    #[must_use]
    pub fn status(&self) -> FetchStatus {
        self.lock().view.status
    }

    #[must_use]
    pub fn error(&self) -> Option<DataSourceError> {
        self.lock().view.error.clone()
    }

    #[must_use]
    pub fn selected_alert(&self) -> Option<Alert> {
        self.lock().view.selected_alert.clone()
    }

    /// Look up an alert of the current page by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<Alert> {
        self.lock().view.alerts.iter().find(|a| a.id == id).cloned()
    }

    /// Run `f` with exclusive access to the state. Reserved for the selection resolver.
    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut AlertListSnapshot) -> R) -> R {
        f(&mut self.lock().view)
    }

    /// Surface a failure that did not come from the list fetch itself.
    pub(crate) fn record_error(&self, error: DataSourceError) {
        self.lock().settle(FetchStatus::Errored, Some(error));
    }
}
