use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::entities::alert::Alert;
use crate::domain::ports::data_source::{AlertDataSource, DataSourceError};

use super::alert_list::AlertListStore;

/// Result of resolving a requested alert id.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Selection was cleared.
    Cleared,
    /// The alert is now selected.
    Found(Alert),
    /// A remote lookup for this same id is already in flight.
    Pending,
    /// The remote lookup failed; the previous selection is kept.
    Failed(DataSourceError),
    /// A newer selection was requested before the remote lookup returned.
    Superseded,
}

enum Step {
    Done(Resolution),
    Fetch { token: u64, id: String },
}

/// Travels inside a lookup future. However the future ends, the id stops
/// counting as in flight unless a newer selection already replaced it.
struct InFlightLookup<'s, 'a> {
    resolver: &'s SelectionResolver<'a>,
    token: u64,
}

impl Drop for InFlightLookup<'_, '_> {
    fn drop(&mut self) {
        let mut in_flight = self.resolver.lock_in_flight();
        if self.resolver.latest_request.load(Ordering::SeqCst) == self.token
            && in_flight.is_some()
        {
            tracing::debug!(token = self.token, "alert lookup ended without completing");
            *in_flight = None;
        }
    }
}

/// Resolves an alert id to a full record: the loaded page first, then the backend.
///
/// Remote lookups are sequenced independently from list fetches; only the
/// latest selection request may change `selected_alert`.
pub struct SelectionResolver<'a> {
    source: &'a dyn AlertDataSource,
    store: &'a AlertListStore<'a>,
    latest_request: AtomicU64,
    in_flight: Mutex<Option<String>>,
}

impl<'a> SelectionResolver<'a> {
    #[must_use]
    pub fn new(source: &'a dyn AlertDataSource, store: &'a AlertListStore<'a>) -> Self {
        Self {
            source,
            store,
            latest_request: AtomicU64::new(0),
            in_flight: Mutex::new(None),
        }
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, Option<String>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Select `id`, or clear the selection with `None`.
    ///
    /// Clearing and local hits take effect before this returns. A miss issues
    /// one backend lookup when the returned future is polled; dropping that
    /// future unfinished releases the id so a later call looks it up again.
    pub fn select_alert(&self, id: Option<&str>) -> impl Future<Output = Resolution> + Send + '_ {
        let step = self.begin(id);
        let lookup = match step {
            Step::Fetch { token, .. } => Some(InFlightLookup {
                resolver: self,
                token,
            }),
            Step::Done(_) => None,
        };
        async move {
            let _lookup = lookup;
            match step {
                Step::Done(resolution) => resolution,
                Step::Fetch { token, id } => {
                    tracing::debug!(token, alert_id = %id, "alert not on current page, fetching");
                    let result = self.source.get_alert_by_id(&id).await;
                    self.complete(token, result)
                }
            }
        }
    }

    fn begin(&self, id: Option<&str>) -> Step {
        let mut in_flight = self.lock_in_flight();

        let Some(id) = id else {
            self.latest_request.fetch_add(1, Ordering::SeqCst);
            *in_flight = None;
            self.store.with_state(|state| state.selected_alert = None);
            return Step::Done(Resolution::Cleared);
        };

        if in_flight.as_deref() == Some(id) {
            return Step::Done(Resolution::Pending);
        }

        let token = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
        *in_flight = None;

        let local = self.store.with_state(|state| {
            if let Some(current) = state.selected_alert.as_ref().filter(|a| a.id == id) {
                return Some(current.clone());
            }
            let found = state.alerts.iter().find(|a| a.id == id).cloned();
            if found.is_some() {
                state.selected_alert.clone_from(&found);
            }
            found
        });
        if let Some(alert) = local {
            return Step::Done(Resolution::Found(alert));
        }

        *in_flight = Some(id.to_string());
        drop(in_flight);
        Step::Fetch {
            token,
            id: id.to_string(),
        }
    }

    fn complete(&self, token: u64, result: Result<Alert, DataSourceError>) -> Resolution {
        let mut in_flight = self.lock_in_flight();
        if self.latest_request.load(Ordering::SeqCst) != token {
            tracing::debug!(token, "discarding stale alert lookup");
            return Resolution::Superseded;
        }
        *in_flight = None;

        match result {
            Ok(alert) => {
                self.store
                    .with_state(|state| state.selected_alert = Some(alert.clone()));
                Resolution::Found(alert)
            }
            Err(e) => {
                tracing::warn!("Alert lookup failed: {e}");
                self.store.record_error(e.clone());
                Resolution::Failed(e)
            }
        }
    }
}
