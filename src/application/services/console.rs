use std::future::Future;

use crate::domain::value_objects::query::{AlertFilters, AlertQuery, FilterUpdate, QueryError};

use super::alert_list::{AlertListSnapshot, AlertListStore, FetchOutcome};
use super::query_state::AlertQueryState;
use super::selection::{Resolution, SelectionResolver};

/// Session-wide alert console: the only surface a rendering layer talks to.
///
/// Built once per session from explicitly constructed parts. Each query
/// mutation is followed by exactly one refetch; construction fetches nothing.
pub struct AlertConsole<'a> {
    query: &'a AlertQueryState,
    list: &'a AlertListStore<'a>,
    selection: &'a SelectionResolver<'a>,
}

impl<'a> AlertConsole<'a> {
    #[must_use]
    pub const fn new(
        query: &'a AlertQueryState,
        list: &'a AlertListStore<'a>,
        selection: &'a SelectionResolver<'a>,
    ) -> Self {
        Self {
            query,
            list,
            selection,
        }
    }

    pub fn set_filter(&self, update: FilterUpdate) -> impl Future<Output = FetchOutcome> + Send + '_ {
        self.query.set_filter(update);
        self.list.fetch_alerts()
    }

    pub fn set_page(&self, offset: u32) -> impl Future<Output = FetchOutcome> + Send + '_ {
        self.query.set_page(offset);
        self.list.fetch_alerts()
    }

    /// Change the page size and refetch.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidLimit` for a zero limit; nothing is fetched then.
    pub fn set_limit(
        &self,
        limit: u32,
    ) -> Result<impl Future<Output = FetchOutcome> + Send + '_, QueryError> {
        self.query.set_limit(limit)?;
        Ok(self.list.fetch_alerts())
    }

    /// Filter change followed by a move to `offset`, with a single refetch.
    pub fn set_view(
        &self,
        filters: AlertFilters,
        offset: u32,
    ) -> impl Future<Output = FetchOutcome> + Send + '_ {
        self.query.set_view(filters, offset);
        self.list.fetch_alerts()
    }

    pub fn clear_filters(&self) -> impl Future<Output = FetchOutcome> + Send + '_ {
        self.query.clear_filters();
        self.list.fetch_alerts()
    }

    /// Explicit (re)fetch, e.g. the initial load or a manual retry.
    pub fn fetch_alerts(&self) -> impl Future<Output = FetchOutcome> + Send + '_ {
        self.list.fetch_alerts()
    }

    pub fn select_alert(&self, id: Option<&str>) -> impl Future<Output = Resolution> + Send + '_ {
        self.selection.select_alert(id)
    }

    #[must_use]
    pub fn query(&self) -> AlertQuery {
        self.query.snapshot()
    }

    #[must_use]
    pub const fn list(&self) -> &'a AlertListStore<'a> {
        self.list
    }

    #[must_use]
    pub fn state(&self) -> AlertListSnapshot {
        self.list.snapshot()
    }
}
