use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::value_objects::query::{
    AlertFilters, AlertQuery, FilterUpdate, Pagination, QueryError,
};

/// Current filter predicate and pagination window for the alert list.
///
/// Mutators never fetch on their own; `AlertConsole` pairs each of them with
/// exactly one refetch.
pub struct AlertQueryState {
    query: Mutex<AlertQuery>,
}

impl AlertQueryState {
    /// # Errors
    ///
    /// Returns `QueryError::InvalidLimit` if `page_size` is zero.
    pub fn new(page_size: u32) -> Result<Self, QueryError> {
        Ok(Self {
            query: Mutex::new(AlertQuery {
                filters: AlertFilters::default(),
                pagination: Pagination::new(page_size, 0)?,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, AlertQuery> {
        self.query.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace one filter field. The offset goes back to the first page.
    pub fn set_filter(&self, update: FilterUpdate) {
        tracing::debug!(key = update.key(), "filter changed");
        let mut query = self.lock();
        query.filters.apply(update);
        query.pagination.offset = 0;
    }

    pub fn set_page(&self, offset: u32) {
        self.lock().pagination.offset = offset;
    }

    /// Change the page size. The offset goes back to the first page.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidLimit` if `limit` is zero; the state is
    /// left untouched.
    pub fn set_limit(&self, limit: u32) -> Result<(), QueryError> {
        let mut query = self.lock();
        query.pagination.set_limit(limit)?;
        query.pagination.offset = 0;
        drop(query);
        Ok(())
    }

    /// Replace the whole predicate, then move to `offset`, in one step.
    ///
    /// Equivalent to a filter change (which resets the offset to 0) followed
    /// by `set_page(offset)`; the offset is only kept because it is the page
    /// explicitly requested for the new predicate. Used when a view is
    /// restored from command-line arguments.
    pub fn set_view(&self, filters: AlertFilters, offset: u32) {
        tracing::debug!(offset, "view replaced");
        let mut query = self.lock();
        query.filters = filters;
        query.pagination.offset = offset;
    }

    pub fn clear_filters(&self) {
        let mut query = self.lock();
        query.filters = AlertFilters::default();
        query.pagination.offset = 0;
    }

    /// Owned copy of filters merged with pagination.
    #[must_use]
    pub fn snapshot(&self) -> AlertQuery {
        self.lock().clone()
    }

    #[must_use]
    pub fn pagination(&self) -> Pagination {
        self.lock().pagination
    }
}

impl Default for AlertQueryState {
    fn default() -> Self {
        Self {
            query: Mutex::new(AlertQuery::default()),
        }
    }
}
