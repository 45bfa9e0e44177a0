use crate::domain::ports::data_source::{AlertDataSource, DataSourceError};
use crate::domain::value_objects::severity_distribution::{SeverityDistribution, TimeWindow};

/// Read-only aggregate queries against the backend. Holds no state of its own,
/// so it never touches the alert list or the selection.
pub struct MetricsService<'a> {
    source: &'a dyn AlertDataSource,
}

impl<'a> MetricsService<'a> {
    #[must_use]
    pub const fn new(source: &'a dyn AlertDataSource) -> Self {
        Self { source }
    }

    /// Alert counts per severity band within `window`.
    ///
    /// # Errors
    ///
    /// Returns the source's `DataSourceError` unchanged.
    pub async fn severity_distribution(
        &self,
        window: TimeWindow,
    ) -> Result<SeverityDistribution, DataSourceError> {
        if let (Some(start), Some(end)) = (window.start, window.end) {
            if start > end {
                tracing::debug!(%start, %end, "empty time window");
                return Ok(SeverityDistribution::default());
            }
        }
        match self.source.severity_distribution(&window).await {
            Ok(distribution) => {
                tracing::debug!(total = distribution.total(), "severity distribution loaded");
                Ok(distribution)
            }
            Err(e) => {
                tracing::warn!(error = %e, "severity distribution failed");
                Err(e)
            }
        }
    }
}
