pub mod fetch_status;
pub mod query;
pub mod severity;
pub mod severity_distribution;

pub use fetch_status::FetchStatus;
pub use query::{AlertFilters, AlertQuery, FilterUpdate, Pagination, QueryError};
pub use severity::Severity;
pub use severity_distribution::{SeverityDistribution, TimeWindow};
