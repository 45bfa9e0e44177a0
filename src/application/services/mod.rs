pub mod alert_list;
pub mod console;
pub mod metrics;
pub mod query_state;
pub mod selection;

pub use alert_list::{AlertListSnapshot, AlertListStore, FetchOutcome};
pub use console::AlertConsole;
pub use metrics::MetricsService;
pub use query_state::AlertQueryState;
pub use selection::{Resolution, SelectionResolver};
