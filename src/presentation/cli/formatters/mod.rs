pub mod alert_fmt;
pub mod table_fmt;
pub mod stats_fmt;
