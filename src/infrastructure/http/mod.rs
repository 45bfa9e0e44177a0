pub mod alert_api;
