pub mod alert;

pub use alert::{AgentRef, Alert, MitreInfo, RuleRef};
