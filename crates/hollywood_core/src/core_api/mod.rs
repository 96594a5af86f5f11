mod browse;
mod engine;
mod error;
mod types;

pub use browse::{default_browse_dir, list_save_candidates};
pub use engine::{Engine, Session};
pub use error::{CoreError, CoreErrorCode};
pub use types::{Capabilities, CapabilityIssue, SaveReport, Snapshot};
