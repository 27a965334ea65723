//! Persistent records owned by the request layer

pub mod login_log;
pub mod profile;

pub use login_log::{LoginLog, LoginRecord};
pub use profile::ProfileStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
