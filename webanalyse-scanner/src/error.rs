use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The page answered, but not with 200 OK.
    #[error("Response status is {status}, expected 200")]
    NotOk { status: u16 },

    #[error("Pool task failed: {0}")]
    TaskFailed(String),

    #[error("Worker pool is closed")]
    PoolClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ScanError>;

/// Why a probed URL is considered inaccessible.
///
/// Only the prober looks inside this; callers see a plain boolean.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("status code is {code}")]
    Status { code: u16 },

    #[error("{0}")]
    Request(#[from] reqwest::Error),
}
