use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned status {0}")]
    Status(u16),
}

#[derive(Debug, Error)]
pub enum ElevationError {
    #[error("elevation unavailable: {0}")]
    Unavailable(String),
    #[error("elevation request failed: {0}")]
    Http(#[from] reqwest::Error),
}
