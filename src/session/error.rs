use thiserror::Error;

use crate::backend::{BackendError, ElevationError};
use crate::coverage::{CoverageError, UnitKey};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("network failure: {0}")]
    NetworkFailure(#[from] BackendError),
    #[error("elevation unavailable: {0}")]
    ElevationUnavailable(String),
    #[error("no coverage available for unit {0}")]
    EmptyCoverageResult(UnitKey),
    #[error("request superseded by a newer one")]
    CancelledRequest,
    #[error("no receiver selected")]
    NoReceiverSelected,
}

impl SessionError {
    /// Superseded requests are expected and never shown to the user.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, SessionError::CancelledRequest)
    }
}

impl From<ElevationError> for SessionError {
    fn from(err: ElevationError) -> Self {
        SessionError::ElevationUnavailable(err.to_string())
    }
}

impl From<CoverageError> for SessionError {
    fn from(err: CoverageError) -> Self {
        match err {
            CoverageError::EmptyImage(unit) => SessionError::EmptyCoverageResult(unit),
        }
    }
}
