use thiserror::Error;

use super::UnitKey;

#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("coverage response has no image for unit {0}")]
    EmptyImage(UnitKey),
}
