mod error;
mod result;
mod samples;
mod unit;

pub use error::CoverageError;
pub use result::{Bounds, CoverageResult};
pub use samples::SignalSampleIndex;
pub use unit::UnitKey;
