mod elevation;
mod error;
#[cfg(test)]
pub(crate) mod fake;
mod http;
pub mod types;

use std::future::Future;

pub use elevation::{ElevationProvider, HttpElevation};
pub use error::{BackendError, ElevationError};
pub use http::HttpBackend;

use crate::geo::GeoPoint;
use types::{
    CoverageRequest, CoverageResponse, LocationInfo, LocationUpdate, ProfileRequest,
    ProfileResponse, SessionData,
};

/// The link-planning backend that owns transmitter state and runs the
/// propagation model.
pub trait Backend: Send + Sync + 'static {
    fn fetch_session(&self) -> impl Future<Output = Result<SessionData, BackendError>> + Send;

    fn push_location(
        &self,
        update: LocationUpdate,
    ) -> impl Future<Output = Result<LocationInfo, BackendError>> + Send;

    fn push_tilt(&self, tilt: f64) -> impl Future<Output = Result<(), BackendError>> + Send;

    fn compute_coverage(
        &self,
        request: CoverageRequest,
    ) -> impl Future<Output = Result<CoverageResponse, BackendError>> + Send;

    fn request_profile(
        &self,
        request: ProfileRequest,
    ) -> impl Future<Output = Result<ProfileResponse, BackendError>> + Send;
}

/// Terrain elevation lookup for a single point.
pub trait ElevationService: Send + Sync + 'static {
    fn elevation(
        &self,
        point: GeoPoint,
    ) -> impl Future<Output = Result<f64, ElevationError>> + Send;
}
