//! In-memory collaborators for tests. They record every call and answer
//! with canned data.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use super::types::{
    CoverageRequest, CoverageResponse, LocationInfo, LocationUpdate, ProfileRequest,
    ProfileResponse, RawBounds, RawUnitImage, SessionData,
};
use super::{Backend, BackendError, ElevationError, ElevationService};
use crate::geo::GeoPoint;

pub const TX: GeoPoint = GeoPoint::new(-14.235, -51.925);

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Session,
    Location(GeoPoint),
    Tilt(f64),
    Coverage(f64),
    Profile,
}

#[derive(Default)]
pub struct FakeState {
    pub calls: Vec<Call>,
    pub coverage: Option<CoverageResponse>,
    pub coverage_delay: Duration,
    pub location_delays: VecDeque<Duration>,
    pub profile: Option<ProfileResponse>,
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    pub state: Arc<StdMutex<FakeState>>,
}

impl FakeBackend {
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    pub fn set_coverage(&self, response: Option<CoverageResponse>) {
        self.state.lock().unwrap().coverage = response;
    }
}

impl Backend for FakeBackend {
    async fn fetch_session(&self) -> Result<SessionData, BackendError> {
        self.record(Call::Session);
        Ok(SessionData {
            latitude: TX.lat,
            longitude: TX.lng,
            antenna_tilt: Some(1.0),
            ..Default::default()
        })
    }

    async fn push_location(
        &self,
        update: LocationUpdate,
    ) -> Result<LocationInfo, BackendError> {
        let point = GeoPoint::new(update.latitude, update.longitude);
        self.record(Call::Location(point));
        let delay = self.state.lock().unwrap().location_delays.pop_front();
        tokio::time::sleep(delay.unwrap_or_default()).await;
        Ok(LocationInfo {
            municipality: Some(format!("{:.3}", point.lat)),
            elevation: Some(500.0),
        })
    }

    async fn push_tilt(&self, tilt: f64) -> Result<(), BackendError> {
        self.record(Call::Tilt(tilt));
        Ok(())
    }

    async fn compute_coverage(
        &self,
        request: CoverageRequest,
    ) -> Result<CoverageResponse, BackendError> {
        self.record(Call::Coverage(request.radius));
        let (response, delay) = {
            let state = self.state.lock().unwrap();
            (state.coverage.clone(), state.coverage_delay)
        };
        tokio::time::sleep(delay).await;
        response.ok_or(BackendError::Status(500))
    }

    async fn request_profile(
        &self,
        _request: ProfileRequest,
    ) -> Result<ProfileResponse, BackendError> {
        self.record(Call::Profile);
        self.state
            .lock()
            .unwrap()
            .profile
            .clone()
            .ok_or(BackendError::Status(502))
    }
}

pub struct FakeElevation {
    pub available: bool,
}

impl ElevationService for FakeElevation {
    async fn elevation(&self, _point: GeoPoint) -> Result<f64, ElevationError> {
        if self.available {
            Ok(100.0)
        } else {
            Err(ElevationError::Unavailable("ZERO_RESULTS".into()))
        }
    }
}

fn image(data: &str) -> RawUnitImage {
    RawUnitImage {
        image: Some(data.into()),
        colorbar: None,
        label: None,
    }
}

/// Coverage around [`TX`] with a 50 km radius and one sample at
/// (-14.2, -51.9): -35 dBµV/m, -95 dBm.
pub fn coverage_response(with_dbm: bool) -> CoverageResponse {
    let mut images = HashMap::from([("dbuv".to_string(), image("dbuv"))]);
    if with_dbm {
        images.insert("dbm".to_string(), image("dbm"));
    }
    CoverageResponse {
        bounds: Some(RawBounds {
            north: -13.8,
            south: -14.7,
            east: -51.4,
            west: -52.4,
        }),
        center: Some(TX),
        images: Some(images),
        signal_level_dict: HashMap::from([("(-14.2, -51.9)".to_string(), Some(-35.0))]),
        signal_level_dict_dbm: HashMap::from([("(-14.2, -51.9)".to_string(), Some(-95.0))]),
        requested_radius_km: Some(50.0),
        location_status: Some("Location confirmed".into()),
        ..Default::default()
    }
}
