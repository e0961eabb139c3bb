use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use utoipa::ToSchema;

use super::debounce::Debouncer;
use super::error::SessionError;
use super::notice::Notice;
use super::stream::RequestStream;
use super::transmitter::Transmitter;
use crate::backend::types::{CoverageRequest, LocationUpdate, ProfileRequest};
use crate::backend::{Backend, ElevationService};
use crate::coverage::{CoverageResult, UnitKey};
use crate::geo::{distance_meters, GeoPoint};
use crate::receivers::{
    ReceiverEntry, ReceiverId, ReceiverRegistry, SummaryContext, SummaryTicket,
    RADIUS_TOLERANCE_M,
};

const MOVED_MESSAGE: &str = "Transmitter moved. Generate coverage again to update the map.";
const TILT_MESSAGE: &str = "Antenna tilt changed. Generate coverage again to update the map.";

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub tilt_debounce: Duration,
    pub radius_tolerance_m: f64,
    /// Moves at or below this distance are treated as noise and keep the
    /// current coverage fresh.
    pub move_threshold_m: f64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            tilt_debounce: Duration::from_millis(350),
            radius_tolerance_m: RADIUS_TOLERANCE_M,
            move_threshold_m: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CoverageState {
    NoCoverage,
    Fresh,
    Stale,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct CoverageParams {
    pub radius_km: f64,
    #[serde(default)]
    pub min_field: Option<f64>,
    #[serde(default)]
    pub max_field: Option<f64>,
}

/// Point-in-time copy of the session for rendering.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub transmitter: Transmitter,
    pub coverage: Option<Arc<CoverageResult>>,
    pub state: CoverageState,
    pub unit: UnitKey,
    pub receivers: Vec<ReceiverEntry>,
    pub status_message: Option<String>,
    pub profile_image: Option<String>,
}

impl SessionSnapshot {
    pub fn selected(&self) -> Option<&ReceiverEntry> {
        self.receivers.iter().find(|e| e.selected)
    }

    pub fn available_units(&self) -> Vec<UnitKey> {
        match &self.coverage {
            Some(coverage) => UnitKey::ALL
                .into_iter()
                .filter(|u| coverage.has_unit(*u))
                .collect(),
            None => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionStatus {
    pub transmitter: Transmitter,
    pub state: CoverageState,
    pub unit: UnitKey,
    pub available_units: Vec<UnitKey>,
    pub requested_radius_km: Option<f64>,
    pub receivers: Vec<ReceiverEntry>,
    pub status_message: Option<String>,
}

impl From<&SessionSnapshot> for SessionStatus {
    fn from(snapshot: &SessionSnapshot) -> Self {
        Self {
            transmitter: snapshot.transmitter.clone(),
            state: snapshot.state,
            unit: snapshot.unit,
            available_units: snapshot.available_units(),
            requested_radius_km: snapshot
                .coverage
                .as_ref()
                .and_then(|c| c.requested_radius_km),
            receivers: snapshot.receivers.clone(),
            status_message: snapshot.status_message.clone(),
        }
    }
}

#[derive(Debug)]
struct SessionState {
    transmitter: Transmitter,
    coverage: Option<Arc<CoverageResult>>,
    stale: bool,
    unit: UnitKey,
    receivers: ReceiverRegistry,
    status_message: Option<String>,
    notices: Vec<Notice>,
    profile_image: Option<String>,
    /// Bumped whenever a parameter the raster depends on changes.
    params_revision: u64,
}

impl SessionState {
    fn coverage_state(&self) -> CoverageState {
        match (&self.coverage, self.stale) {
            (None, _) => CoverageState::NoCoverage,
            (Some(_), false) => CoverageState::Fresh,
            (Some(_), true) => CoverageState::Stale,
        }
    }

    fn invalidate(&mut self, message: &str) {
        self.params_revision += 1;
        if self.coverage.is_some() {
            if !self.stale {
                log::info!("Coverage is stale: {}", message);
            }
            self.stale = true;
            self.status_message = Some(message.to_string());
        }
    }

    fn receivers_with_ctx(
        &mut self,
        tolerance_m: f64,
    ) -> (&mut ReceiverRegistry, SummaryContext<'_>) {
        let ctx = SummaryContext {
            transmitter: self.transmitter.position,
            coverage: self.coverage.as_deref(),
            unit: self.unit,
            radius_tolerance_m: tolerance_m,
        };
        (&mut self.receivers, ctx)
    }
}

struct Core<B, E> {
    backend: B,
    elevation: E,
    settings: SessionSettings,
    state: StdMutex<SessionState>,
    changes: watch::Sender<u64>,
}

impl<B, E> Core<B, E> {
    /// Runs one state mutation and notifies subscribers afterwards.
    fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let result = {
            let mut locked = self.state.lock().unwrap();
            f(&mut locked)
        };
        self.changes.send_modify(|revision| *revision += 1);
        result
    }

    fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        let locked = self.state.lock().unwrap();
        f(&locked)
    }
}

/// Coverage state and link summaries for one transmitter.
///
/// Every method mutates state in one short critical section. Network calls
/// run outside of it, either awaited by the caller or spawned onto the
/// runtime, and write back only if they were not superseded.
pub struct CoverageSession<B, E> {
    core: Arc<Core<B, E>>,
    location_sync: RequestStream,
    coverage_requests: RequestStream,
    tilt_saver: Debouncer,
}

impl<B: Backend, E: ElevationService> CoverageSession<B, E> {
    pub fn new(
        backend: B,
        elevation: E,
        transmitter: Transmitter,
        settings: SessionSettings,
    ) -> Self {
        let (changes, _) = watch::channel(0);
        let tilt_saver = Debouncer::new(settings.tilt_debounce);
        let state = SessionState {
            transmitter,
            coverage: None,
            stale: false,
            unit: UnitKey::default(),
            receivers: ReceiverRegistry::new(),
            status_message: None,
            notices: Vec::new(),
            profile_image: None,
            params_revision: 0,
        };
        Self {
            core: Arc::new(Core {
                backend,
                elevation,
                settings,
                state: StdMutex::new(state),
                changes,
            }),
            location_sync: RequestStream::new("location sync"),
            coverage_requests: RequestStream::new("coverage"),
            tilt_saver,
        }
    }

    /// Loads the stored transmitter from the backend and starts a session
    /// around it.
    pub async fn connect(
        backend: B,
        elevation: E,
        settings: SessionSettings,
    ) -> Result<Self, SessionError> {
        let data = backend.fetch_session().await?;
        log::info!(
            "Loaded transmitter at ({:.5}, {:.5})",
            data.latitude,
            data.longitude
        );
        Ok(Self::new(backend, elevation, data.into(), settings))
    }

    /// Receives a new value after every state change, including those made
    /// by background lookups.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.core.changes.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.core.read(|s| SessionSnapshot {
            transmitter: s.transmitter.clone(),
            coverage: s.coverage.clone(),
            state: s.coverage_state(),
            unit: s.unit,
            receivers: s.receivers.entries().to_vec(),
            status_message: s.status_message.clone(),
            profile_image: s.profile_image.clone(),
        })
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus::from(&self.snapshot())
    }

    /// Drains pending notices. An empty queue is not a state change, so
    /// subscribers are only woken when something was actually taken.
    pub fn take_notices(&self) -> Vec<Notice> {
        if self.core.read(|s| s.notices.is_empty()) {
            return Vec::new();
        }
        self.core.update(|s| std::mem::take(&mut s.notices))
    }

    /// Moves the transmitter. Summaries are re-derived against whatever
    /// coverage is held, and the backend is told about the new location in
    /// the background.
    pub fn move_transmitter(&self, to: GeoPoint) {
        let settings = &self.core.settings;
        let tickets = self.core.update(|s| {
            let moved_m = distance_meters(s.transmitter.position, to);
            s.transmitter.position = to;
            let significant = moved_m > settings.move_threshold_m;
            if significant {
                s.invalidate(MOVED_MESSAGE);
                s.profile_image = None;
                s.notices.push(Notice::info(format!(
                    "Transmitter moved to ({:.5}, {:.5})",
                    to.lat, to.lng
                )));
            }
            let (receivers, ctx) = s.receivers_with_ctx(settings.radius_tolerance_m);
            receivers.recompute_all(&ctx, !significant)
        });
        self.spawn_lookups(tickets);
        self.sync_location(to);
    }

    /// Applies a tilt edit locally and schedules the save. Edits arriving
    /// within the quiet period replace each other before anything is sent.
    pub fn set_tilt(&self, tilt_deg: f64) {
        self.core.update(|s| {
            if s.transmitter.antenna_tilt_deg != tilt_deg {
                s.transmitter.antenna_tilt_deg = tilt_deg;
                s.invalidate(TILT_MESSAGE);
            }
        });

        let core = self.core.clone();
        self.tilt_saver.schedule(move || async move {
            log::debug!("Saving antenna tilt {:.1}°", tilt_deg);
            if let Err(e) = core.backend.push_tilt(tilt_deg).await {
                log::error!("Failed to save antenna tilt: {}", e);
                core.update(|s| {
                    s.notices
                        .push(Notice::error(format!("Could not save antenna tilt: {}", e)))
                });
            }
        });
    }

    /// Switches the display unit. Never touches staleness and never goes to
    /// the network.
    pub fn set_unit(&self, unit: UnitKey) -> Result<(), SessionError> {
        self.core.update(|s| {
            let available = s.coverage.as_ref().is_some_and(|c| c.has_unit(unit));
            if !available {
                return Err(SessionError::EmptyCoverageResult(unit));
            }
            s.unit = unit;
            s.receivers.refresh_pending(unit);
            Ok(())
        })
    }

    /// Requests a coverage computation around the current transmitter and
    /// installs the result. A newer call supersedes this one.
    pub async fn generate_coverage(&self, params: CoverageParams) -> Result<(), SessionError> {
        let (request, revision) = self.core.read(|s| {
            let request = CoverageRequest {
                radius: params.radius_km,
                min_signal_level: params.min_field,
                max_signal_level: params.max_field,
                custom_center: s.transmitter.position,
            };
            (request, s.params_revision)
        });

        let ticket = self.coverage_requests.begin();
        log::info!(
            "Requesting coverage for radius {} km around ({:.5}, {:.5})",
            request.radius,
            request.custom_center.lat,
            request.custom_center.lng
        );
        let response = tokio::select! {
            _ = ticket.superseded() => return Err(SessionError::CancelledRequest),
            response = self.core.backend.compute_coverage(request) => response,
        };
        if ticket.is_superseded() {
            return Err(SessionError::CancelledRequest);
        }

        let result = response
            .map_err(SessionError::from)
            .and_then(|response| {
                let result = CoverageResult::from_response(&response)?;
                Ok((response, result))
            });
        let (response, result) = match result {
            Ok(parts) => parts,
            Err(e) => {
                log::error!("Coverage computation failed: {}", e);
                self.core.update(|s| {
                    s.notices
                        .push(Notice::error(format!("Coverage computation failed: {}", e)))
                });
                return Err(e);
            }
        };

        let settings = &self.core.settings;
        let (tickets, resync) = self.core.update(|s| {
            // Parameters changed while the request was in flight: keep the
            // result for display but do not let it reposition anything.
            let outdated = s.params_revision != revision;
            let mut moved = false;
            if !outdated {
                if let Some(center) = response.center {
                    moved = distance_meters(s.transmitter.position, center)
                        > settings.move_threshold_m;
                    s.transmitter.position = center;
                }
                if let Some(name) = &response.tx_location_name {
                    s.transmitter.location_name = Some(name.clone());
                }
                if let Some(elevation) = response.tx_site_elevation {
                    s.transmitter.elevation_m = Some(elevation);
                }
                if let Some(updated) = response.climate_updated_at {
                    s.transmitter.climate_updated_at = Some(updated);
                }
            }

            log::info!(
                "Installed coverage with units {:?}",
                UnitKey::ALL
                    .into_iter()
                    .filter(|u| result.has_unit(*u))
                    .collect::<Vec<_>>()
            );
            s.unit = result.default_unit;
            s.coverage = Some(Arc::new(result));
            s.stale = outdated;
            s.status_message = if outdated {
                Some(MOVED_MESSAGE.to_string())
            } else {
                response.location_status.clone()
            };
            if moved {
                s.profile_image = None;
            }
            s.notices.push(Notice::info("Coverage generated"));

            let (receivers, ctx) = s.receivers_with_ctx(settings.radius_tolerance_m);
            let tickets = receivers.recompute_all(&ctx, !moved);
            (tickets, moved.then_some(s.transmitter.position))
        });

        self.spawn_lookups(tickets);
        if let Some(position) = resync {
            self.sync_location(position);
        }
        Ok(())
    }

    /// Computes the path profile from the transmitter to the selected
    /// receiver and merges it into that receiver's summary. Returns the
    /// profile image when the backend rendered one.
    pub async fn generate_profile(&self) -> Result<Option<String>, SessionError> {
        let (id, request) = self.core.read(|s| {
            let selected = s
                .receivers
                .selected()
                .ok_or(SessionError::NoReceiverSelected)?;
            let request = ProfileRequest {
                path: [s.transmitter.position, selected.position],
            };
            Ok::<_, SessionError>((selected.id, request))
        })?;

        let profile = match self.core.backend.request_profile(request).await {
            Ok(profile) => profile,
            Err(e) => {
                log::error!("Profile generation failed: {}", e);
                self.core.update(|s| {
                    s.notices
                        .push(Notice::error(format!("Profile generation failed: {}", e)))
                });
                return Err(e.into());
            }
        };

        let tolerance_m = self.core.settings.radius_tolerance_m;
        self.core.update(|s| {
            let (receivers, ctx) = s.receivers_with_ctx(tolerance_m);
            if receivers.apply_profile(id, &profile, &ctx) {
                s.profile_image = profile.image.clone();
                s.notices.push(Notice::info("Profile generated"));
            } else {
                log::debug!("Receiver {} removed before its profile arrived", id);
            }
        });
        Ok(profile.image)
    }

    /// Adds a receiver and selects it. Geometry and field strength are
    /// available immediately; elevation follows asynchronously.
    pub fn add_receiver(&self, position: GeoPoint) -> ReceiverId {
        let tolerance_m = self.core.settings.radius_tolerance_m;
        let ticket = self.core.update(|s| {
            let (receivers, ctx) = s.receivers_with_ctx(tolerance_m);
            let ticket = receivers.add(position);
            receivers.complete(&ticket, &ctx, None);
            ticket
        });
        let id = ticket.id;
        self.spawn_lookups(vec![ticket]);
        id
    }

    pub fn remove_receiver(&self, id: ReceiverId) -> bool {
        self.core.update(|s| match s.receivers.remove(id) {
            Some(entry) => {
                if entry.selected {
                    s.profile_image = None;
                }
                true
            }
            None => false,
        })
    }

    pub fn clear_receivers(&self) {
        self.core.update(|s| {
            s.receivers.clear();
            s.profile_image = None;
        });
    }

    pub fn select_receiver(&self, id: ReceiverId) -> bool {
        self.core.update(|s| {
            let changed = s.receivers.selected().map(|e| e.id) != Some(id);
            let known = s.receivers.select(id);
            if known && changed {
                s.profile_image = None;
            }
            known
        })
    }

    /// Aborts the in-flight location sync, if any.
    pub fn abort_location_sync(&self) {
        self.location_sync.cancel();
    }

    /// Drops every pending background operation.
    pub fn shutdown(&self) {
        self.tilt_saver.cancel();
        self.abort_location_sync();
        self.coverage_requests.cancel();
    }

    fn sync_location(&self, position: GeoPoint) {
        let ticket = self.location_sync.begin();
        let core = self.core.clone();
        tokio::spawn(async move {
            let update = LocationUpdate::from(position);
            let result = tokio::select! {
                _ = ticket.superseded() => return,
                result = core.backend.push_location(update) => result,
            };
            if ticket.is_superseded() {
                return;
            }
            match result {
                Ok(info) => core.update(|s| s.transmitter.merge_location(&info)),
                Err(e) => {
                    log::warn!("Failed to sync transmitter location: {}", e);
                    core.update(|s| {
                        s.notices.push(Notice::error(format!(
                            "Could not update transmitter location: {}",
                            e
                        )))
                    });
                }
            }
        });
    }

    fn spawn_lookups(&self, tickets: Vec<SummaryTicket>) {
        for ticket in tickets {
            let core = self.core.clone();
            tokio::spawn(async move {
                let lookup = core
                    .elevation
                    .elevation(ticket.position)
                    .await
                    .map_err(SessionError::from);
                let elevation = match lookup {
                    Ok(elevation) => Some(elevation),
                    Err(e) => {
                        log::warn!("Receiver {}: {}", ticket.id, e);
                        None
                    }
                };
                let tolerance_m = core.settings.radius_tolerance_m;
                core.update(|s| {
                    let (receivers, ctx) = s.receivers_with_ctx(tolerance_m);
                    if !receivers.complete(&ticket, &ctx, elevation) {
                        log::debug!("Dropping superseded summary for receiver {}", ticket.id);
                    }
                });
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::backend::fake::{coverage_response, Call, FakeBackend, FakeElevation, TX};
    use crate::backend::types::{CoverageResponse, ProfileResponse, SessionData};

    const METERS_PER_DEGREE: f64 = 111_319.5;

    fn session(backend: &FakeBackend) -> CoverageSession<FakeBackend, FakeElevation> {
        let transmitter = Transmitter {
            position: TX,
            frequency_mhz: Some(100.1),
            propagation_model: None,
            antenna_tilt_deg: 0.0,
            location_name: None,
            elevation_m: None,
            climate_updated_at: None,
        };
        CoverageSession::new(
            backend.clone(),
            FakeElevation { available: true },
            transmitter,
            SessionSettings::default(),
        )
    }

    fn params() -> CoverageParams {
        CoverageParams {
            radius_km: 50.0,
            min_field: None,
            max_field: None,
        }
    }

    fn north_of(point: GeoPoint, meters: f64) -> GeoPoint {
        GeoPoint::new(point.lat + meters / METERS_PER_DEGREE, point.lng)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn connect_loads_transmitter() {
        let backend = FakeBackend::default();
        let session = CoverageSession::connect(
            backend.clone(),
            FakeElevation { available: true },
            SessionSettings::default(),
        )
        .await
        .unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.transmitter.position, TX);
        assert_eq!(snapshot.transmitter.antenna_tilt_deg, 1.0);
        assert_eq!(snapshot.state, CoverageState::NoCoverage);
        assert_eq!(backend.calls(), vec![Call::Session]);
    }

    #[tokio::test(start_paused = true)]
    async fn receiver_in_covered_area_resolves_field() {
        let backend = FakeBackend::default();
        backend.set_coverage(Some(coverage_response(false)));
        let session = session(&backend);

        session.generate_coverage(params()).await.unwrap();
        assert_eq!(session.snapshot().state, CoverageState::Fresh);

        let id = session.add_receiver(GeoPoint::new(-14.2, -51.9));
        settle().await;

        let snapshot = session.snapshot();
        let entry = snapshot.receivers.iter().find(|e| e.id == id).unwrap();
        let summary = entry.summary.as_ref().unwrap();
        assert!(entry.selected);
        assert_eq!(summary.field_dbuv, Some(-35.0));
        assert!(summary.inside_coverage_radius);
        assert!(!summary.pending_field);
        assert_eq!(summary.elevation_m, Some(100.0));
        assert_eq!(
            snapshot.status_message.as_deref(),
            Some("Location confirmed")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn large_move_marks_coverage_stale() {
        let backend = FakeBackend::default();
        backend.set_coverage(Some(coverage_response(false)));
        let session = session(&backend);
        session.generate_coverage(params()).await.unwrap();

        session.move_transmitter(north_of(TX, 1000.0));
        assert_eq!(session.snapshot().state, CoverageState::Stale);
        assert!(session.snapshot().status_message.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn tiny_move_keeps_coverage_fresh() {
        let backend = FakeBackend::default();
        backend.set_coverage(Some(coverage_response(false)));
        let session = session(&backend);
        session.generate_coverage(params()).await.unwrap();

        session.move_transmitter(north_of(TX, 0.1));
        assert_eq!(session.snapshot().state, CoverageState::Fresh);
    }

    #[tokio::test(start_paused = true)]
    async fn move_without_coverage_stays_without_coverage() {
        let backend = FakeBackend::default();
        let session = session(&backend);
        session.move_transmitter(north_of(TX, 1000.0));
        assert_eq!(session.snapshot().state, CoverageState::NoCoverage);
    }

    #[tokio::test(start_paused = true)]
    async fn move_keeps_old_coverage_for_summaries() {
        let backend = FakeBackend::default();
        backend.set_coverage(Some(coverage_response(false)));
        let session = session(&backend);
        session.generate_coverage(params()).await.unwrap();
        let id = session.add_receiver(GeoPoint::new(-14.2, -51.9));
        settle().await;

        session.move_transmitter(north_of(TX, 1000.0));
        let snapshot = session.snapshot();
        let entry = snapshot.receivers.iter().find(|e| e.id == id).unwrap();
        let summary = entry.summary.as_ref().unwrap();
        assert_eq!(summary.field_dbuv, Some(-35.0));
        assert_eq!(summary.elevation_m, Some(100.0));
    }

    #[tokio::test(start_paused = true)]
    async fn tilt_burst_sends_one_save_with_last_value() {
        let backend = FakeBackend::default();
        backend.set_coverage(Some(coverage_response(false)));
        let session = session(&backend);
        session.generate_coverage(params()).await.unwrap();

        session.set_tilt(1.0);
        tokio::time::sleep(Duration::from_millis(40)).await;
        session.set_tilt(2.0);
        tokio::time::sleep(Duration::from_millis(40)).await;
        session.set_tilt(3.0);
        assert_eq!(session.snapshot().state, CoverageState::Stale);

        tokio::time::sleep(Duration::from_millis(500)).await;
        let tilts: Vec<_> = backend
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Tilt(_)))
            .collect();
        assert_eq!(tilts, vec![Call::Tilt(3.0)]);
        assert_eq!(session.snapshot().transmitter.antenna_tilt_deg, 3.0);
    }

    #[tokio::test(start_paused = true)]
    async fn unit_switch_is_local() {
        let backend = FakeBackend::default();
        backend.set_coverage(Some(coverage_response(true)));
        let session = session(&backend);
        session.generate_coverage(params()).await.unwrap();
        session.add_receiver(GeoPoint::new(-14.2, -51.9));
        settle().await;

        let before = session.snapshot();
        let calls = backend.calls().len();
        session.set_unit(UnitKey::Dbm).unwrap();
        let after = session.snapshot();

        assert_eq!(backend.calls().len(), calls);
        assert_eq!(after.unit, UnitKey::Dbm);
        assert_eq!(after.state, before.state);
        assert_eq!(after.transmitter.position, before.transmitter.position);
        assert_eq!(after.receivers.len(), before.receivers.len());
        assert_eq!(
            after.coverage.as_ref().unwrap().requested_radius_km,
            before.coverage.as_ref().unwrap().requested_radius_km
        );
        let summary = after.receivers[0].summary.as_ref().unwrap();
        assert_eq!(summary.field_dbm, Some(-95.0));
        assert!(!summary.pending_field);
    }

    #[tokio::test(start_paused = true)]
    async fn unit_without_image_is_rejected() {
        let backend = FakeBackend::default();
        let session = session(&backend);
        assert!(matches!(
            session.set_unit(UnitKey::Dbm),
            Err(SessionError::EmptyCoverageResult(UnitKey::Dbm))
        ));

        backend.set_coverage(Some(coverage_response(false)));
        session.generate_coverage(params()).await.unwrap();
        assert!(matches!(
            session.set_unit(UnitKey::Dbm),
            Err(SessionError::EmptyCoverageResult(UnitKey::Dbm))
        ));
        assert_eq!(session.snapshot().unit, UnitKey::Dbuv);
        assert_eq!(session.snapshot().available_units(), vec![UnitKey::Dbuv]);
    }

    #[tokio::test(start_paused = true)]
    async fn removing_selected_receiver_clears_selection() {
        let backend = FakeBackend::default();
        let session = session(&backend);
        let id = session.add_receiver(GeoPoint::new(-14.2, -51.9));
        assert_eq!(session.snapshot().selected().map(|e| e.id), Some(id));

        assert!(session.remove_receiver(id));
        let snapshot = session.snapshot();
        assert!(snapshot.selected().is_none());
        assert!(snapshot.receivers.is_empty());
        settle().await;
        assert!(session.snapshot().receivers.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_location_sync_is_not_merged() {
        let backend = FakeBackend::default();
        backend.state.lock().unwrap().location_delays =
            VecDeque::from([Duration::from_millis(500), Duration::from_millis(10)]);
        let session = session(&backend);

        let first = north_of(TX, 1000.0);
        let second = north_of(TX, 2000.0);
        session.move_transmitter(first);
        settle().await;
        session.move_transmitter(second);
        tokio::time::sleep(Duration::from_secs(1)).await;

        let transmitter = session.snapshot().transmitter;
        assert_eq!(transmitter.location_name, Some(format!("{:.3}", second.lat)));
        assert_eq!(transmitter.elevation_m, Some(500.0));
        assert_eq!(
            backend.calls(),
            vec![Call::Location(first), Call::Location(second)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn aborting_location_sync_is_idempotent() {
        let backend = FakeBackend::default();
        backend.state.lock().unwrap().location_delays =
            VecDeque::from([Duration::from_millis(100)]);
        let session = session(&backend);
        session.abort_location_sync();
        session.move_transmitter(north_of(TX, 1000.0));
        settle().await;
        session.abort_location_sync();
        session.abort_location_sync();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(session.snapshot().transmitter.location_name, None);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_coverage_leaves_state_untouched() {
        let backend = FakeBackend::default();
        backend.set_coverage(Some(coverage_response(false)));
        let session = session(&backend);
        session.generate_coverage(params()).await.unwrap();
        session.move_transmitter(north_of(TX, 1000.0));
        session.take_notices();

        backend.set_coverage(None);
        let err = session.generate_coverage(params()).await.unwrap_err();
        assert!(matches!(err, SessionError::NetworkFailure(_)));
        assert!(err.is_user_visible());

        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, CoverageState::Stale);
        assert!(snapshot.coverage.is_some());
        let notices = session.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, crate::session::NoticeLevel::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn response_without_image_is_rejected() {
        let backend = FakeBackend::default();
        backend.set_coverage(Some(CoverageResponse::default()));
        let session = session(&backend);
        let err = session.generate_coverage(params()).await.unwrap_err();
        assert!(matches!(err, SessionError::EmptyCoverageResult(UnitKey::Dbuv)));
        assert_eq!(session.snapshot().state, CoverageState::NoCoverage);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_coverage_request_cancels_older() {
        let backend = FakeBackend::default();
        backend.set_coverage(Some(coverage_response(false)));
        backend.state.lock().unwrap().coverage_delay = Duration::from_millis(100);
        let session = session(&backend);

        let (first, second) = tokio::join!(session.generate_coverage(params()), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            session.generate_coverage(params()).await
        });
        let first = first.unwrap_err();
        assert!(matches!(first, SessionError::CancelledRequest));
        assert!(!first.is_user_visible());
        second.unwrap();
        assert_eq!(session.snapshot().state, CoverageState::Fresh);
    }

    #[tokio::test(start_paused = true)]
    async fn result_for_outdated_parameters_installs_stale() {
        let backend = FakeBackend::default();
        backend.set_coverage(Some(coverage_response(false)));
        backend.state.lock().unwrap().coverage_delay = Duration::from_millis(100);
        let session = session(&backend);

        let (result, _) = tokio::join!(session.generate_coverage(params()), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            session.set_tilt(4.0);
        });
        result.unwrap();
        assert_eq!(session.snapshot().state, CoverageState::Stale);
    }

    #[tokio::test(start_paused = true)]
    async fn coverage_center_repositions_transmitter() {
        let backend = FakeBackend::default();
        let center = north_of(TX, 300.0);
        let mut response = coverage_response(false);
        response.center = Some(center);
        response.tx_location_name = Some("Goiás".into());
        response.tx_site_elevation = Some(640.0);
        backend.set_coverage(Some(response));
        let session = session(&backend);

        session.generate_coverage(params()).await.unwrap();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.transmitter.position, center);
        assert_eq!(snapshot.transmitter.location_name.as_deref(), Some("Goiás"));
        assert_eq!(snapshot.transmitter.elevation_m, Some(640.0));
        assert_eq!(snapshot.state, CoverageState::Fresh);

        settle().await;
        assert!(backend.calls().contains(&Call::Location(center)));
    }

    #[tokio::test(start_paused = true)]
    async fn profile_requires_selection() {
        let backend = FakeBackend::default();
        let session = session(&backend);
        assert!(matches!(
            session.generate_profile().await,
            Err(SessionError::NoReceiverSelected)
        ));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn profile_merges_into_selected_receiver() {
        let backend = FakeBackend::default();
        backend.state.lock().unwrap().profile = Some(ProfileResponse {
            image: Some("cHJvZmlsZQ==".into()),
            field_dbuv: Some(41.0),
            obstacle_distances_km: Some(vec![0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5]),
            received_power_dbm: Some(-80.0),
            tx_gain_dbi: Some(8.0),
        });
        let session = session(&backend);
        let id = session.add_receiver(GeoPoint::new(-14.2, -51.9));
        settle().await;

        let image = session.generate_profile().await.unwrap();
        assert_eq!(image.as_deref(), Some("cHJvZmlsZQ=="));

        let snapshot = session.snapshot();
        let summary = snapshot.receivers[0].summary.clone().unwrap();
        assert_eq!(snapshot.receivers[0].id, id);
        assert_eq!(summary.field_dbuv, Some(41.0));
        assert_eq!(summary.obstacle_distances_km.map(|o| o.len()), Some(6));
        assert_eq!(snapshot.profile_image.as_deref(), Some("cHJvZmlsZQ=="));

        session.move_transmitter(north_of(TX, 1000.0));
        let summary = session.snapshot().receivers[0].summary.clone().unwrap();
        assert_eq!(summary.obstacle_distances_km, None);
        assert!(session.snapshot().profile_image.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_elevation_leaves_field_unset() {
        let backend = FakeBackend::default();
        backend.set_coverage(Some(coverage_response(false)));
        let session = CoverageSession::new(
            backend.clone(),
            FakeElevation { available: false },
            Transmitter::from(SessionData {
                latitude: TX.lat,
                longitude: TX.lng,
                ..Default::default()
            }),
            SessionSettings::default(),
        );
        session.generate_coverage(params()).await.unwrap();
        session.add_receiver(GeoPoint::new(-14.2, -51.9));
        settle().await;

        let summary = session.snapshot().receivers[0].summary.clone().unwrap();
        assert_eq!(summary.elevation_m, None);
        assert_eq!(summary.field_dbuv, Some(-35.0));
    }

    #[tokio::test(start_paused = true)]
    async fn changes_are_broadcast() {
        let backend = FakeBackend::default();
        let session = session(&backend);
        let mut changes = session.subscribe();
        session.add_receiver(GeoPoint::new(-14.2, -51.9));
        assert!(changes.has_changed().unwrap());
        changes.borrow_and_update();
        changes.changed().await.unwrap();
        assert!(session.snapshot().receivers[0]
            .summary
            .as_ref()
            .unwrap()
            .elevation_m
            .is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn draining_no_notices_is_silent() {
        let backend = FakeBackend::default();
        let session = session(&backend);
        let changes = session.subscribe();
        assert!(session.take_notices().is_empty());
        assert!(!changes.has_changed().unwrap());

        session.move_transmitter(GeoPoint::new(-14.0, -51.0));
        let mut changes = session.subscribe();
        assert_eq!(session.take_notices().len(), 1);
        assert!(changes.has_changed().unwrap());
        changes.borrow_and_update();
        assert!(session.take_notices().is_empty());
        assert!(!changes.has_changed().unwrap());
    }
}
