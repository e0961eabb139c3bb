use std::sync::{Arc, Mutex as StdMutex};

use super::view::View;
use super::widget::{circle_fill_opacity, Circle, MapWidget, Marker, MarkerId, Overlay};
use crate::backend::{Backend, ElevationService};
use crate::coverage::{CoverageResult, UnitKey};
use crate::geo::GeoPoint;
use crate::receivers::ReceiverId;
use crate::session::{CoverageParams, CoverageSession, SessionError, SessionSnapshot};

pub const DEFAULT_OVERLAY_OPACITY: f64 = 0.85;

struct Display<M> {
    widget: M,
    opacity: f64,
    receivers_drawn: Vec<ReceiverId>,
    fitted: Option<Arc<CoverageResult>>,
    centered: bool,
}

/// Connects user gestures on the map and panels to the session, and draws
/// session state back onto a [`MapWidget`].
pub struct PresentationAdapter<B, E, M> {
    session: Arc<CoverageSession<B, E>>,
    display: StdMutex<Display<M>>,
}

impl<B: Backend, E: ElevationService, M: MapWidget> PresentationAdapter<B, E, M> {
    pub fn new(session: Arc<CoverageSession<B, E>>, widget: M, overlay_opacity: f64) -> Self {
        Self {
            session,
            display: StdMutex::new(Display {
                widget,
                opacity: overlay_opacity.clamp(0.0, 1.0),
                receivers_drawn: Vec::new(),
                fitted: None,
                centered: false,
            }),
        }
    }

    pub fn session(&self) -> &Arc<CoverageSession<B, E>> {
        &self.session
    }

    pub fn on_map_click(&self, point: GeoPoint) -> ReceiverId {
        self.session.add_receiver(point)
    }

    pub fn on_transmitter_drag_end(&self, point: GeoPoint) {
        self.session.move_transmitter(point);
    }

    pub fn on_receiver_click(&self, id: ReceiverId) -> bool {
        self.session.select_receiver(id)
    }

    pub fn on_receiver_remove(&self, id: ReceiverId) -> bool {
        self.session.remove_receiver(id)
    }

    pub fn on_clear_receivers(&self) {
        self.session.clear_receivers();
    }

    pub fn on_unit_toggle(&self, unit: UnitKey) -> Result<(), SessionError> {
        self.session.set_unit(unit)
    }

    pub fn on_tilt_input(&self, tilt_deg: f64) {
        self.session.set_tilt(tilt_deg);
    }

    pub fn on_opacity_input(&self, opacity: f64) {
        let opacity = opacity.clamp(0.0, 1.0);
        let mut display = self.display.lock().unwrap();
        display.opacity = opacity;
        display.widget.set_overlay_opacity(opacity);
    }

    /// Superseded requests resolve to `Ok`, the newer request reports for
    /// both.
    pub async fn on_generate_coverage(&self, params: CoverageParams) -> Result<(), SessionError> {
        swallow_cancelled(self.session.generate_coverage(params).await, ())
    }

    pub async fn on_generate_profile(&self) -> Result<Option<String>, SessionError> {
        self.session.generate_profile().await
    }

    /// Brings the widget up to date and returns the panel contents. Pending
    /// notices are handed out exactly once.
    pub fn render(&self) -> View {
        let snapshot = self.session.snapshot();
        let notices = self.session.take_notices();
        let mut display = self.display.lock().unwrap();
        draw(&mut display, &snapshot);
        View::build(&snapshot, display.opacity, notices)
    }

    pub fn widget(&self) -> M
    where
        M: Clone,
    {
        self.display.lock().unwrap().widget.clone()
    }
}

fn swallow_cancelled<T>(result: Result<T, SessionError>, fallback: T) -> Result<T, SessionError> {
    match result {
        Err(e) if !e.is_user_visible() => {
            log::debug!("{}", e);
            Ok(fallback)
        }
        other => other,
    }
}

fn draw<M: MapWidget>(display: &mut Display<M>, snapshot: &SessionSnapshot) {
    let Display {
        widget,
        opacity,
        receivers_drawn,
        fitted,
        centered,
    } = display;
    let tx = &snapshot.transmitter;

    widget.place_marker(Marker {
        id: MarkerId::Transmitter,
        position: tx.position,
        label: tx.location_name.clone().unwrap_or_else(|| "TX".to_string()),
        selected: false,
        draggable: true,
    });

    let current: Vec<ReceiverId> = snapshot.receivers.iter().map(|e| e.id).collect();
    for gone in receivers_drawn.iter().filter(|id| !current.contains(id)) {
        widget.remove_marker(MarkerId::Receiver(*gone));
    }
    for (index, entry) in snapshot.receivers.iter().enumerate() {
        widget.place_marker(Marker {
            id: MarkerId::Receiver(entry.id),
            position: entry.position,
            label: format!("RX {}", index + 1),
            selected: entry.selected,
            draggable: false,
        });
    }
    *receivers_drawn = current;

    widget.draw_polyline(snapshot.selected().map(|rx| [tx.position, rx.position]));

    match &snapshot.coverage {
        Some(coverage) => {
            let image = coverage
                .image(snapshot.unit)
                .or_else(|| coverage.image(UnitKey::Dbuv));
            widget.draw_overlay(image.map(|image| Overlay {
                image: image.image.clone(),
                bounds: coverage.bounds,
                opacity: *opacity,
            }));
            widget.draw_circle(coverage.requested_radius_m().map(|radius_m| Circle {
                center: coverage.center,
                radius_m,
                fill_opacity: circle_fill_opacity(*opacity),
            }));
            if !fitted.as_ref().is_some_and(|f| Arc::ptr_eq(f, coverage)) {
                widget.fit_bounds(coverage.bounds);
                *fitted = Some(coverage.clone());
            }
        }
        None => {
            widget.draw_overlay(None);
            widget.draw_circle(None);
        }
    }

    if !*centered {
        if fitted.is_none() {
            widget.pan_to(tx.position);
        }
        *centered = true;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::backend::fake::{coverage_response, FakeBackend, FakeElevation, TX};
    use crate::presentation::Scene;
    use crate::session::{CoverageState, NoticeLevel, SessionSettings, Transmitter};

    type Adapter = PresentationAdapter<FakeBackend, FakeElevation, Scene>;

    fn adapter(backend: &FakeBackend) -> Adapter {
        let transmitter = Transmitter {
            position: TX,
            frequency_mhz: Some(100.1),
            propagation_model: None,
            antenna_tilt_deg: 0.0,
            location_name: None,
            elevation_m: None,
            climate_updated_at: None,
        };
        let session = CoverageSession::new(
            backend.clone(),
            FakeElevation { available: true },
            transmitter,
            SessionSettings::default(),
        );
        PresentationAdapter::new(Arc::new(session), Scene::new(), DEFAULT_OVERLAY_OPACITY)
    }

    fn params() -> CoverageParams {
        CoverageParams {
            radius_km: 50.0,
            min_field: None,
            max_field: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_render_centers_on_transmitter() {
        let adapter = adapter(&FakeBackend::default());
        let view = adapter.render();
        let scene = adapter.widget();

        assert_eq!(view.state, CoverageState::NoCoverage);
        assert_eq!(scene.markers.len(), 1);
        assert!(scene.marker(MarkerId::Transmitter).unwrap().draggable);
        assert_eq!(scene.viewport.unwrap().center, TX);
        assert!(scene.overlay.is_none());
        assert!(scene.circle.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn coverage_draws_overlay_circle_and_fits() {
        let backend = FakeBackend::default();
        backend.set_coverage(Some(coverage_response(true)));
        let adapter = adapter(&backend);

        adapter.on_generate_coverage(params()).await.unwrap();
        let view = adapter.render();
        let scene = adapter.widget();

        let overlay = scene.overlay.as_ref().unwrap();
        assert_eq!(overlay.image, "dbuv");
        assert_eq!(overlay.opacity, DEFAULT_OVERLAY_OPACITY);
        let circle = scene.circle.unwrap();
        assert_eq!(circle.radius_m, 50_000.0);
        assert_eq!(circle.fill_opacity, circle_fill_opacity(DEFAULT_OVERLAY_OPACITY));
        assert!(scene.viewport.unwrap().fit.is_some());
        assert_eq!(view.notices.len(), 1);
        assert_eq!(view.notices[0].level, NoticeLevel::Info);

        adapter.on_unit_toggle(UnitKey::Dbm).unwrap();
        adapter.render();
        assert_eq!(adapter.widget().overlay.unwrap().image, "dbm");
    }

    #[tokio::test(start_paused = true)]
    async fn receivers_get_markers_and_selection_line() {
        let backend = FakeBackend::default();
        let adapter = adapter(&backend);

        let first = adapter.on_map_click(GeoPoint::new(-14.2, -51.9));
        let second = adapter.on_map_click(GeoPoint::new(-14.3, -51.8));
        tokio::time::sleep(Duration::from_millis(1)).await;

        let view = adapter.render();
        let scene = adapter.widget();
        assert_eq!(scene.markers.len(), 3);
        assert_eq!(scene.marker(MarkerId::Receiver(first)).unwrap().label, "RX 1");
        assert!(scene.marker(MarkerId::Receiver(second)).unwrap().selected);
        assert_eq!(
            scene.polyline,
            Some(vec![TX, GeoPoint::new(-14.3, -51.8)])
        );
        assert_eq!(view.receivers.len(), 2);

        assert!(adapter.on_receiver_remove(second));
        adapter.render();
        let scene = adapter.widget();
        assert_eq!(scene.markers.len(), 2);
        assert!(scene.polyline.is_none());

        assert!(adapter.on_receiver_click(first));
        adapter.on_clear_receivers();
        adapter.render();
        assert_eq!(adapter.widget().markers.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn opacity_is_clamped_and_applied() {
        let backend = FakeBackend::default();
        backend.set_coverage(Some(coverage_response(false)));
        let adapter = adapter(&backend);
        adapter.on_generate_coverage(params()).await.unwrap();
        adapter.render();

        adapter.on_opacity_input(1.7);
        assert_eq!(adapter.widget().overlay.unwrap().opacity, 1.0);

        adapter.on_opacity_input(0.12);
        let view = adapter.render();
        let scene = adapter.widget();
        assert_eq!(scene.overlay.unwrap().opacity, 0.12);
        assert_eq!(scene.circle.unwrap().fill_opacity, 0.05);
        assert_eq!(view.overlay_opacity, "0.12");
    }

    #[tokio::test(start_paused = true)]
    async fn drag_end_moves_marker_and_marks_stale() {
        let backend = FakeBackend::default();
        backend.set_coverage(Some(coverage_response(false)));
        let adapter = adapter(&backend);
        adapter.on_generate_coverage(params()).await.unwrap();

        let target = GeoPoint::new(-14.3, -51.9);
        adapter.on_transmitter_drag_end(target);
        let view = adapter.render();
        assert_eq!(view.state, CoverageState::Stale);
        assert!(view.status_message.is_some());
        assert_eq!(
            adapter.widget().marker(MarkerId::Transmitter).unwrap().position,
            target
        );
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_coverage_is_silent() {
        let backend = FakeBackend::default();
        backend.set_coverage(Some(coverage_response(false)));
        backend.state.lock().unwrap().coverage_delay = Duration::from_millis(100);
        let adapter = adapter(&backend);

        let (first, second) = tokio::join!(adapter.on_generate_coverage(params()), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            adapter.on_generate_coverage(params()).await
        });
        first.unwrap();
        second.unwrap();
        let notices = adapter.render().notices;
        assert!(notices.iter().all(|n| n.level == NoticeLevel::Info));
    }

    #[tokio::test(start_paused = true)]
    async fn tilt_input_is_forwarded() {
        let backend = FakeBackend::default();
        let adapter = adapter(&backend);
        adapter.on_tilt_input(3.5);
        let view = adapter.render();
        assert_eq!(view.transmitter.tilt, "3.5°");
    }
}
