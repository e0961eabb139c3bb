use std::sync::Arc;

use crate::backend::{ElevationProvider, HttpBackend};
use crate::presentation::{PresentationAdapter, Scene};

pub type LiveAdapter = PresentationAdapter<HttpBackend, ElevationProvider, Scene>;

#[derive(Clone)]
pub struct AppState {
    pub adapter: Arc<LiveAdapter>,
}

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    use std::time::Duration;

    use crate::presentation::DEFAULT_OVERLAY_OPACITY;
    use crate::session::{CoverageSession, SessionSettings, Transmitter};

    // Nothing listens on the discard port, so backend calls fail fast.
    let backend = HttpBackend::new("http://127.0.0.1:9", Duration::from_secs(1), None)
        .expect("client builds");
    let transmitter = Transmitter::from(crate::backend::types::SessionData {
        latitude: -14.235,
        longitude: -51.925,
        ..Default::default()
    });
    let session = CoverageSession::new(
        backend,
        ElevationProvider::Disabled,
        transmitter,
        SessionSettings::default(),
    );
    AppState {
        adapter: Arc::new(PresentationAdapter::new(
            Arc::new(session),
            Scene::new(),
            DEFAULT_OVERLAY_OPACITY,
        )),
    }
}
