use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::session::{OpacityRequest, TiltRequest, UnitRequest, ViewResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::session::view,
        super::api::session::next_view,
        super::api::session::session_status,
        super::api::session::move_transmitter,
        super::api::session::set_tilt,
        super::api::session::generate_coverage,
        super::api::session::set_unit,
        super::api::session::set_overlay_opacity,
        super::api::receivers::add_receiver,
        super::api::receivers::clear_receivers,
        super::api::receivers::remove_receiver,
        super::api::receivers::select_receiver,
        super::api::receivers::generate_profile,
    ),
    components(
        schemas(
            ViewResponse,
            TiltRequest,
            UnitRequest,
            OpacityRequest,
            ErrorResponse,
            crate::geo::GeoPoint,
            crate::coverage::UnitKey,
            crate::session::CoverageParams,
            crate::session::SessionStatus,
            crate::session::CoverageState,
            crate::session::Notice,
            crate::presentation::Scene,
            crate::presentation::View,
        )
    ),
    info(
        title = "Coverage View API",
        description = "Coverage state and link summaries for a radio link-planning map",
        version = "0.1.0"
    ),
    tags(
        (name = "session", description = "Transmitter, coverage and display state"),
        (name = "receivers", description = "Receiver points and link summaries")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();
        for expected in [
            "/api/view",
            "/api/session",
            "/api/coverage",
            "/api/receivers",
            "/api/receivers/{id}/profile",
        ] {
            assert!(paths.iter().any(|p| p == expected), "missing {}", expected);
        }
    }
}
