use std::time::Duration;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::coverage::UnitKey;
use crate::geo::GeoPoint;
use crate::presentation::{Scene, View};
use crate::session::{CoverageParams, SessionStatus};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::AppState;

/// How long a client waiting for the next change is held before it gets
/// the unchanged view.
const LONG_POLL: Duration = Duration::from_secs(25);

/// Map contents plus panel contents, as produced by one render pass.
#[derive(Debug, Serialize, ToSchema)]
pub struct ViewResponse {
    pub scene: Scene,
    pub view: View,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TiltRequest {
    pub tilt_deg: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UnitRequest {
    pub unit: UnitKey,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OpacityRequest {
    pub opacity: f64,
}

pub(crate) fn render(state: &AppState) -> Json<ViewResponse> {
    let view = state.adapter.render();
    Json(ViewResponse {
        scene: state.adapter.widget(),
        view,
    })
}

pub(crate) fn validate_point(point: &GeoPoint) -> ApiResult<()> {
    let valid = (-90.0..=90.0).contains(&point.lat) && (-180.0..=180.0).contains(&point.lng);
    if valid {
        Ok(())
    } else {
        Err(ApiError::Validation(format!(
            "coordinates out of range: ({}, {})",
            point.lat, point.lng
        )))
    }
}

#[utoipa::path(
    get,
    path = "/api/view",
    responses(
        (status = 200, description = "Current map scene and panels", body = ViewResponse)
    ),
    tag = "session"
)]
pub async fn view(State(state): State<AppState>) -> Json<ViewResponse> {
    render(&state)
}

#[utoipa::path(
    get,
    path = "/api/view/next",
    responses(
        (status = 200, description = "View after the next change or a timeout", body = ViewResponse)
    ),
    tag = "session"
)]
pub async fn next_view(State(state): State<AppState>) -> Json<ViewResponse> {
    let mut changes = state.adapter.session().subscribe();
    // Background lookups finish after the gesture that started them. A
    // timeout just yields the current view.
    let _ = tokio::time::timeout(LONG_POLL, changes.changed()).await;
    render(&state)
}

#[utoipa::path(
    get,
    path = "/api/session",
    responses(
        (status = 200, description = "Raw session state", body = SessionStatus)
    ),
    tag = "session"
)]
pub async fn session_status(State(state): State<AppState>) -> Json<SessionStatus> {
    Json(state.adapter.session().status())
}

#[utoipa::path(
    post,
    path = "/api/transmitter/move",
    request_body = GeoPoint,
    responses(
        (status = 200, description = "Transmitter moved", body = ViewResponse),
        (status = 400, description = "Validation error", body = ErrorResponse)
    ),
    tag = "session"
)]
pub async fn move_transmitter(
    State(state): State<AppState>,
    Json(point): Json<GeoPoint>,
) -> ApiResult<Json<ViewResponse>> {
    validate_point(&point)?;
    state.adapter.on_transmitter_drag_end(point);
    Ok(render(&state))
}

#[utoipa::path(
    post,
    path = "/api/transmitter/tilt",
    request_body = TiltRequest,
    responses(
        (status = 200, description = "Tilt applied, save scheduled", body = ViewResponse),
        (status = 400, description = "Validation error", body = ErrorResponse)
    ),
    tag = "session"
)]
pub async fn set_tilt(
    State(state): State<AppState>,
    Json(request): Json<TiltRequest>,
) -> ApiResult<Json<ViewResponse>> {
    if !(-90.0..=90.0).contains(&request.tilt_deg) {
        return Err(ApiError::Validation("tilt must be within ±90°".into()));
    }
    state.adapter.on_tilt_input(request.tilt_deg);
    Ok(render(&state))
}

#[utoipa::path(
    post,
    path = "/api/coverage",
    request_body = CoverageParams,
    responses(
        (status = 200, description = "Coverage installed", body = ViewResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 422, description = "Backend returned no usable image", body = ErrorResponse),
        (status = 502, description = "Backend unavailable", body = ErrorResponse)
    ),
    tag = "session"
)]
pub async fn generate_coverage(
    State(state): State<AppState>,
    Json(params): Json<CoverageParams>,
) -> ApiResult<Json<ViewResponse>> {
    if !(params.radius_km.is_finite() && params.radius_km > 0.0) {
        return Err(ApiError::Validation("radius_km must be positive".into()));
    }
    state.adapter.on_generate_coverage(params).await?;
    Ok(render(&state))
}

#[utoipa::path(
    post,
    path = "/api/unit",
    request_body = UnitRequest,
    responses(
        (status = 200, description = "Display unit switched", body = ViewResponse),
        (status = 422, description = "No coverage for that unit", body = ErrorResponse)
    ),
    tag = "session"
)]
pub async fn set_unit(
    State(state): State<AppState>,
    Json(request): Json<UnitRequest>,
) -> ApiResult<Json<ViewResponse>> {
    state.adapter.on_unit_toggle(request.unit)?;
    Ok(render(&state))
}

#[utoipa::path(
    post,
    path = "/api/overlay/opacity",
    request_body = OpacityRequest,
    responses(
        (status = 200, description = "Overlay opacity changed", body = ViewResponse),
        (status = 400, description = "Validation error", body = ErrorResponse)
    ),
    tag = "session"
)]
pub async fn set_overlay_opacity(
    State(state): State<AppState>,
    Json(request): Json<OpacityRequest>,
) -> ApiResult<Json<ViewResponse>> {
    if !request.opacity.is_finite() {
        return Err(ApiError::Validation("opacity must be a number".into()));
    }
    state.adapter.on_opacity_input(request.opacity);
    Ok(render(&state))
}
