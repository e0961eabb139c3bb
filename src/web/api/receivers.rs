use axum::{
    extract::{Path, State},
    Json,
};

use super::session::{render, validate_point, ViewResponse};
use crate::geo::GeoPoint;
use crate::receivers::ReceiverId;
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::AppState;

#[utoipa::path(
    post,
    path = "/api/receivers",
    request_body = GeoPoint,
    responses(
        (status = 200, description = "Receiver added and selected", body = ViewResponse),
        (status = 400, description = "Validation error", body = ErrorResponse)
    ),
    tag = "receivers"
)]
pub async fn add_receiver(
    State(state): State<AppState>,
    Json(point): Json<GeoPoint>,
) -> ApiResult<Json<ViewResponse>> {
    validate_point(&point)?;
    state.adapter.on_map_click(point);
    Ok(render(&state))
}

#[utoipa::path(
    delete,
    path = "/api/receivers",
    responses(
        (status = 200, description = "All receivers removed", body = ViewResponse)
    ),
    tag = "receivers"
)]
pub async fn clear_receivers(State(state): State<AppState>) -> Json<ViewResponse> {
    state.adapter.on_clear_receivers();
    render(&state)
}

#[utoipa::path(
    delete,
    path = "/api/receivers/{id}",
    params(("id" = String, Path, description = "Receiver id")),
    responses(
        (status = 200, description = "Receiver removed", body = ViewResponse),
        (status = 404, description = "Unknown receiver", body = ErrorResponse)
    ),
    tag = "receivers"
)]
pub async fn remove_receiver(
    State(state): State<AppState>,
    Path(id): Path<ReceiverId>,
) -> ApiResult<Json<ViewResponse>> {
    if !state.adapter.on_receiver_remove(id) {
        return Err(ApiError::NotFound("receiver_not_found"));
    }
    Ok(render(&state))
}

#[utoipa::path(
    post,
    path = "/api/receivers/{id}/select",
    params(("id" = String, Path, description = "Receiver id")),
    responses(
        (status = 200, description = "Receiver selected", body = ViewResponse),
        (status = 404, description = "Unknown receiver", body = ErrorResponse)
    ),
    tag = "receivers"
)]
pub async fn select_receiver(
    State(state): State<AppState>,
    Path(id): Path<ReceiverId>,
) -> ApiResult<Json<ViewResponse>> {
    if !state.adapter.on_receiver_click(id) {
        return Err(ApiError::NotFound("receiver_not_found"));
    }
    Ok(render(&state))
}

#[utoipa::path(
    post,
    path = "/api/receivers/{id}/profile",
    params(("id" = String, Path, description = "Receiver id")),
    responses(
        (status = 200, description = "Path profile merged into the receiver", body = ViewResponse),
        (status = 404, description = "Unknown receiver", body = ErrorResponse),
        (status = 502, description = "Backend unavailable", body = ErrorResponse)
    ),
    tag = "receivers"
)]
pub async fn generate_profile(
    State(state): State<AppState>,
    Path(id): Path<ReceiverId>,
) -> ApiResult<Json<ViewResponse>> {
    if !state.adapter.on_receiver_click(id) {
        return Err(ApiError::NotFound("receiver_not_found"));
    }
    state.adapter.on_generate_profile().await?;
    Ok(render(&state))
}
