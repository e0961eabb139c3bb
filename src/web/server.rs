use axum::{routing::delete, routing::get, routing::post, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::backend::{ElevationProvider, HttpBackend, HttpElevation};
use crate::presentation::{PresentationAdapter, Scene};
use crate::session::CoverageSession;

use super::api::receivers as receiver_handlers;
use super::api::session as session_handlers;
use super::api_doc::ApiDoc;
use super::config::Config;
use super::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Session
        .route("/api/view", get(session_handlers::view))
        .route("/api/view/next", get(session_handlers::next_view))
        .route("/api/session", get(session_handlers::session_status))
        .route(
            "/api/transmitter/move",
            post(session_handlers::move_transmitter),
        )
        .route("/api/transmitter/tilt", post(session_handlers::set_tilt))
        .route("/api/coverage", post(session_handlers::generate_coverage))
        .route("/api/unit", post(session_handlers::set_unit))
        .route(
            "/api/overlay/opacity",
            post(session_handlers::set_overlay_opacity),
        )
        // Receivers
        .route("/api/receivers", post(receiver_handlers::add_receiver))
        .route("/api/receivers", delete(receiver_handlers::clear_receivers))
        .route(
            "/api/receivers/{id}",
            delete(receiver_handlers::remove_receiver),
        )
        .route(
            "/api/receivers/{id}/select",
            post(receiver_handlers::select_receiver),
        )
        .route(
            "/api/receivers/{id}/profile",
            post(receiver_handlers::generate_profile),
        )
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let bind_addr = config.web.bind.clone();
    let timeout = config.backend_timeout()?;
    let settings = config.session_settings()?;

    let backend = HttpBackend::new(
        &config.backend.base_url,
        timeout,
        config.backend.session_cookie.as_deref(),
    )?;
    let elevation = match &config.elevation {
        Some(elevation) => ElevationProvider::Http(HttpElevation::new(
            &elevation.url,
            elevation.api_key.clone(),
            timeout,
        )?),
        None => {
            log::warn!("No elevation service configured, receiver elevations stay empty");
            ElevationProvider::Disabled
        }
    };

    let session = Arc::new(CoverageSession::connect(backend, elevation, settings).await?);
    let adapter = PresentationAdapter::new(
        session.clone(),
        Scene::new(),
        config.session.overlay_opacity,
    );
    let state = AppState {
        adapter: Arc::new(adapter),
    };

    let app = build_router(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    log::info!("Shutting down, dropping pending session work");
    session.shutdown();
    Ok(())
}
