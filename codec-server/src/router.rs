//! Router construction for the codec server.

use axum::{
    middleware as axum_mw,
    routing::{any, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::handlers;
use crate::middleware::request_log::log_api_requests;
use crate::state::AppState;

/// Build the full router: API, dev-server proxy, then static files for
/// everything else.
pub fn build_router(state: AppState) -> Router {
    let prefix = state.config.dev_proxy_prefix.clone();
    let static_dir = state.config.static_dir.clone();

    let api = Router::new()
        .route("/api/codec-status", get(handlers::health::codec_status))
        // Registry
        .route(
            "/api/frequencies",
            get(handlers::registry::list_frequencies),
        )
        .route("/api/characters", get(handlers::registry::list_characters))
        .route("/api/projects", get(handlers::registry::list_projects))
        .route(
            "/api/easter-eggs",
            get(handlers::registry::list_easter_eggs),
        )
        .route(
            "/api/easter-eggs/:id/hint",
            get(handlers::registry::easter_egg_hint),
        )
        // Sessions
        .route("/api/sessions", post(handlers::sessions::create_session))
        .route(
            "/api/sessions/:id",
            get(handlers::sessions::get_session).delete(handlers::sessions::delete_session),
        )
        .route(
            "/api/sessions/:id/select",
            post(handlers::sessions::select_frequency),
        )
        .route("/api/sessions/:id/tune", post(handlers::sessions::tune))
        .route("/api/sessions/:id/key", post(handlers::sessions::key))
        .route(
            "/api/sessions/:id/projects/toggle",
            post(handlers::sessions::toggle_projects),
        )
        .route(
            "/api/sessions/:id/accessibility/:flag",
            post(handlers::sessions::toggle_accessibility),
        )
        .route(
            "/api/sessions/:id/skip",
            post(handlers::sessions::skip_reveal),
        )
        .route(
            "/api/sessions/:id/replay",
            post(handlers::sessions::replay_dialogue),
        );

    let dev_proxy = Router::new()
        .route(&prefix, any(handlers::proxy::forward))
        // `/*path` does not match an empty tail, so the index URL needs its own route.
        .route(&format!("{}/", prefix), any(handlers::proxy::forward))
        .route(&format!("{}/*path", prefix), any(handlers::proxy::forward));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::health))
        .merge(api)
        .merge(dev_proxy)
        .fallback_service(ServeDir::new(static_dir))
        .layer(axum_mw::from_fn(log_api_requests))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
