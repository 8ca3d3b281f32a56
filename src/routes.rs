use std::time::Duration;

use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::handlers::{protected, public};
use crate::middleware::require_auth;
use crate::state::AppState;

/// Builds the full application router.
pub fn app(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);
    let cors = cors_layer(&state.config.security.cors_origins);

    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .layer(TimeoutLayer::new(timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(public::health::health_get))
        .route("/auth/login", post(public::auth::login_post))
        .route("/auth/refresh", post(public::auth::refresh_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{auth, bills, diaries};

    Router::new()
        .route("/auth/me", get(auth::me_get))
        .route("/bills", get(bills::bills_get).post(bills::bills_post))
        .route(
            "/bills/:id",
            get(bills::bill_get).put(bills::bill_put).delete(bills::bill_delete),
        )
        .route("/diaries", get(diaries::diaries_get).post(diaries::diaries_post))
        .route(
            "/diaries/:id",
            get(diaries::diary_get)
                .put(diaries::diary_put)
                .delete(diaries::diary_delete),
        )
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

/// Permissive when no origins are listed or `*` is among them.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
