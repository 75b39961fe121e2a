use std::sync::Arc;

use axum::{
    Router,
    middleware,
    routing::{get, post},
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn calendar_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/auth/url", get(handlers::auth_url))
        .route("/auth/code", post(handlers::exchange_code))
        .route("/medications/sync", post(handlers::sync_medications))
        .route("/appointments/sync", post(handlers::sync_appointment))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
