use std::sync::Arc;

use axum::{
    Router,
    middleware,
    routing::{get, post},
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn medication_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/parse", post(handlers::parse_schedule))
        .route("/", post(handlers::save_medications).get(handlers::list_medications))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
