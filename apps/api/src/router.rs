use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use auth_cell::router::auth_routes;
use booking_cell::router::booking_routes;
use calendar_cell::router::calendar_routes;
use medication_cell::router::medication_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "CuraMate API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/bookings", booking_routes(state.clone()))
        .nest("/medications", medication_routes(state.clone()))
        .nest("/calendar", calendar_routes(state.clone()))
}
