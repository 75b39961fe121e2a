use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query, State},
};
use chrono::Local;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    AuthUrlResponse, ExchangeCodeRequest, SyncAppointmentRequest, SyncMedicationsRequest,
    SyncResponse, default_redirect_uri,
};
use crate::services::oauth::TokenStore;
use crate::services::sync::CalendarSyncService;

#[derive(Debug, Deserialize)]
pub struct AuthUrlQuery {
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
}

pub async fn auth_url(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Query(query): Query<AuthUrlQuery>,
) -> Result<Json<AuthUrlResponse>, AppError> {
    debug!("Building calendar consent URL for user {}", user.id);

    let store = TokenStore::new(&config);
    let url = store
        .authorization_url(&query.redirect_uri)
        .map_err(AppError::from)?;

    Ok(Json(AuthUrlResponse { url }))
}

pub async fn exchange_code(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<ExchangeCodeRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Exchanging calendar authorization code for user {}", user.id);

    if request.code.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Authorization code must not be empty".to_string(),
        ));
    }

    let store = TokenStore::new(&config);
    store
        .exchange_code(&request.code, &request.redirect_uri)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({ "authorized": true })))
}

pub async fn sync_medications(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<SyncMedicationsRequest>,
) -> Result<Json<SyncResponse>, AppError> {
    debug!(
        "Syncing {} medication(s) to calendar for user {}",
        request.medications.len(),
        user.id
    );

    let service = CalendarSyncService::new(&config);
    let added = service
        .sync_medications(&request.medications, Local::now().date_naive())
        .await
        .map_err(AppError::from)?;

    Ok(Json(SyncResponse { added }))
}

pub async fn sync_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<SyncAppointmentRequest>,
) -> Result<Json<SyncResponse>, AppError> {
    debug!(
        "Syncing appointment with {} on {} for user {}",
        request.doctor_name, request.date, user.id
    );

    let service = CalendarSyncService::new(&config);
    service
        .sync_appointment(&request.doctor_name, &request.hospital, request.date)
        .await
        .map_err(AppError::from)?;

    Ok(Json(SyncResponse { added: 1 }))
}
