use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Json, State},
    http::{HeaderMap, Request},
};
use serde_json::json;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::TokenResponse;
use shared_models::error::AppError;
use shared_utils::extractor::{bearer_token, extract_user};
use shared_utils::jwt::validate_token;

pub async fn validate(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let token = bearer_token(&headers)?;

    let user = validate_token(&token, &config.supabase_jwt_secret)
        .map_err(AppError::Auth)?;

    Ok(Json(TokenResponse {
        valid: true,
        user_id: user.id,
        email: user.email,
        role: user.role,
    }))
}

pub async fn verify(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    debug!("Verifying token");

    let token = bearer_token(&headers)?;
    let valid = validate_token(&token, &config.supabase_jwt_secret).is_ok();

    Ok(Json(json!({ "valid": valid })))
}

pub async fn get_profile(
    State(config): State<Arc<AppConfig>>,
    request: Request<Body>,
) -> Result<Json<serde_json::Value>, AppError> {
    // Middleware has already validated the token
    let user = extract_user(&request)?;
    debug!("Getting profile for user: {}", user.id);

    let token = bearer_token(request.headers())?;

    let client = SupabaseClient::new(&config);
    let auth_profile = client
        .get_user_profile(&user.id, &token)
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    Ok(Json(json!({
        "user_id": user.id,
        "profile": auth_profile
    })))
}
