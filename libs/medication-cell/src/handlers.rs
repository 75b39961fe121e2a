use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, State},
};
use axum_extra::TypedHeader;
use chrono::Local;
use headers::{Authorization, authorization::Bearer};
use serde_json::Value;
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    MedicationError, MedicationSchedule, ParseScheduleRequest, SaveMedicationsRequest,
    SaveMedicationsResponse,
};
use crate::services::medication::MedicationService;
use crate::services::parser::MedicationParser;

pub async fn parse_schedule(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<ParseScheduleRequest>,
) -> Result<Json<Vec<MedicationSchedule>>, AppError> {
    debug!("Parsing medication instructions for user {}", user.id);

    if request.instructions.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Doctor's instructions must not be empty".to_string(),
        ));
    }

    let parser = MedicationParser::new(&config);
    let schedules = parser
        .parse(&request.instructions, Local::now().date_naive())
        .await
        .map_err(AppError::from)?;

    if schedules.is_empty() {
        return Err(MedicationError::ParseFailed(
            "no medications recognized".to_string(),
        )
        .into());
    }

    Ok(Json(schedules))
}

pub async fn save_medications(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<SaveMedicationsRequest>,
) -> Result<Json<SaveMedicationsResponse>, AppError> {
    debug!(
        "Saving {} medication(s) for user {}",
        request.medications.len(),
        user.id
    );

    let service = MedicationService::new(&config);
    let saved = service
        .save_medications(&user.id, &request.medications, auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(SaveMedicationsResponse {
        saved,
        total: request.medications.len(),
    }))
}

pub async fn list_medications(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Vec<Value>>, AppError> {
    debug!("Listing medications for user {}", user.id);

    let service = MedicationService::new(&config);
    let medications = service
        .list_medications(&user.id, auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(medications))
}
