use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, State},
};
use axum_extra::TypedHeader;
use chrono::Local;
use headers::{Authorization, authorization::Bearer};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    BookingError, BookingOutcome, BookingRequest, SpecialtyRequest, SpecialtyResponse,
};
use crate::services::booking::BookingService;
use crate::services::parser::BookingParser;
use crate::services::specialty::specialty_for_risks;

pub async fn get_specialty(
    Extension(user): Extension<User>,
    Json(request): Json<SpecialtyRequest>,
) -> Result<Json<SpecialtyResponse>, AppError> {
    debug!("Resolving specialty for user {} from {} risk(s)", user.id, request.risks.len());

    let specialty =
        specialty_for_risks(&request.risks).ok_or(BookingError::UnknownSpecialty)?;

    Ok(Json(SpecialtyResponse { specialty }))
}

pub async fn create_booking(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<BookingRequest>,
) -> Result<Json<BookingOutcome>, AppError> {
    debug!("Booking request from user {}", user.id);

    let patient = &request.patient;
    if patient.name.trim().is_empty()
        || patient.email.trim().is_empty()
        || patient.phone.trim().is_empty()
        || request.preference.trim().is_empty()
    {
        return Err(AppError::ValidationError(
            "Please fill in all fields.".to_string(),
        ));
    }

    let specialty =
        specialty_for_risks(&request.risks).ok_or(BookingError::UnknownSpecialty)?;

    let parser = BookingParser::new(&config);
    let parsed = parser
        .parse(&request.preference, Local::now().date_naive())
        .await
        .map_err(AppError::from)?;

    let booking_service = BookingService::new(&config);
    let outcome = booking_service
        .find_and_book(&specialty, &parsed, patient, &user.id, auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(outcome))
}
