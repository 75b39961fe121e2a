// libs/booking-cell/src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::AppError;

// ==============================================================================
// DOCTOR MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub specialty: String,
    pub city: String,
    pub hospital: String,
    pub experience_years: i32,
    pub fee: f64,
    #[serde(default)]
    pub rating: f32,
    pub working_days: Vec<String>,
}

impl Doctor {
    /// True when the doctor consults on the weekday of the given date.
    pub fn works_on(&self, date: NaiveDate) -> bool {
        let weekday = date.format("%A").to_string();
        self.working_days
            .iter()
            .any(|day| day.eq_ignore_ascii_case(&weekday))
    }
}

/// Contact card shown to the patient when no booking could be made.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSummary {
    pub name: String,
    pub hospital: String,
    pub experience_years: i32,
    pub fee: f64,
    pub working_days: Vec<String>,
}

impl From<&Doctor> for DoctorSummary {
    fn from(doctor: &Doctor) -> Self {
        Self {
            name: doctor.name.clone(),
            hospital: doctor.hospital.clone(),
            experience_years: doctor.experience_years,
            fee: doctor.fee,
            working_days: doctor.working_days.clone(),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Risk labels from the patient's health report, e.g. "Diabetes".
    pub risks: Vec<String>,
    /// Free-text availability, e.g. "I live in Delhi and am free next Tuesday".
    pub preference: String,
    pub patient: PatientDetails,
}

/// What the NLP parser extracts from the free-text preference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedBookingRequest {
    pub city: String,
    pub preferred_dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingOutcome {
    pub success: bool,
    pub doctor_name: Option<String>,
    pub hospital: Option<String>,
    pub date: Option<NaiveDate>,
    pub message: String,
    pub alternatives: Vec<DoctorSummary>,
}

impl BookingOutcome {
    pub fn booked(doctor: &Doctor, date: NaiveDate) -> Self {
        Self {
            success: true,
            doctor_name: Some(doctor.name.clone()),
            hospital: Some(doctor.hospital.clone()),
            date: Some(date),
            message: "Appointment request sent. A confirmation will follow shortly.".to_string(),
            alternatives: vec![],
        }
    }

    pub fn unavailable(message: String, alternatives: Vec<DoctorSummary>) -> Self {
        Self {
            success: false,
            doctor_name: None,
            hospital: None,
            date: None,
            message,
            alternatives,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialtyRequest {
    pub risks: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialtyResponse {
    pub specialty: String,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Could not determine the required medical specialty")]
    UnknownSpecialty,

    #[error("Could not understand the booking request: {0}")]
    ParseFailed(String),

    #[error("Language model error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::UnknownSpecialty => AppError::NotFound(err.to_string()),
            BookingError::ParseFailed(_) => AppError::ValidationError(err.to_string()),
            BookingError::Upstream(msg) => AppError::ExternalService(msg),
            BookingError::Database(msg) => AppError::Database(msg),
            BookingError::ValidationError(msg) => AppError::ValidationError(msg),
        }
    }
}
