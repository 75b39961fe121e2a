use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use shared_models::error::AppError;

/// One medication as extracted from the doctor's instructions.
/// `alert_times` are wall-clock "HH:MM" strings; `end_date` of `None`
/// means the medication runs indefinitely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationSchedule {
    pub name: String,
    pub dosage: String,
    #[serde(default)]
    pub frequency: Option<String>,
    pub alert_times: Vec<String>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseScheduleRequest {
    pub instructions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveMedicationsRequest {
    pub medications: Vec<MedicationSchedule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveMedicationsResponse {
    pub saved: usize,
    pub total: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum MedicationError {
    #[error("Could not understand instructions: {0}")]
    ParseFailed(String),

    #[error("Language model error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Only saved {saved}/{total} medications. Failed to save {name}: {reason}")]
    SaveIncomplete {
        saved: usize,
        total: usize,
        name: String,
        reason: String,
    },
}

impl From<MedicationError> for AppError {
    fn from(err: MedicationError) -> Self {
        match err {
            MedicationError::ParseFailed(_) => AppError::ValidationError(err.to_string()),
            MedicationError::Upstream(msg) => AppError::ExternalService(msg),
            MedicationError::Database(msg) => AppError::Database(msg),
            MedicationError::ValidationError(msg) => AppError::ValidationError(msg),
            MedicationError::SaveIncomplete { .. } => AppError::Database(err.to_string()),
        }
    }
}
