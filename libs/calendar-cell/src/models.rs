use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use medication_cell::models::MedicationSchedule;
use shared_models::error::AppError;

// ==============================================================================
// OAUTH MODELS
// ==============================================================================

/// OAuth client secret file as downloaded from the Google Cloud console
/// ("installed" application shape).
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub installed: InstalledSecrets,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstalledSecrets {
    pub client_id: String,
    pub client_secret: String,
    pub token_uri: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
}

fn default_auth_uri() -> String {
    "https://accounts.google.com/o/oauth2/auth".to_string()
}

/// Cached user token persisted to `token.json` between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// A token without an expiry is treated as expired rather than trusted.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => expiry <= now,
            None => true,
        }
    }
}

/// Token endpoint response for both the refresh and code-exchange grants.
#[derive(Debug, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

// ==============================================================================
// EVENT PAYLOAD MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: String,
    pub time_zone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventReminders {
    pub use_default: bool,
    pub overrides: Vec<ReminderOverride>,
}

impl EventReminders {
    /// Popup reminders at the given offsets, replacing the calendar defaults.
    pub fn popups(minutes: &[i64]) -> Self {
        Self {
            use_default: false,
            overrides: minutes
                .iter()
                .map(|&m| ReminderOverride {
                    method: "popup".to_string(),
                    minutes: m,
                })
                .collect(),
        }
    }
}

/// `events.insert` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub description: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Vec<String>>,
    pub reminders: EventReminders,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncMedicationsRequest {
    pub medications: Vec<MedicationSchedule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncAppointmentRequest {
    pub doctor_name: String,
    pub hospital: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResponse {
    pub added: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUrlResponse {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeCodeRequest {
    pub code: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
}

pub fn default_redirect_uri() -> String {
    "http://localhost".to_string()
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("Missing '{0}'. Please check the setup instructions.")]
    MissingCredentials(String),

    #[error("Google Calendar is not authorized yet. Request an authorization URL and connect it first.")]
    NotAuthorized,

    #[error("Token refresh failed: {0}")]
    TokenRefresh(String),

    #[error("Token cache error: {0}")]
    TokenCache(String),

    #[error("Calendar API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Calendar sync stopped after adding {added} event(s): {message}")]
    SyncAborted { added: usize, message: String },

    #[error("Invalid alert time '{0}': expected HH:MM")]
    InvalidAlertTime(String),
}

impl From<CalendarError> for AppError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::MissingCredentials(_) | CalendarError::NotAuthorized => {
                AppError::BadRequest(err.to_string())
            }
            CalendarError::InvalidAlertTime(_) => AppError::ValidationError(err.to_string()),
            CalendarError::TokenCache(msg) => AppError::Internal(msg),
            CalendarError::TokenRefresh(_)
            | CalendarError::Api { .. }
            | CalendarError::SyncAborted { .. } => AppError::ExternalService(err.to_string()),
        }
    }
}
