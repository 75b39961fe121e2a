use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Value, json};
use tracing::{info, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{MedicationError, MedicationSchedule};

fn alert_time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").unwrap())
}

/// Rejects records the LLM got structurally wrong before anything is persisted.
pub fn validate_schedule(med: &MedicationSchedule) -> Result<(), MedicationError> {
    if med.name.trim().is_empty() {
        return Err(MedicationError::ValidationError(
            "Medication name must not be empty".to_string(),
        ));
    }

    for time in &med.alert_times {
        if !alert_time_pattern().is_match(time) {
            return Err(MedicationError::ValidationError(format!(
                "Invalid alert time '{}' for {}: expected HH:MM",
                time, med.name
            )));
        }
    }

    Ok(())
}

pub struct MedicationService {
    supabase: SupabaseClient,
}

impl MedicationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Validates every record first, then persists them one by one. A failed
    /// insert stops the loop and reports which medication failed and how many
    /// made it in before that.
    pub async fn save_medications(
        &self,
        user_id: &str,
        medications: &[MedicationSchedule],
        auth_token: &str,
    ) -> Result<usize, MedicationError> {
        if medications.is_empty() {
            return Err(MedicationError::ValidationError(
                "No medications to save".to_string(),
            ));
        }

        for med in medications {
            validate_schedule(med)?;
        }

        let total = medications.len();
        let mut saved = 0;

        for med in medications {
            let row = json!({
                "name": med.name,
                "dosage": med.dosage,
                "frequency": med.frequency,
                "alert_times": med.alert_times,
                "end_date": med.end_date,
                "notes": med.notes,
            });

            match self.supabase.save_medication(user_id, row, auth_token).await {
                Ok(_) => saved += 1,
                Err(e) => {
                    warn!("Failed to save medication {}: {}", med.name, e);
                    return Err(MedicationError::SaveIncomplete {
                        saved,
                        total,
                        name: med.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!("Saved {} medication(s) for user {}", saved, user_id);
        Ok(saved)
    }

    pub async fn list_medications(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<Value>, MedicationError> {
        self.supabase
            .get_user_medications(user_id, auth_token)
            .await
            .map_err(|e| MedicationError::Database(e.to_string()))
    }
}
