use chrono::NaiveDate;
use reqwest::{Client, header};
use serde_json::{Value, json};
use tracing::debug;

use shared_config::AppConfig;

use crate::models::{MedicationError, MedicationSchedule};

const SYSTEM_PROMPT: &str = "You are a clinical pharmacist turning a doctor's \
free-text instructions into a medication schedule. For each medication extract \
its name, dosage, a short frequency description, the wall-clock alert times as \
\"HH:MM\" strings spread sensibly across the day, and the end date when a \
duration like 'for 7 days' is given (otherwise null). Respond with a strict \
JSON array only, no prose and no code fences: [{\"name\": ..., \"dosage\": ..., \
\"frequency\": ..., \"alert_times\": [\"HH:MM\"], \"end_date\": \"YYYY-MM-DD\" \
or null, \"notes\": ... or null}]";

pub struct MedicationParser {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl MedicationParser {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http_client: Client::new(),
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.clone(),
        }
    }

    pub async fn parse(
        &self,
        instructions: &str,
        today: NaiveDate,
    ) -> Result<Vec<MedicationSchedule>, MedicationError> {
        debug!("Parsing medication instructions ({} chars)", instructions.len());

        let prompt = json!({
            "model": "gpt-4o",
            "messages": [
                {
                    "role": "system",
                    "content": format!("{} Today is {}.", SYSTEM_PROMPT, today)
                },
                {
                    "role": "user",
                    "content": instructions
                }
            ],
            "temperature": 0.0
        });

        let response = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&prompt)
            .send()
            .await
            .map_err(|e| MedicationError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unreadable error body".to_string());
            return Err(MedicationError::Upstream(error_text));
        }

        let ai_response: Value = response
            .json()
            .await
            .map_err(|e| MedicationError::Upstream(e.to_string()))?;

        let content = ai_response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                MedicationError::Upstream("Invalid completion response format".to_string())
            })?;

        let schedules: Vec<MedicationSchedule> = serde_json::from_str(extract_json(content))
            .map_err(|e| MedicationError::ParseFailed(e.to_string()))?;

        debug!("Parsed {} medication(s)", schedules.len());
        Ok(schedules)
    }
}

/// Models sometimes wrap JSON in markdown fences despite instructions.
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open.strip_suffix("```").unwrap_or(without_open).trim()
}
