use chrono::NaiveDate;
use reqwest::{Client, header};
use serde_json::{Value, json};
use tracing::debug;

use shared_config::AppConfig;

use crate::models::{BookingError, ParsedBookingRequest};

const SYSTEM_PROMPT: &str = "You are a medical scheduling assistant. Extract the \
patient's city and the concrete calendar dates they say they are free from their \
message. Resolve relative expressions such as 'next Tuesday' or 'any day next \
weekend' against today's date. Respond with strict JSON only, no prose and no \
code fences: {\"city\": \"<city>\", \"preferred_dates\": [\"YYYY-MM-DD\", ...]}";

pub struct BookingParser {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl BookingParser {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http_client: Client::new(),
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.clone(),
        }
    }

    /// Turns free text like "I live in Delhi and am free next Tuesday" into a
    /// city plus a list of candidate dates.
    pub async fn parse(
        &self,
        preference: &str,
        today: NaiveDate,
    ) -> Result<ParsedBookingRequest, BookingError> {
        debug!("Parsing booking preference ({} chars)", preference.len());

        let prompt = json!({
            "model": "gpt-4o",
            "messages": [
                {
                    "role": "system",
                    "content": format!("{} Today is {}.", SYSTEM_PROMPT, today)
                },
                {
                    "role": "user",
                    "content": preference
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
            .map_err(|e| BookingError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unreadable error body".to_string());
            return Err(BookingError::Upstream(error_text));
        }

        let ai_response: Value = response
            .json()
            .await
            .map_err(|e| BookingError::Upstream(e.to_string()))?;

        let content = ai_response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| BookingError::Upstream("Invalid completion response format".to_string()))?;

        let parsed: ParsedBookingRequest = serde_json::from_str(extract_json(content))
            .map_err(|e| BookingError::ParseFailed(e.to_string()))?;

        if parsed.city.trim().is_empty() {
            return Err(BookingError::ParseFailed("no city mentioned".to_string()));
        }
        if parsed.preferred_dates.is_empty() {
            return Err(BookingError::ParseFailed("no usable dates mentioned".to_string()));
        }

        debug!(
            "Parsed booking preference: city={}, {} candidate date(s)",
            parsed.city,
            parsed.preferred_dates.len()
        );

        Ok(parsed)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_json_passes_plain_json_through() {
        let text = r#"{"city": "Delhi", "preferred_dates": ["2025-06-10"]}"#;
        assert_eq!(extract_json(text), text);
    }

    #[test]
    fn extract_json_strips_fences() {
        let fenced = "```json\n{\"city\": \"Delhi\", \"preferred_dates\": []}\n```";
        assert_eq!(
            extract_json(fenced),
            "{\"city\": \"Delhi\", \"preferred_dates\": []}"
        );

        let bare_fence = "```\n{\"city\": \"Pune\"}\n```";
        assert_eq!(extract_json(bare_fence), "{\"city\": \"Pune\"}");
    }

    #[test]
    fn parsed_request_deserializes_iso_dates() {
        let parsed: ParsedBookingRequest =
            serde_json::from_str(r#"{"city": "Delhi", "preferred_dates": ["2025-06-10", "2025-06-14"]}"#)
                .unwrap();
        assert_eq!(parsed.city, "Delhi");
        assert_eq!(
            parsed.preferred_dates,
            vec![
                NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
                NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            ]
        );
    }
}
