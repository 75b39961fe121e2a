// libs/calendar-cell/src/services/sync.rs
use chrono::NaiveDate;
use reqwest::{Client, header};
use tracing::{info, warn};

use medication_cell::models::MedicationSchedule;
use shared_config::AppConfig;

use crate::models::{CalendarError, CalendarEvent};
use crate::services::events::{appointment_event, medication_events};
use crate::services::oauth::TokenStore;

const GOOGLE_CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";

pub struct CalendarSyncService {
    store: TokenStore,
    http_client: Client,
    api_base: String,
    timezone: String,
}

impl CalendarSyncService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: TokenStore::new(config),
            http_client: Client::new(),
            api_base: GOOGLE_CALENDAR_API.to_string(),
            timezone: config.calendar_timezone.clone(),
        }
    }

    /// Points the service at a different API host (wiremock in tests).
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.to_string();
        self
    }

    /// Inserts one recurring event per (medication, alert time) into the
    /// user's primary calendar. The first failed insertion aborts the rest
    /// of the batch; the error reports how many events were already added.
    pub async fn sync_medications(
        &self,
        medications: &[MedicationSchedule],
        today: NaiveDate,
    ) -> Result<usize, CalendarError> {
        let access_token = self.store.access_token().await?;

        let mut added = 0;

        for med in medications {
            let events = medication_events(med, today, &self.timezone)
                .map_err(|e| abort(added, e))?;

            for event in events {
                self.insert_event(&access_token, &event)
                    .await
                    .map_err(|e| abort(added, e))?;
                added += 1;
            }
        }

        info!("Added {} recurring medication reminder(s) to calendar", added);
        Ok(added)
    }

    /// Single event for a booked appointment.
    pub async fn sync_appointment(
        &self,
        doctor_name: &str,
        hospital: &str,
        date: NaiveDate,
    ) -> Result<(), CalendarError> {
        let access_token = self.store.access_token().await?;

        let event = appointment_event(doctor_name, hospital, date, &self.timezone);
        self.insert_event(&access_token, &event).await?;

        info!("Added appointment with {} on {} to calendar", doctor_name, date);
        Ok(())
    }

    async fn insert_event(
        &self,
        access_token: &str,
        event: &CalendarEvent,
    ) -> Result<(), CalendarError> {
        let url = format!("{}/calendars/primary/events", self.api_base);

        let response = self
            .http_client
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
            .json(event)
            .send()
            .await
            .map_err(|e| CalendarError::Api {
                status: 0,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unreadable error body".to_string());
            warn!("Event insert failed ({}): {}", status, error_text);

            return Err(CalendarError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        Ok(())
    }
}

fn abort(added: usize, source: CalendarError) -> CalendarError {
    CalendarError::SyncAborted {
        added,
        message: source.to_string(),
    }
}
