// libs/booking-cell/src/services/booking.rs
use chrono::NaiveDate;
use serde_json::json;
use tracing::{info, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    BookingError, BookingOutcome, Doctor, ParsedBookingRequest, PatientDetails,
};
use crate::services::ranking::{rank_doctors, top_alternatives};

pub struct BookingService {
    supabase: SupabaseClient,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Matches the parsed preferences against doctors in the requested city.
    /// The earliest preferred date with a working doctor wins; when no date
    /// works the outcome carries the top-ranked alternatives instead of an
    /// error, so the caller can show them as direct contacts.
    pub async fn find_and_book(
        &self,
        specialty: &str,
        parsed: &ParsedBookingRequest,
        patient: &PatientDetails,
        user_id: &str,
        auth_token: &str,
    ) -> Result<BookingOutcome, BookingError> {
        let rows = self
            .supabase
            .find_doctors(specialty, &parsed.city, auth_token)
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;

        let doctors: Vec<Doctor> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<Doctor>(row) {
                Ok(doctor) => Some(doctor),
                Err(e) => {
                    warn!("Skipping malformed doctor row: {}", e);
                    None
                }
            })
            .collect();

        if doctors.is_empty() {
            return Ok(BookingOutcome::unavailable(
                format!("No {} found in {}.", specialty, parsed.city),
                vec![],
            ));
        }

        let ranked = rank_doctors(doctors);

        let mut dates = parsed.preferred_dates.clone();
        dates.sort();

        for date in &dates {
            if let Some(doctor) = ranked.iter().find(|d| d.works_on(*date)) {
                self.record_appointment(doctor, *date, patient, user_id, specialty, auth_token)
                    .await?;

                info!(
                    "Booked {} with {} at {} on {}",
                    specialty, doctor.name, doctor.hospital, date
                );
                return Ok(BookingOutcome::booked(doctor, *date));
            }
        }

        info!(
            "No {} in {} available on {} preferred date(s), returning alternatives",
            specialty,
            parsed.city,
            dates.len()
        );

        Ok(BookingOutcome::unavailable(
            format!(
                "No {} in {} is available on your preferred days.",
                specialty, parsed.city
            ),
            top_alternatives(&ranked),
        ))
    }

    async fn record_appointment(
        &self,
        doctor: &Doctor,
        date: NaiveDate,
        patient: &PatientDetails,
        user_id: &str,
        specialty: &str,
        auth_token: &str,
    ) -> Result<(), BookingError> {
        let row = json!({
            "patient_id": user_id,
            "doctor_id": doctor.id,
            "doctor_name": doctor.name,
            "hospital": doctor.hospital,
            "city": doctor.city,
            "specialty": specialty,
            "appointment_date": date,
            "patient_name": patient.name,
            "patient_email": patient.email,
            "patient_phone": patient.phone,
            "status": "requested",
        });

        self.supabase
            .insert_appointment(row, auth_token)
            .await
            .map(|_| ())
            .map_err(|e| BookingError::Database(e.to_string()))
    }
}
