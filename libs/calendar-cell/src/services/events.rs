use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use medication_cell::models::MedicationSchedule;

use crate::models::{CalendarEvent, CalendarError, EventDateTime, EventReminders};

/// Medication reminders block a short slot; appointments block an hour.
const MEDICATION_EVENT_MINUTES: i64 = 15;
const APPOINTMENT_HOURS: i64 = 1;

/// Appointments default to 9:00 AM local on the booked date.
const APPOINTMENT_START: (u32, u32) = (9, 0);

/// Daily recurrence, truncated at the end date when one is given.
pub fn daily_recurrence(end_date: Option<NaiveDate>) -> String {
    match end_date {
        // Google requires YYYYMMDD format for UNTIL
        Some(end) => format!("RRULE:FREQ=DAILY;UNTIL={}T235959Z", end.format("%Y%m%d")),
        None => "RRULE:FREQ=DAILY".to_string(),
    }
}

fn event_datetime(local: NaiveDateTime, timezone: &str) -> EventDateTime {
    EventDateTime {
        date_time: local.format("%Y-%m-%dT%H:%M:%S").to_string(),
        time_zone: timezone.to_string(),
    }
}

/// One recurring event per alert time, anchored on `on` so the series starts
/// the day the schedule is synced.
pub fn medication_events(
    med: &MedicationSchedule,
    on: NaiveDate,
    timezone: &str,
) -> Result<Vec<CalendarEvent>, CalendarError> {
    let recurrence = vec![daily_recurrence(med.end_date)];
    let mut events = Vec::with_capacity(med.alert_times.len());

    for alert_time in &med.alert_times {
        let time = NaiveTime::parse_from_str(alert_time, "%H:%M")
            .map_err(|_| CalendarError::InvalidAlertTime(alert_time.clone()))?;

        let start = on.and_time(time);
        let end = start + Duration::minutes(MEDICATION_EVENT_MINUTES);

        events.push(CalendarEvent {
            summary: format!("💊 Take: {}", med.name),
            location: None,
            description: format!("Dosage: {}\nAdded by CuraMate", med.dosage),
            start: event_datetime(start, timezone),
            end: event_datetime(end, timezone),
            recurrence: Some(recurrence.clone()),
            reminders: EventReminders::popups(&[30, 5]),
        });
    }

    Ok(events)
}

/// Single one-hour appointment event with day-before and hour-before popups.
pub fn appointment_event(
    doctor_name: &str,
    hospital: &str,
    date: NaiveDate,
    timezone: &str,
) -> CalendarEvent {
    let (hour, minute) = APPOINTMENT_START;
    let start = date.and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap());
    let end = start + Duration::hours(APPOINTMENT_HOURS);

    CalendarEvent {
        summary: format!("🩺 Appointment: {}", doctor_name),
        location: Some(hospital.to_string()),
        description: "Booked via CuraMate".to_string(),
        start: event_datetime(start, timezone),
        end: event_datetime(end, timezone),
        recurrence: None,
        reminders: EventReminders::popups(&[1440, 60]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TZ: &str = "Asia/Kolkata";

    fn med(alert_times: &[&str], end_date: Option<&str>) -> MedicationSchedule {
        MedicationSchedule {
            name: "Amoxicillin".to_string(),
            dosage: "500mg".to_string(),
            frequency: Some("twice a day".to_string()),
            alert_times: alert_times.iter().map(|s| s.to_string()).collect(),
            end_date: end_date.map(|d| d.parse().unwrap()),
            notes: None,
        }
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn two_alert_times_make_two_daily_events_without_until() {
        let events = medication_events(&med(&["08:00", "20:00"], None), day("2025-06-10"), TZ)
            .unwrap();

        assert_eq!(events.len(), 2);
        for event in &events {
            let rules = event.recurrence.as_ref().unwrap();
            assert_eq!(rules, &vec!["RRULE:FREQ=DAILY".to_string()]);
            assert!(!rules[0].contains("UNTIL"));
        }

        assert_eq!(events[0].start.date_time, "2025-06-10T08:00:00");
        assert_eq!(events[0].end.date_time, "2025-06-10T08:15:00");
        assert_eq!(events[1].start.date_time, "2025-06-10T20:00:00");
    }

    #[test]
    fn end_date_truncates_the_recurrence() {
        let events =
            medication_events(&med(&["08:00"], Some("2025-11-20")), day("2025-06-10"), TZ)
                .unwrap();

        assert_eq!(
            events[0].recurrence.as_ref().unwrap()[0],
            "RRULE:FREQ=DAILY;UNTIL=20251120T235959Z"
        );
    }

    #[test]
    fn medication_event_carries_summary_dosage_and_popups() {
        let events = medication_events(&med(&["08:00"], None), day("2025-06-10"), TZ).unwrap();

        let event = &events[0];
        assert_eq!(event.summary, "💊 Take: Amoxicillin");
        assert!(event.description.contains("Dosage: 500mg"));
        assert_eq!(event.start.time_zone, TZ);
        assert!(!event.reminders.use_default);
        let minutes: Vec<i64> = event.reminders.overrides.iter().map(|o| o.minutes).collect();
        assert_eq!(minutes, vec![30, 5]);
    }

    #[test]
    fn no_alert_times_means_no_events() {
        let events = medication_events(&med(&[], None), day("2025-06-10"), TZ).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn malformed_alert_time_is_rejected() {
        let result = medication_events(&med(&["8 am"], None), day("2025-06-10"), TZ);
        assert!(matches!(
            result.unwrap_err(),
            CalendarError::InvalidAlertTime(t) if t == "8 am"
        ));
    }

    #[test]
    fn appointment_is_one_hour_at_nine_with_day_and_hour_reminders() {
        let event = appointment_event("Dr. Mehta", "City Care Hospital", day("2025-06-10"), TZ);

        assert_eq!(event.start.date_time, "2025-06-10T09:00:00");
        assert_eq!(event.end.date_time, "2025-06-10T10:00:00");
        assert_eq!(event.summary, "🩺 Appointment: Dr. Mehta");
        assert_eq!(event.location.as_deref(), Some("City Care Hospital"));
        assert!(event.recurrence.is_none());
        let minutes: Vec<i64> = event.reminders.overrides.iter().map(|o| o.minutes).collect();
        assert_eq!(minutes, vec![1440, 60]);
    }
}
