use crate::models::{Doctor, DoctorSummary};

/// How many alternative doctors the patient is shown when booking fails.
pub const MAX_ALTERNATIVES: usize = 3;

/// Weighted score in [0, 1]: experience and rating dominate, affordability
/// breaks ties. Experience saturates at 20 years so a 35-year veteran does
/// not drown out rating entirely.
pub fn rank_score(doctor: &Doctor, max_fee: f64) -> f32 {
    let experience_weight = 0.4;
    let rating_weight = 0.4;
    let fee_weight = 0.2;

    let experience_score = (doctor.experience_years as f32 / 20.0).min(1.0);

    let rating_score = (doctor.rating / 5.0).min(1.0);

    let fee_score = if max_fee > 0.0 {
        (1.0 - doctor.fee / max_fee).max(0.0) as f32
    } else {
        0.0
    };

    experience_weight * experience_score + rating_weight * rating_score + fee_weight * fee_score
}

/// Sorts doctors by score, highest first.
pub fn rank_doctors(mut doctors: Vec<Doctor>) -> Vec<Doctor> {
    let max_fee = doctors.iter().map(|d| d.fee).fold(0.0_f64, f64::max);

    doctors.sort_by(|a, b| {
        rank_score(b, max_fee)
            .partial_cmp(&rank_score(a, max_fee))
            .unwrap()
    });
    doctors
}

/// Top-ranked contact cards for the "you can reach out directly" fallback.
pub fn top_alternatives(doctors: &[Doctor]) -> Vec<DoctorSummary> {
    doctors
        .iter()
        .take(MAX_ALTERNATIVES)
        .map(DoctorSummary::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn doctor(name: &str, experience_years: i32, fee: f64, rating: f32) -> Doctor {
        Doctor {
            id: Uuid::new_v4(),
            name: name.to_string(),
            specialty: "Cardiologist".to_string(),
            city: "Delhi".to_string(),
            hospital: "City Care Hospital".to_string(),
            experience_years,
            fee,
            rating,
            working_days: vec!["Monday".to_string()],
        }
    }

    #[test]
    fn experienced_highly_rated_doctor_ranks_first() {
        let ranked = rank_doctors(vec![
            doctor("Dr. Junior", 2, 500.0, 3.5),
            doctor("Dr. Senior", 18, 900.0, 4.8),
        ]);

        assert_eq!(ranked[0].name, "Dr. Senior");
    }

    #[test]
    fn cheaper_doctor_wins_a_tie() {
        let ranked = rank_doctors(vec![
            doctor("Dr. Pricey", 10, 1200.0, 4.0),
            doctor("Dr. Affordable", 10, 600.0, 4.0),
        ]);

        assert_eq!(ranked[0].name, "Dr. Affordable");
    }

    #[test]
    fn experience_saturates_at_twenty_years() {
        let veteran = doctor("Dr. Veteran", 35, 800.0, 4.0);
        let senior = doctor("Dr. Senior", 20, 800.0, 4.0);

        let max_fee = 800.0;
        assert_eq!(rank_score(&veteran, max_fee), rank_score(&senior, max_fee));
    }

    #[test]
    fn alternatives_are_capped_at_three() {
        let ranked = rank_doctors(vec![
            doctor("A", 5, 500.0, 4.0),
            doctor("B", 6, 500.0, 4.0),
            doctor("C", 7, 500.0, 4.0),
            doctor("D", 8, 500.0, 4.0),
        ]);

        let alternatives = top_alternatives(&ranked);
        assert_eq!(alternatives.len(), 3);
        assert_eq!(alternatives[0].name, "D");
    }
}
