/// Risk labels from report analysis mapped to the specialist who handles them.
/// Matching is case-insensitive and substring-based, so "Type 2 Diabetes"
/// resolves the same way "diabetes" does.
const RISK_SPECIALTIES: &[(&str, &str)] = &[
    ("diabetes", "Endocrinologist"),
    ("blood sugar", "Endocrinologist"),
    ("thyroid", "Endocrinologist"),
    ("heart", "Cardiologist"),
    ("cardiac", "Cardiologist"),
    ("hypertension", "Cardiologist"),
    ("blood pressure", "Cardiologist"),
    ("cholesterol", "Cardiologist"),
    ("liver", "Hepatologist"),
    ("kidney", "Nephrologist"),
    ("renal", "Nephrologist"),
    ("anemia", "Hematologist"),
    ("obesity", "Dietitian"),
    ("asthma", "Pulmonologist"),
    ("respiratory", "Pulmonologist"),
];

/// Picks the specialty for the first risk label that maps to one.
pub fn specialty_for_risks(risks: &[String]) -> Option<String> {
    for risk in risks {
        let risk_lower = risk.to_lowercase();
        for (keyword, specialty) in RISK_SPECIALTIES {
            if risk_lower.contains(keyword) {
                return Some(specialty.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn risks(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn maps_known_risks() {
        assert_eq!(
            specialty_for_risks(&risks(&["Diabetes"])),
            Some("Endocrinologist".to_string())
        );
        assert_eq!(
            specialty_for_risks(&risks(&["High Blood Pressure"])),
            Some("Cardiologist".to_string())
        );
        assert_eq!(
            specialty_for_risks(&risks(&["Fatty Liver Disease"])),
            Some("Hepatologist".to_string())
        );
    }

    #[test]
    fn first_mapped_risk_wins() {
        assert_eq!(
            specialty_for_risks(&risks(&["Chronic Kidney Disease", "Diabetes"])),
            Some("Nephrologist".to_string())
        );
    }

    #[test]
    fn skips_unmapped_labels() {
        assert_eq!(
            specialty_for_risks(&risks(&["Sore Throat", "Anemia"])),
            Some("Hematologist".to_string())
        );
    }

    #[test]
    fn unknown_risks_map_to_none() {
        assert_eq!(specialty_for_risks(&risks(&["Sore Throat"])), None);
        assert_eq!(specialty_for_risks(&[]), None);
    }
}
