use crate::models::SymptomReport;

/// Lower-case phrases that mark a symptom as an emergency when they appear
/// anywhere in its name.
pub const EMERGENCY_KEYWORDS: [&str; 20] = [
    "chest pain",
    "severe chest pain",
    "difficulty breathing",
    "shortness of breath",
    "severe dyspnea",
    "loss of consciousness",
    "unconscious",
    "confusion",
    "severe bleeding",
    "heavy bleeding",
    "severe abdominal pain",
    "sudden severe headache",
    "paralysis",
    "weakness in limbs",
    "seizure",
    "convulsion",
    "stroke symptoms",
    "heart attack",
    "anaphylaxis",
    "severe allergic reaction",
];

pub const CRITICAL_INTENSITY: u8 = 9;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmergencyAssessment {
    pub is_emergency: bool,
    pub reason: Option<String>,
}

impl EmergencyAssessment {
    fn flagged(reason: String) -> Self {
        Self {
            is_emergency: true,
            reason: Some(reason),
        }
    }
}

/// Scans symptoms in order; for each one the keyword table is checked before
/// the intensity threshold, and the first hit decides the outcome.
pub fn classify(symptoms: &[SymptomReport]) -> EmergencyAssessment {
    for symptom in symptoms {
        let lowered = symptom.name.to_lowercase();

        if EMERGENCY_KEYWORDS
            .iter()
            .any(|keyword| lowered.contains(keyword))
        {
            return EmergencyAssessment::flagged(format!(
                "Critical symptom detected: {}",
                symptom.name
            ));
        }

        if let Some(intensity) = symptom.intensity
            && intensity.value() >= CRITICAL_INTENSITY
        {
            return EmergencyAssessment::flagged(format!(
                "Critical intensity ({intensity}/10) for: {}",
                symptom.name
            ));
        }
    }

    EmergencyAssessment::default()
}

#[cfg(test)]
mod tests {
    use super::{EmergencyAssessment, classify};
    use crate::models::SymptomReport;

    #[test]
    fn keyword_match_wins_even_with_low_intensity() {
        let assessment = classify(&[
            SymptomReport::named("Headache")
                .with_duration_days(2)
                .with_intensity(3),
            SymptomReport::named("chest pain")
                .with_duration_days(1)
                .with_intensity(4),
        ]);

        assert!(assessment.is_emergency);
        assert_eq!(
            assessment.reason.as_deref(),
            Some("Critical symptom detected: chest pain")
        );
    }

    #[test]
    fn keyword_match_is_case_insensitive_substring() {
        let assessment = classify(&[SymptomReport::named("Sudden SEIZURE at night")]);

        assert_eq!(
            assessment.reason.as_deref(),
            Some("Critical symptom detected: Sudden SEIZURE at night")
        );
    }

    #[test]
    fn intensity_nine_is_critical() {
        let assessment = classify(&[SymptomReport::named("Headache").with_intensity(9)]);

        assert!(assessment.is_emergency);
        assert_eq!(
            assessment.reason.as_deref(),
            Some("Critical intensity (9/10) for: Headache")
        );
    }

    #[test]
    fn intensity_eight_is_not_critical() {
        let assessment = classify(&[SymptomReport::named("Headache").with_intensity(8)]);

        assert_eq!(assessment, EmergencyAssessment::default());
    }

    #[test]
    fn earlier_high_intensity_is_found_before_later_keyword() {
        let assessment = classify(&[
            SymptomReport::named("Back pain").with_intensity(10),
            SymptomReport::named("Chest pain"),
        ]);

        assert_eq!(
            assessment.reason.as_deref(),
            Some("Critical intensity (10/10) for: Back pain")
        );
    }

    #[test]
    fn empty_list_is_not_an_emergency() {
        assert!(!classify(&[]).is_emergency);
    }
}
