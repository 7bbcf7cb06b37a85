use crate::llm::CompletionRequest;
use crate::models::{PatientProfile, SymptomReport};

pub const SYSTEM_PROMPT: &str = "You are a medical assistant that replies only with strict JSON.";
pub const DIAGNOSIS_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_PATIENT_AGE: u32 = 30;

const REPLY_INSTRUCTION: &str = r#"Find 3 probable diagnoses.
Reply ONLY with JSON in this format:
{
  "diseases": [
    {
      "name": "Disease name",
      "probability": 75,
      "description": "Short description",
      "treatments": ["Treatment 1", "Treatment 2"],
      "whenToSeeDoctorUrgently": ["Warning sign 1", "Warning sign 2"]
    }
  ]
}
"probability" is an integer from 0 to 100."#;

pub fn build_prompt(symptoms: &[SymptomReport], profile: &PatientProfile) -> String {
    let mut prompt = patient_clause(profile);

    if !profile.medical_history.is_empty() {
        prompt.push_str("\nMedical history: ");
        prompt.push_str(&profile.medical_history.join(", "));
    }

    if !profile.allergies.is_empty() {
        prompt.push_str("\nKnown allergies: ");
        prompt.push_str(&profile.allergies.join(", "));
    }

    prompt.push_str("\nDetailed symptoms: ");
    prompt.push_str(&symptom_details(symptoms));
    prompt.push_str(".\n");
    prompt.push_str(REPLY_INSTRUCTION);
    prompt
}

pub fn completion_request(symptoms: &[SymptomReport], profile: &PatientProfile) -> CompletionRequest {
    CompletionRequest {
        system_prompt: SYSTEM_PROMPT.to_string(),
        user_prompt: build_prompt(symptoms, profile),
        temperature: DIAGNOSIS_TEMPERATURE,
    }
}

fn patient_clause(profile: &PatientProfile) -> String {
    let mut clause = format!(
        "Patient: {} years old",
        profile
            .age
            .filter(|age| *age > 0)
            .unwrap_or(DEFAULT_PATIENT_AGE)
    );

    if let Some(sex) = profile.sex {
        clause.push_str(", ");
        clause.push_str(sex.descriptor());
    }

    if let (Some(weight), Some(height)) = (profile.weight_kg, profile.height_cm) {
        clause.push_str(&format!(", {weight}kg, {height}cm"));
        if let Some(bmi) = profile.bmi() {
            clause.push_str(&format!(", BMI: {bmi}"));
        }
    }

    clause
}

fn symptom_details(symptoms: &[SymptomReport]) -> String {
    symptoms
        .iter()
        .map(|symptom| {
            let mut detail = symptom.name.clone();
            if let Some(days) = symptom.duration_days {
                detail.push_str(&format!(" (for {days} days)"));
            }
            if let Some(intensity) = symptom.intensity {
                detail.push_str(&format!(" [intensity: {intensity}/10]"));
            }
            detail
        })
        .collect::<Vec<_>>()
        .join(", ")
}
