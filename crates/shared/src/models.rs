use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

pub const MIN_INTENSITY: u8 = 1;
pub const MAX_INTENSITY: u8 = 10;

/// Opaque, unguessable identifier of a symptom session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Patient-reported intensity on the 1..=10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Intensity(u8);

impl Intensity {
    pub fn new(value: i64) -> Option<Self> {
        if (i64::from(MIN_INTENSITY)..=i64::from(MAX_INTENSITY)).contains(&value) {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Intensity {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(i64::from(value))
            .ok_or_else(|| format!("intensity must be between {MIN_INTENSITY} and {MAX_INTENSITY}"))
    }
}

impl From<Intensity> for u8 {
    fn from(value: Intensity) -> Self {
        value.0
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Durations are elapsed days as reported by the patient; zero or negative
/// values carry no information and are treated as absent.
pub fn normalize_duration_days(raw: i64) -> Option<u32> {
    if raw <= 0 {
        return None;
    }
    u32::try_from(raw).ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomReport {
    pub name: String,
    #[serde(rename = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<Intensity>,
}

impl SymptomReport {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            duration_days: None,
            intensity: None,
        }
    }

    pub fn with_duration_days(mut self, days: u32) -> Self {
        self.duration_days = normalize_duration_days(i64::from(days));
        self
    }

    pub fn with_intensity(mut self, intensity: u8) -> Self {
        self.intensity = Intensity::new(i64::from(intensity));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    Other,
}

impl Sex {
    /// Lenient parse of the client-supplied value; unknown labels mean
    /// "unspecified".
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Some(Self::Male),
            "female" | "f" => Some(Self::Female),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn descriptor(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientProfile {
    pub age: Option<u32>,
    pub sex: Option<Sex>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub medical_history: Vec<String>,
    pub allergies: Vec<String>,
}

impl PatientProfile {
    /// Body-mass index rounded to one decimal, available only when both
    /// weight and height are known.
    pub fn bmi(&self) -> Option<f64> {
        let (weight, height) = (self.weight_kg?, self.height_cm?);
        if weight <= 0.0 || height <= 0.0 {
            return None;
        }
        let height_m = height / 100.0;
        Some((weight / (height_m * height_m) * 10.0).round() / 10.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisCandidate {
    pub name: String,
    pub probability: u8,
    pub rank: u32,
    pub description: String,
    pub treatments: Vec<String>,
    pub when_to_see_doctor_urgently: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisResult {
    pub session_id: String,
    #[serde(rename = "enrichedDiseases")]
    pub candidates: Vec<DiagnosisCandidate>,
    pub is_emergency: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_reason: Option<String>,
    pub disclaimer: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitSessionResponse {
    pub session_id: String,
    pub status: String,
}

/// Inbound bodies are read loosely: `null`, numeric strings and wrong types
/// never reject the request. Unusable values are treated as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSymptomRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub symptom: Option<String>,
    #[serde(default)]
    pub duration: Option<Value>,
    #[serde(default)]
    pub intensity: Option<Value>,
}

impl AddSymptomRequest {
    pub fn session_id(&self) -> &str {
        self.session_id.as_deref().unwrap_or_default()
    }

    pub fn symptom(&self) -> &str {
        self.symptom.as_deref().unwrap_or_default()
    }

    pub fn duration_days(&self) -> Option<u32> {
        lenient_field("duration", self.duration.as_ref(), |raw| {
            lenient_integer(raw).and_then(normalize_duration_days)
        })
    }

    pub fn intensity(&self) -> Option<Intensity> {
        lenient_field("intensity", self.intensity.as_ref(), |raw| {
            lenient_integer(raw).and_then(Intensity::new)
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveSymptomRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub symptom: Option<String>,
}

impl RemoveSymptomRequest {
    pub fn session_id(&self) -> &str {
        self.session_id.as_deref().unwrap_or_default()
    }

    pub fn symptom(&self) -> &str {
        self.symptom.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub age: Option<Value>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub weight: Option<Value>,
    #[serde(default)]
    pub height: Option<Value>,
    #[serde(default)]
    pub medical_history: Option<Value>,
    #[serde(default)]
    pub allergies: Option<Value>,
}

impl AnalyzeRequest {
    pub fn session_id(&self) -> &str {
        self.session_id.as_deref().unwrap_or_default()
    }

    pub fn patient_profile(&self) -> PatientProfile {
        PatientProfile {
            age: lenient_field("age", self.age.as_ref(), |raw| {
                lenient_integer(raw)
                    .and_then(|age| u32::try_from(age).ok())
                    .filter(|age| *age > 0)
            }),
            sex: self.gender.as_deref().and_then(Sex::parse),
            weight_kg: lenient_field("weight", self.weight.as_ref(), positive_number),
            height_cm: lenient_field("height", self.height.as_ref(), positive_number),
            medical_history: lenient_labels(self.medical_history.as_ref()),
            allergies: lenient_labels(self.allergies.as_ref()),
        }
    }
}

/// Integer sent as a JSON number or a numeric string. Fractional values are
/// rejected rather than rounded.
pub fn lenient_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|value| value.fract() == 0.0 && value.abs() <= MAX_EXACT_FLOAT_INTEGER)
                .map(|value| value as i64)
        }),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

pub fn lenient_number(raw: &Value) -> Option<f64> {
    let value = match raw {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|value| value.is_finite())
}

const MAX_EXACT_FLOAT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn positive_number(raw: &Value) -> Option<f64> {
    lenient_number(raw).filter(|value| *value > 0.0)
}

fn lenient_field<T>(
    field: &'static str,
    raw: Option<&Value>,
    read: impl FnOnce(&Value) -> Option<T>,
) -> Option<T> {
    let raw = raw?;
    let value = read(raw);
    if value.is_none() {
        warn!(field, value = %raw, "ignoring unusable request field");
    }
    value
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSymptomsResponse {
    pub session_id: String,
    pub symptoms: Vec<SymptomReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSymptom {
    pub id: String,
    pub name: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomSearchResponse {
    pub symptoms: Vec<CatalogSymptom>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub model_configured: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// A list of labels, or a single label sent as a bare string. Non-string
/// items and blank labels are skipped.
fn lenient_labels(raw: Option<&Value>) -> Vec<String> {
    let labels = match raw {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        Some(Value::String(label)) => vec![label.as_str()],
        _ => Vec::new(),
    };

    labels
        .into_iter()
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(ToString::to_string)
        .collect()
}
