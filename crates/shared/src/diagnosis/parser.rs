use std::sync::LazyLock;

use jsonschema::JSONSchema;
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::DiagnosisCandidate;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("model reply does not contain a json object")]
    MissingJsonObject,
    #[error("model reply is not valid json: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("model reply has no diseases list")]
    MissingDiseases,
    #[error("diagnosis schema failed to compile: {0}")]
    SchemaCompile(String),
    #[error("model reply failed schema validation: {0:?}")]
    SchemaViolation(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDiagnosis {
    pub candidates: Vec<DiagnosisCandidate>,
}

/// Shape the model is asked to produce. Only `name` is mandatory per entry;
/// the model routinely drops the descriptive fields or sends them as `null`.
#[derive(Debug, Deserialize, JsonSchema)]
struct ModelDiagnosisReply {
    diseases: Vec<ModelDisease>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ModelDisease {
    name: String,
    #[serde(default)]
    probability: Option<f64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    treatments: Option<Vec<String>>,
    #[serde(default)]
    when_to_see_doctor_urgently: Option<Vec<String>>,
}

static REPLY_VALIDATOR: LazyLock<Result<JSONSchema, String>> = LazyLock::new(|| {
    let schema = serde_json::to_value(schema_for!(ModelDiagnosisReply))
        .map_err(|err| err.to_string())?;
    JSONSchema::compile(&schema).map_err(|err| err.to_string())
});

/// Extracts the JSON object embedded in a free-form model reply.
///
/// Everything outside the first `{` and the last `}` is discarded, so prose
/// and markdown fences around the payload are tolerated. Candidates keep the
/// model's order and are ranked by position, never by probability.
pub fn parse_model_reply(raw: &str) -> Result<ParsedDiagnosis, ParseError> {
    let payload: Value = serde_json::from_str(extract_json_object(raw)?)?;

    if !payload.get("diseases").is_some_and(Value::is_array) {
        return Err(ParseError::MissingDiseases);
    }

    let validator = REPLY_VALIDATOR
        .as_ref()
        .map_err(|message| ParseError::SchemaCompile(message.clone()))?;
    if let Err(validation_errors) = validator.validate(&payload) {
        let errors = validation_errors
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        return Err(ParseError::SchemaViolation(errors));
    }

    let reply: ModelDiagnosisReply = serde_json::from_value(payload)?;

    let candidates = reply
        .diseases
        .into_iter()
        .enumerate()
        .map(|(index, disease)| {
            let name = disease.name.trim();
            if name.is_empty() {
                return Err(ParseError::SchemaViolation(vec![format!(
                    "diseases[{index}].name is empty"
                )]));
            }

            Ok(DiagnosisCandidate {
                name: name.to_string(),
                probability: clamp_probability(disease.probability),
                rank: u32::try_from(index + 1).unwrap_or(u32::MAX),
                description: disease.description.unwrap_or_default(),
                treatments: disease.treatments.unwrap_or_default(),
                when_to_see_doctor_urgently: disease.when_to_see_doctor_urgently.unwrap_or_default(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ParsedDiagnosis { candidates })
}

fn extract_json_object(raw: &str) -> Result<&str, ParseError> {
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&raw[start..=end]),
        _ => Err(ParseError::MissingJsonObject),
    }
}

fn clamp_probability(raw: Option<f64>) -> u8 {
    raw.map(|value| value.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(0)
}
