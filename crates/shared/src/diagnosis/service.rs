use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use super::DISCLAIMER;
use super::parser::{ParseError, parse_model_reply};
use super::prompts::completion_request;
use crate::llm::{LlmGateway, LlmGatewayError};
use crate::models::{DiagnosisResult, PatientProfile};
use crate::sessions::{Clock, SessionStore, SystemClock};
use crate::triage::{EmergencyAssessment, classify};

/// Analysis failures after triage. Each variant keeps the emergency
/// assessment so callers can still log it when no diagnosis is returned.
#[derive(Debug, Error)]
pub enum DiagnosisError {
    #[error("diagnosis model credential is not configured")]
    ModelNotConfigured { emergency: EmergencyAssessment },
    #[error("diagnosis model call failed: {source}")]
    Upstream {
        #[source]
        source: LlmGatewayError,
        emergency: EmergencyAssessment,
    },
    #[error("diagnosis model reply could not be interpreted: {source}")]
    Analysis {
        #[source]
        source: ParseError,
        emergency: EmergencyAssessment,
    },
}

impl DiagnosisError {
    pub fn emergency(&self) -> &EmergencyAssessment {
        match self {
            Self::ModelNotConfigured { emergency }
            | Self::Upstream { emergency, .. }
            | Self::Analysis { emergency, .. } => emergency,
        }
    }
}

/// Runs one analysis: read the session, flag emergencies, ask the model,
/// interpret its reply. Analysis never writes to the session store and never
/// retries the model call.
#[derive(Clone)]
pub struct DiagnosisService {
    sessions: SessionStore,
    gateway: Option<Arc<dyn LlmGateway>>,
    clock: Arc<dyn Clock>,
}

impl DiagnosisService {
    /// `gateway` is `None` when the model credential was missing at startup;
    /// analyses that need the model then fail fast with
    /// [`DiagnosisError::ModelNotConfigured`].
    pub fn new(sessions: SessionStore, gateway: Option<Arc<dyn LlmGateway>>) -> Self {
        Self::with_clock(sessions, gateway, Arc::new(SystemClock))
    }

    pub fn with_clock(
        sessions: SessionStore,
        gateway: Option<Arc<dyn LlmGateway>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions,
            gateway,
            clock,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn is_model_configured(&self) -> bool {
        self.gateway.is_some()
    }

    pub async fn analyze(
        &self,
        session_id: &str,
        profile: &PatientProfile,
    ) -> Result<DiagnosisResult, DiagnosisError> {
        let symptoms = self.sessions.get_symptoms(session_id);

        if symptoms.is_empty() {
            return Ok(DiagnosisResult {
                session_id: session_id.to_string(),
                candidates: Vec::new(),
                is_emergency: false,
                emergency_reason: None,
                disclaimer: DISCLAIMER.to_string(),
                timestamp: self.clock.now(),
            });
        }

        let assessment = classify(&symptoms);
        if assessment.is_emergency {
            warn!(
                symptom_count = symptoms.len(),
                "emergency heuristic triggered for analysis"
            );
        }

        let Some(gateway) = self.gateway.as_ref() else {
            warn!("analysis requested but the diagnosis model is not configured");
            return Err(DiagnosisError::ModelNotConfigured {
                emergency: assessment,
            });
        };

        info!(symptom_count = symptoms.len(), "requesting model diagnosis");
        let raw_reply = match gateway.complete(completion_request(&symptoms, profile)).await {
            Ok(raw_reply) => raw_reply,
            Err(source) => {
                return Err(DiagnosisError::Upstream {
                    source,
                    emergency: assessment,
                });
            }
        };

        let parsed = match parse_model_reply(&raw_reply) {
            Ok(parsed) => parsed,
            Err(source) => {
                return Err(DiagnosisError::Analysis {
                    source,
                    emergency: assessment,
                });
            }
        };
        info!(
            candidate_count = parsed.candidates.len(),
            is_emergency = assessment.is_emergency,
            "model diagnosis completed"
        );

        Ok(DiagnosisResult {
            session_id: session_id.to_string(),
            candidates: parsed.candidates,
            is_emergency: assessment.is_emergency,
            emergency_reason: assessment.reason,
            disclaimer: DISCLAIMER.to_string(),
            timestamp: self.clock.now(),
        })
    }
}
