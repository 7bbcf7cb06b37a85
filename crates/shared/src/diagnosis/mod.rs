pub mod parser;
pub mod prompts;
pub mod service;

pub use parser::{ParseError, ParsedDiagnosis, parse_model_reply};
pub use prompts::{DIAGNOSIS_TEMPERATURE, SYSTEM_PROMPT, build_prompt, completion_request};
pub use service::{DiagnosisError, DiagnosisService};

pub const DISCLAIMER: &str = "IMPORTANT NOTICE: This tool is for information only and does NOT replace a professional medical diagnosis. Always consult a doctor. In an emergency, call your local emergency number (112 in Europe, 911 in North America) immediately.";
