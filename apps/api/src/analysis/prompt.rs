//! Prompt builder: turns a subject text, an intent template and a mode
//! into the exact instruction string sent to the model.

use crate::analysis::error::AnalysisError;
use crate::analysis::schema::OutputSchema;
use crate::llm_client::prompts::STRUCTURED_OUTPUT_TEMPLATE;
use crate::llm_client::ResponseFormat;

/// Placeholder every intent template must contain.
pub const SUBJECT_PLACEHOLDER: &str = "{subject}";

/// How the model's answer will be consumed.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisMode {
    /// Returned verbatim.
    FreeForm,
    /// Parsed as JSON and validated against the schema.
    Structured(OutputSchema),
}

impl AnalysisMode {
    pub fn response_format(&self) -> ResponseFormat {
        match self {
            AnalysisMode::FreeForm => ResponseFormat::Text,
            AnalysisMode::Structured(_) => ResponseFormat::Json,
        }
    }
}

/// One analysis call's input. Built per call and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub subject_text: String,
    pub intent: String,
    pub mode: AnalysisMode,
}

impl AnalysisRequest {
    pub fn new(subject_text: &str, intent: &str, mode: AnalysisMode) -> Self {
        Self {
            subject_text: subject_text.to_string(),
            intent: intent.to_string(),
            mode,
        }
    }
}

/// Builds the instruction for `request`.
///
/// The subject is substituted as given (only emptiness is judged on the
/// trimmed text). Structured requests get the literal schema and the
/// JSON-only rules appended. Pure: equal requests give equal instructions.
pub fn build_instruction(request: &AnalysisRequest) -> Result<String, AnalysisError> {
    if request.subject_text.trim().is_empty() {
        return Err(AnalysisError::InvalidInput(
            "subject text cannot be empty".to_string(),
        ));
    }

    if !request.intent.contains(SUBJECT_PLACEHOLDER) {
        return Err(AnalysisError::InvalidInput(format!(
            "intent template has no {SUBJECT_PLACEHOLDER} placeholder"
        )));
    }

    let mut instruction = request
        .intent
        .replace(SUBJECT_PLACEHOLDER, &request.subject_text);

    if let AnalysisMode::Structured(schema) = &request.mode {
        if schema.fields.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "structured output schema declares no fields".to_string(),
            ));
        }
        instruction.push_str("\n\n");
        instruction.push_str(&STRUCTURED_OUTPUT_TEMPLATE.replace("{schema}", &schema.describe()));
    }

    Ok(instruction)
}
