//! Response interpreter: turns raw model text into an `AnalysisResult`.
//!
//! Structured output is all-or-nothing: the text either parses and matches
//! the schema exactly, or the call fails with `MalformedResponse`. There is
//! no best-effort extraction of JSON from surrounding prose.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::analysis::error::AnalysisError;
use crate::analysis::models::StructuredOutput;
use crate::analysis::prompt::AnalysisMode;
use crate::analysis::schema::OutputSchema;
use crate::llm_client::GenerationResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisResult {
    FreeForm { text: String },
    Structured { fields: Map<String, Value> },
}

pub fn interpret(
    result: GenerationResult,
    mode: &AnalysisMode,
) -> Result<AnalysisResult, AnalysisError> {
    match mode {
        AnalysisMode::FreeForm => Ok(AnalysisResult::FreeForm {
            text: result.raw_text,
        }),
        AnalysisMode::Structured(schema) => {
            parse_structured(&result.raw_text, schema).map(|fields| AnalysisResult::Structured { fields })
        }
    }
}

/// Parses and validates `raw_text`, returning the top-level object.
pub fn parse_structured(
    raw_text: &str,
    schema: &OutputSchema,
) -> Result<Map<String, Value>, AnalysisError> {
    let malformed = |reason: String| AnalysisError::MalformedResponse {
        reason,
        raw_text: raw_text.to_string(),
    };

    let value: Value = serde_json::from_str(strip_json_fences(raw_text))
        .map_err(|e| malformed(format!("invalid JSON: {e}")))?;

    schema
        .validate(&value)
        .map_err(|violation| malformed(format!("schema mismatch at {violation}")))?;

    match value {
        Value::Object(fields) => Ok(fields),
        // validate() only passes objects
        other => Err(malformed(format!("expected a JSON object, found {other}"))),
    }
}

/// Parses `raw_text` against `T`'s schema and decodes it into `T`.
pub fn decode_structured<T: StructuredOutput>(raw_text: &str) -> Result<T, AnalysisError> {
    let fields = parse_structured(raw_text, &T::schema())?;
    serde_json::from_value(Value::Object(fields)).map_err(|e| AnalysisError::MalformedResponse {
        reason: format!("record decoding failed: {e}"),
        raw_text: raw_text.to_string(),
    })
}

/// Strips a ```json ... ``` or ``` ... ``` fence that wraps the whole text.
/// Anything else is returned trimmed and otherwise untouched.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"));

    match inner {
        Some(inner) => inner.trim(),
        None => text,
    }
}
