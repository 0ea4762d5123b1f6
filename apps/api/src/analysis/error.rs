use thiserror::Error;

use crate::llm_client::LlmError;

/// Failure kinds of an analysis call. Each kind calls for a different
/// remedy, so callers branch on the variant rather than the message.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Empty or unusable input. The user should be asked again.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The credential is missing. Fatal to the call, no request was sent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The endpoint could not be reached or answered with a failure status.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The endpoint refused to produce usable content.
    #[error("Upstream rejected the request: {0}")]
    UpstreamRejected(String),

    /// The endpoint answered, but the text does not match the declared schema.
    #[error("Malformed model response: {reason}")]
    MalformedResponse { reason: String, raw_text: String },
}

impl AnalysisError {
    /// Stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::InvalidInput(_) => "invalid_input",
            AnalysisError::Configuration(_) => "configuration",
            AnalysisError::UpstreamUnavailable(_) => "upstream_unavailable",
            AnalysisError::UpstreamRejected(_) => "upstream_rejected",
            AnalysisError::MalformedResponse { .. } => "malformed_response",
        }
    }
}

impl From<LlmError> for AnalysisError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::MissingCredential => AnalysisError::Configuration(err.to_string()),
            LlmError::InvalidRequest(msg) => AnalysisError::InvalidInput(msg),
            LlmError::Transport(_) | LlmError::Api { .. } | LlmError::Envelope(_) => {
                AnalysisError::UpstreamUnavailable(err.to_string())
            }
            LlmError::Rejected(reason) => AnalysisError::UpstreamRejected(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_errors_map_to_matching_kinds() {
        let cases = [
            (LlmError::MissingCredential, "configuration"),
            (LlmError::InvalidRequest("bad".into()), "invalid_input"),
            (LlmError::Transport("reset".into()), "upstream_unavailable"),
            (
                LlmError::Api {
                    status: 503,
                    message: "down".into(),
                },
                "upstream_unavailable",
            ),
            (LlmError::Rejected("SAFETY".into()), "upstream_rejected"),
        ];
        for (llm_error, kind) in cases {
            assert_eq!(AnalysisError::from(llm_error).kind(), kind);
        }
    }

    #[test]
    fn test_malformed_display_omits_raw_text() {
        let err = AnalysisError::MalformedResponse {
            reason: "expected value at line 1 column 1".into(),
            raw_text: "Sorry, I cannot help with that.".into(),
        };
        let message = err.to_string();
        assert!(message.contains("expected value"));
        assert!(!message.contains("Sorry"));
    }
}
