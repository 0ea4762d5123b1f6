//! Analysis pipeline: orchestrates one request/response round trip.
//!
//! Flow: build_instruction → GenerationClient::generate → interpret.
//! Each call moves Building → Sending → Interpreting → Succeeded | Failed
//! and never re-enters an earlier stage. Nothing is shared between calls
//! except the read-only client.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::error::AnalysisError;
use crate::analysis::interpreter::{decode_structured, interpret, AnalysisResult};
use crate::analysis::models::{CareerInsights, ResumeFeedback, StructuredOutput};
use crate::analysis::prompt::{build_instruction, AnalysisMode, AnalysisRequest};
use crate::analysis::prompts::{
    CAREER_INSIGHTS_PROMPT, GENERAL_ANALYSIS_PROMPT, LEARNING_CONTENT_PROMPT,
    RESUME_FEEDBACK_PROMPT, RESUME_SUMMARY_PROMPT,
};
use crate::llm_client::{GenerationClient, GenerationResult, SamplingConfig};

/// Entry point for every analysis operation. Cheap to clone.
#[derive(Clone)]
pub struct Analyzer {
    client: GenerationClient,
}

impl Analyzer {
    pub fn new(client: GenerationClient) -> Self {
        Self { client }
    }

    /// Analyzes arbitrary text. `mode` decides whether the answer comes back
    /// verbatim or as fields validated against the supplied schema.
    pub async fn perform_analysis(
        &self,
        subject_text: &str,
        mode: AnalysisMode,
    ) -> Result<AnalysisResult, AnalysisError> {
        let request = AnalysisRequest::new(subject_text, GENERAL_ANALYSIS_PROMPT, mode);
        self.perform("general_analysis", &request, &SamplingConfig::PRECISE)
            .await
    }

    /// Scored resume review with section feedback and suggested roles.
    pub async fn analyze_resume(&self, resume_text: &str) -> Result<ResumeFeedback, AnalysisError> {
        self.run_structured("resume_feedback", resume_text, RESUME_FEEDBACK_PROMPT)
            .await
    }

    /// Skills, job matches and learning paths for the advisor chat.
    pub async fn analyze_resume_for_chat(
        &self,
        resume_text: &str,
    ) -> Result<CareerInsights, AnalysisError> {
        self.run_structured("career_insights", resume_text, CAREER_INSIGHTS_PROMPT)
            .await
    }

    /// Prose summary of a resume for the chat view.
    pub async fn summarize_resume_for_chat(&self, resume_text: &str) -> Result<String, AnalysisError> {
        self.run_free_form(
            "resume_summary",
            resume_text,
            RESUME_SUMMARY_PROMPT,
            &SamplingConfig::PRECISE,
        )
        .await
    }

    /// Learning guide for one skill. Uses the higher-variance sampling preset.
    pub async fn generate_learning_content(&self, skill: &str) -> Result<String, AnalysisError> {
        self.run_free_form(
            "learning_content",
            skill,
            LEARNING_CONTENT_PROMPT,
            &SamplingConfig::CREATIVE,
        )
        .await
    }

    async fn perform(
        &self,
        operation: &'static str,
        request: &AnalysisRequest,
        sampling: &SamplingConfig,
    ) -> Result<AnalysisResult, AnalysisError> {
        let call_id = Uuid::new_v4();
        let outcome = match self.build_and_send(call_id, operation, request, sampling).await {
            Ok(raw) => {
                debug!(%call_id, operation, "stage=interpreting");
                interpret(raw, &request.mode)
            }
            Err(e) => Err(e),
        };
        log_outcome(call_id, operation, &outcome);
        outcome
    }

    async fn run_structured<T: StructuredOutput>(
        &self,
        operation: &'static str,
        subject_text: &str,
        intent: &str,
    ) -> Result<T, AnalysisError> {
        let call_id = Uuid::new_v4();
        let request = AnalysisRequest::new(subject_text, intent, AnalysisMode::Structured(T::schema()));
        let outcome = match self
            .build_and_send(call_id, operation, &request, &SamplingConfig::PRECISE)
            .await
        {
            Ok(raw) => {
                debug!(%call_id, operation, "stage=interpreting");
                decode_structured::<T>(&raw.raw_text)
            }
            Err(e) => Err(e),
        };
        log_outcome(call_id, operation, &outcome);
        outcome
    }

    async fn run_free_form(
        &self,
        operation: &'static str,
        subject_text: &str,
        intent: &str,
        sampling: &SamplingConfig,
    ) -> Result<String, AnalysisError> {
        let call_id = Uuid::new_v4();
        let request = AnalysisRequest::new(subject_text, intent, AnalysisMode::FreeForm);
        let outcome = self
            .build_and_send(call_id, operation, &request, sampling)
            .await
            .map(|raw| raw.raw_text);
        log_outcome(call_id, operation, &outcome);
        outcome
    }

    async fn build_and_send(
        &self,
        call_id: Uuid,
        operation: &'static str,
        request: &AnalysisRequest,
        sampling: &SamplingConfig,
    ) -> Result<GenerationResult, AnalysisError> {
        let schema_fields = match &request.mode {
            AnalysisMode::Structured(schema) => schema.field_names().len(),
            AnalysisMode::FreeForm => 0,
        };
        debug!(%call_id, operation, schema_fields, "stage=building");
        let instruction = build_instruction(request)?;

        debug!(%call_id, operation, chars = instruction.len(), "stage=sending");
        let raw = self
            .client
            .generate(&instruction, sampling, request.mode.response_format())
            .await?;
        Ok(raw)
    }
}

fn log_outcome<T>(call_id: Uuid, operation: &'static str, outcome: &Result<T, AnalysisError>) {
    match outcome {
        Ok(_) => info!(%call_id, operation, "Analysis succeeded"),
        Err(AnalysisError::MalformedResponse { reason, raw_text }) => warn!(
            %call_id,
            operation,
            kind = "malformed_response",
            raw_chars = raw_text.len(),
            "Analysis failed: {reason}"
        ),
        Err(e) => warn!(%call_id, operation, kind = e.kind(), "Analysis failed: {e}"),
    }
}
