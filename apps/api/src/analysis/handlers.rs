//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::analysis::document::extract_resume_text;
use crate::analysis::interpreter::AnalysisResult;
use crate::analysis::models::{CareerInsights, ResumeFeedback};
use crate::analysis::prompt::AnalysisMode;
use crate::analysis::schema::OutputSchema;
use crate::errors::AppError;
use crate::state::AppState;

/// Multipart field carrying the uploaded resume.
const RESUME_FIELD: &str = "resume";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub subject_text: String,
    /// Present → structured mode validated against this schema.
    #[serde(default)]
    pub schema: Option<OutputSchema>,
}

#[derive(Debug, Deserialize)]
pub struct ResumeTextRequest {
    pub resume_text: String,
}

#[derive(Debug, Serialize)]
pub struct ResumeFeedbackResponse {
    pub feedback: ResumeFeedback,
}

#[derive(Debug, Serialize)]
pub struct CareerInsightsResponse {
    pub insights: CareerInsights,
}

#[derive(Debug, Serialize)]
pub struct ResumeSummaryResponse {
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct LearningContentRequest {
    pub skill: String,
}

#[derive(Debug, Serialize)]
pub struct LearningContentResponse {
    pub skill: String,
    pub content: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analysis
///
/// General analysis. Free-form unless the body carries a `schema`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResult>, AppError> {
    let mode = match request.schema {
        Some(schema) => AnalysisMode::Structured(schema),
        None => AnalysisMode::FreeForm,
    };
    let result = state
        .analyzer
        .perform_analysis(&request.subject_text, mode)
        .await?;
    Ok(Json(result))
}

/// POST /api/v1/analysis/resume
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    Json(request): Json<ResumeTextRequest>,
) -> Result<Json<ResumeFeedbackResponse>, AppError> {
    let feedback = state.analyzer.analyze_resume(&request.resume_text).await?;
    Ok(Json(ResumeFeedbackResponse { feedback }))
}

/// POST /api/v1/analysis/resume/upload
///
/// Accepts a multipart form with a `resume` file (PDF or plain text),
/// extracts its text and runs the resume review on it.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ResumeFeedbackResponse>, AppError> {
    let resume_text = read_resume_upload(multipart).await?;
    let feedback = analyze_uploaded(&state.analyzer, &resume_text).await?;
    Ok(Json(ResumeFeedbackResponse { feedback }))
}

/// POST /api/v1/analysis/resume/chat
pub async fn handle_analyze_resume_for_chat(
    State(state): State<AppState>,
    Json(request): Json<ResumeTextRequest>,
) -> Result<Json<CareerInsightsResponse>, AppError> {
    let insights = state
        .analyzer
        .analyze_resume_for_chat(&request.resume_text)
        .await?;
    Ok(Json(CareerInsightsResponse { insights }))
}

/// POST /api/v1/analysis/resume/summary
pub async fn handle_summarize_resume(
    State(state): State<AppState>,
    Json(request): Json<ResumeTextRequest>,
) -> Result<Json<ResumeSummaryResponse>, AppError> {
    let summary = state
        .analyzer
        .summarize_resume_for_chat(&request.resume_text)
        .await?;
    Ok(Json(ResumeSummaryResponse { summary }))
}

/// POST /api/v1/learning/content
pub async fn handle_learning_content(
    State(state): State<AppState>,
    Json(request): Json<LearningContentRequest>,
) -> Result<Json<LearningContentResponse>, AppError> {
    let content = state
        .analyzer
        .generate_learning_content(&request.skill)
        .await?;
    Ok(Json(LearningContentResponse {
        skill: request.skill,
        content,
    }))
}

async fn read_resume_upload(mut multipart: Multipart) -> Result<String, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("could not read upload: {e}")))?;

        return extract_resume_text(file_name.as_deref(), content_type.as_deref(), data).await;
    }

    Err(AppError::Validation(format!(
        "multipart body has no '{RESUME_FIELD}' field"
    )))
}

async fn analyze_uploaded(analyzer: &Analyzer, resume_text: &str) -> Result<ResumeFeedback, AppError> {
    if resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "no text could be extracted from the uploaded resume".to_string(),
        ));
    }
    Ok(analyzer.analyze_resume(resume_text).await?)
}
