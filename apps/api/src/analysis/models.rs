//! Typed records for the structured analysis operations.
//!
//! Each record declares its `OutputSchema` next to its serde shape. The
//! schema is what the model is told and what the interpreter enforces; the
//! serde derive must accept exactly the same document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::analysis::schema::{Field, OutputSchema, SchemaNode};

/// A record produced by a structured analysis operation.
pub trait StructuredOutput: DeserializeOwned {
    fn schema() -> OutputSchema;
}

fn present_missing() -> SchemaNode {
    SchemaNode::object(vec![
        Field::new("present", SchemaNode::strings()),
        Field::new("missing", SchemaNode::strings()),
    ])
}

fn percentage() -> SchemaNode {
    SchemaNode::bounded(0.0, 100.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Resume feedback
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeywordCoverage {
    pub present: Vec<String>,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionFeedback {
    pub summary: String,
    pub experience: String,
    pub education: String,
    pub skills: String,
    pub projects: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuggestedJob {
    pub title: String,
    /// 0 – 100
    #[serde(rename = "match")]
    pub match_score: f64,
}

/// Full resume review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResumeFeedback {
    /// 0 – 100
    pub score: f64,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub keywords: KeywordCoverage,
    pub section_feedback: SectionFeedback,
    pub suggested_jobs: Vec<SuggestedJob>,
}

impl StructuredOutput for ResumeFeedback {
    fn schema() -> OutputSchema {
        OutputSchema::new(vec![
            Field::new("score", percentage()),
            Field::new("strengths", SchemaNode::strings()),
            Field::new("improvements", SchemaNode::strings()),
            Field::new("keywords", present_missing()),
            Field::new(
                "sectionFeedback",
                SchemaNode::object(vec![
                    Field::new("summary", SchemaNode::String),
                    Field::new("experience", SchemaNode::String),
                    Field::new("education", SchemaNode::String),
                    Field::new("skills", SchemaNode::String),
                    Field::new("projects", SchemaNode::String),
                ]),
            ),
            Field::new(
                "suggestedJobs",
                SchemaNode::array_of(SchemaNode::object(vec![
                    Field::new("title", SchemaNode::String),
                    Field::new("match", percentage()),
                ])),
            ),
        ])
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Career insights (chat)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkillInventory {
    pub present: Vec<String>,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobMatch {
    pub id: String,
    pub title: String,
    pub company: String,
    /// 0 – 100
    #[serde(rename = "match")]
    pub match_score: f64,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LearningPath {
    pub skill: String,
    pub resources: Vec<String>,
}

/// Skills, job matches and learning paths extracted for the advisor chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CareerInsights {
    pub skills: SkillInventory,
    pub job_matches: Vec<JobMatch>,
    pub career_advice: String,
    pub learning_paths: Vec<LearningPath>,
}

impl StructuredOutput for CareerInsights {
    fn schema() -> OutputSchema {
        OutputSchema::new(vec![
            Field::new("skills", present_missing()),
            Field::new(
                "jobMatches",
                SchemaNode::array_of(SchemaNode::object(vec![
                    Field::new("id", SchemaNode::String),
                    Field::new("title", SchemaNode::String),
                    Field::new("company", SchemaNode::String),
                    Field::new("match", percentage()),
                    Field::new("reasons", SchemaNode::strings()),
                ])),
            ),
            Field::new("careerAdvice", SchemaNode::String),
            Field::new(
                "learningPaths",
                SchemaNode::array_of(SchemaNode::object(vec![
                    Field::new("skill", SchemaNode::String),
                    Field::new("resources", SchemaNode::strings()),
                ])),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::prompts::RESUME_FEEDBACK_PROMPT;
    use serde_json::json;

    fn insights_json() -> serde_json::Value {
        json!({
            "skills": {"present": ["React", "JavaScript"], "missing": ["TypeScript"]},
            "jobMatches": [{
                "id": "1",
                "title": "Frontend Developer",
                "company": "TechCorp",
                "match": 85,
                "reasons": ["Strong React portfolio"]
            }],
            "careerAdvice": "Learn TypeScript next.",
            "learningPaths": [{"skill": "TypeScript", "resources": ["TypeScript Handbook"]}]
        })
    }

    fn feedback_json() -> serde_json::Value {
        json!({
            "score": 78,
            "strengths": ["Quantified achievements"],
            "improvements": ["Add a summary"],
            "keywords": {"present": ["React"], "missing": ["Node.js"]},
            "sectionFeedback": {
                "summary": "Missing",
                "experience": "Strong",
                "education": "Clear",
                "skills": "Expand",
                "projects": "Good"
            },
            "suggestedJobs": [{"title": "Frontend Developer", "match": 85}]
        })
    }

    #[test]
    fn test_schema_accepts_what_serde_accepts_for_insights() {
        let value = insights_json();
        assert!(CareerInsights::schema().validate(&value).is_ok());
        let insights: CareerInsights = serde_json::from_value(value).unwrap();
        assert_eq!(insights.job_matches[0].match_score, 85.0);
        assert_eq!(insights.skills.present.len(), 2);
    }

    #[test]
    fn test_schema_accepts_what_serde_accepts_for_feedback() {
        let value = feedback_json();
        assert!(ResumeFeedback::schema().validate(&value).is_ok());
        let feedback: ResumeFeedback = serde_json::from_value(value).unwrap();
        assert_eq!(feedback.score, 78.0);
        assert_eq!(feedback.section_feedback.experience, "Strong");
        assert_eq!(feedback.suggested_jobs[0].title, "Frontend Developer");
    }

    #[test]
    fn test_serialization_uses_wire_field_names() {
        let insights: CareerInsights = serde_json::from_value(insights_json()).unwrap();
        let value = serde_json::to_value(&insights).unwrap();
        assert_eq!(value["careerAdvice"], "Learn TypeScript next.");
        assert_eq!(value["jobMatches"][0]["match"].as_f64(), Some(85.0));
        assert_eq!(value["learningPaths"][0]["skill"], "TypeScript");
        assert!(value.get("job_matches").is_none());
    }

    #[test]
    fn test_fractional_scores_match_the_prompt_wording() {
        assert!(RESUME_FEEDBACK_PROMPT.contains("numbers from 0 to 100"));
        assert!(!RESUME_FEEDBACK_PROMPT.contains("integer"));

        let mut value = feedback_json();
        value["score"] = json!(72.5);
        value["suggestedJobs"][0]["match"] = json!(88.5);
        assert!(ResumeFeedback::schema().validate(&value).is_ok());
        let feedback: ResumeFeedback = serde_json::from_value(value).unwrap();
        assert_eq!(feedback.score, 72.5);
        assert_eq!(feedback.suggested_jobs[0].match_score, 88.5);
    }

    #[test]
    fn test_serde_rejects_undeclared_fields_like_the_schema() {
        let mut value = feedback_json();
        value["sectionFeedback"]["awards"] = json!("none");
        assert!(ResumeFeedback::schema().validate(&value).is_err());
        assert!(serde_json::from_value::<ResumeFeedback>(value).is_err());
    }
}
