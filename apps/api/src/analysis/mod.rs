// Resume & skill analysis: prompt building, generation, response interpretation.
// All model calls go through llm_client, no direct Gemini calls here.

pub mod analyzer;
pub mod document;
pub mod error;
pub mod handlers;
pub mod interpreter;
pub mod models;
pub mod prompt;
pub mod prompts;
pub mod schema;
