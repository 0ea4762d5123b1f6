use crate::analysis::analyzer::Analyzer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Stateless between calls; holds the read-only generation client.
    pub analyzer: Analyzer,
}
