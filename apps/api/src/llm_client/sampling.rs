use super::types::GenerationConfig;
use super::LlmError;

/// Fixed sampling parameters for one kind of generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    /// 0.0 – 2.0
    pub temperature: f32,
    /// 0.0 – 1.0
    pub top_p: f32,
    /// ≥ 1
    pub top_k: u32,
    /// > 0
    pub max_output_tokens: u32,
}

impl SamplingConfig {
    /// Low-variance settings for resume analysis.
    pub const PRECISE: SamplingConfig = SamplingConfig {
        temperature: 0.2,
        top_p: 0.8,
        top_k: 40,
        max_output_tokens: 8192,
    };

    /// Higher-variance settings for learning content.
    pub const CREATIVE: SamplingConfig = SamplingConfig {
        temperature: 0.7,
        top_p: 0.95,
        top_k: 64,
        max_output_tokens: 8192,
    };

    pub fn validate(&self) -> Result<(), LlmError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(LlmError::InvalidRequest(format!(
                "temperature {} is outside 0.0..=2.0",
                self.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(LlmError::InvalidRequest(format!(
                "top_p {} is outside 0.0..=1.0",
                self.top_p
            )));
        }
        if self.top_k == 0 {
            return Err(LlmError::InvalidRequest("top_k must be at least 1".to_string()));
        }
        if self.max_output_tokens == 0 {
            return Err(LlmError::InvalidRequest(
                "max_output_tokens must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn to_generation_config(self, response_mime_type: Option<&str>) -> GenerationConfig {
        GenerationConfig {
            temperature: self.temperature,
            top_p: self.top_p,
            top_k: self.top_k,
            max_output_tokens: self.max_output_tokens,
            response_mime_type: response_mime_type.map(str::to_string),
        }
    }
}
