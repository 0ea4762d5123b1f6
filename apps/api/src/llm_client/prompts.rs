// Shared prompt fragments for every LLM call.
// Operation-specific templates live next to the operation (see analysis::prompts).

/// Appended to every structured request. `{schema}` is replaced with the
/// rendered output schema.
pub const STRUCTURED_OUTPUT_TEMPLATE: &str = "\
Return a JSON object with this EXACT structure (every field is required, no extra fields):
{schema}

You MUST respond with valid JSON only. \
Do NOT include any text outside the JSON object. \
Do NOT use markdown code fences. \
Do NOT include explanations or apologies.";
