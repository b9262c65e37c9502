// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments only.

/// Default system prompt for all pipeline calls. Individual prompts add
/// their own output-format contract on top of this.
pub const ADVISOR_SYSTEM: &str = "You are a precise career advisor for university students. \
    When asked for JSON, respond with valid JSON only: \
    no text outside the JSON value, no markdown code fences, \
    no explanations or apologies.";
