// Shared prompt fragments. Each feature that calls a model keeps its own
// prompts.rs alongside it; cross-cutting fragments live here.

/// Output contract appended to every structured-output instruction.
pub const JSON_ONLY_INSTRUCTION: &str = "RESPONSE: ONLY a single JSON object. \
    No explanatory text, no Markdown, no code fences.";
