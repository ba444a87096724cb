// Shared prompt fragments. Record-specific templates live in summary/prompts.rs.

/// Role instruction prefixed to every summarization system prompt.
pub const HSE_ASSISTANT_ROLE: &str = "You are an HSE assistant summarizing health & safety";

/// Appended to prompts whose answer is decoded as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    Respond with the JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";
