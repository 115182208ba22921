// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Voice of the site owner, shared by every writing prompt.
pub const AUTHOR_VOICE: &str = "\
    Write as a senior data engineer who blogs about building reliable data \
    platforms. Be concrete and practical, prefer real examples over buzzwords, \
    and keep a confident, friendly tone.";
