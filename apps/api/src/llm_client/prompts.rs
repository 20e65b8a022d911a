// Shared prompt fragments.
// Each feature that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments.

/// Plain-text layout rules for long-form prose output.
pub const PLAIN_TEXT_FORMATTING: &str = "\
    Use plain text formatting with clear section headers and bullet points. \
    Use bullet points with '- ' for main points and '   - ' for sub-points \
    (with three spaces before the dash). \
    Number lists as '1. ', '2. ', etc.";
