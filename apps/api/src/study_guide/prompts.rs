// All LLM prompt text for study guide generation.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::PLAIN_TEXT_FORMATTING;
use crate::study_guide::models::StudyGuideParams;

/// Section names every study guide must contain, in order.
pub const SECTION_NAMES: [&str; 6] = [
    "INTRODUCTION",
    "KEY CONCEPTS",
    "DEFINITIONS",
    "PRACTICE PROBLEMS",
    "ADDITIONAL RESOURCES",
    "CONCLUSION",
];

const ROLE_INSTRUCTION: &str = "You are a professional study guide creator. \
    You create detailed, well-structured study guides for students. \
    Thoughtfully consider a student's education level, course, and unit/topic \
    to generate an in-depth, relevant study guide. \
    Ensure that the depth and vocabulary of the study guide are appropriate \
    for their education level.";

/// System instruction: role, level tailoring, and the six-section output contract.
pub fn system_prompt() -> String {
    let sections = SECTION_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{}. {name}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{ROLE_INSTRUCTION}\n\
        Format the study guide with exactly these six sections, in this order, \
        each preceded by a line of the form '===== SECTION NAME =====' \
        (including the equals signs and spaces):\n\
        {sections}\n\n\
        {PLAIN_TEXT_FORMATTING}"
    )
}

/// User instruction interpolating the resolved request fields.
pub fn user_prompt(params: &StudyGuideParams) -> String {
    format!(
        "I am a student at the {year} level studying {class}. \
        I need a study guide for the {unit} unit or topic. \
        Additional details: {details}\n\n\
        Please generate a comprehensive study guide to help me prepare for my exam or assignment.",
        year = params.year,
        class = params.class,
        unit = params.unit,
        details = params.details,
    )
}
