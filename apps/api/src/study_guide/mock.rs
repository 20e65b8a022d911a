//! Offline generator. Fills a fixed six-section template from the request.
//! No network I/O, never fails.

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};

use crate::study_guide::generator::{GenerationError, StudyGuideGenerator};
use crate::study_guide::models::{StudyGuideDocument, StudyGuideParams};

pub struct MockStudyGuideGenerator;

#[async_trait]
impl StudyGuideGenerator for MockStudyGuideGenerator {
    async fn generate(
        &self,
        params: &StudyGuideParams,
    ) -> Result<StudyGuideDocument, GenerationError> {
        Ok(render_mock_guide(params, Local::now().naive_local()))
    }

    fn backend(&self) -> &'static str {
        "mock"
    }
}

/// Renders the canned study guide for `params`, stamped with `generated_at`.
pub fn render_mock_guide(
    params: &StudyGuideParams,
    generated_at: NaiveDateTime,
) -> StudyGuideDocument {
    let details = if params.details.is_empty() {
        "No additional details provided."
    } else {
        params.details.as_str()
    };

    StudyGuideDocument::new(format!(
        "{title}
Year Level: {year}
Generated on: {generated_on}

===== INTRODUCTION =====
This study guide covers key concepts from {class}, focusing on the {unit} unit.
{details}

===== KEY CONCEPTS =====
1. Main Concept One
- Detail point
- Detail point
- Example application

2. Main Concept Two
- Detail point
- Relationship to other concepts
- Common misconceptions

3. Main Concept Three
- Detail point
- Historical context
- Modern applications

===== DEFINITIONS =====
- Term One: Short definition
- Term Two: Short definition
   - Related term: How it connects

===== PRACTICE PROBLEMS =====
1. Problem description
Solution: Brief explanation

2. Problem description
Solution: Brief explanation

===== ADDITIONAL RESOURCES =====
- Recommended textbook chapters
- Online resources
- Practice exercises

===== CONCLUSION =====
This study guide was automatically generated to help with your studies.
Feel free to supplement with your own notes and ask questions if anything is unclear.
",
        title = params.title_marker(),
        year = params.year,
        generated_on = generated_at.format("%Y-%m-%d %H:%M:%S"),
        class = params.class,
        unit = params.unit,
    ))
}
