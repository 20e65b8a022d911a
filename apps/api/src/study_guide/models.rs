//! Request, parameter and document types for study guide generation.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const DEFAULT_CLASS: &str = "General";
pub const DEFAULT_UNIT: &str = "Unknown";
pub const DEFAULT_YEAR: &str = "College";
pub const DEFAULT_DETAILS: &str = "";

/// Prefix of every section marker line: `===== SECTION NAME =====`.
pub const SECTION_MARKER: &str = "=====";

/// Raw request body for `POST /generate-study-guide`.
///
/// Every field is optional and accepts any JSON scalar; non-strings are kept
/// as their JSON text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudyGuideRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub class: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub details: Option<String>,
}

impl StudyGuideRequest {
    /// Parses a request body. Anything that is not a JSON object (empty body,
    /// invalid JSON, arrays, scalars) yields a request with every field absent.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    /// Substitutes defaults for missing or empty fields.
    pub fn resolve(self) -> StudyGuideParams {
        StudyGuideParams {
            class: or_default(self.class, DEFAULT_CLASS),
            unit: or_default(self.unit, DEFAULT_UNIT),
            year: or_default(self.year, DEFAULT_YEAR),
            details: or_default(self.details, DEFAULT_DETAILS),
        }
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }))
}

/// Request fields after default substitution. This is what prompts and
/// templates are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyGuideParams {
    pub class: String,
    pub unit: String,
    pub year: String,
    pub details: String,
}

impl StudyGuideParams {
    /// `===== STUDY GUIDE FOR {CLASS} - {UNIT} =====`
    pub fn title_marker(&self) -> String {
        format!(
            "{SECTION_MARKER} STUDY GUIDE FOR {} - {} {SECTION_MARKER}",
            self.class.to_uppercase(),
            self.unit.to_uppercase()
        )
    }
}

/// A generated study guide: opaque text made of `===== NAME =====` sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyGuideDocument(String);

impl StudyGuideDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the text, ignoring leading whitespace, opens with a section marker.
    pub fn has_section_header(&self) -> bool {
        self.as_str().trim_start().starts_with(SECTION_MARKER)
    }

    /// Names of all `===== NAME =====` marker lines, in document order.
    pub fn section_names(&self) -> Vec<&str> {
        self.as_str()
            .lines()
            .filter_map(|line| {
                line.trim()
                    .strip_prefix(SECTION_MARKER)?
                    .strip_suffix(SECTION_MARKER)
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
            })
            .collect()
    }
}

/// Success body. Failures are rendered by `AppError`.
#[derive(Debug, Serialize)]
pub struct StudyGuideResponse {
    pub success: bool,
    pub content: String,
}
