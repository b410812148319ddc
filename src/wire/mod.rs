use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// ========================================
/// Prediction protocol (remote side)
/// ========================================

#[derive(Debug, Clone, Serialize)]
pub struct PredictionRequest<'a> {
    pub input: PredictionInput<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionInput<'a> {
    pub prompt: &'a str,
    pub temperature: f32,
    pub max_new_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl PredictionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionUrls {
    #[serde(default)]
    pub get: Option<String>,
}

/// Job resource as returned by both the submission and the poll calls.
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    #[serde(default)]
    pub id: Option<String>,
    pub status: PredictionStatus,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub urls: PredictionUrls,
}

impl Prediction {
    /// Output as text. Language models stream tokens, so a list of strings is
    /// concatenated. Anything else is not text.
    pub fn output_text(&self) -> Option<String> {
        match self.output.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => items
                .iter()
                .map(|v| v.as_str())
                .collect::<Option<Vec<_>>>()
                .map(|parts| parts.concat()),
            _ => None,
        }
    }

    pub fn error_detail(&self) -> String {
        match &self.error {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => "unknown error".to_string(),
            Some(other) => other.to_string(),
        }
    }
}

/// ========================================
/// Generation results (outward side)
/// ========================================

pub const MARKUP_FILE: &str = "index.html";
pub const STYLE_FILE: &str = "style.css";
pub const SCRIPT_FILE: &str = "script.js";

/// The generated markup/style/script triple.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeBundle {
    #[serde(rename = "html")]
    pub markup: String,
    #[serde(rename = "css")]
    pub style: String,
    #[serde(rename = "javascript")]
    pub script: String,
}

impl CodeBundle {
    pub fn is_empty(&self) -> bool {
        self.markup.is_empty() && self.style.is_empty() && self.script.is_empty()
    }

    pub fn files(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (MARKUP_FILE.to_string(), self.markup.clone()),
            (STYLE_FILE.to_string(), self.style.clone()),
            (SCRIPT_FILE.to_string(), self.script.clone()),
        ])
    }
}

/// Either code was produced, or `feedback` explains what needs clarifying.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    #[serde(flatten)]
    pub code: CodeBundle,
    pub analysis: Option<String>,
    pub plan: Option<String>,
    pub feedback: Option<String>,
}

impl GenerationResult {
    pub fn needs_clarification(&self) -> bool {
        self.feedback.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub files: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    pub feedback: Option<String>,
}

impl From<GenerationResult> for GenerateResponse {
    fn from(r: GenerationResult) -> Self {
        Self {
            files: r.code.files(),
            analysis: r.analysis,
            plan: r.plan,
            feedback: r.feedback,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrdResponse {
    pub prd: String,
}
