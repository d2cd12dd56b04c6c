//! Prompt construction and parsing of the model's credibility verdict.

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

pub const GENERIC_FAILURE: &str = "Unable to complete analysis. Please try again.";
const FAILURE_KEY_POINT: &str = "Analysis failed due to technical error";

const RESPONSE_FORMAT: &str = r#"Provide a detailed analysis in the following JSON format:
{
  "credibilityScore": <number 0-100>,
  "verdict": "<real|fake|uncertain>",
  "analysis": "<detailed explanation>",
  "keyPoints": ["<point1>", "<point2>", ...],
  "sources": ["<source1>", "<source2>", ...]
}

Consider:
1. Source credibility and reputation
2. Factual accuracy and verifiable claims
3. Emotional manipulation or sensationalism
4. Logical consistency
5. Cross-reference with known facts
6. Signs of manipulation or fabrication

Respond ONLY with valid JSON, no additional text."#;

/// What the user submitted, as named by the form's `type` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Url,
    Image,
    Video,
}

impl InputKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Url => "url",
            InputKind::Image => "image",
            InputKind::Video => "video",
        }
    }

    /// Image and video submissions carry a file instead of an input string.
    pub fn is_media(self) -> bool {
        matches!(self, InputKind::Image | InputKind::Video)
    }

    /// MIME type assumed when the browser did not declare one for the upload.
    pub fn default_mime(self) -> &'static str {
        match self {
            InputKind::Video => "video/mp4",
            _ => "image/jpeg",
        }
    }
}

impl FromStr for InputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "text" => Ok(InputKind::Text),
            "url" => Ok(InputKind::Url),
            "image" => Ok(InputKind::Image),
            "video" => Ok(InputKind::Video),
            other => Err(format!("unsupported input type {other:?}")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Real,
    Fake,
    Uncertain,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(deserialize_with = "score_from_number")]
    pub credibility_score: u8,
    #[serde(deserialize_with = "verdict_from_label")]
    pub verdict: Verdict,
    pub analysis: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
}

impl AnalysisResult {
    /// The well-formed but uninformative result returned on every failure path.
    pub fn fallback(message: impl Into<String>) -> Self {
        Self {
            credibility_score: 50,
            verdict: Verdict::Uncertain,
            analysis: message.into(),
            key_points: vec![FAILURE_KEY_POINT.to_string()],
            sources: Vec::new(),
        }
    }
}

// Models sometimes answer 87.5 or 120; round and clamp into 0..=100.
fn score_from_number<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() {
        return Err(serde::de::Error::custom("credibilityScore is not a finite number"));
    }
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

// Labels arrive as "Real", "FAKE", " uncertain "; compare case-insensitively.
fn verdict_from_label<'de, D>(deserializer: D) -> Result<Verdict, D::Error>
where
    D: Deserializer<'de>,
{
    let label = String::deserialize(deserializer)?;
    match label.trim().to_ascii_lowercase().as_str() {
        "real" => Ok(Verdict::Real),
        "fake" => Ok(Verdict::Fake),
        "uncertain" => Ok(Verdict::Uncertain),
        _ => Err(serde::de::Error::unknown_variant(
            &label,
            &["real", "fake", "uncertain"],
        )),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("model output contains no JSON object")]
    NoJsonObject,

    #[error("model output is not a valid analysis: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

pub fn build_prompt(kind: InputKind, input: &str) -> String {
    let directive = match kind {
        InputKind::Text => format!(
            "Analyze the following news headline/text for credibility and potential misinformation:\n\n\"{input}\"\n\n"
        ),
        InputKind::Url => format!(
            "Analyze the news article from this URL for credibility: {input}\n\n\
             Note: Since I cannot directly access URLs, please analyze based on the URL structure, \
             domain reputation, and provide general guidance on verification.\n\n"
        ),
        InputKind::Image => "Analyze this image for potential misinformation, manipulated content, or fake news. \
             Look for signs of photo manipulation, misleading captions, or out-of-context usage.\n\n"
            .to_string(),
        InputKind::Video => "Analyze this video thumbnail/frame for potential misinformation or fake news. \
             Look for signs of deepfakes, manipulated footage, or misleading content.\n\n"
            .to_string(),
    };

    directive + RESPONSE_FORMAT
}

/// Returns the span from the first `{` to the last `}` of `text`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    static OBJECT: OnceLock<Regex> = OnceLock::new();
    let re = OBJECT.get_or_init(|| Regex::new(r"\{[\s\S]*\}").expect("static regex"));
    re.find(text).map(|m| m.as_str())
}

pub fn parse_model_output(text: &str) -> Result<AnalysisResult, ParseError> {
    let json = extract_json_object(text).ok_or(ParseError::NoJsonObject)?;
    Ok(serde_json::from_str(json)?)
}
