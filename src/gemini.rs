// Thin client for the Google Gemini REST API (v1beta).

use base64::{engine::general_purpose, Engine as _};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("request to Gemini failed: {0}")]
    Http(reqwest::Error),

    #[error("Gemini API error {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("unreadable Gemini response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Gemini returned no text in its response")]
    EmptyResponse,
}

// The request URL carries the API key; keep it out of messages and logs.
impl From<reqwest::Error> for GeminiError {
    fn from(err: reqwest::Error) -> Self {
        GeminiError::Http(err.without_url())
    }
}

/// A file attached to a prompt, already base64-encoded.
#[derive(Clone, Debug, Serialize)]
pub struct InlineMedia {
    pub mime_type: String,
    pub data: String,
}

impl InlineMedia {
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: general_purpose::STANDARD.encode(bytes),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename(serialize = "supportedMethods"))]
    pub supported_generation_methods: Vec<String>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Inline { inline_data: &'a InlineMedia },
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Sends one `generateContent` call and returns the first candidate's text.
    pub async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
        media: Option<&InlineMedia>,
    ) -> Result<String, GeminiError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);

        let mut parts = vec![Part::Text { text: prompt }];
        if let Some(media) = media {
            parts.push(Part::Inline { inline_data: media });
        }
        let payload = GenerateRequest {
            contents: [Content { parts }],
        };

        tracing::info!(
            model,
            with_media = media.is_some(),
            "📤 Sending request to Google Gemini..."
        );

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await?;

        let body = read_success_body(response).await?;
        let parsed: GenerateResponse = serde_json::from_str(&body)?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GeminiError::EmptyResponse);
        }

        tracing::info!(model, chars = text.len(), "✅ Gemini answered");
        Ok(text)
    }

    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, GeminiError> {
        let url = format!("{}/v1beta/models", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let body = read_success_body(response).await?;
        let parsed: ListModelsResponse = serde_json::from_str(&body)?;
        Ok(parsed.models)
    }
}

async fn read_success_body(response: reqwest::Response) -> Result<String, GeminiError> {
    let status = response.status();
    let body = response.text().await?;

    tracing::debug!(
        %status,
        body = preview(&body, 500),
        "Gemini response"
    );

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or(body);
        return Err(GeminiError::Api { status, message });
    }

    Ok(body)
}

fn preview(body: &str, max: usize) -> &str {
    match body.char_indices().nth(max) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
