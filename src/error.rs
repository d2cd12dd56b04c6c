use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::analysis::{AnalysisResult, ParseError, GENERIC_FAILURE};
use crate::gemini::GeminiError;

pub const MISSING_KEY_MESSAGE: &str =
    "Gemini API key is not configured. Set GEMINI_API_KEY in the server configuration.";

/// Everything that can go wrong while serving `/api/analyze`.
///
/// Each variant still renders as an [`AnalysisResult`] so the page has a
/// single rendering path.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    #[error("invalid request: {0}")]
    BadRequest(String),

    #[error("could not read upload: {0}")]
    Upload(#[from] axum::extract::multipart::MultipartError),

    #[error(transparent)]
    Gemini(#[from] GeminiError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl AnalyzeError {
    /// Every failure is reported as 500; the body carries the detail.
    pub fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    /// Message shown to the user in the `analysis` field.
    pub fn user_message(&self) -> String {
        match self {
            AnalyzeError::MissingApiKey => MISSING_KEY_MESSAGE.to_string(),
            AnalyzeError::BadRequest(reason) => format!("Invalid request: {reason}."),
            AnalyzeError::Upload(_) => "The uploaded file could not be read. Please try again.".to_string(),
            AnalyzeError::Gemini(err) => describe_gemini_failure(err).to_string(),
            AnalyzeError::Parse(_) => GENERIC_FAILURE.to_string(),
        }
    }
}

const QUOTA_MESSAGE: &str =
    "The AI service quota has been exceeded. Please wait a moment and try again.";
const INVALID_KEY_MESSAGE: &str =
    "The Gemini API key was rejected. Check that GEMINI_API_KEY is valid.";
const MODEL_MISSING_MESSAGE: &str =
    "The configured AI model is not available. Check the model configuration.";
const UNREACHABLE_MESSAGE: &str =
    "Could not reach the AI service. Check the server's network connection.";

/// Maps an upstream failure onto something a reader can act on.
///
/// The HTTP status decides first; the message text is only consulted when
/// the status alone is not conclusive (Gemini answers 400 for a bad key).
pub fn describe_gemini_failure(err: &GeminiError) -> &'static str {
    match err {
        GeminiError::Http(_) => UNREACHABLE_MESSAGE,
        GeminiError::Api { status, message } => match status.as_u16() {
            429 => QUOTA_MESSAGE,
            401 | 403 => INVALID_KEY_MESSAGE,
            404 => MODEL_MISSING_MESSAGE,
            _ => describe_by_message(message),
        },
        GeminiError::Decode(_) | GeminiError::EmptyResponse => GENERIC_FAILURE,
    }
}

fn describe_by_message(message: &str) -> &'static str {
    let lower = message.to_lowercase();

    if lower.contains("quota")
        || lower.contains("resource_exhausted")
        || lower.contains("rate limit")
    {
        QUOTA_MESSAGE
    } else if lower.contains("api key")
        || lower.contains("api_key")
        || lower.contains("permission_denied")
    {
        INVALID_KEY_MESSAGE
    } else if lower.contains("is not found") || lower.contains("not_found") {
        MODEL_MISSING_MESSAGE
    } else {
        GENERIC_FAILURE
    }
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AnalyzeError::BadRequest(_) | AnalyzeError::Upload(_) => {
                tracing::warn!(status = status.as_u16(), error = %self, "Rejected analysis request")
            }
            _ => tracing::error!(status = status.as_u16(), error = %self, "Analysis error"),
        }

        (status, Json(AnalysisResult::fallback(self.user_message()))).into_response()
    }
}
