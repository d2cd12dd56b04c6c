use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::analysis::{build_prompt, parse_model_output, AnalysisResult, InputKind};
use crate::config::Config;
use crate::error::AnalyzeError;
use crate::gemini::{GeminiClient, InlineMedia};
use crate::page;

const KEY_PROBE_PROMPT: &str =
    r#"Say "API key is working" in JSON format: {"status": "working"}"#;
const MIN_KEY_LENGTH: usize = 20;

pub struct AppState {
    pub config: Config,
    /// Only built when an API key is configured.
    pub gemini: Option<GeminiClient>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let gemini = config
            .api_key
            .as_deref()
            .map(|key| GeminiClient::new(key, config.api_base.as_str()));

        Self { config, gemini }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(page::index))
        .route("/api/analyze", post(analyze))
        .route("/api/models", get(list_models))
        .route("/api/test", get(test_api_key))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

struct Upload {
    mime_type: Option<String>,
    bytes: Vec<u8>,
}

/// The raw multipart fields of an analysis request.
#[derive(Default)]
struct AnalyzeForm {
    kind: Option<String>,
    input: Option<String>,
    file: Option<Upload>,
}

impl AnalyzeForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AnalyzeError> {
        let mut form = AnalyzeForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "type" => form.kind = Some(field.text().await?),
                "input" => form.input = Some(field.text().await?),
                "file" => {
                    let mime_type = field
                        .content_type()
                        .map(str::to_string)
                        .filter(|m| !m.is_empty() && m != "application/octet-stream");
                    let bytes = field.bytes().await?.to_vec();
                    if !bytes.is_empty() {
                        form.file = Some(Upload { mime_type, bytes });
                    }
                }
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    /// Checks that the fields required by the declared kind are present.
    fn validate(self) -> Result<AnalyzeRequest, AnalyzeError> {
        let kind: InputKind = self
            .kind
            .as_deref()
            .ok_or_else(|| AnalyzeError::BadRequest("missing \"type\" field".into()))?
            .parse()
            .map_err(AnalyzeError::BadRequest)?;

        if kind.is_media() {
            let upload = self.file.ok_or_else(|| {
                AnalyzeError::BadRequest(format!("a file is required for {}", kind.as_str()))
            })?;
            let mime_type = upload
                .mime_type
                .unwrap_or_else(|| kind.default_mime().to_string());
            return Ok(AnalyzeRequest {
                kind,
                input: String::new(),
                media: Some(InlineMedia::from_bytes(mime_type, &upload.bytes)),
            });
        }

        let input = self
            .input
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                AnalyzeError::BadRequest(format!("\"input\" is required for {}", kind.as_str()))
            })?;

        Ok(AnalyzeRequest {
            kind,
            input,
            media: None,
        })
    }
}

struct AnalyzeRequest {
    kind: InputKind,
    input: String,
    media: Option<InlineMedia>,
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<AnalysisResult>, AnalyzeError> {
    let gemini = state.gemini.as_ref().ok_or(AnalyzeError::MissingApiKey)?;

    let request = AnalyzeForm::read(multipart).await?.validate()?;

    let model = if request.media.is_some() {
        &state.config.vision_model
    } else {
        &state.config.text_model
    };
    let prompt = build_prompt(request.kind, &request.input);

    let start = std::time::Instant::now();
    let text = gemini
        .generate_content(model, &prompt, request.media.as_ref())
        .await?;
    let result = parse_model_output(&text)?;

    tracing::info!(
        kind = request.kind.as_str(),
        verdict = ?result.verdict,
        score = result.credibility_score,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Analysis complete"
    );

    Ok(Json(result))
}

async fn list_models(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let Some(gemini) = state.gemini.as_ref() else {
        return (
            StatusCode::OK,
            Json(json!({ "status": "error", "message": "GEMINI_API_KEY not set" })),
        );
    };

    match gemini.list_models().await {
        Ok(models) => (
            StatusCode::OK,
            Json(json!({ "status": "success", "models": models })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Listing models failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "message": e.to_string(),
                    "errorDetails": format!("{e:?}"),
                })),
            )
        }
    }
}

async fn test_api_key(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let (Some(key), Some(gemini)) = (state.config.api_key.as_deref(), state.gemini.as_ref()) else {
        return (
            StatusCode::OK,
            Json(json!({
                "status": "error",
                "message": "GEMINI_API_KEY environment variable is not set",
                "hasKey": false,
            })),
        );
    };

    let key_length = key.chars().count();
    if key_length < MIN_KEY_LENGTH {
        return (
            StatusCode::OK,
            Json(json!({
                "status": "error",
                "message": "API key seems too short",
                "hasKey": true,
                "keyLength": key_length,
            })),
        );
    }

    match gemini
        .generate_content(&state.config.text_model, KEY_PROBE_PROMPT, None)
        .await
    {
        Ok(text) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": "API key is valid and working",
                "hasKey": true,
                "keyLength": key_length,
                "testResponse": text,
            })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "API key probe failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "message": e.to_string(),
                    "errorDetails": format!("{e:?}"),
                })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        extract::Path,
        http::{header, Request},
        response::{IntoResponse, Response},
    };
    use std::sync::Mutex;
    use tower::ServiceExt;

    const BOUNDARY: &str = "detector-test-boundary";
    const VALID_KEY: &str = "AIzaTestKeyThatIsLongEnough";

    #[derive(Clone)]
    enum Reply {
        Text(String),
        Failure(StatusCode, String),
    }

    /// Stand-in for the Gemini API that records every generateContent call.
    #[derive(Clone)]
    struct StubGemini {
        reply: Reply,
        calls: Arc<Mutex<Vec<(String, Value)>>>,
    }

    async fn stub_generate(
        State(stub): State<StubGemini>,
        Path(call): Path<String>,
        Json(body): Json<Value>,
    ) -> Response {
        let model = call.trim_end_matches(":generateContent").to_string();
        stub.calls.lock().unwrap().push((model, body));
        match stub.reply {
            Reply::Text(text) => Json(json!({
                "candidates": [{ "content": { "parts": [{ "text": text }] } }]
            }))
            .into_response(),
            Reply::Failure(status, message) => (
                status,
                Json(json!({ "error": { "code": status.as_u16(), "message": message } })),
            )
                .into_response(),
        }
    }

    async fn stub_list_models() -> Json<Value> {
        Json(json!({
            "models": [{
                "name": "models/gemini-2.5-flash",
                "displayName": "Gemini 2.5 Flash",
                "description": "Fast model",
                "supportedGenerationMethods": ["generateContent"]
            }]
        }))
    }

    async fn spawn_stub(reply: Reply) -> (String, Arc<Mutex<Vec<(String, Value)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let stub = StubGemini {
            reply,
            calls: calls.clone(),
        };
        let app = Router::new()
            .route("/v1beta/models", get(stub_list_models))
            .route("/v1beta/models/:call", post(stub_generate))
            .with_state(stub);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), calls)
    }

    fn app_with(api_key: Option<&str>, api_base: &str) -> Router {
        let config = Config::from_lookup(|key| match key {
            "GEMINI_API_KEY" => api_key.map(str::to_string),
            "GEMINI_API_BASE" => Some(api_base.to_string()),
            "GEMINI_TEXT_MODEL" => Some("text-model".to_string()),
            "GEMINI_VISION_MODEL" => Some("vision-model".to_string()),
            _ => None,
        })
        .unwrap();
        router(Arc::new(AppState::new(config)))
    }

    enum Field<'a> {
        Text(&'a str, &'a str),
        File {
            filename: &'a str,
            mime: &'a str,
            bytes: &'a [u8],
        },
    }

    fn multipart_request(fields: &[Field<'_>]) -> Request<Body> {
        let mut body = Vec::new();
        for field in fields {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match field {
                Field::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                            .as_bytes(),
                    );
                }
                Field::File {
                    filename,
                    mime,
                    bytes,
                } => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
                             Content-Type: {mime}\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn verdict_reply() -> Reply {
        Reply::Text(
            "```json\n{\"credibilityScore\": 82, \"verdict\": \"real\", \"analysis\": \"Consistent with reporting.\", \"keyPoints\": [\"Named sources\"], \"sources\": [\"https://example.org\"]}\n```"
                .to_string(),
        )
    }

    fn prompt_of(body: &Value) -> String {
        body["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn missing_api_key_returns_configuration_fallback() {
        let (base, calls) = spawn_stub(verdict_reply()).await;
        let app = app_with(None, &base);

        let (status, body) = send(
            app,
            multipart_request(&[Field::Text("type", "text"), Field::Text("input", "hello")]),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["verdict"], "uncertain");
        assert_eq!(body["credibilityScore"], 50);
        assert!(body["analysis"].as_str().unwrap().contains("not configured"));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn text_request_quotes_the_headline_and_uses_text_model() {
        let (base, calls) = spawn_stub(verdict_reply()).await;
        let app = app_with(Some(VALID_KEY), &base);

        let (status, body) = send(
            app,
            multipart_request(&[
                Field::Text("type", "text"),
                Field::Text("input", "Breaking: scientists confirm water is wet"),
            ]),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["credibilityScore"], 82);
        assert_eq!(body["verdict"], "real");
        assert_eq!(body["keyPoints"][0], "Named sources");

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (model, request) = &calls[0];
        assert_eq!(model, "text-model");
        assert!(prompt_of(request).contains("\"Breaking: scientists confirm water is wet\""));
        assert!(request["contents"][0]["parts"].as_array().unwrap().len() == 1);
    }

    #[tokio::test]
    async fn image_request_sends_base64_bytes_with_declared_mime() {
        let (base, calls) = spawn_stub(verdict_reply()).await;
        let app = app_with(Some(VALID_KEY), &base);

        let (status, _) = send(
            app,
            multipart_request(&[
                Field::Text("type", "image"),
                Field::File {
                    filename: "photo.png",
                    mime: "image/png",
                    bytes: b"\x89PNG fake",
                },
            ]),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let calls = calls.lock().unwrap();
        let (model, request) = &calls[0];
        assert_eq!(model, "vision-model");
        assert!(prompt_of(request).contains("photo manipulation"));
        let media = &request["contents"][0]["parts"][1]["inline_data"];
        assert_eq!(media["mime_type"], "image/png");
        assert_eq!(media["data"], "iVBORyBmYWtl");
    }

    #[tokio::test]
    async fn every_input_kind_yields_a_valid_result() {
        let (base, _) = spawn_stub(verdict_reply()).await;

        let file = Field::File {
            filename: "clip.bin",
            mime: "video/webm",
            bytes: b"frames",
        };
        let cases = [
            vec![Field::Text("type", "text"), Field::Text("input", "headline")],
            vec![Field::Text("type", "url"), Field::Text("input", "https://news.example/a")],
            vec![
                Field::Text("type", "image"),
                Field::File {
                    filename: "a.jpg",
                    mime: "image/jpeg",
                    bytes: b"jpeg",
                },
            ],
            vec![Field::Text("type", "video"), file],
        ];

        for fields in cases {
            let (status, body) =
                send(app_with(Some(VALID_KEY), &base), multipart_request(&fields)).await;
            assert_eq!(status, StatusCode::OK);
            let score = body["credibilityScore"].as_u64().unwrap();
            assert!(score <= 100);
            assert!(["real", "fake", "uncertain"].contains(&body["verdict"].as_str().unwrap()));
        }
    }

    #[tokio::test]
    async fn output_without_json_object_returns_generic_fallback() {
        let (base, _) =
            spawn_stub(Reply::Text("I'm sorry, I can't assess that.".to_string())).await;
        let app = app_with(Some(VALID_KEY), &base);

        let (status, body) = send(
            app,
            multipart_request(&[Field::Text("type", "url"), Field::Text("input", "https://x.test")]),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["verdict"], "uncertain");
        assert_eq!(body["credibilityScore"], 50);
        assert_eq!(body["analysis"], crate::analysis::GENERIC_FAILURE);
    }

    #[tokio::test]
    async fn upstream_quota_error_is_reported_readably() {
        let (base, _) = spawn_stub(Reply::Failure(
            StatusCode::TOO_MANY_REQUESTS,
            "You exceeded your current quota".to_string(),
        ))
        .await;
        let app = app_with(Some(VALID_KEY), &base);

        let (status, body) = send(
            app,
            multipart_request(&[Field::Text("type", "text"), Field::Text("input", "headline")]),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["analysis"].as_str().unwrap().contains("quota"));
    }

    #[tokio::test]
    async fn missing_fields_fail_with_500_before_calling_gemini() {
        let (base, calls) = spawn_stub(verdict_reply()).await;

        let (status, body) = send(
            app_with(Some(VALID_KEY), &base),
            multipart_request(&[Field::Text("type", "text")]),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["verdict"], "uncertain");
        assert_eq!(body["credibilityScore"], 50);
        assert_eq!(body["analysis"], "Invalid request: \"input\" is required for text.");

        let (status, body) = send(
            app_with(Some(VALID_KEY), &base),
            multipart_request(&[Field::Text("type", "image")]),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["analysis"], "Invalid request: a file is required for image.");

        let (status, _) = send(
            app_with(Some(VALID_KEY), &base),
            multipart_request(&[Field::Text("type", "text"), Field::Text("input", "  ")]),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = send(
            app_with(Some(VALID_KEY), &base),
            multipart_request(&[Field::Text("type", "podcast"), Field::Text("input", "x")]),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn capitalised_verdict_from_the_model_is_accepted() {
        let (base, _) = spawn_stub(Reply::Text(
            "{\"credibilityScore\": 80, \"verdict\": \"Real\", \"analysis\": \"ok\"}".to_string(),
        ))
        .await;

        let (status, body) = send(
            app_with(Some(VALID_KEY), &base),
            multipart_request(&[Field::Text("type", "text"), Field::Text("input", "headline")]),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["verdict"], "real");
        assert_eq!(body["credibilityScore"], 80);
        assert_eq!(body["analysis"], "ok");
    }

    #[tokio::test]
    async fn key_probe_reports_missing_and_short_keys() {
        let (base, _) = spawn_stub(verdict_reply()).await;

        let (status, body) = send(app_with(None, &base), get_request("/api/test")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hasKey"], false);

        let (status, body) = send(app_with(Some("short"), &base), get_request("/api/test")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "API key seems too short");
        assert_eq!(body["keyLength"], 5);
    }

    #[tokio::test]
    async fn key_probe_calls_the_text_model() {
        let (base, calls) = spawn_stub(Reply::Text("{\"status\": \"working\"}".into())).await;

        let (status, body) =
            send(app_with(Some(VALID_KEY), &base), get_request("/api/test")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["testResponse"], "{\"status\": \"working\"}");
        assert_eq!(calls.lock().unwrap()[0].0, "text-model");
    }

    #[tokio::test]
    async fn models_endpoint_lists_available_models() {
        let (base, _) = spawn_stub(verdict_reply()).await;

        let (status, body) = send(app_with(None, &base), get_request("/api/models")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "GEMINI_API_KEY not set");

        let (status, body) =
            send(app_with(Some(VALID_KEY), &base), get_request("/api/models")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["models"][0]["displayName"], "Gemini 2.5 Flash");
        assert_eq!(body["models"][0]["supportedMethods"][0], "generateContent");
        assert!(body["models"][0].get("supportedGenerationMethods").is_none());
    }

    #[tokio::test]
    async fn index_serves_the_detector_page() {
        let response = app_with(None, "http://127.0.0.1:1")
            .oneshot(get_request("/"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(html.to_vec()).unwrap();
        assert!(html.contains("/api/analyze"));
        assert!(html.contains("analyzeButton.disabled = state.loading || (!state.input && !state.file)"));
    }
}
