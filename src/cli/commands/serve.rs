//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for video processing, questions, graph inspection,
//! and the speech helpers used by the web front end.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::{ErrorKind, VidgraphError};
use crate::graph_store::{VideoGraph, VideoInfo};
use crate::orchestrator::{Pipeline, ProcessRequest, ProcessResponse};
use crate::speech::{
    decode_audio_data, encode_audio_data, AudioTranscriber, OpenAISpeech, SpeechSynthesizer,
};
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, FromRequest, Path, Request, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

/// Audio uploads arrive base64-encoded inside JSON.
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Shared application state.
pub struct AppState {
    pipeline: Pipeline,
    transcriber: Arc<dyn AudioTranscriber>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let cors = cors_layer(&settings.server.cors_origins);

    let speech = Arc::new(OpenAISpeech::new(&settings.llm, &settings.speech)?);
    let pipeline = Pipeline::new(settings)?;

    let state = Arc::new(AppState {
        pipeline,
        transcriber: speech.clone(),
        synthesizer: speech,
    });

    let app = router(state).layer(cors);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("vidgraph API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Process video", "POST /process-video");
    Output::kv("Ask question", "POST /ask-question");
    Output::kv("List videos", "GET  /videos");
    Output::kv("Video graph", "GET  /videos/{video_id}");
    Output::kv("Speech to text", "POST /speech-to-text");
    Output::kv("Text to speech", "POST /text-to-speech");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/process-video", post(process_video))
        .route("/ask-question", post(ask_question))
        .route("/videos", get(list_videos))
        .route("/videos/{video_id}", get(get_video))
        .route("/speech-to-text", post(speech_to_text))
        .route("/text-to-speech", post(text_to_speech))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Allow the configured origins, or any origin when none are configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(allowed))
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ProcessVideoRequest {
    video_url: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    word_count: Option<u32>,
    #[serde(default)]
    style: Option<String>,
    #[serde(default)]
    transcript_text: Option<String>,
}

#[derive(Deserialize)]
struct AskQuestionRequest {
    video_url: String,
    question: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    transcript_text: Option<String>,
}

#[derive(Serialize)]
struct AskQuestionResponse {
    answer: String,
}

#[derive(Serialize)]
struct VideoListResponse {
    videos: Vec<VideoInfo>,
    total: usize,
}

#[derive(Deserialize)]
struct SpeechToTextRequest {
    audio_data: String,
    #[serde(default = "default_language")]
    language: String,
}

#[derive(Serialize)]
struct SpeechToTextResponse {
    text: String,
}

#[derive(Deserialize)]
struct TextToSpeechRequest {
    text: String,
    #[serde(default = "default_language")]
    lang: String,
}

#[derive(Serialize)]
struct TextToSpeechResponse {
    #[serde(rename = "audioContent")]
    audio_content: String,
}

fn default_language() -> String {
    "english".to_string()
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    kind: ErrorKind,
}

/// A library error rendered as an HTTP response.
struct ApiError(VidgraphError);

impl From<VidgraphError> for ApiError {
    fn from(e: VidgraphError) -> Self {
        Self(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(VidgraphError::InvalidInput(rejection.body_text()))
    }
}

/// JSON body extractor whose failures use the API error body.
struct ApiJson<T>(T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::TranscriptUnavailable => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::GenerationFailure => StatusCode::BAD_GATEWAY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        (
            status_for(kind),
            Json(ErrorResponse {
                detail: self.0.to_string(),
                kind,
            }),
        )
            .into_response()
    }
}

// === Handlers ===

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "vidgraph API is running" }))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn process_video(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ProcessVideoRequest>,
) -> Response {
    let defaults = &state.pipeline.settings().summary;
    let request = ProcessRequest {
        video: req.video_url,
        style: req.style.unwrap_or_else(|| defaults.default_style.clone()),
        word_count: req.word_count.unwrap_or(defaults.default_word_count),
        language: req.language.unwrap_or_else(|| defaults.default_language.clone()),
        transcript: req.transcript_text,
    };

    let result = state.pipeline.process_video(&request).await;
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => status_for(e.kind()),
    };

    (status, Json(ProcessResponse::from_result(result))).into_response()
}

async fn ask_question(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<AskQuestionRequest>,
) -> Result<Json<AskQuestionResponse>, ApiError> {
    let language = req
        .language
        .unwrap_or_else(|| state.pipeline.settings().summary.default_language.clone());

    let answer = state
        .pipeline
        .ask_question(
            &req.video_url,
            &req.question,
            &language,
            req.transcript_text.as_deref(),
        )
        .await?;

    Ok(Json(AskQuestionResponse { answer }))
}

async fn list_videos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<VideoListResponse>, ApiError> {
    let videos = state.pipeline.list_videos().await?;
    Ok(Json(VideoListResponse {
        total: videos.len(),
        videos,
    }))
}

async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> Result<Json<VideoGraph>, ApiError> {
    Ok(Json(state.pipeline.video_graph(&video_id).await?))
}

async fn speech_to_text(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SpeechToTextRequest>,
) -> Result<Json<SpeechToTextResponse>, ApiError> {
    let audio = decode_audio_data(&req.audio_data)?;
    let text = state
        .transcriber
        .transcribe_audio(&audio.bytes, &audio.file_name, &req.language)
        .await?;
    Ok(Json(SpeechToTextResponse { text }))
}

async fn text_to_speech(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<TextToSpeechRequest>,
) -> Result<Json<TextToSpeechResponse>, ApiError> {
    let audio = state.synthesizer.synthesize_speech(&req.text, &req.lang).await?;
    Ok(Json(TextToSpeechResponse {
        audio_content: encode_audio_data(&audio),
    }))
}
