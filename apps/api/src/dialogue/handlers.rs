//! Axum route handlers for the chat and job listing API.

use axum::{
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dialogue::context::Turn;
use crate::dialogue::intent::TextRoutingIntent;
use crate::errors::AppError;
use crate::job_search::search_or_degrade;
use crate::llm_client::{sniff_media_type, ImageBytes, MAX_IMAGE_BYTES};
use crate::state::AppState;

/// Body limit for image uploads: the largest accepted image plus room for the
/// other multipart fields.
pub const MAX_UPLOAD_BYTES: usize = MAX_IMAGE_BYTES + 1024 * 1024;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    /// Omit to start a new session.
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub session_id: Uuid,
    pub response: String,
    pub intent: TextRoutingIntent,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeImageResponse {
    pub session_id: Uuid,
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub session_id: Uuid,
    pub turns: Vec<Turn>,
    pub context: String,
}

#[derive(Debug, Deserialize)]
pub struct JobsQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct JobsResponse {
    pub job_listings: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/chat/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    if request.prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }

    let session_id = request.session_id.unwrap_or_else(Uuid::new_v4);
    let ctx = state.sessions.context(session_id).await;
    let turn = state.orchestrator.handle_text(&ctx, &request.prompt).await?;

    Ok(Json(GenerateResponse {
        session_id,
        response: turn.response,
        intent: turn.intent,
    }))
}

/// POST /api/v1/chat/analyze-image
///
/// Multipart fields: `image` (required), `prompt`, `session_id`.
pub async fn handle_analyze_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeImageResponse>, AppError> {
    let mut image: Option<ImageBytes> = None;
    let mut prompt = String::new();
    let mut session_id: Option<Uuid> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Invalid multipart body", e))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let declared = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("Failed to read image", e))?;
                image = Some(to_image(data, declared)?);
            }
            Some("prompt") => {
                prompt = field
                    .text()
                    .await
                    .map_err(|e| multipart_error("Failed to read prompt", e))?;
            }
            Some("session_id") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| multipart_error("Failed to read session_id", e))?;
                let id = Uuid::parse_str(raw.trim())
                    .map_err(|_| AppError::Validation("session_id must be a UUID".to_string()))?;
                session_id = Some(id);
            }
            _ => {}
        }
    }

    let image = image.ok_or_else(|| AppError::Validation("No image file uploaded".to_string()))?;
    let session_id = session_id.unwrap_or_else(Uuid::new_v4);
    let ctx = state.sessions.context(session_id).await;
    let response = state.orchestrator.handle_image(&ctx, &image, &prompt).await?;

    Ok(Json(AnalyzeImageResponse {
        session_id,
        response,
    }))
}

/// POST /api/v1/chat/clear
pub async fn handle_clear(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> Result<Json<ClearResponse>, AppError> {
    // Reset as well as drop, so a turn still holding the context sees it empty.
    if let Some(ctx) = state.sessions.remove(request.session_id).await {
        ctx.reset().await;
    }
    Ok(Json(ClearResponse {
        message: "Chat history cleared".to_string(),
    }))
}

/// GET /api/v1/chat/history?session_id=
pub async fn handle_history(
    State(state): State<AppState>,
    Query(params): Query<SessionRequest>,
) -> Result<Json<HistoryResponse>, AppError> {
    let ctx = state
        .sessions
        .existing(params.session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", params.session_id)))?;

    Ok(Json(HistoryResponse {
        session_id: params.session_id,
        turns: ctx.turns().await.as_ref().clone(),
        context: ctx.as_text().await,
    }))
}

/// GET /api/v1/jobs?query=
pub async fn handle_get_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobsQuery>,
) -> Result<Json<JobsResponse>, AppError> {
    let job_listings = search_or_degrade(state.jobs.as_ref(), &params.query).await;
    Ok(Json(JobsResponse { job_listings }))
}

fn multipart_error(context: &str, e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!(
            "Upload exceeds the {} MB limit",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        ))
    } else {
        AppError::Validation(format!("{context}: {}", e.body_text()))
    }
}

/// Resolves the media type from the upload's declaration, falling back to magic bytes.
fn to_image(data: Bytes, declared: Option<String>) -> Result<ImageBytes, AppError> {
    if data.is_empty() {
        return Err(AppError::Validation("Uploaded image is empty".to_string()));
    }
    if data.len() > MAX_IMAGE_BYTES {
        return Err(AppError::PayloadTooLarge(format!(
            "Image exceeds the {} MB limit",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }

    let declared = declared.map(|d| ImageBytes::new(data.clone(), d));
    if let Some(image) = declared.filter(ImageBytes::is_supported) {
        return Ok(image);
    }

    sniff_media_type(&data)
        .map(|media_type| ImageBytes::new(data.clone(), media_type))
        .ok_or_else(|| {
            AppError::Validation("Unsupported image format; use PNG, JPEG, GIF or WebP".to_string())
        })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::dialogue::orchestrator::DialogueOrchestrator;
    use crate::dialogue::sessions::SessionRegistry;
    use crate::dialogue::testing::{ScriptedModel, StubJobs};
    use crate::routes::build_router;

    const BOUNDARY: &str = "mentor-test-boundary";

    fn app_with(model: ScriptedModel, jobs: StubJobs) -> (axum::Router, SessionRegistry) {
        let jobs = Arc::new(jobs);
        let sessions = SessionRegistry::new();
        let state = AppState {
            orchestrator: DialogueOrchestrator::new(Arc::new(model), jobs.clone()),
            sessions: sessions.clone(),
            jobs,
        };
        (build_router(state), sessions)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_post(parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
        let mut body: Vec<u8> = Vec::new();
        for (name, content_type, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match content_type {
                Some(ct) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"upload\"\r\n\
                         Content-Type: {ct}\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/v1/chat/analyze-image")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[test]
    fn test_to_image_prefers_supported_declaration() {
        let image = to_image(Bytes::from_static(b"GIF89a"), Some("image/png".to_string())).unwrap();
        assert_eq!(image.media_type, "image/png");
    }

    #[test]
    fn test_to_image_sniffs_when_declaration_unusable() {
        let image = to_image(
            Bytes::from_static(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some("application/octet-stream".to_string()),
        )
        .unwrap();
        assert_eq!(image.media_type, "image/jpeg");

        assert!(to_image(Bytes::from_static(b"plain text"), None).is_err());
        assert!(to_image(Bytes::new(), Some("image/png".to_string())).is_err());
    }

    #[test]
    fn test_to_image_rejects_oversized_image() {
        let mut data = vec![0u8; MAX_IMAGE_BYTES + 1];
        data[..4].copy_from_slice(&[0x89, b'P', b'N', b'G']);
        assert!(matches!(
            to_image(Bytes::from(data), Some("image/png".to_string())),
            Err(AppError::PayloadTooLarge(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_returns_response_intent_and_session() {
        let (app, sessions) = app_with(
            ScriptedModel::new([r#"{"intent": "other", "query": null}"#, "Knock knock."]),
            StubJobs::returning("• Role at Co, Remote\n  #"),
        );

        let response = app
            .oneshot(json_post("/api/v1/chat/generate", json!({"prompt": "Tell me a joke."})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["response"], "Knock knock.");
        assert_eq!(body["intent"]["intent"], "other");

        let session_id: Uuid = serde_json::from_value(body["session_id"].clone()).unwrap();
        let ctx = sessions.existing(session_id).await.unwrap();
        assert_eq!(ctx.as_text().await, "Tell me a joke.\n\nKnock knock.");
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_prompt() {
        let (app, _) = app_with(ScriptedModel::new(Vec::<String>::new()), StubJobs::unavailable());
        let response = app
            .oneshot(json_post("/api/v1/chat/generate", json!({"prompt": "   "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_turn_failure_has_error_shape() {
        let (app, _) = app_with(
            ScriptedModel::new([r#"{"intent": "horoscope"}"#]),
            StubJobs::unavailable(),
        );

        let response = app
            .oneshot(json_post("/api/v1/chat/generate", json!({"prompt": "Am I lucky?"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "MALFORMED_PAYLOAD");
        assert!(body.get("response").is_none());
    }

    #[tokio::test]
    async fn test_analyze_image_greeting() {
        let (app, _) = app_with(
            ScriptedModel::new([r#"{"intent": "greeting"}"#]),
            StubJobs::unavailable(),
        );

        let png: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A];
        let response = app
            .oneshot(multipart_post(&[
                ("image", Some("image/png"), png),
                ("prompt", None, &b"hello!"[..]),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["response"], crate::dialogue::prompts::GREETING_REPLY);
    }

    fn png_of_size(len: usize) -> Vec<u8> {
        let mut data = vec![0u8; len];
        data[..6].copy_from_slice(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A]);
        data
    }

    #[tokio::test]
    async fn test_analyze_image_accepts_multi_megabyte_scan() {
        let (app, _) = app_with(
            ScriptedModel::new([r#"{"intent": "greeting"}"#]),
            StubJobs::unavailable(),
        );

        let png = png_of_size(3 * 1024 * 1024);
        let response = app
            .oneshot(multipart_post(&[
                ("image", Some("image/png"), &png[..]),
                ("prompt", None, &b"hi"[..]),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["response"], crate::dialogue::prompts::GREETING_REPLY);
    }

    #[tokio::test]
    async fn test_analyze_image_over_body_limit_is_payload_too_large() {
        let (app, _) = app_with(ScriptedModel::new(Vec::<String>::new()), StubJobs::unavailable());

        let png = png_of_size(MAX_UPLOAD_BYTES + 1024);
        let response = app
            .oneshot(multipart_post(&[
                ("prompt", None, &b"review this"[..]),
                ("image", Some("image/png"), &png[..]),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_analyze_image_requires_image() {
        let (app, _) = app_with(ScriptedModel::new(Vec::<String>::new()), StubJobs::unavailable());
        let response = app
            .oneshot(multipart_post(&[("prompt", None, &b"review this"[..])]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "No image file uploaded");
    }

    #[tokio::test]
    async fn test_history_returns_turns_and_context() {
        let (app, sessions) = app_with(ScriptedModel::new(Vec::<String>::new()), StubJobs::unavailable());
        let session_id = Uuid::new_v4();
        sessions
            .context(session_id)
            .await
            .append_exchange(Turn::user("hi"), Turn::assistant("hello"))
            .await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/chat/history?session_id={session_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["context"], "hi\n\nhello");
        assert_eq!(body["turns"][0]["role"], "user");
    }

    #[tokio::test]
    async fn test_clear_drops_session_and_empties_held_context() {
        let model = Arc::new(ScriptedModel::new([
            r#"{"intent": "other", "query": null}"#,
            "Fresh start.",
        ]));
        let jobs = Arc::new(StubJobs::unavailable());
        let sessions = SessionRegistry::new();
        let app = build_router(AppState {
            orchestrator: DialogueOrchestrator::new(model.clone(), jobs.clone()),
            sessions: sessions.clone(),
            jobs,
        });
        let session_id = Uuid::new_v4();
        let held = sessions.context(session_id).await;
        held.append_exchange(Turn::user("hi"), Turn::assistant("hello"))
            .await;

        let response = app
            .clone()
            .oneshot(json_post("/api/v1/chat/clear", json!({"session_id": session_id})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(sessions.len().await, 0);
        assert_eq!(held.as_text().await, "");

        let response = app
            .oneshot(json_post(
                "/api/v1/chat/generate",
                json!({"prompt": "Tell me a joke.", "session_id": session_id}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(model.generate_prompts().last().unwrap(), "Tell me a joke.");
    }

    #[tokio::test]
    async fn test_anonymous_requests_do_not_grow_registry_unbounded() {
        let model = ScriptedModel::new(
            (0..20).flat_map(|_| [r#"{"intent": "other", "query": null}"#, "ok"]),
        );
        let jobs = Arc::new(StubJobs::unavailable());
        let sessions = SessionRegistry::with_limits(Duration::from_secs(60), 5);
        let app = build_router(AppState {
            orchestrator: DialogueOrchestrator::new(Arc::new(model), jobs.clone()),
            sessions: sessions.clone(),
            jobs,
        });

        for _ in 0..20 {
            let response = app
                .clone()
                .oneshot(json_post("/api/v1/chat/generate", json!({"prompt": "hello"})))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert_eq!(sessions.len().await, 5);
    }

    #[tokio::test]
    async fn test_history_of_unknown_session_is_not_found() {
        let (app, _) = app_with(ScriptedModel::new(Vec::<String>::new()), StubJobs::unavailable());
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/chat/history?session_id={}", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_jobs_endpoint_degrades_to_sentinel() {
        let (app, _) = app_with(ScriptedModel::new(Vec::<String>::new()), StubJobs::unavailable());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/jobs?query=rust%20engineer")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["job_listings"], crate::job_search::NO_RESULTS);
    }
}
