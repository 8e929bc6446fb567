#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use flashcard_service::config::GenerationSettings;
use flashcard_service::services::extractor::BalancedArrayExtractor;
use flashcard_service::services::providers::mock::ScriptedTextProvider;
use flashcard_service::services::providers::TextProvider;
use flashcard_service::{build_router, AppState};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::util::ServiceExt;

pub const GENERATE_PATH: &str = "/api/generate";

/// Router wired to `provider`, or to no provider at all (missing key).
pub fn app_with(provider: Option<Arc<ScriptedTextProvider>>) -> Router {
    app_with_settings(provider, GenerationSettings::default())
}

pub fn app_with_settings(
    provider: Option<Arc<ScriptedTextProvider>>,
    settings: GenerationSettings,
) -> Router {
    let provider = provider.map(|p| p as Arc<dyn TextProvider>);
    build_router(AppState::new(
        provider,
        Arc::new(BalancedArrayExtractor),
        settings,
    ))
}

/// A document-mode body whose context is `chars` ASCII characters long.
pub fn large_document_body(chars: usize) -> String {
    format!(
        r#"{{"context":"{}","isFile":true,"lang":"en"}}"#,
        "a".repeat(chars)
    )
}

pub fn scripted(reply: &str) -> Arc<ScriptedTextProvider> {
    Arc::new(ScriptedTextProvider::replying(reply))
}

pub fn post_json(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(GENERATE_PATH)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn request(method: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(GENERATE_PATH)
        .body(Body::empty())
        .unwrap()
}

pub async fn send(app: Router, req: Request<Body>) -> Response<Body> {
    app.oneshot(req).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("response body is JSON")
}

pub fn assert_cors_headers<B>(response: &Response<B>) {
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
    assert_eq!(
        headers["access-control-allow-headers"],
        "Content-Type, Authorization"
    );
}
