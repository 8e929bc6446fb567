//! End-to-end tests for `/api/generate` against a scripted provider.

mod common;

use axum::http::StatusCode;
use common::*;
use flashcard_service::config::GenerationSettings;
use flashcard_service::services::providers::mock::ScriptedTextProvider;
use flashcard_service::services::providers::ProviderError;
use std::sync::Arc;

const TOPIC_BODY: &str = r#"{"context":"The solar system","isFile":false,"lang":"en"}"#;

// ============================================================================
// Method handling and preflight
// ============================================================================

#[tokio::test]
async fn preflight_returns_204_with_empty_body() {
    // No provider configured: preflight must not depend on configuration.
    let response = send(app_with(None), request("OPTIONS")).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_cors_headers(&response);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn other_methods_are_rejected_with_405() {
    for method in ["GET", "PUT", "DELETE", "PATCH"] {
        let response = send(app_with(Some(scripted("[]"))), request(method)).await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert_cors_headers(&response);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Method Not Allowed");
    }
}

// ============================================================================
// Missing credential
// ============================================================================

#[tokio::test]
async fn missing_key_is_500_whatever_the_payload() {
    for body in [TOPIC_BODY, "{}", "not json at all", ""] {
        let response = send(app_with(None), post_json(body)).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{body}");
        assert_cors_headers(&response);
        assert_eq!(
            response.headers()["content-type"],
            "application/json"
        );
        let json = body_json(response).await;
        assert_eq!(json["error"], "Server API Key is missing");
    }
}

#[tokio::test]
async fn missing_key_is_500_for_bodies_past_the_default_transport_limit() {
    let body = large_document_body(3 * 1024 * 1024);
    let response = send(app_with(None), post_json(&body)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors_headers(&response);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Server API Key is missing");
}

// ============================================================================
// Success path
// ============================================================================

#[tokio::test]
async fn fenced_reply_becomes_card_array() {
    let provider = scripted("```json\n[{\"front\":\"Q\",\"back\":\"A\"}]\n```");
    let response = send(app_with(Some(provider)), post_json(TOPIC_BODY)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors_headers(&response);
    assert_eq!(response.headers()["content-type"], "application/json");

    let body = body_json(response).await;
    assert_eq!(body, serde_json::json!([{"front": "Q", "back": "A"}]));
}

#[tokio::test]
async fn returned_set_reserializes_to_same_shape() {
    let provider = scripted(
        r#"Sure! [{"front":"Mercury","back":"Closest planet"},{"front":"Mars","back":"Red planet"}] Enjoy."#,
    );
    let response = send(app_with(Some(provider)), post_json(TOPIC_BODY)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = body_bytes(response).await;
    let cards: Vec<flashcard_service::models::Flashcard> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].front, "Mercury");
    assert_eq!(cards[1].back, "Red planet");

    let again = serde_json::to_vec(&cards).unwrap();
    let original: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let reparsed: serde_json::Value = serde_json::from_slice(&again).unwrap();
    assert_eq!(original, reparsed);
}

// ============================================================================
// Prompt construction seen by the provider
// ============================================================================

#[tokio::test]
async fn card_count_is_clamped_in_prompt() {
    let cases = [(2, "Create 4 flashcards"), (20, "Create 10 flashcards"), (7, "Create 7 flashcards")];

    for (requested, expected) in cases {
        let provider = scripted("[]");
        let body = format!(r#"{{"context":"Rust","isFile":false,"lang":"en","cardCount":{requested}}}"#);
        let response = send(app_with(Some(provider.clone())), post_json(&body)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let prompt = provider.last_prompt().unwrap();
        assert!(prompt.starts_with(expected), "{requested}: {prompt}");
    }
}

#[tokio::test]
async fn default_count_is_five() {
    let provider = scripted("[]");
    send(app_with(Some(provider.clone())), post_json(TOPIC_BODY)).await;
    assert!(provider.last_prompt().unwrap().starts_with("Create 5 flashcards"));
}

#[tokio::test]
async fn lang_selects_output_language() {
    let english = scripted("[]");
    send(app_with(Some(english.clone())), post_json(TOPIC_BODY)).await;
    let prompt = english.last_prompt().unwrap();
    assert!(prompt.contains("Output language must be English"));
    assert!(!prompt.contains("Vietnamese"));

    let vietnamese = scripted("[]");
    send(
        app_with(Some(vietnamese.clone())),
        post_json(r#"{"context":"Hệ mặt trời","isFile":false,"lang":"vi"}"#),
    )
    .await;
    let prompt = vietnamese.last_prompt().unwrap();
    assert!(prompt.contains("Output language must be Vietnamese"));
    assert!(prompt.contains("Hệ mặt trời"));
}

#[tokio::test]
async fn file_mode_uses_extraction_prompt() {
    let provider = scripted("[]");
    send(
        app_with(Some(provider.clone())),
        post_json(r#"{"context":"Lecture notes on cells.","isFile":true,"lang":"en","cardCount":6}"#),
    )
    .await;

    let prompt = provider.last_prompt().unwrap();
    assert!(prompt.starts_with("Analyze this text and extract 6 key concepts"));
    assert!(prompt.contains("Lecture notes on cells."));
    assert_eq!(provider.prompts().len(), 1);
}

#[tokio::test]
async fn multi_megabyte_document_is_accepted_and_truncated() {
    let provider = scripted("[]");
    let body = large_document_body(3 * 1024 * 1024);
    let response = send(app_with(Some(provider.clone())), post_json(&body)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let prompt = provider.last_prompt().unwrap();
    assert!(prompt.contains(&"a".repeat(25_000)));
    assert!(!prompt.contains(&"a".repeat(25_001)));
}

// ============================================================================
// Error mapping
// ============================================================================

#[tokio::test]
async fn prose_reply_is_a_format_error() {
    let provider = scripted("I'm sorry, I can't create flashcards about that.");
    let response = send(app_with(Some(provider)), post_json(TOPIC_BODY)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors_headers(&response);
    let body = body_json(response).await;
    assert_eq!(body["error"], "AI output format error");
}

#[tokio::test]
async fn truncated_long_reply_is_a_format_error() {
    let mut reply = String::from("[");
    for _ in 0..20_000 {
        reply.push_str(r#"{"front":"x [","back":"y"},"#);
    }
    let response = send(app_with(Some(scripted(&reply))), post_json(TOPIC_BODY)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "AI output format error");
}

#[tokio::test]
async fn truncated_reply_with_bracketed_card_text_is_a_format_error() {
    let provider = scripted(r#"[{"front":"Primes","back":"[2, 3, 5]"},{"front":"x","ba"#);
    let response = send(app_with(Some(provider)), post_json(TOPIC_BODY)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "AI output format error");
}

#[tokio::test]
async fn quota_errors_become_429() {
    let providers = [
        Arc::new(ScriptedTextProvider::failing_with(|| ProviderError::RateLimited)),
        Arc::new(ScriptedTextProvider::failing(
            "Gemini API error 403: You exceeded your current quota",
        )),
    ];

    for provider in providers {
        let response = send(app_with(Some(provider)), post_json(TOPIC_BODY)).await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_cors_headers(&response);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("try again later"));
    }
}

#[tokio::test]
async fn invalid_key_reports_credential_problem() {
    let provider = Arc::new(ScriptedTextProvider::failing(
        "Gemini API error 400 Bad Request: API key not valid. Please pass a valid API key.",
    ));
    let response = send(app_with(Some(provider)), post_json(TOPIC_BODY)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Server API Key is invalid or expired");
}

#[tokio::test]
async fn other_failures_are_server_errors() {
    let provider = Arc::new(ScriptedTextProvider::failing_with(|| {
        ProviderError::NetworkError("connection refused".into())
    }));
    let response = send(app_with(Some(provider)), post_json(TOPIC_BODY)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Server Error: Network error: connection refused");
}

#[tokio::test]
async fn malformed_body_is_a_server_error() {
    let response = send(app_with(Some(scripted("[]"))), post_json("{\"context\": ")).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Server Error: invalid request body"));
}

#[tokio::test]
async fn body_over_configured_limit_is_a_json_server_error() {
    let settings = GenerationSettings {
        max_body_bytes: 1024,
        ..GenerationSettings::default()
    };
    let app = app_with_settings(Some(scripted("[]")), settings);
    let response = send(app, post_json(&large_document_body(4096))).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors_headers(&response);
    assert_eq!(response.headers()["content-type"], "application/json");
    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Server Error: failed to read request body"));
}

#[tokio::test]
async fn responses_carry_request_id() {
    let response = send(app_with(None), request("OPTIONS")).await;
    assert!(response.headers().contains_key("x-request-id"));
}
