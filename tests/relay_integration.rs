//! End-to-end relay tests.
//!
//! Each test starts a wiremock server standing in for the RAG backend and a
//! real relay on an ephemeral port, then talks to the relay over HTTP.
//!
//! ```bash
//! cargo test --test relay_integration
//! ```

mod common;

use std::time::Duration;

use finqa::relay::{BackendClient, RelayService};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

use common::{http, start_relay};

// ============================================================================
// Chat
// ============================================================================

#[tokio::test]
async fn test_chat_forwards_question_and_returns_answer_verbatim() {
    let env = start_relay().await;
    let backend_answer = json!({
        "answer": "Total revenue for 2025 was $4.2B, up 12% year over year.",
        "sources": [{
            "content": "Consolidated revenue reached $4.2 billion...",
            "page": 3,
            "score": 0.91,
            "metadata": {"document_id": "doc-1", "chunk_index": 7, "filename": "annual-2025.pdf"}
        }],
        "processing_time": 1.4,
        "model": "kept-as-is"
    });

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({
            "question": "What is the total revenue for 2025?",
            "session_id": "abc123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&backend_answer))
        .expect(1)
        .mount(&env.backend)
        .await;

    let response = http()
        .post(env.endpoint("/api/chat"))
        .json(&json!({"question": "What is the total revenue for 2025?", "session_id": "abc123"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, backend_answer);
}

#[tokio::test]
async fn test_chat_backend_error_message_is_wrapped() {
    let env = start_relay().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "X"})))
        .mount(&env.backend)
        .await;

    let response = http()
        .post(env.endpoint("/api/chat"))
        .json(&json!({"question": "Net margin?"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Chat failed: 500 - X");
}

#[tokio::test]
async fn test_chat_non_json_backend_error_uses_status_reason() {
    let env = start_relay().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&env.backend)
        .await;

    let response = http()
        .post(env.endpoint("/api/chat"))
        .json(&json!({"question": "Net margin?"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Chat failed: 502 - Bad Gateway");
}

#[tokio::test]
async fn test_chat_blank_question_is_rejected_without_backend_call() {
    let env = start_relay().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&env.backend)
        .await;

    for payload in [json!({}), json!({"question": "   "})] {
        let response = http()
            .post(env.endpoint("/api/chat"))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Question is required");
    }
}

#[tokio::test]
async fn test_unreachable_backend_is_500() {
    // Reserve a port, then free it so nothing listens there.
    let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let backend_uri = format!("http://{}", closed.local_addr().unwrap());
    drop(closed);

    let client = BackendClient::new(&backend_uri, Duration::from_secs(2)).unwrap();
    let mut relay = RelayService::new("127.0.0.1", 0, client, common::MAX_UPLOAD_BYTES);
    let addr = relay.start().await.unwrap();

    let response = http()
        .get(format!("http://{addr}/api/documents"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("List documents failed"));
    relay.stop().await;
}

// ============================================================================
// Documents
// ============================================================================

#[tokio::test]
async fn test_list_documents_verbatim() {
    let env = start_relay().await;
    let listing = json!({
        "documents": [{
            "id": "doc-1",
            "filename": "q3-report.pdf",
            "chunks_count": 42,
            "upload_date": "2025-10-01T09:30:00",
            "status": "processed"
        }]
    });
    Mock::given(method("GET"))
        .and(path("/api/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&listing))
        .mount(&env.backend)
        .await;

    let body: Value = http()
        .get(env.endpoint("/api/documents"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, listing);
}

#[tokio::test]
async fn test_list_documents_with_null_id_is_relayed() {
    let env = start_relay().await;
    let listing = json!({
        "documents": [
            {"id": null, "filename": "a.pdf", "chunks_count": 3, "upload_date": "2025-10-01T09:30:00"},
            {"id": "doc-2", "filename": "b.pdf", "chunks_count": 7, "upload_date": "2025-10-02T09:30:00"}
        ]
    });
    Mock::given(method("GET"))
        .and(path("/api/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&listing))
        .mount(&env.backend)
        .await;

    let response = http().get(env.endpoint("/api/documents")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, listing);
}

#[tokio::test]
async fn test_delete_document_with_empty_backend_body() {
    let env = start_relay().await;
    Mock::given(method("DELETE"))
        .and(path("/api/documents/doc-42"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&env.backend)
        .await;

    let response = http()
        .delete(env.endpoint("/api/documents/doc-42"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"success": true}));
}

#[tokio::test]
async fn test_delete_document_with_json_backend_body() {
    let env = start_relay().await;
    Mock::given(method("DELETE"))
        .and(path("/api/documents/doc-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deleted": "doc-42"})))
        .mount(&env.backend)
        .await;

    let body: Value = http()
        .delete(env.endpoint("/api/documents/doc-42"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({"success": true}));
}

#[tokio::test]
async fn test_delete_missing_document_is_500_with_backend_detail() {
    let env = start_relay().await;
    Mock::given(method("DELETE"))
        .and(path("/api/documents/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Document not found"})))
        .mount(&env.backend)
        .await;

    let response = http()
        .delete(env.endpoint("/api/documents/nope"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Delete document failed: 404 - Document not found");
}

// ============================================================================
// Methods and routes
// ============================================================================

#[tokio::test]
async fn test_wrong_method_is_405_with_allow_header() {
    let env = start_relay().await;

    let cases = [
        (reqwest::Method::GET, "/api/chat", "POST"),
        (reqwest::Method::PUT, "/api/upload", "POST"),
        (reqwest::Method::POST, "/api/documents", "GET"),
        (reqwest::Method::GET, "/api/documents/doc-1", "DELETE"),
        (reqwest::Method::DELETE, "/api/feedback", "POST"),
    ];

    for (verb, route, allow) in cases {
        let response = http()
            .request(verb.clone(), env.endpoint(route))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{verb} {route}");
        assert_eq!(response.headers()["allow"], allow, "{verb} {route}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Method not allowed");
    }
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let env = start_relay().await;
    let response = http().get(env.endpoint("/api/nothing")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("/api/nothing"));
}

#[tokio::test]
async fn test_health_does_not_touch_backend() {
    let env = start_relay().await;
    let response = http().get(env.endpoint("/api/health")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert!(env.backend.received_requests().await.unwrap().is_empty());
}

// ============================================================================
// Upload
// ============================================================================

#[tokio::test]
async fn test_upload_without_file_is_400_and_backend_untouched() {
    let env = start_relay().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&env.backend)
        .await;

    let form = Form::new().text("note", "no file here");
    let response = http()
        .post(env.endpoint("/api/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No file provided");
}

#[tokio::test]
async fn test_upload_forwards_filename_and_content_type() {
    let env = start_relay().await;
    let receipt = json!({
        "message": "Document processed",
        "filename": "q3-report.pdf",
        "chunks_count": 18,
        "processing_time": 3.2
    });
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"q3-report.pdf\""))
        .and(body_string_contains("application/pdf"))
        .and(body_string_contains("%PDF-1.7 fake"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&receipt))
        .expect(1)
        .mount(&env.backend)
        .await;

    let part = Part::bytes(b"%PDF-1.7 fake".to_vec())
        .file_name("q3-report.pdf")
        .mime_str("application/pdf")
        .unwrap();
    let response = http()
        .post(env.endpoint("/api/upload"))
        .multipart(Form::new().part("file", part))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, receipt);
}

#[tokio::test]
async fn test_oversized_upload_is_413_and_backend_untouched() {
    let env = start_relay().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&env.backend)
        .await;

    let part = Part::bytes(vec![b'x'; common::MAX_UPLOAD_BYTES + 10])
        .file_name("huge.pdf")
        .mime_str("application/pdf")
        .unwrap();
    let response = http()
        .post(env.endpoint("/api/upload"))
        .multipart(Form::new().part("file", part))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        format!("File is too large (limit {} bytes)", common::MAX_UPLOAD_BYTES)
    );
}

#[tokio::test]
async fn test_upload_backend_rejection_is_500() {
    let env = start_relay().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"detail": "Only PDF files are supported"})))
        .mount(&env.backend)
        .await;

    let part = Part::bytes(b"plain".to_vec()).file_name("notes.txt");
    let response = http()
        .post(env.endpoint("/api/upload"))
        .multipart(Form::new().part("file", part))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Upload failed: 422 - Only PDF files are supported");
}

// ============================================================================
// Feedback and charts
// ============================================================================

#[tokio::test]
async fn test_feedback_forwarded_verbatim() {
    let env = start_relay().await;
    let feedback = json!({
        "question": "What is the total revenue for 2025?",
        "answer": "$4.2B",
        "rating": 9,
        "session_id": "abc123"
    });
    Mock::given(method("POST"))
        .and(path("/api/feedback"))
        .and(body_json(&feedback))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "recorded"})))
        .expect(1)
        .mount(&env.backend)
        .await;

    let response = http()
        .post(env.endpoint("/api/feedback"))
        .json(&feedback)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "recorded");
}

#[tokio::test]
async fn test_generate_chart_forwards_to_analysis_router() {
    let env = start_relay().await;
    let request = json!({
        "type": "bar",
        "data": {"labels": ["Q1", "Q2"], "values": [1.2, 1.5]},
        "title": "Quarterly revenue"
    });
    let chart = json!({"chart": {"data": [], "layout": {"title": "Quarterly revenue"}}});

    Mock::given(method("POST"))
        .and(path("/analysis/generate-chart"))
        .and(body_json(&request))
        .respond_with(ResponseTemplate::new(200).set_body_json(&chart))
        .expect(1)
        .mount(&env.backend)
        .await;

    let body: Value = http()
        .post(env.endpoint("/api/generate-chart"))
        .json(&request)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, chart);
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let env = start_relay().await;
    let response = http()
        .post(env.endpoint("/api/feedback"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}
