//! HTTP client against a live relay backed by a mock RAG backend.

mod common;

use std::time::Duration;

use finqa::client::{ApiError, AssistantApi, HttpAssistantApi, UploadFile};
use finqa::core::models::{ChartKind, ChartRequest, ChatRequest, FeedbackRequest};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

use common::{start_relay, TestRelay};

fn client(env: &TestRelay) -> HttpAssistantApi {
    HttpAssistantApi::new(&env.url, Duration::from_secs(10)).unwrap()
}

#[tokio::test]
async fn test_chat_round_trip() {
    let env = start_relay().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({"question": "EBITDA in Q3?", "session_id": "abc123"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "EBITDA was $310M.",
            "sources": [{
                "content": "EBITDA for the third quarter was $310 million",
                "page": 12,
                "score": 0.88,
                "metadata": {"filename": "q3.pdf", "chunk_index": 4}
            }]
        })))
        .mount(&env.backend)
        .await;

    let response = client(&env)
        .chat(ChatRequest::new("EBITDA in Q3?", "abc123"))
        .await
        .unwrap();

    assert_eq!(response.answer, "EBITDA was $310M.");
    assert_eq!(response.sources.len(), 1);
    assert_eq!(response.sources[0].page, 12);
    assert_eq!(response.sources[0].filename(), Some("q3.pdf"));
    assert_eq!(response.sources[0].chunk_index(), Some(4));
    assert!(response.processing_time.is_none());
}

#[tokio::test]
async fn test_relay_error_surfaces_message() {
    let env = start_relay().await;
    Mock::given(method("GET"))
        .and(path("/api/documents"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"detail": "maintenance"})))
        .mount(&env.backend)
        .await;

    let err = client(&env).list_documents().await.unwrap_err();
    match err {
        ApiError::Relay { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "List documents failed: 503 - maintenance");
        }
        other => panic!("expected relay error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_list_and_delete_documents() {
    let env = start_relay().await;
    Mock::given(method("GET"))
        .and(path("/api/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                {"id": "doc-1", "filename": "a.pdf", "chunks_count": 10, "upload_date": "2025-01-02T03:04:05"},
                {"id": "doc-42", "filename": "b.pdf", "chunks_count": 5, "upload_date": "2025-01-03T00:00:00Z"}
            ]
        })))
        .mount(&env.backend)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/documents/doc-42"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&env.backend)
        .await;

    let api = client(&env);
    let documents = api.list_documents().await.unwrap();
    assert_eq!(documents.len(), 2);
    assert!(documents.iter().all(|d| d.uploaded_at().is_some()));

    api.delete_document("doc-42".to_string()).await.unwrap();
}

#[tokio::test]
async fn test_list_documents_tolerates_missing_id() {
    let env = start_relay().await;
    Mock::given(method("GET"))
        .and(path("/api/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [{"id": null, "filename": "a.pdf", "chunks_count": 2, "upload_date": ""}]
        })))
        .mount(&env.backend)
        .await;

    let documents = client(&env).list_documents().await.unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].id, None);
    assert_eq!(documents[0].filename, "a.pdf");
}

#[tokio::test]
async fn test_upload_pdf() {
    let env = start_relay().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(body_string_contains("filename=\"10-k.pdf\""))
        .and(body_string_contains("application/pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Document processed",
            "filename": "10-k.pdf",
            "chunks_count": 64
        })))
        .expect(1)
        .mount(&env.backend)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("10-k.pdf");
    std::fs::write(&file_path, b"%PDF-1.4 annual report").unwrap();

    let file = UploadFile::from_path(&file_path).await.unwrap();
    let receipt = client(&env).upload(file).await.unwrap();
    assert_eq!(receipt.chunks_count, Some(64));
    assert_eq!(receipt.filename.as_deref(), Some("10-k.pdf"));
}

#[tokio::test]
async fn test_feedback_and_chart() {
    let env = start_relay().await;
    Mock::given(method("POST"))
        .and(path("/api/feedback"))
        .and(body_json(json!({
            "question": "EBITDA in Q3?",
            "answer": "EBITDA was $310M.",
            "rating": 5,
            "session_id": "abc123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&env.backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/analysis/generate-chart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"chart": {"data": []}})))
        .expect(1)
        .mount(&env.backend)
        .await;

    let api = client(&env);
    api.submit_feedback(FeedbackRequest {
        question: "EBITDA in Q3?".to_string(),
        answer: "EBITDA was $310M.".to_string(),
        rating: 5,
        session_id: Some("abc123".to_string()),
        feedback_text: None,
    })
    .await
    .unwrap();

    let mut data = serde_json::Map::new();
    data.insert("values".to_string(), json!([1, 2, 3]));
    let chart = api
        .generate_chart(ChartRequest {
            kind: ChartKind::Line,
            data,
            title: None,
        })
        .await
        .unwrap();
    assert!(chart.get("chart").is_some());
}
