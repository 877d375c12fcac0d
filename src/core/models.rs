//! Transport records shared by the relay and the client.
//!
//! These are wire shapes, not domain objects: the backend owns every durable
//! record and the relay forwards them without interpretation beyond a shape
//! check.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Documents
// ============================================================================

/// A processed document as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// May be null in a backend listing. Such a document cannot be deleted.
    #[serde(default)]
    pub id: Option<String>,
    pub filename: String,
    #[serde(default)]
    pub chunks_count: u64,
    /// Backend timestamp, kept verbatim. See [`Document::uploaded_at`].
    #[serde(default)]
    pub upload_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Document {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Parse the upload timestamp.
    ///
    /// The backend emits either RFC 3339 or a naive ISO-8601 timestamp
    /// (treated as UTC). Returns `None` for anything else.
    pub fn uploaded_at(&self) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(&self.upload_date) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.upload_date, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// `GET /api/documents` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentList {
    #[serde(default)]
    pub documents: Vec<Document>,
}

/// `DELETE /api/documents/{id}` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// Backend acknowledgement for an upload. Every field is optional so that a
/// backend returning a different metadata shape still parses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub chunks_count: Option<u64>,
    #[serde(default)]
    pub processing_time: Option<f64>,
}

// ============================================================================
// Chat
// ============================================================================

/// `POST /api/chat` request.
///
/// `question` defaults to empty when absent so the relay can reject a missing
/// question with its own 400 instead of a deserialization failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl ChatRequest {
    pub fn new(question: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            session_id: Some(session_id.into()),
        }
    }

    /// True when the question is empty or whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.question.trim().is_empty()
    }
}

/// A retrieval citation attached to an answer. Opaque display data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Source {
    pub fn document_id(&self) -> Option<&str> {
        self.metadata.get("document_id").and_then(Value::as_str)
    }

    pub fn chunk_index(&self) -> Option<i64> {
        self.metadata.get("chunk_index").and_then(Value::as_i64)
    }

    pub fn filename(&self) -> Option<&str> {
        self.metadata.get("filename").and_then(Value::as_str)
    }

    /// First `max_chars` characters of the excerpt, with an ellipsis when cut.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let mut chars = self.content.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }
}

/// `POST /api/chat` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the client's conversation log. Append-only within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub processing_time: Option<f64>,
    /// Synthetic assistant message standing in for a failed answer.
    #[serde(default)]
    pub is_error: bool,
    /// Whether the rating control is expanded.
    #[serde(default)]
    pub feedback_open: bool,
    /// Rating already submitted for this answer.
    #[serde(default)]
    pub rating: Option<u8>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            sources: Vec::new(),
            processing_time: None,
            is_error: false,
            feedback_open: false,
            rating: None,
        }
    }

    pub fn assistant(response: ChatResponse) -> Self {
        Self {
            role: Role::Assistant,
            content: response.answer,
            sources: response.sources,
            processing_time: response.processing_time,
            is_error: false,
            feedback_open: false,
            rating: None,
        }
    }

    pub fn assistant_error(content: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::assistant(ChatResponse {
                answer: content.into(),
                sources: Vec::new(),
                processing_time: None,
            })
        }
    }

    /// Only real answers can be rated, and only once.
    pub fn can_rate(&self) -> bool {
        self.role == Role::Assistant && !self.is_error && self.rating.is_none()
    }
}

// ============================================================================
// Feedback
// ============================================================================

/// `POST /api/feedback` request. `rating` is intended to be 1-5 but is not
/// range-checked here; the backend owns that rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub question: String,
    pub answer: String,
    pub rating: i64,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_text: Option<String>,
}

// ============================================================================
// Analysis
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    FinancialMetrics,
}

/// `POST /api/generate-chart` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRequest {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

// ============================================================================
// Misc
// ============================================================================

/// Body of every non-success relay response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
