use serde::Serialize;

use crate::logging::LogEntry;

use super::document::{Document, DocumentCollection};
use super::graph::{EntityEdge, EntityNode, Episode};
use super::message::{Message, Thread};
use super::user::User;

// ============================================================================
// Base Response Types
// ============================================================================

/// Wrapper for successful responses with data
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

// ============================================================================
// Thread Responses
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedData {
    pub deleted: String,
}

#[derive(Debug, Serialize)]
pub struct ThreadContextData {
    pub thread_id: String,
    pub context: String,
}

#[derive(Debug, Serialize)]
pub struct MessagesData {
    pub messages: Vec<Message>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct AddMessageData {
    pub message_uuids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

// ============================================================================
// Graph Responses
// ============================================================================

#[derive(Debug, Serialize)]
pub struct NodesData {
    pub nodes: Vec<EntityNode>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct EdgesData {
    pub edges: Vec<EntityEdge>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct EpisodesData {
    pub episodes: Vec<Episode>,
    pub count: usize,
}

/// Graph search results plus the rendered context block
#[derive(Debug, Serialize)]
pub struct GraphSearchData {
    pub edges: Vec<EntityEdge>,
    pub nodes: Vec<EntityNode>,
    pub episodes: Vec<Episode>,
    pub context: String,
}

// ============================================================================
// User Responses
// ============================================================================

#[derive(Debug, Serialize)]
pub struct UsersData {
    pub users: Vec<User>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ThreadsData {
    pub threads: Vec<Thread>,
    pub count: usize,
}

// ============================================================================
// Document Responses
// ============================================================================

/// One row of `collection-list`
#[derive(Debug, Serialize)]
pub struct CollectionSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: &'static str,
    pub document_count: u64,
}

impl From<&DocumentCollection> for CollectionSummary {
    fn from(collection: &DocumentCollection) -> Self {
        Self {
            name: collection.name.clone(),
            description: collection.description.clone(),
            status: collection.status(),
            document_count: collection.document_count.unwrap_or(0),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CollectionsData {
    pub collections: Vec<CollectionSummary>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct DocumentsData {
    pub documents: Vec<Document>,
    pub count: usize,
}

// ============================================================================
// Chat Responses
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ChatData {
    pub content: String,
    pub streamed: bool,
}

// ============================================================================
// Log Responses
// ============================================================================

/// Response for reading logs
#[derive(Debug, Serialize)]
pub struct LogsData {
    pub entries: Vec<LogEntry>,
    pub count: usize,
}

/// Response for clearing logs
#[derive(Debug, Serialize)]
pub struct ClearLogsData {
    pub cleared: usize,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response_serialization() {
        let response = SuccessResponse::new(DeletedData {
            deleted: "thread-1".to_string(),
        });

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"deleted\":\"thread-1\""));
    }

    #[test]
    fn test_error_response_serialization() {
        let response = ErrorResponse::new("Something went wrong");

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("\"error\":\"Something went wrong\""));
    }

    #[test]
    fn test_add_message_data_omits_missing_context() {
        let data = AddMessageData {
            message_uuids: vec!["m-1".to_string()],
            context: None,
        };
        let json = serde_json::to_string(&SuccessResponse::new(data)).unwrap();
        assert!(json.contains("\"message_uuids\":[\"m-1\"]"));
        assert!(!json.contains("context"));
    }

    #[test]
    fn test_graph_search_data_has_correct_fields() {
        let data = GraphSearchData {
            edges: vec![],
            nodes: vec![],
            episodes: vec![],
            context: "FACTS and ENTITIES".to_string(),
        };
        let json = serde_json::to_string(&SuccessResponse::new(data)).unwrap();
        assert!(json.contains("\"edges\":[]"));
        assert!(json.contains("\"context\""));
    }

    #[test]
    fn test_collection_summary_status() {
        let collection = DocumentCollection {
            name: "products".to_string(),
            document_count: Some(3),
            document_embedded_count: Some(3),
            ..Default::default()
        };
        let summary = CollectionSummary::from(&collection);
        assert_eq!(summary.status, "ready");
        assert_eq!(summary.document_count, 3);

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("description").is_none());
    }
}
