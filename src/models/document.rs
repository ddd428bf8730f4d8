//! Document collection models.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ZepError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentCollection {
    #[serde(default)]
    pub uuid: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub embedding_dimensions: Option<u32>,
    #[serde(default)]
    pub is_auto_embedded: Option<bool>,
    #[serde(default)]
    pub is_indexed: Option<bool>,
    #[serde(default)]
    pub document_count: Option<u64>,
    #[serde(default)]
    pub document_embedded_count: Option<u64>,
}

impl DocumentCollection {
    /// `ready` once every document is embedded, otherwise `pending`
    pub fn status(&self) -> &'static str {
        match (self.document_count, self.document_embedded_count) {
            (Some(total), Some(embedded)) if total > 0 && total == embedded => "ready",
            _ => "pending",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_embedded: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_document_id(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateDocumentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    Similarity,
    Mmr,
}

impl FromStr for SearchType {
    type Err = ZepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "similarity" => Ok(Self::Similarity),
            "mmr" => Ok(Self::Mmr),
            _ => Err(ZepError::InvalidSearchType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentSearchPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    pub search_type: SearchType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mmr_lambda: Option<f64>,
}

impl DocumentSearchPayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentSearchResultPage {
    #[serde(default)]
    pub results: Vec<Document>,
    #[serde(default)]
    pub query_vector: Vec<f32>,
    #[serde(default)]
    pub result_count: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u64>,
    #[serde(default)]
    pub current_page: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetDocumentsRequest<'a> {
    pub uuids: &'a [String],
}
