use tracing::{debug, warn};

use crate::error::{Result, ZepError};
use crate::http::{query, HttpClient, Query};
use crate::models::{
    ApiAck, CollectionRequest, Document, DocumentCollection, DocumentSearchPayload,
    DocumentSearchResultPage, GetDocumentsRequest, SearchType, UpdateDocumentRequest,
};

use super::require_id;

/// Documents per upload request
pub const DOCUMENT_BATCH_SIZE: usize = 1000;
/// Uploads larger than this log a warning
pub const LARGE_BATCH_WARNING_LIMIT: usize = 5000;

const MIN_COLLECTION_NAME: usize = 5;
const MAX_COLLECTION_NAME: usize = 45;

/// A limit of zero means "server default" and is left off the request.
fn search_query(limit: Option<u32>) -> Query {
    query([("limit", limit.filter(|n| *n > 0).map(|n| n.to_string()))])
}

/// Collection names are 5-45 ASCII alphanumerics, `_` or `-`.
pub fn validate_collection_name(name: &str) -> Result<&str> {
    let len = name.chars().count();
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !(MIN_COLLECTION_NAME..=MAX_COLLECTION_NAME).contains(&len) || !valid_chars {
        return Err(ZepError::InvalidArgument(format!(
            "collection name must be {}-{} characters of letters, digits, '_' or '-': {:?}",
            MIN_COLLECTION_NAME, MAX_COLLECTION_NAME, name
        )));
    }
    Ok(name)
}

/// Vector-store collections and their documents
#[derive(Debug, Clone)]
pub struct DocumentClient {
    http: HttpClient,
}

impl DocumentClient {
    pub(crate) fn new(http: HttpClient) -> Self {
        Self { http }
    }

    // ========================================================================
    // Collections
    // ========================================================================

    pub async fn add_collection(
        &self,
        name: &str,
        description: Option<&str>,
        metadata: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<DocumentCollection> {
        let name = validate_collection_name(name)?;
        let body = CollectionRequest {
            description: description.map(String::from),
            metadata,
        };
        self.http.post(&["collections", name], &body).await
    }

    pub async fn get_collection(&self, name: &str) -> Result<DocumentCollection> {
        let name = validate_collection_name(name)?;
        self.http.get(&["collections", name]).await
    }

    pub async fn update_collection(
        &self,
        name: &str,
        description: Option<&str>,
        metadata: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<DocumentCollection> {
        let name = validate_collection_name(name)?;
        let body = CollectionRequest {
            description: description.map(String::from),
            metadata,
        };
        self.http.patch(&["collections", name], &body).await
    }

    pub async fn delete_collection(&self, name: &str) -> Result<ApiAck> {
        let name = validate_collection_name(name)?;
        let ack: Option<ApiAck> = self.http.delete(&["collections", name]).await?;
        Ok(ack.unwrap_or_default())
    }

    pub async fn list_collections(&self) -> Result<Vec<DocumentCollection>> {
        let collections: Option<Vec<DocumentCollection>> = self.http.get(&["collections"]).await?;
        Ok(collections.unwrap_or_default())
    }

    // ========================================================================
    // Documents
    // ========================================================================

    /// Upload documents in batches, returning their uuids in input order.
    pub async fn add_documents(&self, collection: &str, documents: &[Document]) -> Result<Vec<String>> {
        let collection = validate_collection_name(collection)?;
        if documents.is_empty() {
            return Err(ZepError::InvalidArgument("documents must not be empty".to_string()));
        }
        if let Some(i) = documents.iter().position(|d| d.content.trim().is_empty()) {
            return Err(ZepError::InvalidArgument(format!(
                "document at index {} has empty content",
                i
            )));
        }
        if documents.len() > LARGE_BATCH_WARNING_LIMIT {
            warn!(
                count = documents.len(),
                "uploading a large number of documents; consider splitting the upload"
            );
        }

        let mut uuids = Vec::with_capacity(documents.len());
        for (i, batch) in documents.chunks(DOCUMENT_BATCH_SIZE).enumerate() {
            debug!(collection, batch = i, size = batch.len(), "uploading documents");
            let batch_uuids: Option<Vec<String>> = self
                .http
                .post(&["collections", collection, "documents"], batch)
                .await?;
            uuids.extend(batch_uuids.unwrap_or_default());
        }
        Ok(uuids)
    }

    pub async fn get_document(&self, collection: &str, uuid: &str) -> Result<Document> {
        let collection = validate_collection_name(collection)?;
        let uuid = require_id(uuid, "uuid")?;
        self.http
            .get(&["collections", collection, "documents", "uuid", uuid])
            .await
    }

    pub async fn update_document(
        &self,
        collection: &str,
        uuid: &str,
        request: &UpdateDocumentRequest,
    ) -> Result<ApiAck> {
        let collection = validate_collection_name(collection)?;
        let uuid = require_id(uuid, "uuid")?;
        let ack: Option<ApiAck> = self
            .http
            .patch(&["collections", collection, "documents", "uuid", uuid], request)
            .await?;
        Ok(ack.unwrap_or_default())
    }

    pub async fn delete_document(&self, collection: &str, uuid: &str) -> Result<ApiAck> {
        let collection = validate_collection_name(collection)?;
        let uuid = require_id(uuid, "uuid")?;
        let ack: Option<ApiAck> = self
            .http
            .delete(&["collections", collection, "documents", "uuid", uuid])
            .await?;
        Ok(ack.unwrap_or_default())
    }

    pub async fn get_documents(&self, collection: &str, uuids: &[String]) -> Result<Vec<Document>> {
        let collection = validate_collection_name(collection)?;
        if uuids.is_empty() {
            return Err(ZepError::InvalidArgument("uuids must not be empty".to_string()));
        }
        if uuids.len() > LARGE_BATCH_WARNING_LIMIT {
            warn!(
                count = uuids.len(),
                "fetching a large number of documents; consider fewer uuids per request"
            );
        }
        let documents: Option<Vec<Document>> = self
            .http
            .post(
                &["collections", collection, "documents", "list", "get"],
                &GetDocumentsRequest { uuids },
            )
            .await?;
        Ok(documents.unwrap_or_default())
    }

    // ========================================================================
    // Search
    // ========================================================================

    pub async fn search(
        &self,
        collection: &str,
        payload: &DocumentSearchPayload,
        limit: Option<u32>,
    ) -> Result<Vec<Document>> {
        Ok(self.search_page(collection, payload, limit).await?.results)
    }

    /// Search results together with the embedding of the query text
    pub async fn search_with_query_vector(
        &self,
        collection: &str,
        payload: &DocumentSearchPayload,
        limit: Option<u32>,
    ) -> Result<(Vec<Document>, Vec<f32>)> {
        let page = self.search_page(collection, payload, limit).await?;
        Ok((page.results, page.query_vector))
    }

    async fn search_page(
        &self,
        collection: &str,
        payload: &DocumentSearchPayload,
        limit: Option<u32>,
    ) -> Result<DocumentSearchResultPage> {
        let collection = validate_collection_name(collection)?;
        let has_text = payload.text.as_deref().is_some_and(|t| !t.trim().is_empty());
        let has_metadata = payload.metadata.as_ref().is_some_and(|m| !m.is_empty());
        if !has_text && !has_metadata {
            return Err(ZepError::InvalidArgument(
                "search requires text or metadata".to_string(),
            ));
        }
        if let Some(lambda) = payload.mmr_lambda {
            if payload.search_type != SearchType::Mmr {
                return Err(ZepError::InvalidArgument(
                    "mmr_lambda requires the mmr search type".to_string(),
                ));
            }
            if !(0.0..=1.0).contains(&lambda) {
                return Err(ZepError::InvalidArgument(
                    "mmr_lambda must be between 0 and 1".to_string(),
                ));
            }
        }

        let q = search_query(limit);
        let page: Option<Option<DocumentSearchResultPage>> = self
            .http
            .post_optional(&["collections", collection, "search"], &q, payload)
            .await?;
        Ok(page.flatten().unwrap_or_default())
    }
}
