use serde_json::Value;

use crate::client::Zep;
use crate::error::Result;
use crate::models::{
    CollectionSummary, CollectionsData, DocumentSearchPayload, DocumentsData, SearchType,
    SuccessResponse,
};

/// List collections with their embedding status
pub async fn list_collections(zep: &Zep) -> Result<Value> {
    let collections = zep.document().list_collections().await?;
    let summaries: Vec<CollectionSummary> = collections.iter().map(CollectionSummary::from).collect();
    let count = summaries.len();
    Ok(serde_json::to_value(SuccessResponse::new(CollectionsData {
        collections: summaries,
        count,
    }))?)
}

pub async fn create_collection(zep: &Zep, name: &str, description: Option<&str>) -> Result<Value> {
    let collection = zep
        .document()
        .add_collection(name, description, None)
        .await?;
    Ok(serde_json::to_value(SuccessResponse::new(CollectionSummary::from(
        &collection,
    )))?)
}

pub async fn search_documents(
    zep: &Zep,
    collection: &str,
    text: &str,
    limit: Option<u32>,
    search_type: SearchType,
    mmr_lambda: Option<f64>,
) -> Result<Value> {
    let payload = DocumentSearchPayload {
        search_type,
        mmr_lambda,
        ..DocumentSearchPayload::text(text)
    };
    let documents = zep.document().search(collection, &payload, limit).await?;
    let count = documents.len();
    Ok(serde_json::to_value(SuccessResponse::new(DocumentsData {
        documents,
        count,
    }))?)
}
