use serde_json::Value;
use uuid::Uuid;

use crate::client::Zep;
use crate::error::Result;
use crate::models::{
    AddMessageData, ContextMode, DeletedData, Message, MessagesData, RoleType, SuccessResponse,
    ThreadContextData,
};

/// Create a thread, generating a UUID when no ID was given
pub async fn create_thread(zep: &Zep, thread_id: Option<&str>, user_id: &str) -> Result<Value> {
    let thread_id = thread_id
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let thread = zep.thread().create(&thread_id, user_id).await?;
    Ok(serde_json::to_value(SuccessResponse::new(thread))?)
}

pub async fn list_threads(
    zep: &Zep,
    page: Option<u32>,
    page_size: Option<u32>,
    order_by: Option<&str>,
    asc: bool,
) -> Result<Value> {
    let asc = if asc { Some(true) } else { None };
    let threads = zep.thread().list_all(page, page_size, order_by, asc).await?;
    Ok(serde_json::to_value(SuccessResponse::new(threads))?)
}

pub async fn delete_thread(zep: &Zep, thread_id: &str) -> Result<Value> {
    zep.thread().delete(thread_id).await?;
    Ok(serde_json::to_value(SuccessResponse::new(DeletedData {
        deleted: thread_id.to_string(),
    }))?)
}

/// Context block for a thread; empty when the server has none yet
pub async fn thread_context(
    zep: &Zep,
    thread_id: &str,
    min_rating: Option<f64>,
    mode: Option<ContextMode>,
) -> Result<Value> {
    let response = zep
        .thread()
        .get_user_context(thread_id, min_rating, mode)
        .await?;
    Ok(serde_json::to_value(SuccessResponse::new(ThreadContextData {
        thread_id: thread_id.to_string(),
        context: response.context.unwrap_or_default(),
    }))?)
}

pub async fn thread_messages(
    zep: &Zep,
    thread_id: &str,
    limit: Option<u32>,
    cursor: Option<u64>,
    lastn: Option<u32>,
) -> Result<Value> {
    let response = zep.thread().get(thread_id, limit, cursor, lastn).await?;
    let count = response.messages.len();
    Ok(serde_json::to_value(SuccessResponse::new(MessagesData {
        messages: response.messages,
        count,
    }))?)
}

pub async fn add_message(
    zep: &Zep,
    thread_id: &str,
    role: RoleType,
    content: &str,
    name: Option<&str>,
    return_context: bool,
) -> Result<Value> {
    let mut message = Message::new(role, content);
    if let Some(name) = name {
        message = message.with_name(name);
    }
    let return_context = if return_context { Some(true) } else { None };
    let response = zep
        .thread()
        .add_messages(thread_id, &[message], None, return_context)
        .await?;
    Ok(serde_json::to_value(SuccessResponse::new(AddMessageData {
        message_uuids: response.message_uuids,
        context: response.context,
    }))?)
}

// ============================================================================
// Tests
// ============================================================================
