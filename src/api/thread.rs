use tracing::debug;

use crate::error::{Result, ZepError};
use crate::http::{query, HttpClient};
use crate::models::{
    AddThreadMessagesRequest, AddThreadMessagesResponse, ApiAck, ContextMode, CreateThreadRequest,
    Message, MessageListResponse, RoleType, Thread, ThreadContextResponse, ThreadListResponse,
    UpdateMessageRequest,
};

use super::require_id;

/// Thread (conversation) operations
#[derive(Debug, Clone)]
pub struct ThreadClient {
    http: HttpClient,
}

impl ThreadClient {
    pub(crate) fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn create(&self, thread_id: &str, user_id: &str) -> Result<Thread> {
        let body = CreateThreadRequest {
            thread_id: require_id(thread_id, "thread_id")?.to_string(),
            user_id: require_id(user_id, "user_id")?.to_string(),
        };
        self.http.post(&["threads"], &body).await
    }

    pub async fn list_all(
        &self,
        page_number: Option<u32>,
        page_size: Option<u32>,
        order_by: Option<&str>,
        asc: Option<bool>,
    ) -> Result<ThreadListResponse> {
        let q = query([
            ("page_number", page_number.map(|n| n.to_string())),
            ("page_size", page_size.map(|n| n.to_string())),
            ("order_by", order_by.map(String::from)),
            ("asc", asc.map(|b| b.to_string())),
        ]);
        self.http.get_with_query(&["threads"], &q).await
    }

    pub async fn delete(&self, thread_id: &str) -> Result<ApiAck> {
        let thread_id = require_id(thread_id, "thread_id")?;
        let ack: Option<ApiAck> = self.http.delete(&["threads", thread_id]).await?;
        Ok(ack.unwrap_or_default())
    }

    /// Context block for the user that owns this thread.
    pub async fn get_user_context(
        &self,
        thread_id: &str,
        min_rating: Option<f64>,
        mode: Option<ContextMode>,
    ) -> Result<ThreadContextResponse> {
        let thread_id = require_id(thread_id, "thread_id")?;
        let q = query([
            ("min_rating", min_rating.map(|r| r.to_string())),
            ("mode", mode.map(|m| m.as_str().to_string())),
        ]);
        self.http
            .get_with_query(&["threads", thread_id, "context"], &q)
            .await
    }

    /// Messages in a thread; `lastn` takes the most recent n instead of paging.
    pub async fn get(
        &self,
        thread_id: &str,
        limit: Option<u32>,
        cursor: Option<u64>,
        lastn: Option<u32>,
    ) -> Result<MessageListResponse> {
        let thread_id = require_id(thread_id, "thread_id")?;
        let q = query([
            ("limit", limit.map(|n| n.to_string())),
            ("cursor", cursor.map(|n| n.to_string())),
            ("lastn", lastn.map(|n| n.to_string())),
        ]);
        self.http
            .get_with_query(&["threads", thread_id, "messages"], &q)
            .await
    }

    pub async fn add_messages(
        &self,
        thread_id: &str,
        messages: &[Message],
        ignore_roles: Option<&[RoleType]>,
        return_context: Option<bool>,
    ) -> Result<AddThreadMessagesResponse> {
        self.post_messages(thread_id, "messages", messages, ignore_roles, return_context)
            .await
    }

    /// Bulk import; messages are ingested concurrently on the server.
    pub async fn add_messages_batch(
        &self,
        thread_id: &str,
        messages: &[Message],
        return_context: Option<bool>,
    ) -> Result<AddThreadMessagesResponse> {
        self.post_messages(thread_id, "messages-batch", messages, None, return_context)
            .await
    }

    /// Replace the metadata of one message, returning the updated message.
    pub async fn update_message(
        &self,
        thread_id: &str,
        message_uuid: &str,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Message> {
        let thread_id = require_id(thread_id, "thread_id")?;
        let message_uuid = require_id(message_uuid, "message_uuid")?;
        let body = UpdateMessageRequest { metadata };
        self.http
            .patch(&["threads", thread_id, "messages", message_uuid], &body)
            .await
    }

    async fn post_messages(
        &self,
        thread_id: &str,
        endpoint: &str,
        messages: &[Message],
        ignore_roles: Option<&[RoleType]>,
        return_context: Option<bool>,
    ) -> Result<AddThreadMessagesResponse> {
        let thread_id = require_id(thread_id, "thread_id")?;
        if messages.is_empty() {
            return Err(ZepError::InvalidArgument(
                "messages must contain at least one message".to_string(),
            ));
        }
        debug!(thread_id, count = messages.len(), endpoint, "adding messages");

        let body = AddThreadMessagesRequest {
            messages,
            ignore_roles,
            return_context,
        };
        let response: Option<AddThreadMessagesResponse> = self
            .http
            .post(&["threads", thread_id, endpoint], &body)
            .await?;
        Ok(response.unwrap_or_default())
    }
}
