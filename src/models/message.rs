//! Thread and message models.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ZepError;

// ============================================================================
// RoleType
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
    NoRole,
    System,
    Assistant,
    User,
    Function,
    Tool,
}

impl RoleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoRole => "norole",
            Self::System => "system",
            Self::Assistant => "assistant",
            Self::User => "user",
            Self::Function => "function",
            Self::Tool => "tool",
        }
    }
}

impl FromStr for RoleType {
    type Err = ZepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "norole" => Ok(Self::NoRole),
            "system" => Ok(Self::System),
            "assistant" => Ok(Self::Assistant),
            "user" => Ok(Self::User),
            "function" => Ok(Self::Function),
            "tool" => Ok(Self::Tool),
            _ => Err(ZepError::InvalidRoleType(s.to_string())),
        }
    }
}

// ============================================================================
// Message
// ============================================================================

/// A single chat message stored in a thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub role: RoleType,
    /// Display name of the speaker, e.g. "Jane" or "assistant"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed: Option<bool>,
}

impl Message {
    pub fn new(role: RoleType, content: impl Into<String>) -> Self {
        Self {
            uuid: None,
            created_at: None,
            role,
            name: None,
            content: content.into(),
            metadata: None,
            processed: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(RoleType::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(RoleType::Assistant, content)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

// ============================================================================
// Threads
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    #[serde(default)]
    pub uuid: Option<String>,
    pub thread_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub project_uuid: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateThreadRequest {
    pub thread_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadListResponse {
    #[serde(default)]
    pub threads: Vec<Thread>,
    #[serde(default)]
    pub response_count: Option<i64>,
    #[serde(default)]
    pub total_count: Option<i64>,
}

/// How the server renders the user context block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextMode {
    Summary,
    Basic,
}

impl ContextMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Basic => "basic",
        }
    }
}

impl FromStr for ContextMode {
    type Err = ZepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "summary" => Ok(Self::Summary),
            "basic" => Ok(Self::Basic),
            _ => Err(ZepError::InvalidArgument(format!(
                "Invalid context mode: {}. Must be one of: summary, basic",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadContextResponse {
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageListResponse {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub row_count: Option<i64>,
    #[serde(default)]
    pub total_count: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddThreadMessagesRequest<'a> {
    pub messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_roles: Option<&'a [RoleType]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_context: Option<bool>,
}

/// Body of a message metadata update
#[derive(Debug, Clone, Serialize)]
pub struct UpdateMessageRequest {
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddThreadMessagesResponse {
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub message_uuids: Vec<String>,
}

/// Generic acknowledgement returned by delete endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiAck {
    #[serde(default)]
    pub message: Option<String>,
}
