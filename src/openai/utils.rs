//! Helpers shared by the OpenAI wrappers: parameter splitting, placeholder
//! handling and error-tolerant Zep calls.

use serde_json::{Map, Value};
use std::future::Future;
use tracing::warn;

use crate::error::{Result, ZepError};
use crate::models::{Message, RoleType};

/// Request keys consumed by the wrapper and never forwarded to OpenAI
pub const ZEP_PARAMS: [&str; 4] = [
    "thread_id",
    "session_id",
    "context_placeholder",
    "skip_zep_on_error",
];

pub const DEFAULT_CONTEXT_PLACEHOLDER: &str = "{context}";

/// Zep settings pulled out of a request
#[derive(Debug, Clone, PartialEq)]
pub struct ZepParams {
    pub thread_id: Option<String>,
    pub context_placeholder: String,
    pub skip_zep_on_error: bool,
}

impl Default for ZepParams {
    fn default() -> Self {
        Self {
            thread_id: None,
            context_placeholder: DEFAULT_CONTEXT_PLACEHOLDER.to_string(),
            skip_zep_on_error: true,
        }
    }
}

impl ZepParams {
    pub fn for_thread(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
            ..Default::default()
        }
    }
}

/// Remove the Zep keys from `params` and return them typed.
///
/// `session_id` is accepted as an older name for `thread_id`.
pub fn extract_zep_params(params: &mut Map<String, Value>) -> ZepParams {
    let mut zep = ZepParams::default();

    let id_of = |v: Option<Value>| match v {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    };
    let thread_id = id_of(params.remove("thread_id"));
    let session_id = id_of(params.remove("session_id"));
    zep.thread_id = thread_id.or(session_id);

    if let Some(Value::String(p)) = params.remove("context_placeholder") {
        zep.context_placeholder = p;
    }
    if let Some(Value::Bool(skip)) = params.remove("skip_zep_on_error") {
        zep.skip_zep_on_error = skip;
    }
    zep
}

/// Copy of `params` without the Zep keys.
pub fn remove_zep_params(params: &Map<String, Value>) -> Map<String, Value> {
    params
        .iter()
        .filter(|(k, _)| !ZEP_PARAMS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn string_content(message: &Value) -> Option<&str> {
    message.get("content").and_then(Value::as_str)
}

fn role(message: &Value) -> &str {
    message.get("role").and_then(Value::as_str).unwrap_or("")
}

pub fn has_context_placeholder(messages: &[Value], placeholder: &str) -> bool {
    if placeholder.is_empty() {
        return false;
    }
    // System prompts carry the placeholder almost always
    let (system, rest): (Vec<&Value>, Vec<&Value>) =
        messages.iter().partition(|m| role(m) == "system");
    system
        .into_iter()
        .chain(rest)
        .filter_map(string_content)
        .any(|c| c.contains(placeholder))
}

/// Replace `placeholder` in every string content; `None` injects an empty string.
pub fn inject_context(messages: &[Value], context: Option<&str>, placeholder: &str) -> Vec<Value> {
    let context = context.unwrap_or("");
    messages
        .iter()
        .map(|message| {
            let mut message = message.clone();
            if placeholder.is_empty() {
                return message;
            }
            if let Some(Value::String(content)) = message.get_mut("content") {
                if content.contains(placeholder) {
                    *content = content.replace(placeholder, context);
                }
            }
            message
        })
        .collect()
}

/// Convert OpenAI messages to Zep messages.
///
/// `user_only` keeps only user turns so replies are not stored twice.
pub fn extract_conversation_messages(messages: &[Value], user_only: bool) -> Vec<Message> {
    messages
        .iter()
        .filter_map(|m| {
            let content = string_content(m).filter(|c| !c.is_empty())?;
            let role = match role(m) {
                "user" => RoleType::User,
                "assistant" if !user_only => RoleType::Assistant,
                _ => return None,
            };
            Some(Message::new(role, content))
        })
        .collect()
}

/// Await a Zep call; on failure either log and yield `None` or fail with a wrapper error.
pub async fn safe_zep_operation<T, F>(operation: F, skip_on_error: bool, name: &str) -> Result<Option<T>>
where
    F: Future<Output = Result<T>>,
{
    match operation.await {
        Ok(value) => Ok(Some(value)),
        Err(e) if skip_on_error => {
            warn!("{} failed: {}", name, e);
            Ok(None)
        }
        Err(e) => Err(ZepError::OpenAi(format!("{} failed: {}", name, e))),
    }
}
