use futures_util::StreamExt;
use serde_json::{json, Map, Value};
use std::io::Write;

use crate::cli::ChatApi;
use crate::client::Zep;
use crate::config::OpenAiConfig;
use crate::error::Result;
use crate::models::{ChatData, SuccessResponse};
use crate::openai::{ChatCompletions, Completion, CompletionApi, OpenAiHttp, Responses, ZepWrapper};

/// System prompt used for thread-backed chats when none is given
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Use what you know about the user below.\n{context}";

/// Options for a single chat turn
#[derive(Debug, Default)]
pub struct ChatOptions {
    pub message: String,
    pub thread_id: Option<String>,
    pub system: Option<String>,
    pub model: Option<String>,
    pub stream: bool,
    pub api: ChatApi,
    pub strict: bool,
}

/// Send one user message through the chosen endpoint
pub async fn chat(zep: &Zep, config: &OpenAiConfig, opts: ChatOptions) -> Result<Value> {
    let http = OpenAiHttp::new(config)?;
    let model = opts.model.clone().unwrap_or_else(|| config.model.clone());
    match opts.api {
        ChatApi::Chat => {
            let wrapper = ZepWrapper::new(zep.clone(), ChatCompletions::new(http));
            run_chat(&wrapper, &model, &opts).await
        }
        ChatApi::Responses => {
            let wrapper = ZepWrapper::new(zep.clone(), Responses::new(http));
            run_chat(&wrapper, &model, &opts).await
        }
    }
}

async fn run_chat<A: CompletionApi>(wrapper: &ZepWrapper<A>, model: &str, opts: &ChatOptions) -> Result<Value> {
    let messages = build_messages(opts);
    let params = build_params(model, opts);

    let content = match wrapper.create(&messages, params).await? {
        Completion::Response(response) => wrapper.api().assistant_content(&response).unwrap_or_default(),
        Completion::Stream(mut stream) => {
            while let Some(chunk) = stream.next().await {
                echo_chunk(wrapper.api(), &chunk?);
            }
            stream.content().to_string()
        }
        Completion::Passthrough(mut chunks) => {
            let mut content = String::new();
            while let Some(chunk) = chunks.next().await {
                let chunk = chunk?;
                if let Some(text) = wrapper.api().chunk_content(&chunk) {
                    content.push_str(&text);
                }
                echo_chunk(wrapper.api(), &chunk);
            }
            content
        }
    };
    if opts.stream {
        eprintln!();
    }

    Ok(serde_json::to_value(SuccessResponse::new(ChatData {
        content,
        streamed: opts.stream,
    }))?)
}

/// Streamed text goes to stderr so stdout stays a single JSON document
fn echo_chunk<A: CompletionApi>(api: &A, chunk: &Value) {
    if let Some(text) = api.chunk_content(chunk) {
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "{}", text);
        let _ = stderr.flush();
    }
}

fn build_messages(opts: &ChatOptions) -> Vec<Value> {
    let system = match (&opts.system, &opts.thread_id) {
        (Some(system), _) => Some(system.as_str()),
        (None, Some(_)) => Some(DEFAULT_SYSTEM_PROMPT),
        (None, None) => None,
    };
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system {
        messages.push(json!({"role": "system", "content": system}));
    }
    messages.push(json!({"role": "user", "content": opts.message}));
    messages
}

fn build_params(model: &str, opts: &ChatOptions) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert("model".to_string(), json!(model));
    if opts.stream {
        params.insert("stream".to_string(), json!(true));
    }
    if let Some(thread_id) = &opts.thread_id {
        params.insert("thread_id".to_string(), json!(thread_id));
        params.insert("skip_zep_on_error".to_string(), json!(!opts.strict));
    }
    params
}

// ============================================================================
// Tests
// ============================================================================
