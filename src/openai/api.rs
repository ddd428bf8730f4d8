//! OpenAI endpoints the wrapper can drive.
//!
//! Requests and responses stay as JSON values so every OpenAI option passes
//! through untouched; only the bits the wrapper needs are read out.

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde_json::{json, Map, Value};
use std::pin::Pin;
use std::time::Duration;
use tracing::debug;

use crate::config::OpenAiConfig;
use crate::error::{Result, ZepError};

/// Stream of decoded server-sent event payloads
pub type ChunkStream = BoxStream<'static, Result<Value>>;

/// One OpenAI generation endpoint
#[async_trait]
pub trait CompletionApi: Send + Sync {
    /// Single request; `params` must not contain Zep keys.
    async fn create_direct(&self, messages: &[Value], params: &Map<String, Value>) -> Result<Value>;

    /// Streaming request, yielding each event payload.
    async fn create_stream(&self, messages: &[Value], params: &Map<String, Value>) -> Result<ChunkStream>;

    /// Text of the assistant reply in a complete response
    fn assistant_content(&self, response: &Value) -> Option<String>;

    /// Text carried by one streamed chunk
    fn chunk_content(&self, chunk: &Value) -> Option<String>;
}

// ============================================================================
// Transport
// ============================================================================

/// Authenticated JSON/SSE transport for the OpenAI REST API
#[derive(Debug, Clone)]
pub struct OpenAiHttp {
    client: Client,
    base_url: String,
}

impl OpenAiHttp {
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ZepError::Config("OpenAI API key is not set (OPENAI_API_KEY)".to_string()))?;

        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| ZepError::Config(format!("OpenAI API key is not a valid header value: {}", e)))?;
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn send(&self, path: &str, body: &Value) -> Result<reqwest::Response> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(url = %url, "openai request");
        let response = self.client.post(&url).json(body).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(String::from))
            .unwrap_or(text);
        Err(ZepError::Api {
            status: status.as_u16(),
            message,
        })
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        Ok(self.send(path, body).await?.json().await?)
    }

    pub async fn post_stream(&self, path: &str, body: &Value) -> Result<ChunkStream> {
        let response = self.send(path, body).await?;
        Ok(sse_events(response.bytes_stream()))
    }
}

/// Build a request body: the caller's params plus the given fields.
fn request_body(params: &Map<String, Value>, fields: [(&str, Value); 1], stream: bool) -> Value {
    let mut body = params.clone();
    for (k, v) in fields {
        body.insert(k.to_string(), v);
    }
    if stream {
        body.insert("stream".to_string(), Value::Bool(true));
    }
    Value::Object(body)
}

// ============================================================================
// Server-sent events
// ============================================================================

struct SseState<S> {
    bytes: Pin<Box<S>>,
    buffer: Vec<u8>,
    done: bool,
}

/// Take the next complete `data:` payload out of the buffer, if any.
fn next_data_line(buffer: &mut Vec<u8>) -> Option<String> {
    while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
        let line: Vec<u8> = buffer.drain(..=pos).collect();
        let line = String::from_utf8_lossy(&line);
        let line = line.trim_end_matches(['\r', '\n']);
        if let Some(data) = line.strip_prefix("data:") {
            return Some(data.trim_start().to_string());
        }
    }
    None
}

/// Decode an SSE byte stream into JSON payloads, ending at `[DONE]`.
pub fn sse_events<S, B, E>(bytes: S) -> ChunkStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<ZepError> + Send + 'static,
{
    let state = SseState {
        bytes: Box::pin(bytes),
        buffer: Vec::new(),
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if state.done {
                return None;
            }
            if let Some(data) = next_data_line(&mut state.buffer) {
                if data == "[DONE]" {
                    state.done = true;
                    return None;
                }
                if data.is_empty() {
                    continue;
                }
                let event = serde_json::from_str::<Value>(&data).map_err(|e| {
                    ZepError::Stream(format!("invalid event payload: {}", e))
                });
                return Some((event, state));
            }
            match state.bytes.next().await {
                Some(Ok(chunk)) => state.buffer.extend_from_slice(chunk.as_ref()),
                Some(Err(e)) => {
                    state.done = true;
                    return Some((Err(e.into()), state));
                }
                None => {
                    // Flush a final line that had no trailing newline
                    state.done = true;
                    if state.buffer.is_empty() {
                        return None;
                    }
                    state.buffer.push(b'\n');
                    let data = next_data_line(&mut state.buffer)?;
                    if data.is_empty() || data == "[DONE]" {
                        return None;
                    }
                    let event = serde_json::from_str::<Value>(&data).map_err(|e| {
                        ZepError::Stream(format!("invalid event payload: {}", e))
                    });
                    return Some((event, state));
                }
            }
        }
    })
    .boxed()
}

// ============================================================================
// Chat Completions
// ============================================================================

/// `POST /chat/completions`
#[derive(Debug, Clone)]
pub struct ChatCompletions {
    http: OpenAiHttp,
}

impl ChatCompletions {
    pub fn new(http: OpenAiHttp) -> Self {
        Self { http }
    }
}

#[async_trait]
impl CompletionApi for ChatCompletions {
    async fn create_direct(&self, messages: &[Value], params: &Map<String, Value>) -> Result<Value> {
        let body = request_body(params, [("messages", Value::Array(messages.to_vec()))], false);
        self.http.post_json("chat/completions", &body).await
    }

    async fn create_stream(&self, messages: &[Value], params: &Map<String, Value>) -> Result<ChunkStream> {
        let body = request_body(params, [("messages", Value::Array(messages.to_vec()))], true);
        self.http.post_stream("chat/completions", &body).await
    }

    fn assistant_content(&self, response: &Value) -> Option<String> {
        response["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
    }

    fn chunk_content(&self, chunk: &Value) -> Option<String> {
        chunk["choices"][0]["delta"]["content"]
            .as_str()
            .map(String::from)
    }
}

// ============================================================================
// Responses
// ============================================================================

/// `POST /responses`
#[derive(Debug, Clone)]
pub struct Responses {
    http: OpenAiHttp,
}

impl Responses {
    pub fn new(http: OpenAiHttp) -> Self {
        Self { http }
    }

    /// A lone user message with text content goes as a bare string.
    pub fn to_input(messages: &[Value]) -> Value {
        match messages {
            [] => json!([]),
            [only] if only["role"] == "user" && only["content"].is_string() => only["content"].clone(),
            _ => Value::Array(messages.to_vec()),
        }
    }
}

#[async_trait]
impl CompletionApi for Responses {
    async fn create_direct(&self, messages: &[Value], params: &Map<String, Value>) -> Result<Value> {
        let body = request_body(params, [("input", Self::to_input(messages))], false);
        self.http.post_json("responses", &body).await
    }

    async fn create_stream(&self, messages: &[Value], params: &Map<String, Value>) -> Result<ChunkStream> {
        let body = request_body(params, [("input", Self::to_input(messages))], true);
        self.http.post_stream("responses", &body).await
    }

    fn assistant_content(&self, response: &Value) -> Option<String> {
        let message = response["output"]
            .as_array()?
            .iter()
            .find(|item| item["type"] == "message" && item["role"] == "assistant")?;
        message["content"]
            .as_array()?
            .iter()
            .find(|c| c["type"] == "output_text")?["text"]
            .as_str()
            .map(String::from)
    }

    fn chunk_content(&self, chunk: &Value) -> Option<String> {
        if chunk["type"] != "response.output_text.delta" {
            return None;
        }
        chunk["delta"].as_str().map(String::from)
    }
}
