//! OpenAI calls with Zep memory injected into the prompt.

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

use crate::client::Zep;
use crate::error::{Result, ZepError};
use crate::models::Message;

use super::api::{ChunkStream, CompletionApi};
use super::streaming::ZepStream;
use super::utils::{
    extract_conversation_messages, extract_zep_params, has_context_placeholder, inject_context,
    safe_zep_operation, ZepParams,
};

const THREAD_NOT_FOUND: &str =
    "Thread not found, please ensure you have created the thread before using it.";

/// Result of [`ZepWrapper::create`]
pub enum Completion<A> {
    /// A complete response
    Response(Value),
    /// A stream whose reply is recorded in the thread when it ends
    Stream(ZepStream<A>),
    /// A stream with no thread attached
    Passthrough(ChunkStream),
}

impl<A> std::fmt::Debug for Completion<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Response(v) => f.debug_tuple("Response").field(v).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::Passthrough(_) => f.write_str("Passthrough(..)"),
        }
    }
}

/// Wraps one OpenAI endpoint with Zep context injection.
pub struct ZepWrapper<A> {
    zep: Zep,
    api: Arc<A>,
}

impl<A: CompletionApi> ZepWrapper<A> {
    pub fn new(zep: Zep, api: A) -> Self {
        Self {
            zep,
            api: Arc::new(api),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Create a completion.
    ///
    /// `params` holds OpenAI options plus the optional Zep keys `thread_id`
    /// (or `session_id`), `context_placeholder` and `skip_zep_on_error`.
    pub async fn create(&self, messages: &[Value], mut params: Map<String, Value>) -> Result<Completion<A>> {
        let zep_params = extract_zep_params(&mut params);
        let stream = params.get("stream").and_then(Value::as_bool).unwrap_or(false);

        match (zep_params.thread_id.as_deref(), stream) {
            (Some(thread_id), true) => Ok(Completion::Stream(
                self.create_stream_with_zep(messages, thread_id, &zep_params, &params)
                    .await?,
            )),
            (Some(thread_id), false) => Ok(Completion::Response(
                self.create_with_zep(messages, thread_id, &zep_params, &params)
                    .await?,
            )),
            (None, true) => Ok(Completion::Passthrough(
                self.api.create_stream(messages, &params).await?,
            )),
            (None, false) => Ok(Completion::Response(
                self.api.create_direct(messages, &params).await?,
            )),
        }
    }

    async fn create_with_zep(
        &self,
        messages: &[Value],
        thread_id: &str,
        zep_params: &ZepParams,
        params: &Map<String, Value>,
    ) -> Result<Value> {
        let (messages, needs_context) = self.preprocess(messages, thread_id, zep_params).await?;
        let response = self.api.create_direct(&messages, params).await?;

        if needs_context {
            self.add_assistant_response(thread_id, &response, zep_params.skip_zep_on_error)
                .await?;
        }
        Ok(response)
    }

    async fn create_stream_with_zep(
        &self,
        messages: &[Value],
        thread_id: &str,
        zep_params: &ZepParams,
        params: &Map<String, Value>,
    ) -> Result<ZepStream<A>> {
        let (messages, _) = self.preprocess(messages, thread_id, zep_params).await?;
        let chunks = self.api.create_stream(&messages, params).await?;
        Ok(ZepStream::new(
            chunks,
            Arc::clone(&self.api),
            self.zep.thread(),
            thread_id,
            zep_params.skip_zep_on_error,
        ))
    }

    /// Check the thread, then fill the placeholder when the prompt has one.
    ///
    /// Returns the messages to send and whether the placeholder was present.
    async fn preprocess(
        &self,
        messages: &[Value],
        thread_id: &str,
        zep_params: &ZepParams,
    ) -> Result<(Vec<Value>, bool)> {
        let skip = zep_params.skip_zep_on_error;
        self.ensure_thread_exists(thread_id, skip).await?;

        let placeholder = zep_params.context_placeholder.as_str();
        if !has_context_placeholder(messages, placeholder) {
            return Ok((messages.to_vec(), false));
        }

        let messages = match self.fetch_context(thread_id, messages, skip).await? {
            Some(context) => inject_context(messages, Some(&context), placeholder),
            None => messages.to_vec(),
        };
        Ok((messages, true))
    }

    async fn ensure_thread_exists(&self, thread_id: &str, skip: bool) -> Result<()> {
        let threads = self.zep.thread();
        let check = async {
            match threads.get_user_context(thread_id, None, None).await {
                Ok(_) => Ok(()),
                Err(e) if e.is_not_found() => Err(ZepError::OpenAi(THREAD_NOT_FOUND.to_string())),
                Err(e) => Err(e),
            }
        };
        safe_zep_operation(check, skip, &format!("Ensure thread {} exists", thread_id)).await?;
        Ok(())
    }

    /// Store new user turns and get context in one call, or just read context.
    async fn fetch_context(&self, thread_id: &str, messages: &[Value], skip: bool) -> Result<Option<String>> {
        let threads = self.zep.thread();
        let user_messages = extract_conversation_messages(messages, true);

        let context = if user_messages.is_empty() {
            safe_zep_operation(
                threads.get_user_context(thread_id, None, None),
                skip,
                "Get context from Zep thread",
            )
            .await?
            .and_then(|r| r.context)
        } else {
            safe_zep_operation(
                threads.add_messages(thread_id, &user_messages, None, Some(true)),
                skip,
                "Add messages and get context from Zep thread",
            )
            .await?
            .and_then(|r| r.context)
        };
        Ok(context)
    }

    async fn add_assistant_response(&self, thread_id: &str, response: &Value, skip: bool) -> Result<()> {
        let Some(content) = self.api.assistant_content(response).filter(|c| !c.is_empty()) else {
            return Ok(());
        };
        let message = Message::assistant(content).with_name("assistant");
        let added = safe_zep_operation(
            self.zep.thread().add_messages(thread_id, &[message], None, None),
            skip,
            "Add assistant response to Zep thread",
        )
        .await?;
        if added.is_some() {
            debug!(thread_id, "added assistant response");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::http_for;
    use async_trait::async_trait;
    use futures_util::{stream, StreamExt};
    use mockito::Matcher;
    use parking_lot::Mutex;
    use serde_json::json;

    /// Records the prompts it receives and answers with a fixed reply.
    #[derive(Default)]
    struct FakeApi {
        prompts: Mutex<Vec<Vec<Value>>>,
        params: Mutex<Vec<Map<String, Value>>>,
    }

    #[async_trait]
    impl CompletionApi for FakeApi {
        async fn create_direct(&self, messages: &[Value], params: &Map<String, Value>) -> Result<Value> {
            self.prompts.lock().push(messages.to_vec());
            self.params.lock().push(params.clone());
            Ok(json!({"reply": "Size 10 trail runners"}))
        }

        async fn create_stream(&self, messages: &[Value], _: &Map<String, Value>) -> Result<ChunkStream> {
            self.prompts.lock().push(messages.to_vec());
            let chunks: Vec<Result<Value>> = vec![Ok(json!({"delta": "Size 10"})), Ok(json!({"delta": " it is"}))];
            Ok(stream::iter(chunks).boxed())
        }

        fn assistant_content(&self, response: &Value) -> Option<String> {
            response["reply"].as_str().map(String::from)
        }

        fn chunk_content(&self, chunk: &Value) -> Option<String> {
            chunk["delta"].as_str().map(String::from)
        }
    }

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn prompt() -> Vec<Value> {
        vec![
            json!({"role": "system", "content": "You sell shoes. Memory:\n{context}"}),
            json!({"role": "user", "content": "What should I buy?"}),
        ]
    }

    #[tokio::test]
    async fn test_without_thread_calls_openai_directly() {
        let mut server = mockito::Server::new_async().await;
        let any = server.mock("GET", Matcher::Any).expect(0).create_async().await;

        let wrapper = ZepWrapper::new(Zep::from_http(http_for(&server)), FakeApi::default());
        let completion = wrapper
            .create(&prompt(), params(json!({"model": "gpt-4o-mini", "skip_zep_on_error": false})))
            .await
            .unwrap();

        assert!(matches!(completion, Completion::Response(_)));
        assert_eq!(wrapper.api().prompts.lock()[0], prompt());
        assert_eq!(wrapper.api().params.lock()[0], params(json!({"model": "gpt-4o-mini"})));
        any.assert_async().await;
    }

    #[tokio::test]
    async fn test_context_injected_and_reply_stored() {
        let mut server = mockito::Server::new_async().await;
        let ensure = server
            .mock("GET", "/api/v2/threads/wrap-ctx/context")
            .with_status(200)
            .with_body(r#"{"context":"unused"}"#)
            .expect(1)
            .create_async()
            .await;
        let add_user = server
            .mock("POST", "/api/v2/threads/wrap-ctx/messages")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#""return_context":true"#.to_string()),
                Matcher::Regex(r#""content":"What should I buy\?""#.to_string()),
            ]))
            .with_status(200)
            .with_body(r#"{"context":"Jane wears size 10","message_uuids":["m-1"]}"#)
            .expect(1)
            .create_async()
            .await;
        let add_reply = server
            .mock("POST", "/api/v2/threads/wrap-ctx/messages")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#""role":"assistant""#.to_string()),
                Matcher::Regex(r#""name":"assistant""#.to_string()),
                Matcher::Regex(r#""content":"Size 10 trail runners""#.to_string()),
            ]))
            .with_status(200)
            .with_body(r#"{"message_uuids":["m-2"]}"#)
            .expect(1)
            .create_async()
            .await;

        let wrapper = ZepWrapper::new(Zep::from_http(http_for(&server)), FakeApi::default());
        let completion = wrapper
            .create(&prompt(), params(json!({"model": "m", "thread_id": "wrap-ctx"})))
            .await
            .unwrap();
        assert!(matches!(completion, Completion::Response(ref r) if r["reply"] == "Size 10 trail runners"));

        let sent = wrapper.api().prompts.lock()[0].clone();
        assert_eq!(sent[0]["content"], "You sell shoes. Memory:\nJane wears size 10");
        assert_eq!(wrapper.api().params.lock()[0], params(json!({"model": "m"})));

        ensure.assert_async().await;
        add_user.assert_async().await;
        add_reply.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_placeholder_skips_memory_calls() {
        let mut server = mockito::Server::new_async().await;
        let ensure = server
            .mock("GET", "/api/v2/threads/wrap-plain/context")
            .with_status(200)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;
        let posts = server.mock("POST", Matcher::Any).expect(0).create_async().await;

        let wrapper = ZepWrapper::new(Zep::from_http(http_for(&server)), FakeApi::default());
        let messages = vec![json!({"role": "user", "content": "hello"})];
        wrapper
            .create(&messages, params(json!({"thread_id": "wrap-plain"})))
            .await
            .unwrap();

        assert_eq!(wrapper.api().prompts.lock()[0], messages);
        ensure.assert_async().await;
        posts.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_thread_fails_when_not_skipping() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v2/threads/wrap-missing/context")
            .with_status(404)
            .create_async()
            .await;

        let wrapper = ZepWrapper::new(Zep::from_http(http_for(&server)), FakeApi::default());
        let err = wrapper
            .create(
                &prompt(),
                params(json!({"thread_id": "wrap-missing", "skip_zep_on_error": false})),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Ensure thread wrap-missing exists failed: Thread not found, please ensure you have created the thread before using it."
        );
        assert!(wrapper.api().prompts.lock().is_empty());
    }

    #[tokio::test]
    async fn test_zep_failures_skipped_by_default() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v2/threads/wrap-down/context")
            .with_status(404)
            .create_async()
            .await;
        server
            .mock("POST", "/api/v2/threads/wrap-down/messages")
            .with_status(404)
            .create_async()
            .await;

        let wrapper = ZepWrapper::new(Zep::from_http(http_for(&server)), FakeApi::default());
        let completion = wrapper
            .create(&prompt(), params(json!({"session_id": "wrap-down"})))
            .await
            .unwrap();

        assert!(matches!(completion, Completion::Response(_)));
        // no context obtained, so the placeholder is left for the model
        assert_eq!(wrapper.api().prompts.lock()[0], prompt());
    }

    #[tokio::test]
    async fn test_stream_with_thread_records_reply() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v2/threads/wrap-stream/context")
            .with_status(200)
            .with_body(r#"{"context":"Jane wears size 10"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/api/v2/threads/wrap-stream/messages")
            .match_body(Matcher::Regex(r#""return_context":true"#.to_string()))
            .with_status(200)
            .with_body(r#"{"context":"Jane wears size 10"}"#)
            .create_async()
            .await;
        let reply = server
            .mock("POST", "/api/v2/threads/wrap-stream/messages")
            .match_body(Matcher::Regex(r#""content":"Size 10 it is""#.to_string()))
            .with_status(200)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        let wrapper = ZepWrapper::new(Zep::from_http(http_for(&server)), FakeApi::default());
        let completion = wrapper
            .create(&prompt(), params(json!({"thread_id": "wrap-stream", "stream": true})))
            .await
            .unwrap();

        let Completion::Stream(mut recorded) = completion else {
            panic!("expected a recorded stream");
        };
        while let Some(chunk) = recorded.next().await {
            chunk.unwrap();
        }
        assert_eq!(recorded.content(), "Size 10 it is");
        assert!(wrapper.api().prompts.lock()[0][0]["content"]
            .as_str()
            .unwrap()
            .ends_with("Jane wears size 10"));
        reply.assert_async().await;
    }

    fn responses_api(openai: &mockito::Server) -> crate::openai::Responses {
        let config = crate::config::OpenAiConfig {
            api_key: Some("sk-test".to_string()),
            base_url: openai.url(),
            model: "gpt-4o-mini".to_string(),
        };
        crate::openai::Responses::new(crate::openai::OpenAiHttp::new(&config).unwrap())
    }

    #[tokio::test]
    async fn test_responses_reply_stored_through_wrapper() {
        let mut zep = mockito::Server::new_async().await;
        zep.mock("GET", "/api/v2/threads/wrap-resp/context")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        zep.mock("POST", "/api/v2/threads/wrap-resp/messages")
            .match_body(Matcher::Regex(r#""return_context":true"#.to_string()))
            .with_status(200)
            .with_body(r#"{"context":"Jane wears size 10"}"#)
            .create_async()
            .await;
        let reply = zep
            .mock("POST", "/api/v2/threads/wrap-resp/messages")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#""role":"assistant""#.to_string()),
                Matcher::Regex(r#""content":"Go with the size 10 trail runners""#.to_string()),
            ]))
            .with_status(200)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        let mut openai = mockito::Server::new_async().await;
        let create = openai
            .mock("POST", "/responses")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::Regex(r"Memory:\\nJane wears size 10".to_string()))
            .with_status(200)
            .with_body(
                r#"{"output":[{"type":"message","role":"assistant","content":[{"type":"output_text","text":"Go with the size 10 trail runners"}]}]}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let wrapper = ZepWrapper::new(Zep::from_http(http_for(&zep)), responses_api(&openai));
        let completion = wrapper
            .create(&prompt(), params(json!({"model": "gpt-4o-mini", "thread_id": "wrap-resp"})))
            .await
            .unwrap();
        assert!(matches!(completion, Completion::Response(ref r) if r["output"][0]["role"] == "assistant"));

        create.assert_async().await;
        reply.assert_async().await;
    }

    #[tokio::test]
    async fn test_responses_stream_deltas_stored_through_wrapper() {
        let mut zep = mockito::Server::new_async().await;
        zep.mock("GET", "/api/v2/threads/wrap-resp-stream/context")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        zep.mock("POST", "/api/v2/threads/wrap-resp-stream/messages")
            .match_body(Matcher::Regex(r#""return_context":true"#.to_string()))
            .with_status(200)
            .with_body(r#"{"context":"Jane wears size 10"}"#)
            .create_async()
            .await;
        let reply = zep
            .mock("POST", "/api/v2/threads/wrap-resp-stream/messages")
            .match_body(Matcher::Regex(r#""content":"Size 10 it is""#.to_string()))
            .with_status(200)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        let mut openai = mockito::Server::new_async().await;
        openai
            .mock("POST", "/responses")
            .match_body(Matcher::PartialJson(json!({"stream": true})))
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(
                "data: {\"type\":\"response.created\"}\n\n\
                 data: {\"type\":\"response.output_text.delta\",\"delta\":\"Size 10\"}\n\n\
                 data: {\"type\":\"response.output_text.delta\",\"delta\":\" it is\"}\n\n\
                 data: {\"type\":\"response.completed\"}\n\n\
                 data: [DONE]\n\n",
            )
            .create_async()
            .await;

        let wrapper = ZepWrapper::new(Zep::from_http(http_for(&zep)), responses_api(&openai));
        let completion = wrapper
            .create(&prompt(), params(json!({"thread_id": "wrap-resp-stream", "stream": true})))
            .await
            .unwrap();

        let Completion::Stream(mut recorded) = completion else {
            panic!("expected a recorded stream");
        };
        let mut chunks = 0;
        while let Some(chunk) = recorded.next().await {
            chunk.unwrap();
            chunks += 1;
        }
        assert_eq!(chunks, 4);
        assert_eq!(recorded.content(), "Size 10 it is");
        reply.assert_async().await;
    }
}
