//! Streaming responses that record the finished assistant reply in Zep.

use chrono::Utc;
use futures_util::StreamExt;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::api::ThreadClient;
use crate::error::Result;
use crate::models::Message;

use super::api::{ChunkStream, CompletionApi};
use super::message_cache::MessageCache;
use super::utils::safe_zep_operation;

/// A chunk stream that buffers the assistant text as it passes through.
///
/// When the stream ends, or `finish` is called, the buffered reply is added
/// to the thread once. Dropping the stream early stores nothing.
pub struct ZepStream<A> {
    inner: ChunkStream,
    api: Arc<A>,
    threads: ThreadClient,
    thread_id: String,
    skip_zep_on_error: bool,
    cache: &'static MessageCache,
    content: String,
    finalized: bool,
}

impl<A: CompletionApi> ZepStream<A> {
    pub(crate) fn new(
        inner: ChunkStream,
        api: Arc<A>,
        threads: ThreadClient,
        thread_id: impl Into<String>,
        skip_zep_on_error: bool,
    ) -> Self {
        Self {
            inner,
            api,
            threads,
            thread_id: thread_id.into(),
            skip_zep_on_error,
            cache: MessageCache::global(),
            content: String::new(),
            finalized: false,
        }
    }

    /// Next chunk, or `None` once the stream is exhausted and recorded.
    pub async fn next(&mut self) -> Option<Result<Value>> {
        if self.finalized {
            return None;
        }
        match self.inner.next().await {
            Some(Ok(chunk)) => {
                if let Some(text) = self.api.chunk_content(&chunk) {
                    self.content.push_str(&text);
                }
                Some(Ok(chunk))
            }
            Some(Err(e)) => Some(Err(e)),
            None => match self.finalize().await {
                Ok(()) => None,
                Err(e) => Some(Err(e)),
            },
        }
    }

    /// Stop reading and store whatever text was received so far.
    pub async fn finish(&mut self) -> Result<()> {
        self.finalize().await
    }

    /// Assistant text collected so far
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    async fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Ok(());
        }
        self.finalized = true;

        if self.content.trim().is_empty() {
            return Ok(());
        }
        if self
            .cache
            .is_message_seen(&self.thread_id, "assistant", &self.content, Utc::now())
        {
            debug!(thread_id = %self.thread_id, "skipped duplicate streamed assistant response");
            return Ok(());
        }

        let message = Message::assistant(self.content.clone()).with_name("assistant");
        let added = safe_zep_operation(
            self.threads.add_messages(&self.thread_id, &[message], None, None),
            self.skip_zep_on_error,
            "Add streamed assistant response to Zep thread",
        )
        .await?;
        if added.is_some() {
            debug!(thread_id = %self.thread_id, "added streamed assistant response");
        }
        Ok(())
    }
}
