//! OpenAI integration: inject Zep context into prompts and record replies.

pub mod api;
pub mod message_cache;
pub mod streaming;
pub mod utils;
pub mod wrapper;

pub use api::{ChatCompletions, ChunkStream, CompletionApi, OpenAiHttp, Responses};
pub use message_cache::MessageCache;
pub use streaming::ZepStream;
pub use utils::{ZepParams, DEFAULT_CONTEXT_PLACEHOLDER, ZEP_PARAMS};
pub use wrapper::{Completion, ZepWrapper};
