pub mod api;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod graph_context;
pub mod http;
pub mod logging;
pub mod models;
pub mod openai;

pub use cli::{ChatApi, Cli, Command};
pub use client::Zep;
pub use config::{OpenAiConfig, ZepConfig};
pub use error::{Result, ZepError};
pub use graph_context::{compose_context_string, format_edge_date_range};
pub use logging::{clear_logs, init_tracing, log, read_logs, LogEntry};
pub use openai::{ChatCompletions, Completion, Responses, ZepStream, ZepWrapper};
