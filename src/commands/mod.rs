pub mod chat;
pub mod document;
pub mod graph;
pub mod thread;
pub mod user;

pub use chat::{chat, ChatOptions, DEFAULT_SYSTEM_PROMPT};
pub use document::{create_collection, list_collections, search_documents};
pub use graph::{add_data, list_edges, list_episodes, list_nodes, resolve_owner, search};
pub use thread::{
    add_message, create_thread, delete_thread, list_threads, thread_context, thread_messages,
};
pub use user::{add_user, delete_user, get_user, list_users, user_threads, AddUserOptions};
