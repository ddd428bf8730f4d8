// CLI Parser - Clap derive definitions

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};

use crate::models::{ContextMode, GraphDataType, GraphSearchScope, Reranker, RoleType, SearchType};

/// Zep: memory and knowledge-graph CLI
#[derive(Parser, Debug)]
#[command(name = "zep")]
#[command(version)]
#[command(about = "Command line client for the Zep memory and knowledge-graph service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Which OpenAI endpoint `chat` goes through
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ChatApi {
    #[default]
    Chat,
    Responses,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    // ------------------------------------------------------------------------
    // Threads
    // ------------------------------------------------------------------------
    /// Create a thread for a user
    ThreadCreate {
        /// Thread ID (a UUID is generated when omitted)
        #[arg(long)]
        thread_id: Option<String>,
        /// Owning user ID
        #[arg(long)]
        user_id: String,
    },

    /// List threads
    ThreadList {
        /// Page number (1-based)
        #[arg(long)]
        page: Option<u32>,
        /// Threads per page
        #[arg(long)]
        page_size: Option<u32>,
        /// Sort field, e.g. created_at or updated_at
        #[arg(long)]
        order_by: Option<String>,
        /// Sort ascending
        #[arg(long)]
        asc: bool,
    },

    /// Delete a thread
    ThreadDelete {
        thread_id: String,
    },

    /// Get the user context block for a thread
    ThreadContext {
        thread_id: String,
        /// Minimum fact rating
        #[arg(long)]
        min_rating: Option<f64>,
        /// Context mode: summary, basic
        #[arg(long, value_parser = parse_context_mode)]
        mode: Option<ContextMode>,
    },

    /// List messages in a thread
    ThreadMessages {
        thread_id: String,
        /// Page size
        #[arg(long)]
        limit: Option<u32>,
        /// Cursor for the next page
        #[arg(long)]
        cursor: Option<u64>,
        /// Only the last n messages
        #[arg(long)]
        lastn: Option<u32>,
    },

    /// Add a message to a thread
    AddMessage {
        thread_id: String,
        /// Role: norole, system, assistant, user, function, tool
        #[arg(value_parser = parse_role)]
        role: RoleType,
        /// Message content
        content: String,
        /// Speaker name
        #[arg(long)]
        name: Option<String>,
        /// Return the updated context block
        #[arg(long)]
        return_context: bool,
    },

    // ------------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------------
    /// Create a user
    UserAdd {
        user_id: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },

    /// Get a user
    UserGet {
        user_id: String,
    },

    /// Delete a user
    UserDelete {
        user_id: String,
    },

    /// List users
    UserList {
        /// Page number (1-based)
        #[arg(long)]
        page: Option<u32>,
        /// Users per page
        #[arg(long)]
        page_size: Option<u32>,
    },

    /// List a user's threads
    UserThreads {
        user_id: String,
    },

    // ------------------------------------------------------------------------
    // Graph
    // ------------------------------------------------------------------------
    /// Add data to a user graph or a named graph
    #[command(group(owner_group()))]
    GraphAdd {
        /// Data type: text, json, message
        #[arg(value_parser = parse_data_type)]
        data_type: GraphDataType,
        /// The data to ingest
        data: String,
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long)]
        graph_id: Option<String>,
        #[arg(long)]
        source_description: Option<String>,
    },

    /// Search a graph
    #[command(group(owner_group()))]
    GraphSearch {
        /// Search query
        query: String,
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long)]
        graph_id: Option<String>,
        /// Scope: edges, nodes, episodes
        #[arg(long, default_value = "edges", value_parser = parse_scope)]
        scope: GraphSearchScope,
        /// Maximum results
        #[arg(long)]
        limit: Option<u32>,
        /// Reranker: rrf, mmr, node_distance, episode_mentions, cross_encoder
        #[arg(long, value_parser = parse_reranker)]
        reranker: Option<Reranker>,
    },

    /// List entity nodes
    #[command(group(owner_group()))]
    GraphNodes {
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long)]
        graph_id: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        /// UUID cursor from the previous page
        #[arg(long)]
        cursor: Option<String>,
    },

    /// List facts (edges)
    #[command(group(owner_group()))]
    GraphEdges {
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long)]
        graph_id: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        /// UUID cursor from the previous page
        #[arg(long)]
        cursor: Option<String>,
    },

    /// List recent episodes
    #[command(group(owner_group()))]
    GraphEpisodes {
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long)]
        graph_id: Option<String>,
        /// Only the last n episodes
        #[arg(long)]
        lastn: Option<u32>,
    },

    // ------------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------------
    /// List document collections
    CollectionList,

    /// Create a document collection
    CollectionCreate {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },

    /// Search a document collection
    DocumentSearch {
        collection: String,
        /// Search text
        text: String,
        #[arg(long)]
        limit: Option<u32>,
        /// Search type: similarity, mmr
        #[arg(long, default_value = "similarity", value_parser = parse_search_type)]
        search_type: SearchType,
        /// Diversity for mmr search, 0-1
        #[arg(long)]
        mmr_lambda: Option<f64>,
    },

    // ------------------------------------------------------------------------
    // OpenAI
    // ------------------------------------------------------------------------
    /// Ask an OpenAI model, with thread memory injected into the system prompt
    Chat {
        /// User message
        message: String,
        /// Thread to read context from and record the exchange in
        #[arg(long)]
        thread_id: Option<String>,
        /// System prompt; `{context}` is replaced by the thread's memory
        #[arg(long)]
        system: Option<String>,
        /// Model name (defaults to the configured model)
        #[arg(long)]
        model: Option<String>,
        /// Stream the reply
        #[arg(long)]
        stream: bool,
        /// Endpoint to call
        #[arg(long, value_enum, default_value_t = ChatApi::Chat)]
        api: ChatApi,
        /// Fail instead of continuing when a Zep call fails
        #[arg(long)]
        strict: bool,
    },

    // ------------------------------------------------------------------------
    // Journal
    // ------------------------------------------------------------------------
    /// View operation logs
    Logs {
        /// Number of log entries
        #[arg(default_value = "50")]
        n: usize,
        /// Filter by operation type
        operation: Option<String>,
    },

    /// Clear all logs
    ClearLogs,
}

impl Command {
    /// Journal name of the command, as typed on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Self::ThreadCreate { .. } => "thread-create",
            Self::ThreadList { .. } => "thread-list",
            Self::ThreadDelete { .. } => "thread-delete",
            Self::ThreadContext { .. } => "thread-context",
            Self::ThreadMessages { .. } => "thread-messages",
            Self::AddMessage { .. } => "add-message",
            Self::UserAdd { .. } => "user-add",
            Self::UserGet { .. } => "user-get",
            Self::UserDelete { .. } => "user-delete",
            Self::UserList { .. } => "user-list",
            Self::UserThreads { .. } => "user-threads",
            Self::GraphAdd { .. } => "graph-add",
            Self::GraphSearch { .. } => "graph-search",
            Self::GraphNodes { .. } => "graph-nodes",
            Self::GraphEdges { .. } => "graph-edges",
            Self::GraphEpisodes { .. } => "graph-episodes",
            Self::CollectionList => "collection-list",
            Self::CollectionCreate { .. } => "collection-create",
            Self::DocumentSearch { .. } => "document-search",
            Self::Chat { .. } => "chat",
            Self::Logs { .. } => "logs",
            Self::ClearLogs => "clear-logs",
        }
    }

    /// Short description of the target for the journal
    pub fn details(&self) -> Option<String> {
        match self {
            Self::ThreadCreate { thread_id, user_id } => Some(format!(
                "user={} thread={}",
                user_id,
                thread_id.as_deref().unwrap_or("<generated>")
            )),
            Self::ThreadDelete { thread_id }
            | Self::ThreadContext { thread_id, .. }
            | Self::ThreadMessages { thread_id, .. } => Some(format!("thread={}", thread_id)),
            Self::AddMessage { thread_id, role, .. } => {
                Some(format!("thread={} role={}", thread_id, role.as_str()))
            }
            Self::UserAdd { user_id, .. }
            | Self::UserGet { user_id }
            | Self::UserDelete { user_id }
            | Self::UserThreads { user_id } => Some(format!("user={}", user_id)),
            Self::GraphAdd {
                data_type,
                user_id,
                graph_id,
                ..
            } => Some(format!("{} {}", owner_detail(user_id, graph_id), data_type.as_str())),
            Self::GraphSearch {
                query,
                user_id,
                graph_id,
                ..
            } => Some(format!("{} query={:?}", owner_detail(user_id, graph_id), query)),
            Self::GraphNodes { user_id, graph_id, .. }
            | Self::GraphEdges { user_id, graph_id, .. }
            | Self::GraphEpisodes { user_id, graph_id, .. } => Some(owner_detail(user_id, graph_id)),
            Self::CollectionCreate { name, .. } => Some(format!("collection={}", name)),
            Self::DocumentSearch { collection, .. } => Some(format!("collection={}", collection)),
            Self::Chat { thread_id, stream, .. } => Some(format!(
                "thread={} stream={}",
                thread_id.as_deref().unwrap_or("-"),
                stream
            )),
            Self::ThreadList { .. }
            | Self::UserList { .. }
            | Self::CollectionList
            | Self::Logs { .. }
            | Self::ClearLogs => None,
        }
    }

    /// Commands that only touch the local journal
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Logs { .. } | Self::ClearLogs)
    }
}

/// Graph commands target exactly one of `--user-id` / `--graph-id`.
fn owner_group() -> ArgGroup {
    ArgGroup::new("owner")
        .args(["user_id", "graph_id"])
        .required(true)
        .multiple(false)
}

fn owner_detail(user_id: &Option<String>, graph_id: &Option<String>) -> String {
    match (user_id, graph_id) {
        (Some(u), _) => format!("user={}", u),
        (None, Some(g)) => format!("graph={}", g),
        (None, None) => "-".to_string(),
    }
}

// Custom parsers for enum types
fn parse_role(s: &str) -> Result<RoleType, String> {
    s.parse::<RoleType>().map_err(|e| format!("{}", e))
}

fn parse_context_mode(s: &str) -> Result<ContextMode, String> {
    s.parse::<ContextMode>().map_err(|e| format!("{}", e))
}

fn parse_data_type(s: &str) -> Result<GraphDataType, String> {
    s.parse::<GraphDataType>().map_err(|e| format!("{}", e))
}

fn parse_scope(s: &str) -> Result<GraphSearchScope, String> {
    s.parse::<GraphSearchScope>().map_err(|e| format!("{}", e))
}

fn parse_reranker(s: &str) -> Result<Reranker, String> {
    s.parse::<Reranker>().map_err(|e| format!("{}", e))
}

fn parse_search_type(s: &str) -> Result<SearchType, String> {
    s.parse::<SearchType>().map_err(|e| format!("{}", e))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_thread_create_generated_id() {
        let cli = Cli::parse_from(["zep", "thread-create", "--user-id", "jane"]);
        match cli.command {
            Command::ThreadCreate { thread_id, user_id } => {
                assert!(thread_id.is_none());
                assert_eq!(user_id, "jane");
            }
            _ => panic!("Expected ThreadCreate command"),
        }
    }

    #[test]
    fn test_add_message_all_args() {
        let cli = Cli::parse_from([
            "zep",
            "add-message",
            "t-1",
            "User",
            "I need trail shoes",
            "--name=Jane",
            "--return-context",
        ]);
        match cli.command {
            Command::AddMessage {
                thread_id,
                role,
                content,
                name,
                return_context,
            } => {
                assert_eq!(thread_id, "t-1");
                assert_eq!(role, RoleType::User);
                assert_eq!(content, "I need trail shoes");
                assert_eq!(name.as_deref(), Some("Jane"));
                assert!(return_context);
            }
            _ => panic!("Expected AddMessage command"),
        }
    }

    #[test]
    fn test_add_message_invalid_role_fails() {
        let result = Cli::try_parse_from(["zep", "add-message", "t-1", "robot", "hi"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_thread_context_mode() {
        let cli = Cli::parse_from(["zep", "thread-context", "t-1", "--mode", "basic", "--min-rating", "0.7"]);
        match cli.command {
            Command::ThreadContext {
                mode, min_rating, ..
            } => {
                assert_eq!(mode, Some(ContextMode::Basic));
                assert_eq!(min_rating, Some(0.7));
            }
            _ => panic!("Expected ThreadContext command"),
        }
    }

    #[test]
    fn test_graph_search_defaults() {
        let cli = Cli::parse_from(["zep", "graph-search", "shoes", "--user-id", "jane"]);
        match cli.command {
            Command::GraphSearch {
                scope,
                reranker,
                limit,
                ..
            } => {
                assert_eq!(scope, GraphSearchScope::Edges);
                assert!(reranker.is_none());
                assert!(limit.is_none());
            }
            _ => panic!("Expected GraphSearch command"),
        }
    }

    #[test]
    fn test_graph_search_reranker() {
        let cli = Cli::parse_from([
            "zep",
            "graph-search",
            "shoes",
            "--graph-id",
            "shop",
            "--scope",
            "nodes",
            "--reranker",
            "node_distance",
        ]);
        match cli.command {
            Command::GraphSearch { scope, reranker, .. } => {
                assert_eq!(scope, GraphSearchScope::Nodes);
                assert_eq!(reranker, Some(Reranker::NodeDistance));
            }
            _ => panic!("Expected GraphSearch command"),
        }
    }

    #[test]
    fn test_graph_commands_need_one_owner() {
        for cmd in ["graph-nodes", "graph-edges", "graph-episodes"] {
            let err = Cli::try_parse_from(["zep", cmd, "--user-id", "jane", "--graph-id", "shop"]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);

            let err = Cli::try_parse_from(["zep", cmd]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

            assert!(Cli::try_parse_from(["zep", cmd, "--graph-id", "shop"]).is_ok());
        }

        assert!(Cli::try_parse_from(["zep", "graph-search", "shoes"]).is_err());
        assert!(Cli::try_parse_from(["zep", "graph-add", "text", "hi", "--user-id", "jane", "--graph-id", "shop"]).is_err());
    }

    #[test]
    fn test_graph_add_invalid_type_fails() {
        let result = Cli::try_parse_from(["zep", "graph-add", "xml", "<a/>", "--user-id", "u"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_document_search_defaults() {
        let cli = Cli::parse_from(["zep", "document-search", "products", "trail shoes"]);
        match cli.command {
            Command::DocumentSearch {
                collection,
                search_type,
                mmr_lambda,
                ..
            } => {
                assert_eq!(collection, "products");
                assert_eq!(search_type, SearchType::Similarity);
                assert!(mmr_lambda.is_none());
            }
            _ => panic!("Expected DocumentSearch command"),
        }
    }

    #[test]
    fn test_chat_args() {
        let cli = Cli::parse_from([
            "zep",
            "chat",
            "What should I buy?",
            "--thread-id",
            "t-1",
            "--system",
            "Memory: {context}",
            "--stream",
            "--api",
            "responses",
        ]);
        match cli.command {
            Command::Chat {
                message,
                thread_id,
                system,
                stream,
                api,
                strict,
                model,
            } => {
                assert_eq!(message, "What should I buy?");
                assert_eq!(thread_id.as_deref(), Some("t-1"));
                assert_eq!(system.as_deref(), Some("Memory: {context}"));
                assert!(stream);
                assert_eq!(api, ChatApi::Responses);
                assert!(!strict);
                assert!(model.is_none());
            }
            _ => panic!("Expected Chat command"),
        }
    }

    #[test]
    fn test_logs_default() {
        let cli = Cli::parse_from(["zep", "logs"]);
        match cli.command {
            Command::Logs { n, operation } => {
                assert_eq!(n, 50);
                assert!(operation.is_none());
            }
            _ => panic!("Expected Logs command"),
        }
    }

    #[test]
    fn test_logs_with_args() {
        let cli = Cli::parse_from(["zep", "logs", "10", "graph-search"]);
        match cli.command {
            Command::Logs { n, operation } => {
                assert_eq!(n, 10);
                assert_eq!(operation.as_deref(), Some("graph-search"));
            }
            _ => panic!("Expected Logs command"),
        }
    }

    #[test]
    fn test_command_names_and_details() {
        let cli = Cli::parse_from(["zep", "graph-nodes", "--graph-id", "shop"]);
        assert_eq!(cli.command.name(), "graph-nodes");
        assert_eq!(cli.command.details().as_deref(), Some("graph=shop"));
        assert!(!cli.command.is_local());

        let cli = Cli::parse_from(["zep", "clear-logs"]);
        assert_eq!(cli.command.name(), "clear-logs");
        assert!(cli.command.details().is_none());
        assert!(cli.command.is_local());
    }

    #[test]
    fn test_missing_required_args_fails() {
        assert!(Cli::try_parse_from(["zep", "thread-create"]).is_err());
        assert!(Cli::try_parse_from(["zep", "add-message", "t-1", "user"]).is_err());
        assert!(Cli::try_parse_from(["zep", "collection-create"]).is_err());
    }
}
