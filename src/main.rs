//! Zep CLI
//!
//! Main entry point for the CLI application.
//! Dispatches commands to the appropriate handlers and outputs JSON results.

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::debug;

use zep_client::commands::{self, AddUserOptions, ChatOptions};
use zep_client::logging::{clear_logs, init_tracing, log, read_logs};
use zep_client::models::{ClearLogsData, ErrorResponse, LogsData, SuccessResponse};
use zep_client::{Cli, Command, Zep, ZepConfig};

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Diagnostics go to stderr; RUST_LOG overrides the level
    if let Err(e) = init_tracing("warn") {
        eprintln!("warning: diagnostics disabled: {}", e);
    }

    // Run the command and handle errors
    match run(cli).await {
        Ok(json) => print_json(&json),
        Err(e) => {
            print_json(&ErrorResponse::new(format!("{:#}", e)));
            std::process::exit(1);
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => println!(r#"{{"success":false,"error":"failed to serialize output: {}"}}"#, e),
    }
}

/// Run the dispatched command
async fn run(cli: Cli) -> anyhow::Result<serde_json::Value> {
    let command = cli.command;

    // Commands that only touch the local journal
    if command.is_local() {
        return run_local(command);
    }

    let config = ZepConfig::load().context("failed to load configuration")?;
    let zep = Zep::new(&config)?;

    let name = command.name();
    let details = command.details();
    let result = dispatch(command, &zep, &config).await;

    if let Err(e) = log(name, details, result.is_ok()) {
        debug!(error = %e, "failed to write journal entry");
    }
    Ok(result?)
}

fn run_local(command: Command) -> anyhow::Result<serde_json::Value> {
    match command {
        Command::Logs { n, operation } => {
            let entries = read_logs(n, operation.as_deref())?;
            let count = entries.len();
            Ok(serde_json::to_value(SuccessResponse::new(LogsData { entries, count }))?)
        }
        Command::ClearLogs => {
            let cleared = clear_logs()?;
            Ok(serde_json::to_value(SuccessResponse::new(ClearLogsData { cleared }))?)
        }
        other => anyhow::bail!("{} needs a Zep connection", other.name()),
    }
}

/// Dispatch commands that talk to the Zep service
async fn dispatch(
    command: Command,
    zep: &Zep,
    config: &ZepConfig,
) -> zep_client::Result<serde_json::Value> {
    match command {
        // Threads
        Command::ThreadCreate { thread_id, user_id } => {
            commands::create_thread(zep, thread_id.as_deref(), &user_id).await
        }
        Command::ThreadList {
            page,
            page_size,
            order_by,
            asc,
        } => commands::list_threads(zep, page, page_size, order_by.as_deref(), asc).await,
        Command::ThreadDelete { thread_id } => commands::delete_thread(zep, &thread_id).await,
        Command::ThreadContext {
            thread_id,
            min_rating,
            mode,
        } => commands::thread_context(zep, &thread_id, min_rating, mode).await,
        Command::ThreadMessages {
            thread_id,
            limit,
            cursor,
            lastn,
        } => commands::thread_messages(zep, &thread_id, limit, cursor, lastn).await,
        Command::AddMessage {
            thread_id,
            role,
            content,
            name,
            return_context,
        } => {
            commands::add_message(zep, &thread_id, role, &content, name.as_deref(), return_context)
                .await
        }

        // Users
        Command::UserAdd {
            user_id,
            email,
            first_name,
            last_name,
        } => {
            let opts = AddUserOptions {
                user_id,
                email,
                first_name,
                last_name,
            };
            commands::add_user(zep, opts).await
        }
        Command::UserGet { user_id } => commands::get_user(zep, &user_id).await,
        Command::UserDelete { user_id } => commands::delete_user(zep, &user_id).await,
        Command::UserList { page, page_size } => commands::list_users(zep, page, page_size).await,
        Command::UserThreads { user_id } => commands::user_threads(zep, &user_id).await,

        // Graph
        Command::GraphAdd {
            data_type,
            data,
            user_id,
            graph_id,
            source_description,
        } => {
            let owner = commands::resolve_owner(user_id.as_deref(), graph_id.as_deref())?;
            commands::add_data(zep, owner, data_type, &data, source_description).await
        }
        Command::GraphSearch {
            query,
            user_id,
            graph_id,
            scope,
            limit,
            reranker,
        } => {
            let owner = commands::resolve_owner(user_id.as_deref(), graph_id.as_deref())?;
            commands::search(zep, owner, &query, scope, limit, reranker).await
        }
        Command::GraphNodes {
            user_id,
            graph_id,
            limit,
            cursor,
        } => {
            let owner = commands::resolve_owner(user_id.as_deref(), graph_id.as_deref())?;
            commands::list_nodes(zep, owner, limit, cursor).await
        }
        Command::GraphEdges {
            user_id,
            graph_id,
            limit,
            cursor,
        } => {
            let owner = commands::resolve_owner(user_id.as_deref(), graph_id.as_deref())?;
            commands::list_edges(zep, owner, limit, cursor).await
        }
        Command::GraphEpisodes {
            user_id,
            graph_id,
            lastn,
        } => {
            let owner = commands::resolve_owner(user_id.as_deref(), graph_id.as_deref())?;
            commands::list_episodes(zep, owner, lastn).await
        }

        // Documents
        Command::CollectionList => commands::list_collections(zep).await,
        Command::CollectionCreate { name, description } => {
            commands::create_collection(zep, &name, description.as_deref()).await
        }
        Command::DocumentSearch {
            collection,
            text,
            limit,
            search_type,
            mmr_lambda,
        } => {
            commands::search_documents(zep, &collection, &text, limit, search_type, mmr_lambda)
                .await
        }

        // OpenAI
        Command::Chat {
            message,
            thread_id,
            system,
            model,
            stream,
            api,
            strict,
        } => {
            let opts = ChatOptions {
                message,
                thread_id,
                system,
                model,
                stream,
                api,
                strict,
            };
            commands::chat(zep, &config.openai, opts).await
        }

        // Handled in run() before a client is built
        Command::Logs { .. } | Command::ClearLogs => Err(zep_client::ZepError::InvalidArgument(
            "journal commands do not use the Zep service".to_string(),
        )),
    }
}
