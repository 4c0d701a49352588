//! # board-sync
//!
//! Command-line front end for the board sync client: loads settings, loads the
//! current boards, runs one operation and prints the local cache as JSON.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rb_config::{LogFormat, LogSettings, Settings};
use rb_core::models::{Board, NewBoard};
use rb_store_firebase::FirebaseStore;
use rb_sync::BoardModule;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "board-sync", version, about = "Sync boards with the remote document store")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch all boards, newest first
    List,
    /// Create a board
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        university: String,
        /// Identifier of the creating user
        #[arg(long)]
        user_id: String,
    },
    /// Delete a board by id
    Delete { board_id: String },
    /// Replace a board with the given JSON (must include `id`)
    Update { board_json: String },
    /// Append a comment to a board
    Comment {
        board_id: String,
        #[arg(long)]
        text: String,
        #[arg(long)]
        user_name: String,
        #[arg(long)]
        user_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().context("loading settings")?;
    init_tracing(&settings.log);

    let timeout = settings.request_timeout();
    let base_url = settings.database_url;
    tracing::info!(%base_url, "board-sync starting");

    let store = FirebaseStore::with_auth(base_url, timeout, settings.auth_token)
        .context("building http client")?;
    let module = BoardModule::new(Arc::new(store));

    run(cli.command, &module).await?;

    println!("{}", serde_json::to_string_pretty(&module.state().boards())?);
    Ok(())
}

/// `list` fails when the collection cannot be read. The other commands load
/// the cache on a best-effort basis first, so only their own request decides
/// the outcome.
async fn run(command: Command, module: &BoardModule) -> anyhow::Result<()> {
    let actions = module.actions();
    if let Command::List = command {
        actions.try_fetch_all().await.context("fetching boards")?;
        return Ok(());
    }
    actions.fetch_all().await;

    match command {
        Command::List => {}
        Command::Create { title, content, author, university, user_id } => {
            let board = actions
                .try_create(NewBoard { title, content, author, university, id: user_id })
                .await
                .context("creating board")?;
            tracing::info!(board_id = %board.id, "created");
        }
        Command::Delete { board_id } => {
            actions.try_delete(&board_id).await.context("deleting board")?;
        }
        Command::Update { board_json } => {
            let board: Board = serde_json::from_str(&board_json).context("parsing board json")?;
            actions.try_update(board).await.context("updating board")?;
        }
        Command::Comment { board_id, text, user_name, user_id } => {
            actions
                .try_add_comment(&board_id, &text, &user_name, &user_id)
                .await
                .context("adding comment")?;
        }
    }
    Ok(())
}

/// Logs go to stderr; stdout carries the JSON result.
fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let registry = tracing_subscriber::registry().with(filter);
    match log.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rb_core::error::SyncError;
    use rb_core::traits::MockDocumentStore;

    fn unreadable_store() -> MockDocumentStore {
        let mut store = MockDocumentStore::new();
        store
            .expect_get()
            .returning(|_| Err(SyncError::http(503, "unavailable")));
        store
    }

    #[tokio::test]
    async fn delete_goes_ahead_when_initial_load_fails() {
        let mut store = unreadable_store();
        store.expect_delete().times(1).returning(|_| Ok(()));
        let module = BoardModule::new(Arc::new(store));

        run(Command::Delete { board_id: "K1".into() }, &module).await.unwrap();

        assert!(module.state().is_empty());
    }

    #[tokio::test]
    async fn list_reports_a_failed_load() {
        let module = BoardModule::new(Arc::new(unreadable_store()));

        let err = run(Command::List, &module).await.unwrap_err();

        assert_eq!(err.downcast_ref::<SyncError>().and_then(SyncError::status), Some(503));
    }

    #[test]
    fn comment_arguments_parse() {
        let cli = Cli::try_parse_from([
            "board-sync", "comment", "K1", "--text", "hi", "--user-name", "Bo", "--user-id", "u2",
        ])
        .unwrap();

        assert!(matches!(cli.command, Command::Comment { board_id, .. } if board_id == "K1"));
    }
}
