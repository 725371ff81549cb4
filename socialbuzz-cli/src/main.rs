use anyhow::Result;
use clap::Parser;
use socialbuzz_core::config::Config;
use socialbuzz_core::core_feed::FeedCoordinator;
use socialbuzz_core::core_gateway::HttpGateway;
use socialbuzz_core::core_session::SessionManager;
use socialbuzz_core::core_store::model::{PostId, UserId};
use socialbuzz_core::core_store::EntityStore;
use socialbuzz_core::logging::{init_logging_with_config, LogConfig, LogLevel};
use socialbuzz_core::test_harness::HarnessServer;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "socialbuzz")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Set the log level (trace, debug, info, warn, error); overrides
    /// the configured level
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON formatted logging; overrides the configured format
    #[arg(long)]
    json_logs: bool,

    /// Backend base URL (overrides config and environment)
    #[arg(long)]
    remote_url: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
enum Command {
    /// Register a new account
    Register { username: String, password: String },

    /// Log in and persist the session
    Login { username: String, password: String },

    /// Log out and clear the persisted session
    Logout,

    /// Submit a new post
    Post {
        /// Post text (may be empty)
        #[arg(default_value = "")]
        text: String,
    },

    /// Like a post by id
    Like { post_id: String },

    /// Delete a post by id
    Delete { post_id: String },

    /// Add a friend by user id
    AddFriend { user_id: String },

    /// Print the current feed
    Feed,

    /// Run a scripted flow against an in-process backend
    Demo,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(url) = args.remote_url {
        config.remote.base_url = url;
    }

    // Logging settings come from the config's logging section; CLI flags
    // override it.
    let level_name = args.log_level.as_deref().unwrap_or(&config.logging.level);
    let log_level = LogLevel::from_str(level_name).unwrap_or_else(|| {
        eprintln!("Invalid log level '{}', using 'info'", level_name);
        LogLevel::Info
    });

    let log_config = LogConfig::new(log_level)
        .with_target(config.logging.with_target)
        .json_format(config.logging.json_format || args.json_logs);
    init_logging_with_config(log_config)?;
    socialbuzz_core::metrics::init_metrics();

    match args.command {
        Command::Demo => demo().await,
        command => run(command, &config).await,
    }
}

/// Build a coordinator from config, refresh from the backend and restore
/// the persisted session, then execute one command.
async fn run(command: Command, config: &Config) -> Result<()> {
    let store = Arc::new(EntityStore::new());
    let gateway = Arc::new(HttpGateway::new(
        config.remote.base_url.clone(),
        config.remote.request_timeout,
    )?);
    let session = Arc::new(SessionManager::new(&config.session.slot_dir)?);
    let feed = FeedCoordinator::new(store, gateway, session);

    feed.refresh().await?;
    feed.restore_session().await?;

    match command {
        Command::Register { username, password } => {
            let user = feed.register(&username, &password).await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        Command::Login { username, password } => {
            let snapshot = feed.login(&username, &password).await?;
            println!("Logged in as {} ({})", snapshot.username, snapshot.user_id);
        }
        Command::Logout => {
            feed.logout().await?;
            println!("Logged out");
        }
        Command::Post { text } => {
            feed.set_draft(text).await;
            let post = feed.create_post().await?;
            println!("{}", serde_json::to_string_pretty(&post)?);
        }
        Command::Like { post_id } => {
            let likes = feed.like_post(&PostId::new(post_id)).await?;
            println!("Likes: {}", likes);
        }
        Command::Delete { post_id } => {
            feed.delete_post(&PostId::new(post_id)).await?;
            println!("Deleted");
        }
        Command::AddFriend { user_id } => {
            let user = feed.add_friend(&UserId::new(user_id)).await?;
            println!("Friends: {}", serde_json::to_string(&user.friends)?);
        }
        Command::Feed => {
            for post in feed.posts().await {
                println!("{}", serde_json::to_string(&post)?);
            }
        }
        Command::Demo => unreachable!("handled in main"),
    }

    Ok(())
}

/// Scripted flow against an in-process backend, exercising every
/// operation end to end.
async fn demo() -> Result<()> {
    let harness = HarnessServer::spawn().await?;
    info!(url = %harness.base_url(), "In-process backend started");

    let slot_dir = std::env::temp_dir().join(format!("socialbuzz-demo-{}", std::process::id()));
    let store = Arc::new(EntityStore::new());
    let gateway = Arc::new(HttpGateway::new(
        harness.base_url(),
        std::time::Duration::from_secs(2),
    )?);
    let session = Arc::new(SessionManager::new(&slot_dir)?);
    let feed = FeedCoordinator::new(store, gateway, session);

    let alice = feed.register("alice", "pw1").await?;
    let bob = feed.register("bob", "pw2").await?;
    feed.login("alice", "pw1").await?;

    feed.set_draft("hello from the demo").await;
    let post = feed.create_post().await?;
    let likes = feed.like_post(&post.id).await?;
    feed.add_friend(&bob.id).await?;

    println!("alice: {}", alice.id);
    println!("post:  {} ({} likes)", post.id, likes);
    println!(
        "friends of alice: {}",
        serde_json::to_string(&feed.session().await.expect("session").friends)?
    );

    feed.logout().await?;
    harness.shutdown().await;
    let _ = std::fs::remove_dir_all(&slot_dir);

    info!("Demo finished");
    Ok(())
}
