use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use reddit_notion_sync::config;
use reddit_notion_sync::error::SyncError;
use reddit_notion_sync::notion::NotionClient;
use reddit_notion_sync::reddit::RedditClient;
use reddit_notion_sync::sync::{SyncOptions, Syncer};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Copy saved Reddit posts and comments into a Notion database"
)]
struct Args {
    /// Optional YAML config; environment variables override its values
    #[arg(long, env = "SYNC_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    if let Err(err) = run(&args).await {
        let code = match err.downcast_ref::<SyncError>() {
            Some(sync_err) => sync_err.exit_code(),
            None => 1,
        };
        error!("{:#}", err);
        std::process::exit(code);
    }
}

async fn run(args: &Args) -> Result<()> {
    let cfg = config::load(args.config.as_deref()).map_err(SyncError::from)?;
    let opts = SyncOptions::from_config(&cfg);
    if opts.database_id.is_none() {
        return Err(SyncError::MissingDatabaseId.into());
    }

    let notion = NotionClient::from_config(&cfg)?;
    let reddit = RedditClient::new(&cfg.reddit.user_agent)?
        .login(&cfg.reddit)
        .await?;

    info!(user = %reddit.username(), "starting sync");
    Syncer::new(&notion, &reddit, opts).run().await?;
    Ok(())
}
