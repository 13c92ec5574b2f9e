use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use reddit_notion_sync::config;
use reddit_notion_sync::notion::NotionClient;
use reddit_notion_sync::sync::FieldMapper;

/// Print a database's properties and whether they suit the sync job.
#[derive(Parser, Debug)]
struct Args {
    /// Optional YAML config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Database ID to inspect (defaults to the configured one)
    #[arg(long)]
    db_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let cfg = config::load(args.config.as_deref())?;
    let db_id = args
        .db_id
        .or_else(|| cfg.database_id().map(str::to_string))
        .ok_or_else(|| anyhow::anyhow!("Please set database ID"))?;
    let client = NotionClient::from_config(&cfg)?;

    let db = client.retrieve_database(&db_id).await?;
    println!("Database ID: {}", db.id);
    println!("Properties:");
    let mut props: Vec<_> = db.properties.iter().collect();
    props.sort_by(|a, b| a.0.cmp(b.0));
    for (name, prop) in props {
        println!("  {} -> {{ id: {}, type: {} }}", name, prop.id, prop.typ);
    }

    match FieldMapper::new(&db) {
        Ok(mapper) if mapper.has_category() => println!("OK (subreddit column mapped)"),
        Ok(_) => println!("OK (no Subreddit column; category not synced)"),
        Err(err) => println!("NOT USABLE: {}", err),
    }
    Ok(())
}
