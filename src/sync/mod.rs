//! One-way reconciliation of Reddit saved items into a Notion database.
//!
//! A run reads the whole database once into a [`DestinationIndex`] keyed by
//! the `Reddit Link` url, then walks the saved listing page by page. Items
//! whose key is unknown get a new row; known items are rewritten in place
//! when `update_existing` is on. Rows are never deleted, and the index is not
//! refreshed during the run.
use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::model::RemoteItem;
use crate::notion::NotionService;
use crate::reddit::{FetchMode, RedditService, SavedListing};

pub mod index;
pub mod key;
pub mod mapper;

pub use index::{build_index, DestinationIndex, IndexOptions};
pub use key::{natural_key, REDDIT_HOST};
pub use mapper::{merge_properties, FieldMapper, CATEGORY_PROPERTY, LINK_PROPERTY, NAME_PROPERTY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    pub database_id: Option<String>,
    pub update_existing: bool,
    /// Saved items requested per listing page.
    pub page_size: u32,
    pub index: IndexOptions,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            database_id: None,
            update_existing: true,
            page_size: 25,
            index: IndexOptions::default(),
        }
    }
}

impl SyncOptions {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            database_id: cfg.database_id().map(str::to_string),
            update_existing: cfg.sync.update_existing,
            page_size: cfg.sync.page_size,
            index: IndexOptions {
                page_size: None,
                max_pages: cfg.sync.max_pages,
            },
        }
    }
}

/// What happened to one saved item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Created,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub indexed: usize,
    pub pages: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    fn new(indexed: usize, started_at: DateTime<Utc>) -> Self {
        Self {
            indexed,
            pages: 0,
            created: 0,
            updated: 0,
            unchanged: 0,
            started_at,
            finished_at: started_at,
        }
    }

    fn record(&mut self, action: Action) {
        match action {
            Action::Created => self.created += 1,
            Action::Updated => self.updated += 1,
            Action::Unchanged => self.unchanged += 1,
        }
    }
}

pub struct Syncer<'a, N: ?Sized, R: ?Sized> {
    notion: &'a N,
    reddit: &'a R,
    opts: SyncOptions,
}

impl<'a, N, R> Syncer<'a, N, R>
where
    N: NotionService + ?Sized,
    R: RedditService + ?Sized,
{
    pub fn new(notion: &'a N, reddit: &'a R, opts: SyncOptions) -> Self {
        Self {
            notion,
            reddit,
            opts,
        }
    }

    /// Run one full sync. The first failing remote call aborts the run;
    /// rows written before it stay written.
    #[instrument(skip_all)]
    pub async fn run(&self) -> Result<SyncReport> {
        let database_id = self
            .opts
            .database_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or(SyncError::MissingDatabaseId)?;
        let started_at = Utc::now();

        let schema = self.notion.retrieve_database(database_id).await?;
        let mapper = FieldMapper::new(&schema)?;

        let index = build_index(self.notion, database_id, self.opts.index).await?;
        let mut report = SyncReport::new(index.len(), started_at);

        let mut listing = SavedListing::open(self.reddit, self.opts.page_size).await?;
        loop {
            for item in listing.items() {
                let action = self
                    .reconcile_item(database_id, &mapper, &index, item)
                    .await?;
                report.record(action);
            }
            if listing.is_finished() {
                break;
            }
            listing
                .fetch_more(self.opts.page_size, FetchMode::Replace)
                .await?;
        }
        report.pages = listing.pages();
        report.finished_at = Utc::now();

        info!(
            created = report.created,
            updated = report.updated,
            unchanged = report.unchanged,
            pages = report.pages,
            indexed = report.indexed,
            elapsed_ms = (report.finished_at - report.started_at).num_milliseconds(),
            "sync finished"
        );
        Ok(report)
    }

    async fn reconcile_item(
        &self,
        database_id: &str,
        mapper: &FieldMapper,
        index: &DestinationIndex,
        item: &RemoteItem,
    ) -> Result<Action> {
        let key = natural_key(item);
        match index.get(&key) {
            None => {
                let page_id = self
                    .notion
                    .create_page(database_id, mapper.map(item))
                    .await?;
                info!(url = %key, page_id = %page_id, "created page");
                Ok(Action::Created)
            }
            Some(existing) if self.opts.update_existing => {
                info!(url = %key, page_id = %existing.id, "updating page");
                let merged = merge_properties(&existing.properties, mapper.map(item));
                self.notion.update_page(&existing.id, merged).await?;
                Ok(Action::Updated)
            }
            Some(_) => Ok(Action::Unchanged),
        }
    }
}
