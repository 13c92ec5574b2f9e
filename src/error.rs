use thiserror::Error;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, SyncError>;

/// Fatal outcomes of a sync run. Nothing here is retried.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Please set database ID (NOTION_DATABASE_ID)")]
    MissingDatabaseId,

    #[error("Database must have the {expected} property `{property}` (found: {})", .found.as_deref().unwrap_or("none"))]
    SchemaMismatch {
        property: &'static str,
        expected: &'static str,
        found: Option<String>,
    },

    #[error("destination table exceeded {max_pages} pages while indexing")]
    PageLimit { max_pages: usize },

    #[error(transparent)]
    Remote(#[from] anyhow::Error),
}

impl SyncError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            SyncError::Config(_) | SyncError::MissingDatabaseId => 2,
            SyncError::SchemaMismatch { .. } => 3,
            SyncError::PageLimit { .. } | SyncError::Remote(_) => 1,
        }
    }
}
