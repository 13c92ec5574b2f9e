use std::collections::HashMap;
use tracing::{debug, info, instrument};

use super::mapper::LINK_PROPERTY;
use crate::error::{Result, SyncError};
use crate::notion::{NotionService, Page};

/// Natural key -> existing row, as of the moment the index was built.
#[derive(Debug, Default, Clone)]
pub struct DestinationIndex {
    rows: HashMap<String, Page>,
    skipped: usize,
}

impl DestinationIndex {
    pub fn get(&self, key: &str) -> Option<&Page> {
        self.rows.get(key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows dropped because their link value was empty or missing.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Index `page` under its link value. Later rows with the same key win.
    pub fn insert(&mut self, page: Page) {
        let key = page.url_property(LINK_PROPERTY).map(str::to_string);
        match key {
            Some(key) => {
                self.rows.insert(key, page);
            }
            None => {
                debug!(page_id = %page.id, "row has no link value; not indexed");
                self.skipped += 1;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexOptions {
    /// Rows per query; None leaves it to the API default.
    pub page_size: Option<u32>,
    /// Abort instead of indexing more than this many pages.
    pub max_pages: Option<usize>,
}

/// Drain every page of the database into a [`DestinationIndex`].
#[instrument(skip_all, fields(database_id = %database_id))]
pub async fn build_index<N>(
    notion: &N,
    database_id: &str,
    opts: IndexOptions,
) -> Result<DestinationIndex>
where
    N: NotionService + ?Sized,
{
    let mut index = DestinationIndex::default();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        if let Some(max_pages) = opts.max_pages {
            if pages >= max_pages {
                return Err(SyncError::PageLimit { max_pages });
            }
        }
        let resp = notion
            .query_database(database_id, cursor.as_deref(), opts.page_size)
            .await?;
        pages += 1;
        for page in resp.results {
            index.insert(page);
        }
        match resp.next_cursor {
            Some(next) if resp.has_more => cursor = Some(next),
            _ => break,
        }
    }

    info!(
        rows = index.len(),
        skipped = index.skipped(),
        pages,
        "indexed destination database"
    );
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notion::{DatabaseSchema, QueryDatabaseResp};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use serde_json::{json, Map, Value};
    use std::sync::Mutex;

    fn row(id: &str, url: Value) -> Page {
        serde_json::from_value(json!({
            "id": id,
            "properties": {
                "Reddit Link": { "id": "lnk", "type": "url", "url": url }
            }
        }))
        .unwrap()
    }

    /// Serves `rows` in chunks of `chunk`, with cursors "c1", "c2", ...
    struct ChunkedNotion {
        rows: Vec<Page>,
        chunk: usize,
        cursors: Mutex<Vec<Option<String>>>,
    }

    #[async_trait]
    impl NotionService for ChunkedNotion {
        async fn retrieve_database(&self, _database_id: &str) -> anyhow::Result<DatabaseSchema> {
            Err(anyhow!("unused"))
        }

        async fn query_database(
            &self,
            _database_id: &str,
            start_cursor: Option<&str>,
            _page_size: Option<u32>,
        ) -> anyhow::Result<QueryDatabaseResp> {
            self.cursors
                .lock()
                .unwrap()
                .push(start_cursor.map(str::to_string));
            let page_no = match start_cursor {
                None => 0,
                Some(c) => c.trim_start_matches('c').parse::<usize>()?,
            };
            let start = page_no * self.chunk;
            let end = (start + self.chunk).min(self.rows.len());
            let has_more = end < self.rows.len();
            Ok(QueryDatabaseResp {
                results: self.rows[start..end].to_vec(),
                has_more,
                next_cursor: has_more.then(|| format!("c{}", page_no + 1)),
            })
        }

        async fn create_page(
            &self,
            _database_id: &str,
            _properties: Map<String, Value>,
        ) -> anyhow::Result<String> {
            Err(anyhow!("unused"))
        }

        async fn update_page(
            &self,
            _page_id: &str,
            _properties: Map<String, Value>,
        ) -> anyhow::Result<String> {
            Err(anyhow!("unused"))
        }
    }

    fn rows(n: usize) -> Vec<Page> {
        (0..n)
            .map(|i| row(&format!("p{}", i), json!(format!("reddit.com/r/x/{}", i))))
            .collect()
    }

    #[tokio::test]
    async fn indexes_every_row_regardless_of_page_size() {
        for chunk in [1, 3, 7, 100] {
            let notion = ChunkedNotion {
                rows: rows(7),
                chunk,
                cursors: Mutex::new(Vec::new()),
            };
            let index = build_index(&notion, "db", IndexOptions::default())
                .await
                .unwrap();
            assert_eq!(index.len(), 7, "chunk size {}", chunk);
            assert_eq!(
                notion.cursors.lock().unwrap().len(),
                (7 + chunk - 1) / chunk
            );
        }
    }

    #[tokio::test]
    async fn first_query_has_no_cursor() {
        let notion = ChunkedNotion {
            rows: rows(4),
            chunk: 2,
            cursors: Mutex::new(Vec::new()),
        };
        build_index(&notion, "db", IndexOptions::default())
            .await
            .unwrap();
        let cursors = notion.cursors.lock().unwrap().clone();
        assert_eq!(cursors, vec![None, Some("c1".to_string())]);
    }

    #[tokio::test]
    async fn rows_without_link_are_skipped() {
        let mut all = rows(3);
        all.push(row("empty", json!("")));
        all.push(row("null", Value::Null));
        all.push(serde_json::from_value(json!({ "id": "bare", "properties": {} })).unwrap());
        let notion = ChunkedNotion {
            rows: all,
            chunk: 2,
            cursors: Mutex::new(Vec::new()),
        };
        let index = build_index(&notion, "db", IndexOptions::default())
            .await
            .unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.skipped(), 3);
    }

    #[tokio::test]
    async fn duplicate_keys_keep_the_last_row() {
        let notion = ChunkedNotion {
            rows: vec![
                row("first", json!("reddit.com/r/x/dup")),
                row("second", json!("reddit.com/r/x/dup")),
            ],
            chunk: 1,
            cursors: Mutex::new(Vec::new()),
        };
        let index = build_index(&notion, "db", IndexOptions::default())
            .await
            .unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("reddit.com/r/x/dup").unwrap().id, "second");
    }

    #[tokio::test]
    async fn page_ceiling_aborts() {
        let notion = ChunkedNotion {
            rows: rows(5),
            chunk: 2,
            cursors: Mutex::new(Vec::new()),
        };
        let opts = IndexOptions {
            page_size: None,
            max_pages: Some(2),
        };
        let err = build_index(&notion, "db", opts).await.unwrap_err();
        assert!(matches!(err, SyncError::PageLimit { max_pages: 2 }));

        let opts = IndexOptions {
            page_size: None,
            max_pages: Some(3),
        };
        assert_eq!(build_index(&notion, "db", opts).await.unwrap().len(), 5);
    }
}
