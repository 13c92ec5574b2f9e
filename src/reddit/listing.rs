//! Lazily paginated view over the saved listing.
use anyhow::Result;

use super::RedditService;
use crate::model::RemoteItem;

/// How `fetch_more` treats the items already held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Keep the current items and extend them with the next page.
    Append,
    /// Drop the current items; only the next page is held afterwards.
    Replace,
}

pub struct SavedListing<'a, S: RedditService + ?Sized> {
    service: &'a S,
    items: Vec<RemoteItem>,
    after: Option<String>,
    pages: usize,
}

impl<'a, S: RedditService + ?Sized> SavedListing<'a, S> {
    /// Fetch the first page.
    pub async fn open(service: &'a S, amount: u32) -> Result<Self> {
        let first = service.saved_page(None, amount).await?;
        Ok(Self {
            service,
            items: first.items,
            after: first.after,
            pages: 1,
        })
    }

    pub fn items(&self) -> &[RemoteItem] {
        &self.items
    }

    /// True once Reddit reported no further pages.
    pub fn is_finished(&self) -> bool {
        self.after.is_none()
    }

    /// Number of pages fetched so far.
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Fetch the next page. Returns how many items it held; a finished
    /// listing is left untouched and yields 0.
    pub async fn fetch_more(&mut self, amount: u32, mode: FetchMode) -> Result<usize> {
        let Some(after) = self.after.as_deref() else {
            return Ok(0);
        };
        let next = self.service.saved_page(Some(after), amount).await?;
        let fetched = next.items.len();
        match mode {
            FetchMode::Append => self.items.extend(next.items),
            FetchMode::Replace => self.items = next.items,
        }
        self.after = next.after;
        self.pages += 1;
        Ok(fetched)
    }
}
