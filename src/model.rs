use serde::{Deserialize, Serialize};

/// Comment bodies are cut to this many characters when used as a title.
pub const COMMENT_TITLE_CHARS: usize = 25;

/// What kind of thing was saved, carrying the text its title derives from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SavedKind {
    Post { title: String },
    Comment { body: String },
}

/// A saved post or comment as fetched from Reddit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteItem {
    /// Reddit fullname, e.g. `t3_abc123`.
    pub name: String,
    /// Relative permalink, e.g. `/r/rust/comments/abc123/title/`.
    pub permalink: String,
    /// Prefixed subreddit name, e.g. `r/rust`.
    pub subreddit: String,
    pub kind: SavedKind,
}

impl RemoteItem {
    pub fn post(
        name: impl Into<String>,
        permalink: impl Into<String>,
        subreddit: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            permalink: permalink.into(),
            subreddit: subreddit.into(),
            kind: SavedKind::Post {
                title: title.into(),
            },
        }
    }

    pub fn comment(
        name: impl Into<String>,
        permalink: impl Into<String>,
        subreddit: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            permalink: permalink.into(),
            subreddit: subreddit.into(),
            kind: SavedKind::Comment { body: body.into() },
        }
    }

    /// Title shown in the destination row: the post title, or a hard cut of
    /// the first [`COMMENT_TITLE_CHARS`] characters of a comment body.
    pub fn display_title(&self) -> String {
        match &self.kind {
            SavedKind::Post { title } => title.clone(),
            SavedKind::Comment { body } => body.chars().take(COMMENT_TITLE_CHARS).collect(),
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, SavedKind::Comment { .. })
    }
}
