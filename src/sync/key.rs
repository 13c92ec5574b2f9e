use crate::model::RemoteItem;

/// Host prefix joined with a permalink to form the natural key.
pub const REDDIT_HOST: &str = "reddit.com";

/// Natural key of a saved item, stored verbatim in the link column.
/// No normalization: case and trailing slashes are significant.
pub fn natural_key(item: &RemoteItem) -> String {
    format!("{}{}", REDDIT_HOST, item.permalink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_host_plus_permalink() {
        let item = RemoteItem::post("t3_a", "/r/rust/comments/a/title/", "r/rust", "t");
        assert_eq!(natural_key(&item), "reddit.com/r/rust/comments/a/title/");
    }

    #[test]
    fn trailing_slash_and_case_are_significant() {
        let a = RemoteItem::post("t3_a", "/r/Rust/comments/a/", "r/Rust", "t");
        let b = RemoteItem::post("t3_a", "/r/Rust/comments/a", "r/Rust", "t");
        let c = RemoteItem::post("t3_a", "/r/rust/comments/a/", "r/rust", "t");
        assert_ne!(natural_key(&a), natural_key(&b));
        assert_ne!(natural_key(&a), natural_key(&c));
    }
}
