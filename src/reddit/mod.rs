use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::fmt;
use tracing::{debug, info};

use crate::config;
use crate::model::RemoteItem;

pub mod listing;
pub mod model;

pub use listing::{FetchMode, SavedListing};

use model::{Listing, MeResp, TokenResp};

const REDDIT_AUTH_BASE: &str = "https://www.reddit.com/";
const REDDIT_API_BASE: &str = "https://oauth.reddit.com/";

/// One page of the current user's saved listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedPage {
    pub items: Vec<RemoteItem>,
    /// Cursor for the next page; None once the listing is exhausted.
    pub after: Option<String>,
}

/// Operations the sync job needs from Reddit.
#[async_trait]
pub trait RedditService: Send + Sync {
    async fn saved_page(&self, after: Option<&str>, limit: u32) -> Result<SavedPage>;
}

#[derive(Clone)]
pub struct RedditClient {
    http: Client,
    auth_url: Url,
    api_url: Url,
}

impl fmt::Debug for RedditClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditClient")
            .field("auth_url", &self.auth_url)
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl RedditClient {
    pub fn new(user_agent: &str) -> Result<Self> {
        let auth_url = Url::parse(REDDIT_AUTH_BASE).context("invalid default Reddit URL")?;
        let api_url = Url::parse(REDDIT_API_BASE).context("invalid default Reddit URL")?;
        Self::with_base_urls(user_agent, auth_url, api_url)
    }

    pub fn with_base_urls(user_agent: &str, auth_url: Url, api_url: Url) -> Result<Self> {
        let http = Client::builder()
            .user_agent(user_agent)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            auth_url,
            api_url,
        })
    }

    /// Exchange the refresh token for an access token and resolve the user
    /// whose saved items will be listed.
    pub async fn login(self, creds: &config::Reddit) -> Result<RedditSession> {
        let token_url = self.auth_url.join("api/v1/access_token")?;
        let res = self
            .http
            .post(token_url)
            .basic_auth(&creds.client_id, Some(&creds.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", creds.refresh_token.as_str()),
            ])
            .send()
            .await
            .context("failed to reach Reddit")?;
        let token: TokenResp = read_json(res).await.context("reddit token refresh failed")?;
        debug!(expires_in = ?token.expires_in, scope = ?token.scope, "obtained reddit access token");

        let mut session = RedditSession {
            client: self,
            access_token: token.access_token,
            username: String::new(),
        };
        let me: MeResp = session.get("api/v1/me", &[]).await?;
        info!(user = %me.name, "logged in to reddit");
        session.username = me.name;
        Ok(session)
    }
}

/// An authenticated Reddit session.
pub struct RedditSession {
    client: RedditClient,
    access_token: String,
    username: String,
}

impl fmt::Debug for RedditSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditSession")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl RedditSession {
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn build_request(&self, path: &str, query: &[(&str, &str)]) -> Result<reqwest::Request> {
        let url = self
            .client
            .api_url
            .join(path)
            .context("invalid Reddit API URL")?;
        self.client
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .query(query)
            .build()
            .context("failed to build Reddit request")
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let request = self.build_request(path, query)?;
        debug!(url=%request.url(), "reddit request");
        let res = self
            .client
            .http
            .execute(request)
            .await
            .context("failed to reach Reddit")?;
        read_json(res).await
    }
}

#[async_trait]
impl RedditService for RedditSession {
    async fn saved_page(&self, after: Option<&str>, limit: u32) -> Result<SavedPage> {
        let path = format!("user/{}/saved", self.username);
        let limit = limit.to_string();
        let mut query = vec![("limit", limit.as_str()), ("raw_json", "1")];
        if let Some(after) = after {
            query.push(("after", after));
        }
        let listing: Listing = self.get(&path, &query).await?;
        Ok(SavedPage {
            items: listing.data.children.into_iter().map(Into::into).collect(),
            after: listing.data.after.filter(|a| !a.is_empty()),
        })
    }
}

async fn read_json<T: DeserializeOwned>(res: reqwest::Response) -> Result<T> {
    let status = res.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        let body = res.text().await.unwrap_or_default();
        return Err(anyhow!("received 429 from Reddit: {}", body));
    }
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(anyhow!("reddit error {}: {}", status, body));
    }
    res.json::<T>().await.context("invalid Reddit response")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> RedditSession {
        RedditSession {
            client: RedditClient::new("notion-reddit-sync").unwrap(),
            access_token: "tok".into(),
            username: "spez".into(),
        }
    }

    #[test]
    fn build_request_uses_bearer_and_query() {
        let s = session();
        let request = s
            .build_request(
                "user/spez/saved",
                &[("limit", "25"), ("raw_json", "1"), ("after", "t3_x")],
            )
            .unwrap();
        assert_eq!(request.url().host_str(), Some("oauth.reddit.com"));
        assert_eq!(request.url().path(), "/user/spez/saved");
        assert_eq!(request.url().query(), Some("limit=25&raw_json=1&after=t3_x"));
        assert_eq!(
            request
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .unwrap(),
            "Bearer tok"
        );
    }

    #[test]
    fn debug_hides_access_token() {
        let s = session();
        let out = format!("{:?}", s);
        assert!(out.contains("spez"));
        assert!(!out.contains("tok"));
    }
}
