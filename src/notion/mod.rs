use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::fmt;
use tracing::debug;

use crate::config::Config;

pub mod model;

pub use model::{DatabaseProperty, DatabaseSchema, Page, QueryDatabaseResp};

const NOTION_API_BASE: &str = "https://api.notion.com/";

/// Operations the sync job needs from the destination database.
#[async_trait]
pub trait NotionService: Send + Sync {
    async fn retrieve_database(&self, database_id: &str) -> Result<DatabaseSchema>;

    /// One page of rows. `start_cursor` is omitted from the request when None.
    async fn query_database(
        &self,
        database_id: &str,
        start_cursor: Option<&str>,
        page_size: Option<u32>,
    ) -> Result<QueryDatabaseResp>;

    /// Returns the id of the created page.
    async fn create_page(&self, database_id: &str, properties: Map<String, Value>)
        -> Result<String>;

    async fn update_page(&self, page_id: &str, properties: Map<String, Value>) -> Result<String>;
}

#[derive(Clone)]
pub struct NotionClient {
    http: Client,
    base_url: Url,
    token: String,
    version: String,
}

impl fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotionClient")
            .field("base_url", &self.base_url)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl NotionClient {
    pub fn new(token: String, version: String) -> Result<Self> {
        let base_url = Url::parse(NOTION_API_BASE).context("invalid default Notion URL")?;
        Self::with_base_url(token, version, base_url)
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(cfg.notion.token.clone(), cfg.notion.version.clone())
    }

    pub fn with_base_url(token: String, version: String, base_url: Url) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("reddit-notion-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url,
            token,
            version,
        })
    }

    pub fn build_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Request> {
        let endpoint = self
            .base_url
            .join(path)
            .context("invalid Notion base URL")?;
        let mut builder = self
            .http
            .request(method, endpoint)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Notion-Version", &self.version);
        if let Some(body) = body {
            builder = builder
                .header("Content-Type", "application/json")
                .json(body);
        }
        builder.build().context("failed to build Notion request")
    }

    async fn execute<T: DeserializeOwned>(&self, request: reqwest::Request) -> Result<T> {
        let method = request.method().clone();
        let url = request.url().clone();
        let res = self
            .http
            .execute(request)
            .await
            .context("failed to reach Notion")?;

        let status = res.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow!("received 429 from Notion: {}", body));
        }
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow!("notion error {} on {} {}: {}", status, method, url, body));
        }

        res.json::<T>()
            .await
            .with_context(|| format!("invalid Notion response for {} {}", method, url))
    }

    pub async fn retrieve_database(&self, database_id: &str) -> Result<DatabaseSchema> {
        let request =
            self.build_request(Method::GET, &format!("v1/databases/{}", database_id), None)?;
        debug!(url=%request.url(), "retrieving notion database");
        self.execute(request)
            .await
            .context("failed to retrieve database schema")
    }

    pub async fn query_database(
        &self,
        database_id: &str,
        start_cursor: Option<&str>,
        page_size: Option<u32>,
    ) -> Result<QueryDatabaseResp> {
        let body = build_query_request(start_cursor, page_size);
        let request = self.build_request(
            Method::POST,
            &format!("v1/databases/{}/query", database_id),
            Some(&body),
        )?;
        debug!(url=%request.url(), payload=%body, "querying notion database");
        self.execute(request).await
    }

    pub async fn create_page(
        &self,
        database_id: &str,
        properties: Map<String, Value>,
    ) -> Result<String> {
        let body = build_create_page_request(database_id, properties);
        let request = self.build_request(Method::POST, "v1/pages", Some(&body))?;
        debug!(url=%request.url(), payload=%body, "creating notion page");
        let page: PageResponse = self.execute(request).await?;
        Ok(page.id)
    }

    pub async fn update_page(
        &self,
        page_id: &str,
        properties: Map<String, Value>,
    ) -> Result<String> {
        let body = build_update_page_request(properties);
        let request =
            self.build_request(Method::PATCH, &format!("v1/pages/{}", page_id), Some(&body))?;
        debug!(url=%request.url(), payload=%body, "updating notion page");
        let page: PageResponse = self.execute(request).await?;
        Ok(page.id)
    }
}

#[async_trait]
impl NotionService for NotionClient {
    async fn retrieve_database(&self, database_id: &str) -> Result<DatabaseSchema> {
        NotionClient::retrieve_database(self, database_id).await
    }

    async fn query_database(
        &self,
        database_id: &str,
        start_cursor: Option<&str>,
        page_size: Option<u32>,
    ) -> Result<QueryDatabaseResp> {
        NotionClient::query_database(self, database_id, start_cursor, page_size).await
    }

    async fn create_page(
        &self,
        database_id: &str,
        properties: Map<String, Value>,
    ) -> Result<String> {
        NotionClient::create_page(self, database_id, properties).await
    }

    async fn update_page(&self, page_id: &str, properties: Map<String, Value>) -> Result<String> {
        NotionClient::update_page(self, page_id, properties).await
    }
}

pub fn build_query_request(start_cursor: Option<&str>, page_size: Option<u32>) -> Value {
    let mut body = Map::new();
    if let Some(cursor) = start_cursor {
        body.insert("start_cursor".into(), json!(cursor));
    }
    if let Some(size) = page_size {
        body.insert("page_size".into(), json!(size));
    }
    Value::Object(body)
}

pub fn build_create_page_request(database_id: &str, properties: Map<String, Value>) -> Value {
    json!({
        "parent": { "database_id": database_id },
        "properties": Value::Object(properties),
    })
}

pub fn build_update_page_request(properties: Map<String, Value>) -> Value {
    json!({ "properties": Value::Object(properties) })
}

#[derive(Deserialize)]
struct PageResponse {
    id: String,
}
