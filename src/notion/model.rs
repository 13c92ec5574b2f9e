use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::SyncError;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DatabaseProperty {
    pub id: String,
    #[serde(rename = "type")]
    pub typ: String,
}

/// Schema descriptor of a database: property name -> { id, type }.
#[derive(Deserialize, Debug, Clone)]
pub struct DatabaseSchema {
    pub id: String,
    #[serde(default)]
    pub title: Vec<Value>,
    pub properties: HashMap<String, DatabaseProperty>,
}

impl DatabaseSchema {
    pub fn property(&self, name: &str) -> Option<&DatabaseProperty> {
        self.properties.get(name)
    }

    /// Fails with `SchemaMismatch` unless `name` exists with type `typ`.
    pub fn require_property(
        &self,
        name: &'static str,
        typ: &'static str,
    ) -> Result<&DatabaseProperty, SyncError> {
        match self.properties.get(name) {
            Some(prop) if prop.typ == typ => Ok(prop),
            other => Err(SyncError::SchemaMismatch {
                property: name,
                expected: typ,
                found: other.map(|p| p.typ.clone()),
            }),
        }
    }
}

/// A database row.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Page {
    /// Non-empty `url` value of the named url property.
    pub fn url_property(&self, name: &str) -> Option<&str> {
        self.properties
            .get(name)
            .and_then(|p| p.get("url"))
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct QueryDatabaseResp {
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}
