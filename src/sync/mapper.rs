use serde_json::{json, Map, Value};

use super::key::natural_key;
use crate::error::SyncError;
use crate::model::RemoteItem;
use crate::notion::DatabaseSchema;

pub const LINK_PROPERTY: &str = "Reddit Link";
pub const NAME_PROPERTY: &str = "Name";
pub const CATEGORY_PROPERTY: &str = "Subreddit";

/// Property ids resolved once from the database schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapper {
    link_id: String,
    name_id: Option<String>,
    category_id: Option<String>,
}

impl FieldMapper {
    /// Fails unless the schema has a url-typed `Reddit Link` property.
    pub fn new(schema: &DatabaseSchema) -> Result<Self, SyncError> {
        let link = schema.require_property(LINK_PROPERTY, "url")?;
        Ok(Self {
            link_id: link.id.clone(),
            name_id: schema.property(NAME_PROPERTY).map(|p| p.id.clone()),
            category_id: schema.property(CATEGORY_PROPERTY).map(|p| p.id.clone()),
        })
    }

    pub fn has_category(&self) -> bool {
        self.category_id.is_some()
    }

    /// Property payloads for creating or updating the row of `item`.
    pub fn map(&self, item: &RemoteItem) -> Map<String, Value> {
        let mut properties = Map::new();
        properties.insert(
            LINK_PROPERTY.to_string(),
            json!({
                "type": "url",
                "url": natural_key(item),
                "id": self.link_id,
            }),
        );

        let mut name = json!({
            "type": "title",
            "title": [
                {
                    "type": "text",
                    "text": { "content": item.display_title() }
                }
            ]
        });
        if let Some(id) = &self.name_id {
            name["id"] = json!(id);
        }
        properties.insert(NAME_PROPERTY.to_string(), name);

        // Stored as rich text: select options cannot be created through the API.
        if let Some(id) = &self.category_id {
            properties.insert(
                CATEGORY_PROPERTY.to_string(),
                json!({
                    "type": "rich_text",
                    "rich_text": [
                        {
                            "type": "text",
                            "text": { "content": item.subreddit }
                        }
                    ],
                    "id": id,
                }),
            );
        }

        properties
    }
}

/// Overlay `mapped` onto a row's existing properties; keys not produced by
/// the mapper are preserved.
pub fn merge_properties(
    existing: &Map<String, Value>,
    mapped: Map<String, Value>,
) -> Map<String, Value> {
    let mut merged = existing.clone();
    merged.extend(mapped);
    merged
}
