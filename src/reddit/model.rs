use serde::Deserialize;

use crate::model::RemoteItem;

#[derive(Deserialize, Debug)]
pub struct TokenResp {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct MeResp {
    pub name: String,
}

#[derive(Deserialize, Debug)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Deserialize, Debug)]
pub struct ListingData {
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub children: Vec<Thing>,
}

/// Saved listings only ever hold links (`t3`) and comments (`t1`).
#[derive(Deserialize, Debug)]
#[serde(tag = "kind", content = "data")]
pub enum Thing {
    #[serde(rename = "t3")]
    Link(LinkData),
    #[serde(rename = "t1")]
    Comment(CommentData),
}

#[derive(Deserialize, Debug)]
pub struct LinkData {
    pub name: String,
    pub permalink: String,
    pub title: String,
    pub subreddit_name_prefixed: String,
}

#[derive(Deserialize, Debug)]
pub struct CommentData {
    pub name: String,
    pub permalink: String,
    #[serde(default)]
    pub body: String,
    pub subreddit_name_prefixed: String,
}

impl From<Thing> for RemoteItem {
    fn from(thing: Thing) -> Self {
        match thing {
            Thing::Link(d) => {
                RemoteItem::post(d.name, d.permalink, d.subreddit_name_prefixed, d.title)
            }
            Thing::Comment(d) => {
                RemoteItem::comment(d.name, d.permalink, d.subreddit_name_prefixed, d.body)
            }
        }
    }
}
