use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Channel type code for public channels
pub const OPEN_CHANNEL: &str = "O";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(default)]
    pub team_id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(rename = "type", default)]
    pub channel_type: String,
}

/// Body of a channel creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewChannel {
    pub team_id: String,
    pub name: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub channel_type: String,
}

impl NewChannel {
    pub fn public(
        team_id: impl Into<String>,
        name: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            team_id: team_id.into(),
            name: name.into(),
            display_name: display_name.into(),
            channel_type: OPEN_CHANNEL.to_string(),
        }
    }
}

/// Body of a post creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPost {
    pub channel_id: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_id: Option<String>,
    pub message: String,
    /// Zero lets the server stamp the post
    pub create_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub root_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub create_at: i64,
}

/// Post ids in server order plus the posts keyed by id
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostList {
    #[serde(default)]
    pub order: Vec<String>,
    #[serde(default)]
    pub posts: HashMap<String, Post>,
}

impl PostList {
    pub fn last_in_order(&self) -> Option<&str> {
        self.order.last().map(String::as_str)
    }
}
