//! Remote platform seams
//!
//! The bridge core only talks to Slack and Mattermost through these traits.
//! Production wiring uses [`crate::slack::SlackClient`] and
//! [`crate::mattermost::MattermostClient`]; tests substitute in-memory fakes.

use crate::error::Result;
use crate::mattermost::{Channel, NewChannel, NewPost, Post, PostList, User};
use async_trait::async_trait;

/// Lookups against the platform events originate from (Slack)
#[async_trait]
pub trait SourcePlatform: Send + Sync {
    /// Handle of the user with this id (users.info)
    async fn user_name(&self, user_id: &str) -> Result<String>;

    /// Name of the conversation with this id (conversations.info)
    async fn channel_name(&self, channel_id: &str) -> Result<String>;

    /// Join a conversation and return its name (conversations.join)
    async fn join_channel(&self, channel_id: &str) -> Result<String>;
}

/// Queries and writes against the platform events are replayed on (Mattermost)
#[async_trait]
pub trait DestinationPlatform: Send + Sync {
    async fn users_by_usernames(&self, usernames: &[String]) -> Result<Vec<User>>;

    /// `Ok(None)` when the team has no channel with this name
    async fn channel_by_name(&self, team_id: &str, name: &str) -> Result<Option<Channel>>;

    async fn create_channel(&self, channel: &NewChannel) -> Result<Channel>;

    async fn create_post(&self, post: &NewPost) -> Result<Post>;

    /// Posts in a channel created or modified at or after `since_ms`
    async fn posts_since(&self, channel_id: &str, since_ms: i64) -> Result<PostList>;
}
