//! Mattermost REST v4 adapter

mod client;
mod types;

pub use client::MattermostClient;
pub use types::{Channel, NewChannel, NewPost, OPEN_CHANNEL, Post, PostList, User};
