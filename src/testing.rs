//! In-memory platform fakes for unit tests

use crate::error::{BridgeError, Result};
use crate::mattermost::{Channel, NewChannel, NewPost, Post, PostList, User};
use crate::platform::{DestinationPlatform, SourcePlatform};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct FakeSlack {
    pub users: Mutex<HashMap<String, String>>,
    pub channels: Mutex<HashMap<String, String>>,
    pub user_calls: AtomicUsize,
    pub channel_calls: AtomicUsize,
    pub joined: Mutex<Vec<String>>,
}

impl FakeSlack {
    pub fn with_user(self, id: &str, name: &str) -> Self {
        self.users
            .lock()
            .unwrap()
            .insert(id.to_string(), name.to_string());
        self
    }

    pub fn with_channel(self, id: &str, name: &str) -> Self {
        self.channels
            .lock()
            .unwrap()
            .insert(id.to_string(), name.to_string());
        self
    }

    pub fn rename_user(&self, id: &str, name: &str) {
        self.users
            .lock()
            .unwrap()
            .insert(id.to_string(), name.to_string());
    }

    pub fn user_calls(&self) -> usize {
        self.user_calls.load(Ordering::SeqCst)
    }

    pub fn channel_calls(&self) -> usize {
        self.channel_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourcePlatform for FakeSlack {
    async fn user_name(&self, user_id: &str) -> Result<String> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        self.users
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .ok_or_else(|| BridgeError::SlackApi("user_not_found".to_string()))
    }

    async fn channel_name(&self, channel_id: &str) -> Result<String> {
        self.channel_calls.fetch_add(1, Ordering::SeqCst);
        self.channels
            .lock()
            .unwrap()
            .get(channel_id)
            .cloned()
            .ok_or_else(|| BridgeError::SlackApi("channel_not_found".to_string()))
    }

    async fn join_channel(&self, channel_id: &str) -> Result<String> {
        self.joined.lock().unwrap().push(channel_id.to_string());
        self.channels
            .lock()
            .unwrap()
            .get(channel_id)
            .cloned()
            .ok_or_else(|| BridgeError::SlackApi("method_not_supported_for_channel_type".to_string()))
    }
}

#[derive(Default)]
pub struct FakeMattermost {
    pub users: Mutex<Vec<User>>,
    pub channels: Mutex<Vec<Channel>>,
    pub created_channels: Mutex<Vec<NewChannel>>,
    pub posts: Mutex<Vec<NewPost>>,
    /// Post ids returned by `posts_since`, per channel, in server order
    pub history: Mutex<HashMap<String, Vec<String>>>,
    pub since_queries: Mutex<Vec<(String, i64)>>,
    pub user_lookups: AtomicUsize,
    pub fail_posts: bool,
}

impl FakeMattermost {
    pub fn with_user(self, id: &str, username: &str) -> Self {
        self.users.lock().unwrap().push(User {
            id: id.to_string(),
            username: username.to_string(),
        });
        self
    }

    pub fn with_channel(self, id: &str, name: &str) -> Self {
        self.channels.lock().unwrap().push(Channel {
            id: id.to_string(),
            team_id: "team1".to_string(),
            name: name.to_string(),
            display_name: name.to_string(),
            channel_type: "O".to_string(),
        });
        self
    }

    pub fn with_history(self, channel_id: &str, order: &[&str]) -> Self {
        self.history.lock().unwrap().insert(
            channel_id.to_string(),
            order.iter().map(|id| id.to_string()).collect(),
        );
        self
    }

    pub fn created_channels(&self) -> Vec<NewChannel> {
        self.created_channels.lock().unwrap().clone()
    }

    pub fn posts(&self) -> Vec<NewPost> {
        self.posts.lock().unwrap().clone()
    }

    pub fn since_queries(&self) -> Vec<(String, i64)> {
        self.since_queries.lock().unwrap().clone()
    }

    pub fn user_lookups(&self) -> usize {
        self.user_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DestinationPlatform for FakeMattermost {
    async fn users_by_usernames(&self, usernames: &[String]) -> Result<Vec<User>> {
        self.user_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| usernames.contains(&u.username))
            .cloned()
            .collect())
    }

    async fn channel_by_name(&self, _team_id: &str, name: &str) -> Result<Option<Channel>> {
        Ok(self
            .channels
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn create_channel(&self, channel: &NewChannel) -> Result<Channel> {
        self.created_channels.lock().unwrap().push(channel.clone());
        let mut channels = self.channels.lock().unwrap();
        let created = Channel {
            id: format!("mm-c{}", channels.len() + 1),
            team_id: channel.team_id.clone(),
            name: channel.name.clone(),
            display_name: channel.display_name.clone(),
            channel_type: channel.channel_type.clone(),
        };
        channels.push(created.clone());
        Ok(created)
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post> {
        if self.fail_posts {
            return Err(BridgeError::Mattermost("500 Internal Server Error".to_string()));
        }
        let mut posts = self.posts.lock().unwrap();
        posts.push(post.clone());
        Ok(Post {
            id: format!("mm-p{}", posts.len()),
            channel_id: post.channel_id.clone(),
            user_id: post.user_id.clone(),
            root_id: post.root_id.clone().unwrap_or_default(),
            message: post.message.clone(),
            create_at: post.create_at,
        })
    }

    async fn posts_since(&self, channel_id: &str, since_ms: i64) -> Result<PostList> {
        self.since_queries
            .lock()
            .unwrap()
            .push((channel_id.to_string(), since_ms));
        let order = self
            .history
            .lock()
            .unwrap()
            .get(channel_id)
            .cloned()
            .unwrap_or_default();
        Ok(PostList {
            order,
            posts: HashMap::new(),
        })
    }
}
