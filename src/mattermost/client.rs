use crate::config::MattermostConfig;
use crate::error::{BridgeError, Result};
use crate::mattermost::{Channel, NewChannel, NewPost, Post, PostList, User};
use crate::platform::DestinationPlatform;
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct MattermostClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl MattermostClient {
    pub fn new(config: &MattermostConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("slack-mm-bridge/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BridgeError::Mattermost(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v4{}", self.base_url, path)
    }

    /// Turn a non-2xx response into an error carrying status and body
    async fn ensure_success(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(BridgeError::Mattermost(format!("{}: {}", status, body)))
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| BridgeError::Mattermost(e.to_string()))?;

        Self::ensure_success(response)
            .await?
            .json::<T>()
            .await
            .map_err(|e| BridgeError::Mattermost(format!("invalid response body: {}", e)))
    }
}

#[async_trait]
impl DestinationPlatform for MattermostClient {
    async fn users_by_usernames(&self, usernames: &[String]) -> Result<Vec<User>> {
        tracing::debug!(count = usernames.len(), "Looking up Mattermost users by username");
        self.send_json(self.http.post(self.url("/users/usernames")).json(usernames))
            .await
    }

    async fn channel_by_name(&self, team_id: &str, name: &str) -> Result<Option<Channel>> {
        let response = self
            .http
            .get(self.url(&format!("/teams/{}/channels/name/{}", team_id, name)))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| BridgeError::Mattermost(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let channel = Self::ensure_success(response)
            .await?
            .json::<Channel>()
            .await
            .map_err(|e| BridgeError::Mattermost(format!("invalid response body: {}", e)))?;
        Ok(Some(channel))
    }

    async fn create_channel(&self, channel: &NewChannel) -> Result<Channel> {
        tracing::info!(
            team_id = %channel.team_id,
            name = %channel.name,
            display_name = %channel.display_name,
            "Creating Mattermost channel"
        );
        self.send_json(self.http.post(self.url("/channels")).json(channel))
            .await
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post> {
        self.send_json(self.http.post(self.url("/posts")).json(post))
            .await
    }

    async fn posts_since(&self, channel_id: &str, since_ms: i64) -> Result<PostList> {
        self.send_json(
            self.http
                .get(self.url(&format!("/channels/{}/posts?since={}", channel_id, since_ms))),
        )
        .await
    }
}
