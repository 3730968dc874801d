use crate::config::SlackConfig;
use crate::error::{BridgeError, Result};
use crate::platform::SourcePlatform;
use async_trait::async_trait;
use slack_morphism::prelude::*;
use std::sync::Arc;

pub struct SlackClient {
    client: Arc<SlackHyperClient>,
    token: SlackApiToken,
}

impl SlackClient {
    pub fn new(config: &SlackConfig) -> Result<Self> {
        let connector = SlackClientHyperConnector::new()
            .map_err(|e| BridgeError::SlackApi(e.to_string()))?;

        let client = Arc::new(slack_morphism::SlackClient::new(connector));
        let token = SlackApiToken::new(config.bot_token.clone().into());

        Ok(Self { client, token })
    }
}

#[async_trait]
impl SourcePlatform for SlackClient {
    async fn user_name(&self, user_id: &str) -> Result<String> {
        let session = self.client.open_session(&self.token);

        let request = SlackApiUsersInfoRequest::new(SlackUserId(user_id.to_string()));

        let response = session
            .users_info(&request)
            .await
            .map_err(|e| BridgeError::SlackApi(e.to_string()))?;

        response
            .user
            .name
            .ok_or_else(|| BridgeError::SlackApi(format!("user {} has no name", user_id)))
    }

    async fn channel_name(&self, channel_id: &str) -> Result<String> {
        let session = self.client.open_session(&self.token);

        let request = SlackApiConversationsInfoRequest::new(SlackChannelId(channel_id.to_string()));

        let response = session
            .conversations_info(&request)
            .await
            .map_err(|e| BridgeError::SlackApi(e.to_string()))?;

        response
            .channel
            .name
            .ok_or_else(|| BridgeError::SlackApi(format!("channel {} has no name", channel_id)))
    }

    async fn join_channel(&self, channel_id: &str) -> Result<String> {
        let session = self.client.open_session(&self.token);

        let request = SlackApiConversationsJoinRequest::new(SlackChannelId(channel_id.to_string()));

        let response = session
            .conversations_join(&request)
            .await
            .map_err(|e| BridgeError::SlackApi(e.to_string()))?;

        tracing::info!(channel_id = %channel_id, "Joined Slack channel");

        response
            .channel
            .name
            .ok_or_else(|| BridgeError::SlackApi(format!("channel {} has no name", channel_id)))
    }
}
