use crate::error::Result;
use crate::identity::{IdentityCache, LocalIdentity};
use crate::logging::log_error;
use crate::mattermost::NewChannel;
use crate::platform::DestinationPlatform;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::{Arc, LazyLock};

static CHANNEL_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9\-_]+$").expect("valid channel name regex"));

/// Map a Slack channel name onto Mattermost's channel name alphabet
///
/// Names already made of `[a-z0-9-_]` pass through; anything else becomes the
/// lowercase hex SHA-256 of the name, which itself passes through unchanged.
pub fn sanitize_channel_name(name: &str) -> String {
    if CHANNEL_NAME.is_match(name) {
        name.to_string()
    } else {
        hex::encode(Sha256::digest(name.as_bytes()))
    }
}

/// Ensures a Mattermost channel exists for a Slack channel name
pub struct ChannelProvisioner {
    destination: Arc<dyn DestinationPlatform>,
    cache: Arc<IdentityCache>,
    team_id: String,
}

impl ChannelProvisioner {
    pub fn new(
        destination: Arc<dyn DestinationPlatform>,
        cache: Arc<IdentityCache>,
        team_id: impl Into<String>,
    ) -> Self {
        Self {
            destination,
            cache,
            team_id: team_id.into(),
        }
    }

    /// Look the channel up by its sanitized name, creating it when absent
    ///
    /// Concurrent misses for the same name may both reach `create_channel`.
    pub async fn ensure_channel(&self, raw_name: &str) -> Result<LocalIdentity> {
        let token = sanitize_channel_name(raw_name);

        if let Some(channel) = self.cache.local_channel(&token) {
            tracing::trace!(channel = %token, "Mattermost channel cache hit");
            return Ok(channel);
        }

        let existing = match self.destination.channel_by_name(&self.team_id, &token).await {
            Ok(channel) => channel,
            Err(e) => {
                // Treated as absent; creation reports the real failure if any
                log_error("channel_by_name", &e);
                None
            }
        };

        let channel = match existing {
            Some(channel) => {
                tracing::debug!(channel = %token, channel_id = %channel.id, "Found Mattermost channel");
                channel
            }
            None => {
                let request = NewChannel::public(&self.team_id, &token, raw_name);
                let created = self.destination.create_channel(&request).await?;
                tracing::info!(
                    channel = %token,
                    display_name = %raw_name,
                    channel_id = %created.id,
                    "Provisioned Mattermost channel"
                );
                created
            }
        };

        Ok(self.cache.insert_local_channel(&token, channel.into()))
    }
}
