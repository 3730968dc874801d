use crate::bridge::{MentionRewriter, ThreadResolver};
use crate::error::{BridgeError, Result};
use crate::identity::IdentityResolver;
use crate::mattermost::NewPost;
use crate::slack::MessageEvent;
use std::sync::Arc;

/// A Slack message fully resolved into Mattermost terms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedMessage {
    pub channel_id: String,
    pub user_id: String,
    /// Present only for thread replies
    pub root_id: Option<String>,
    pub text: String,
    pub created_at_millis: i64,
}

impl From<TranslatedMessage> for NewPost {
    fn from(message: TranslatedMessage) -> Self {
        Self {
            channel_id: message.channel_id,
            user_id: message.user_id,
            root_id: message.root_id,
            message: message.text,
            create_at: message.created_at_millis,
        }
    }
}

pub struct MessageTranslator {
    resolver: Arc<IdentityResolver>,
    mentions: MentionRewriter,
    threads: ThreadResolver,
}

impl MessageTranslator {
    pub fn new(
        resolver: Arc<IdentityResolver>,
        mentions: MentionRewriter,
        threads: ThreadResolver,
    ) -> Self {
        Self {
            resolver,
            mentions,
            threads,
        }
    }

    /// Resolve author, channel, mentions and thread root for a message
    ///
    /// Fails with [`BridgeError::NotFound`] when the author or channel has no
    /// Mattermost counterpart; the message is then not bridged.
    pub async fn translate(&self, message: &MessageEvent) -> Result<TranslatedMessage> {
        let (Some(user), Some(channel)) = (&message.user, &message.channel) else {
            return Err(BridgeError::NotFound("message without user or channel".into()));
        };

        let (author, target) = futures::join!(
            self.resolver.resolve_user(user.as_str()),
            self.resolver.resolve_channel(channel.as_str()),
        );
        let author = author
            .ok_or_else(|| BridgeError::NotFound(format!("Mattermost user for {}", user.as_str())))?;
        let target = target.ok_or_else(|| {
            BridgeError::NotFound(format!("Mattermost channel for {}", channel.as_str()))
        })?;

        let text = self.mentions.rewrite(&message.text).await;

        let created_at_millis = message.ts.to_millis().unwrap_or_else(|e| {
            tracing::debug!(ts = %message.ts.as_str(), error = %e, "Unparsable message ts, letting server stamp post");
            0
        });

        let root_id = match message.reply_anchor() {
            Some(anchor) => self.threads.resolve_root(&target.id, anchor).await,
            None => None,
        };

        Ok(TranslatedMessage {
            channel_id: target.id,
            user_id: author.id,
            root_id,
            text,
            created_at_millis,
        })
    }
}
