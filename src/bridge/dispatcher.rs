use crate::bridge::{MentionRewriter, MessageTranslator, ThreadResolver};
use crate::identity::{ChannelProvisioner, IdentityCache, IdentityResolver, LocalIdentity};
use crate::logging::{Timer, log_error, preview};
use crate::mattermost::NewPost;
use crate::platform::{DestinationPlatform, SourcePlatform};
use crate::slack::{ChannelCreatedEvent, InnerEvent, MessageEvent};
use std::sync::Arc;

/// What handling an inner event amounted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    ChannelProvisioned(LocalIdentity),
    Posted {
        post_id: String,
        root_id: Option<String>,
    },
    /// Event type or message variant the bridge does not replay
    Ignored(&'static str),
    /// Replayable event abandoned after a resolution or creation failure
    Dropped(String),
}

/// Routes Slack inner events to channel provisioning or post creation
///
/// Each event is handled independently; nothing is ordered across events.
pub struct EventDispatcher {
    source: Arc<dyn SourcePlatform>,
    destination: Arc<dyn DestinationPlatform>,
    resolver: Arc<IdentityResolver>,
    provisioner: Arc<ChannelProvisioner>,
    translator: MessageTranslator,
}

impl EventDispatcher {
    pub fn new(
        source: Arc<dyn SourcePlatform>,
        destination: Arc<dyn DestinationPlatform>,
        cache: Arc<IdentityCache>,
        team_id: impl Into<String>,
    ) -> Self {
        let provisioner = Arc::new(ChannelProvisioner::new(
            destination.clone(),
            cache.clone(),
            team_id,
        ));
        let resolver = Arc::new(IdentityResolver::new(
            source.clone(),
            destination.clone(),
            provisioner.clone(),
            cache,
        ));
        let translator = MessageTranslator::new(
            resolver.clone(),
            MentionRewriter::new(resolver.clone()),
            ThreadResolver::new(destination.clone()),
        );

        Self {
            source,
            destination,
            resolver,
            provisioner,
            translator,
        }
    }

    pub fn resolver(&self) -> &Arc<IdentityResolver> {
        &self.resolver
    }

    pub async fn dispatch(&self, event: InnerEvent) -> DispatchOutcome {
        let _timer = Timer::new("dispatch_event");
        tracing::debug!(event_type = event.kind(), "Dispatching event");

        match event {
            InnerEvent::ChannelCreated(created) => self.on_channel_created(created).await,
            InnerEvent::MessagePosted(message) => self.on_message(message).await,
            InnerEvent::Other => DispatchOutcome::Ignored("unhandled event type"),
        }
    }

    async fn on_channel_created(&self, event: ChannelCreatedEvent) -> DispatchOutcome {
        let channel_id = event.channel.id.as_str();

        // Joining makes Slack deliver this channel's messages to the bridge
        let name = match self.source.join_channel(channel_id).await {
            Ok(name) => name,
            Err(e) => {
                log_error("join_channel", &e);
                event.channel.name.clone()
            }
        };
        let name = self.resolver.remember_source_channel(channel_id, &name).display_name;

        tracing::info!(channel_id = %channel_id, channel = %name, "Slack channel created");

        match self.provisioner.ensure_channel(&name).await {
            Ok(channel) => DispatchOutcome::ChannelProvisioned(channel),
            Err(e) => {
                log_error("ensure_channel", &e);
                DispatchOutcome::Dropped(e.to_string())
            }
        }
    }

    async fn on_message(&self, message: MessageEvent) -> DispatchOutcome {
        if let Some(reason) = message.skip_reason() {
            tracing::debug!(
                subtype = ?message.subtype,
                channel_type = ?message.channel_type,
                reason = reason,
                "Skipping message"
            );
            return DispatchOutcome::Ignored(reason);
        }

        let translated = match self.translator.translate(&message).await {
            Ok(translated) => translated,
            Err(e) => {
                tracing::warn!(
                    channel = ?message.channel,
                    user = ?message.user,
                    ts = %message.ts.as_str(),
                    error = %e,
                    "Dropping message that could not be translated"
                );
                return DispatchOutcome::Dropped(e.to_string());
            }
        };

        let root_id = translated.root_id.clone();
        let post: NewPost = translated.into();

        match self.destination.create_post(&post).await {
            Ok(created) => {
                tracing::info!(
                    channel_id = %post.channel_id,
                    user_id = %post.user_id,
                    post_id = %created.id,
                    root_id = ?root_id,
                    message = %preview(&post.message),
                    "Bridged message"
                );
                DispatchOutcome::Posted {
                    post_id: created.id,
                    root_id,
                }
            }
            Err(e) => {
                log_error("create_post", &e);
                DispatchOutcome::Dropped(e.to_string())
            }
        }
    }
}
