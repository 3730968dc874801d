//! Events API payloads
//!
//! Only the shapes the bridge acts on are modelled. Inner event types that are
//! not listed deserialize to [`InnerEvent::Other`] instead of failing.

use crate::error::{BridgeError, Result};
use crate::slack::{ChannelId, ThreadAnchor, UserId};
use serde::Deserialize;

/// Channel type Slack reports for public channel messages
pub const PUBLIC_CHANNEL_TYPE: &str = "channel";

/// Message subtypes that still carry text a person wrote
///
/// Every other subtype (joins, topic changes, bot posts, edit and delete
/// notifications) is skipped.
pub const BRIDGED_SUBTYPES: &[&str] = &["thread_broadcast", "file_share", "me_message"];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackEvent {
    #[serde(rename = "url_verification")]
    ChallengeRequest { challenge: String },

    #[serde(rename = "event_callback")]
    CallbackEvent { event: InnerEvent },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InnerEvent {
    ChannelCreated(ChannelCreatedEvent),

    #[serde(rename = "message")]
    MessagePosted(MessageEvent),

    #[serde(other)]
    Other,
}

impl InnerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ChannelCreated(_) => "channel_created",
            Self::MessagePosted(_) => "message",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChannelCreatedEvent {
    pub channel: CreatedChannel,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedChannel {
    pub id: ChannelId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageEvent {
    #[serde(default)]
    pub channel: Option<ChannelId>,
    #[serde(default)]
    pub channel_type: Option<String>,
    #[serde(default)]
    pub user: Option<UserId>,
    #[serde(default)]
    pub text: String,
    pub ts: ThreadAnchor,
    #[serde(default)]
    pub thread_ts: Option<ThreadAnchor>,
    #[serde(default)]
    pub edited: Option<Edited>,
    #[serde(default)]
    pub subtype: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Edited {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
}

impl MessageEvent {
    /// Why this message is not bridged, or `None` for a plain public channel message
    pub fn skip_reason(&self) -> Option<&'static str> {
        if self.channel_type.as_deref() != Some(PUBLIC_CHANNEL_TYPE) {
            return Some("not a public channel message");
        }
        if self.edited.is_some() {
            return Some("edited message");
        }
        if self
            .subtype
            .as_deref()
            .is_some_and(|subtype| !BRIDGED_SUBTYPES.contains(&subtype))
        {
            return Some("message subtype");
        }
        if self.text.is_empty() {
            return Some("empty text");
        }
        if self.channel.is_none() || self.user.is_none() {
            return Some("missing channel or user");
        }
        None
    }

    /// Anchor of the thread this message replies to
    ///
    /// A thread's parent carries `thread_ts == ts` and is not a reply.
    pub fn reply_anchor(&self) -> Option<&ThreadAnchor> {
        self.thread_ts
            .as_ref()
            .filter(|anchor| !anchor.as_str().is_empty() && *anchor != &self.ts)
    }
}

/// Decode a verified request body
pub fn parse_event(body: &[u8]) -> Result<SlackEvent> {
    serde_json::from_slice(body).map_err(|e| BridgeError::Parse(e.to_string()))
}
