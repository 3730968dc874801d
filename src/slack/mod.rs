mod client;
mod events;
mod signature;
mod types;

pub use client::SlackClient;
pub use events::{
    BRIDGED_SUBTYPES, ChannelCreatedEvent, CreatedChannel, Edited, InnerEvent, MessageEvent,
    PUBLIC_CHANNEL_TYPE, SlackEvent, parse_event,
};
pub use signature::{SIGNATURE_HEADER, SIGNATURE_VERSION, SignatureVerifier, TIMESTAMP_HEADER};
pub use types::{ChannelId, ThreadAnchor, UserId, ts_to_millis};
