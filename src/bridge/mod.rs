//! Event translation from Slack into Mattermost posts and channels

mod dispatcher;
mod mentions;
mod thread;
mod translator;

pub use dispatcher::{DispatchOutcome, EventDispatcher};
pub use mentions::MentionRewriter;
pub use thread::{ROOT_LOOKBACK_MS, ThreadResolver};
pub use translator::{MessageTranslator, TranslatedMessage};
