//! Cross-platform identity resolution
//!
//! Maps Slack user and channel ids to their Mattermost counterparts by name.
//!
//! Key properties:
//! - Lazy-loading: remote lookups happen only on a cache miss
//! - Write-once entries: the first value cached for a key is kept for the
//!   life of the process, even if the name later changes upstream
//! - Graceful degradation: failed lookups are logged and resolve to nothing
//!   instead of failing the event

mod cache;
mod provisioner;
mod resolver;
mod types;

pub use cache::IdentityCache;
pub use provisioner::{ChannelProvisioner, sanitize_channel_name};
pub use resolver::{IdentityResolver, ResolverStats};
pub use types::{ExternalIdentity, LocalIdentity};
