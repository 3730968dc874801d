use crate::identity::{ExternalIdentity, LocalIdentity};
use dashmap::DashMap;

/// Concurrent identity tables shared by every request handler
///
/// Slack ids map to display names; sanitized Mattermost names map to the
/// resolved Mattermost identity. Inserts never overwrite: the first value
/// stored for a key is returned to every later writer.
#[derive(Default)]
pub struct IdentityCache {
    /// Slack user id -> handle
    source_users: DashMap<String, String>,

    /// Slack channel id -> channel name
    source_channels: DashMap<String, String>,

    /// Mattermost username -> user
    local_users: DashMap<String, LocalIdentity>,

    /// Sanitized Mattermost channel name -> channel
    local_channels: DashMap<String, LocalIdentity>,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source_user(&self, id: &str) -> Option<ExternalIdentity> {
        self.source_users
            .get(id)
            .map(|name| ExternalIdentity::new(id, name.value().clone()))
    }

    pub fn insert_source_user(&self, identity: ExternalIdentity) -> ExternalIdentity {
        let name = self
            .source_users
            .entry(identity.id.clone())
            .or_insert(identity.display_name)
            .value()
            .clone();
        ExternalIdentity::new(identity.id, name)
    }

    pub fn source_channel(&self, id: &str) -> Option<ExternalIdentity> {
        self.source_channels
            .get(id)
            .map(|name| ExternalIdentity::new(id, name.value().clone()))
    }

    pub fn insert_source_channel(&self, identity: ExternalIdentity) -> ExternalIdentity {
        let name = self
            .source_channels
            .entry(identity.id.clone())
            .or_insert(identity.display_name)
            .value()
            .clone();
        ExternalIdentity::new(identity.id, name)
    }

    pub fn local_user(&self, username: &str) -> Option<LocalIdentity> {
        self.local_users.get(username).map(|u| u.value().clone())
    }

    pub fn insert_local_user(&self, username: &str, user: LocalIdentity) -> LocalIdentity {
        self.local_users
            .entry(username.to_string())
            .or_insert(user)
            .value()
            .clone()
    }

    pub fn local_channel(&self, token: &str) -> Option<LocalIdentity> {
        self.local_channels.get(token).map(|c| c.value().clone())
    }

    pub fn insert_local_channel(&self, token: &str, channel: LocalIdentity) -> LocalIdentity {
        self.local_channels
            .entry(token.to_string())
            .or_insert(channel)
            .value()
            .clone()
    }

    /// Entry counts: (source users, source channels, local users, local channels)
    pub fn sizes(&self) -> (usize, usize, usize, usize) {
        (
            self.source_users.len(),
            self.source_channels.len(),
            self.local_users.len(),
            self.local_channels.len(),
        )
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.source_users.clear();
        self.source_channels.clear();
        self.local_users.clear();
        self.local_channels.clear();
    }
}
