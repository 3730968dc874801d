//! Lazy Slack -> Mattermost identity resolution

use crate::identity::{ChannelProvisioner, ExternalIdentity, IdentityCache, LocalIdentity};
use crate::logging::log_error;
use crate::platform::{DestinationPlatform, SourcePlatform};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Resolver statistics for monitoring
#[derive(Debug, Default, Clone)]
pub struct ResolverStats {
    pub user_hits: u64,
    pub user_misses: u64,
    pub channel_hits: u64,
    pub channel_misses: u64,
    pub api_calls: u64,
    pub api_errors: u64,
    pub unresolved: u64,
}

/// Resolves Slack users and channels to Mattermost identities by name
///
/// Slack ids are never compared with Mattermost ids; the link between the two
/// platforms is the Slack handle (users) or channel name (channels).
pub struct IdentityResolver {
    source: Arc<dyn SourcePlatform>,
    destination: Arc<dyn DestinationPlatform>,
    provisioner: Arc<ChannelProvisioner>,
    cache: Arc<IdentityCache>,
    stats: RwLock<ResolverStats>,
}

impl IdentityResolver {
    pub fn new(
        source: Arc<dyn SourcePlatform>,
        destination: Arc<dyn DestinationPlatform>,
        provisioner: Arc<ChannelProvisioner>,
        cache: Arc<IdentityCache>,
    ) -> Self {
        Self {
            source,
            destination,
            provisioner,
            cache,
            stats: RwLock::new(ResolverStats::default()),
        }
    }

    /// Slack handle for a user id
    ///
    /// A failed lookup yields an empty display name and is not cached, so the
    /// next event for this user tries again.
    pub async fn source_user(&self, user_id: &str) -> ExternalIdentity {
        if let Some(identity) = self.cache.source_user(user_id) {
            self.stats.write().await.user_hits += 1;
            tracing::trace!(user_id = %user_id, user = %identity.display_name, "User cache hit");
            return identity;
        }

        self.stats.write().await.user_misses += 1;
        tracing::debug!(user_id = %user_id, "User cache miss, fetching from Slack API");

        match self.fetch(self.source.user_name(user_id)).await {
            Some(name) => {
                tracing::info!(user_id = %user_id, user = %name, "Fetched and cached Slack user");
                self.cache
                    .insert_source_user(ExternalIdentity::new(user_id, name))
            }
            None => ExternalIdentity::new(user_id, ""),
        }
    }

    /// Slack channel name for a channel id, degraded the same way as users
    pub async fn source_channel(&self, channel_id: &str) -> ExternalIdentity {
        if let Some(identity) = self.cache.source_channel(channel_id) {
            self.stats.write().await.channel_hits += 1;
            tracing::trace!(channel_id = %channel_id, channel = %identity.display_name, "Channel cache hit");
            return identity;
        }

        self.stats.write().await.channel_misses += 1;
        tracing::debug!(channel_id = %channel_id, "Channel cache miss, fetching from Slack API");

        match self.fetch(self.source.channel_name(channel_id)).await {
            Some(name) => {
                tracing::info!(channel_id = %channel_id, channel = %name, "Fetched and cached Slack channel");
                self.cache
                    .insert_source_channel(ExternalIdentity::new(channel_id, name))
            }
            None => ExternalIdentity::new(channel_id, ""),
        }
    }

    /// Record a channel name learned from an event payload
    pub fn remember_source_channel(&self, channel_id: &str, name: &str) -> ExternalIdentity {
        self.cache
            .insert_source_channel(ExternalIdentity::new(channel_id, name))
    }

    /// Mattermost user with the same username as the Slack user
    ///
    /// `None` when the Slack handle is unknown or no Mattermost account has that
    /// username; no account is ever created.
    pub async fn resolve_user(&self, user_id: &str) -> Option<LocalIdentity> {
        let external = self.source_user(user_id).await;
        if external.display_name.is_empty() {
            self.unresolved("user", user_id, "Slack handle unavailable").await;
            return None;
        }
        let username = external.display_name;

        if let Some(user) = self.cache.local_user(&username) {
            return Some(user);
        }

        let users = self
            .fetch(
                self.destination
                    .users_by_usernames(std::slice::from_ref(&username)),
            )
            .await?;

        match users.into_iter().next() {
            Some(user) => {
                tracing::debug!(user = %username, mm_user_id = %user.id, "Resolved Mattermost user");
                Some(self.cache.insert_local_user(&username, user.into()))
            }
            None => {
                self.unresolved("user", user_id, "no Mattermost user with this username")
                    .await;
                None
            }
        }
    }

    /// Mattermost channel for a Slack channel, provisioned when missing
    pub async fn resolve_channel(&self, channel_id: &str) -> Option<LocalIdentity> {
        let external = self.source_channel(channel_id).await;
        if external.display_name.is_empty() {
            self.unresolved("channel", channel_id, "Slack channel name unavailable")
                .await;
            return None;
        }

        match self.provisioner.ensure_channel(&external.display_name).await {
            Ok(channel) => Some(channel),
            Err(e) => {
                self.stats.write().await.api_errors += 1;
                log_error("ensure_channel", &e);
                None
            }
        }
    }

    /// Run a remote call, logging and counting failures
    async fn fetch<T>(
        &self,
        call: impl Future<Output = crate::error::Result<T>>,
    ) -> Option<T> {
        self.stats.write().await.api_calls += 1;
        match call.await {
            Ok(value) => Some(value),
            Err(e) => {
                self.stats.write().await.api_errors += 1;
                tracing::warn!(error = %e, "Identity lookup failed, degrading");
                None
            }
        }
    }

    async fn unresolved(&self, kind: &str, id: &str, reason: &str) {
        self.stats.write().await.unresolved += 1;
        tracing::warn!(kind = %kind, id = %id, reason = %reason, "Identity not resolved");
    }

    pub async fn get_stats(&self) -> ResolverStats {
        self.stats.read().await.clone()
    }

    pub fn cache(&self) -> &Arc<IdentityCache> {
        &self.cache
    }

    /// Log resolver statistics (for periodic monitoring)
    pub async fn log_stats(&self) {
        let stats = self.get_stats().await;
        let (source_users, source_channels, local_users, local_channels) = self.cache.sizes();

        let hit_rate = |hits: u64, misses: u64| {
            if hits + misses > 0 {
                (hits as f32 / (hits + misses) as f32 * 100.0) as u32
            } else {
                0
            }
        };

        tracing::info!(
            source_users = source_users,
            source_channels = source_channels,
            local_users = local_users,
            local_channels = local_channels,
            user_hit_rate = hit_rate(stats.user_hits, stats.user_misses),
            channel_hit_rate = hit_rate(stats.channel_hits, stats.channel_misses),
            api_calls = stats.api_calls,
            api_errors = stats.api_errors,
            unresolved = stats.unresolved,
            "Identity cache statistics"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeMattermost, FakeSlack};

    fn resolver(slack: Arc<FakeSlack>, mm: Arc<FakeMattermost>) -> IdentityResolver {
        let cache = Arc::new(IdentityCache::new());
        let provisioner = Arc::new(ChannelProvisioner::new(mm.clone(), cache.clone(), "team1"));
        IdentityResolver::new(slack, mm, provisioner, cache)
    }

    #[tokio::test]
    async fn test_resolve_user_by_handle() {
        let slack = Arc::new(FakeSlack::default().with_user("U123ABC", "alice"));
        let mm = Arc::new(FakeMattermost::default().with_user("mm-u1", "alice"));
        let resolver = resolver(slack, mm);

        let user = resolver.resolve_user("U123ABC").await.unwrap();
        assert_eq!(user.id, "mm-u1");
        assert_eq!(user.name, "alice");
    }

    #[tokio::test]
    async fn test_resolve_user_is_cache_stable() {
        let slack = Arc::new(FakeSlack::default().with_user("U1", "alice"));
        let mm = Arc::new(
            FakeMattermost::default()
                .with_user("mm-u1", "alice")
                .with_user("mm-u2", "alicia"),
        );
        let resolver = resolver(slack.clone(), mm.clone());

        let first = resolver.resolve_user("U1").await;
        slack.rename_user("U1", "alicia");
        let second = resolver.resolve_user("U1").await;

        assert_eq!(first, second);
        assert_eq!(slack.user_calls(), 1);
        assert_eq!(mm.user_lookups(), 1);

        let stats = resolver.get_stats().await;
        assert_eq!(stats.user_hits, 1);
        assert_eq!(stats.user_misses, 1);
    }

    #[tokio::test]
    async fn test_unknown_mattermost_user_is_none() {
        let slack = Arc::new(FakeSlack::default().with_user("U1", "bob"));
        let mm = Arc::new(FakeMattermost::default());
        let resolver = resolver(slack, mm);

        assert!(resolver.resolve_user("U1").await.is_none());
        assert_eq!(resolver.get_stats().await.unresolved, 1);
    }

    #[tokio::test]
    async fn test_slack_failure_degrades_to_empty_name_and_is_retried() {
        let slack = Arc::new(FakeSlack::default());
        let mm = Arc::new(FakeMattermost::default());
        let resolver = resolver(slack.clone(), mm);

        let identity = resolver.source_user("UGONE").await;
        assert_eq!(identity.display_name, "");
        assert!(resolver.resolve_user("UGONE").await.is_none());

        assert_eq!(slack.user_calls(), 2);
        assert_eq!(resolver.cache().sizes().0, 0);
        assert_eq!(resolver.get_stats().await.api_errors, 2);
    }

    #[tokio::test]
    async fn test_resolve_channel_provisions_missing_channel() {
        let slack = Arc::new(FakeSlack::default().with_channel("C1", "general"));
        let mm = Arc::new(FakeMattermost::default());
        let resolver = resolver(slack.clone(), mm.clone());

        let channel = resolver.resolve_channel("C1").await.unwrap();
        let again = resolver.resolve_channel("C1").await.unwrap();

        assert_eq!(channel, again);
        assert_eq!(channel.name, "general");
        assert_eq!(mm.created_channels().len(), 1);
        assert_eq!(slack.channel_calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_slack_channel_is_not_provisioned() {
        let slack = Arc::new(FakeSlack::default());
        let mm = Arc::new(FakeMattermost::default());
        let resolver = resolver(slack, mm.clone());

        assert!(resolver.resolve_channel("CGONE").await.is_none());
        assert!(mm.created_channels().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_lookups_agree() {
        let slack = Arc::new(FakeSlack::default().with_user("U1", "alice"));
        let mm = Arc::new(FakeMattermost::default().with_user("mm-u1", "alice"));
        let resolver = Arc::new(resolver(slack, mm));

        let lookups = (0..8).map(|_| {
            let resolver = resolver.clone();
            async move { resolver.resolve_user("U1").await }
        });
        let results = futures::future::join_all(lookups).await;

        assert!(results.iter().all(|r| r.as_ref().map(|u| u.id.as_str()) == Some("mm-u1")));
        assert_eq!(resolver.cache().sizes().0, 1);
    }
}
