use crate::logging::log_error;
use crate::platform::DestinationPlatform;
use crate::slack::ThreadAnchor;
use std::sync::Arc;

/// How far before the anchor the post history query starts
pub const ROOT_LOOKBACK_MS: i64 = 100;

/// Finds the Mattermost post a Slack thread reply belongs under
pub struct ThreadResolver {
    destination: Arc<dyn DestinationPlatform>,
}

impl ThreadResolver {
    pub fn new(destination: Arc<dyn DestinationPlatform>) -> Self {
        Self { destination }
    }

    /// Root post id for a thread anchor in a Mattermost channel
    ///
    /// Queries posts since `anchor - 100ms` and takes the last id in the
    /// returned order. `None` (post top-level) when the anchor is unparsable,
    /// the query fails, or nothing was posted since the anchor.
    pub async fn resolve_root(&self, channel_id: &str, anchor: &ThreadAnchor) -> Option<String> {
        let anchor_ms = match anchor.to_millis() {
            Ok(ms) => ms,
            Err(e) => {
                tracing::warn!(thread_ts = %anchor.as_str(), error = %e, "Unparsable thread anchor");
                return None;
            }
        };
        let since = anchor_ms.saturating_sub(ROOT_LOOKBACK_MS);

        let posts = match self.destination.posts_since(channel_id, since).await {
            Ok(posts) => posts,
            Err(e) => {
                log_error("posts_since", &e);
                return None;
            }
        };

        match posts.last_in_order() {
            Some(root_id) => {
                tracing::debug!(
                    channel_id = %channel_id,
                    thread_ts = %anchor.as_str(),
                    root_id = %root_id,
                    candidates = posts.order.len(),
                    "Resolved thread root"
                );
                Some(root_id.to_string())
            }
            None => {
                tracing::warn!(
                    channel_id = %channel_id,
                    thread_ts = %anchor.as_str(),
                    "No Mattermost post since thread anchor, posting top-level"
                );
                None
            }
        }
    }
}
