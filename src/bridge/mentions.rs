use crate::identity::IdentityResolver;
use regex::Regex;
use std::sync::{Arc, LazyLock};

static USER_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<@([A-Z0-9]+)>").expect("valid user mention regex"));

/// Rewrites Slack user mentions (`<@U123ABC>`) into `@handle`
pub struct MentionRewriter {
    resolver: Arc<IdentityResolver>,
}

impl MentionRewriter {
    pub fn new(resolver: Arc<IdentityResolver>) -> Self {
        Self { resolver }
    }

    /// Replace each mention token with the Slack handle of the mentioned user
    ///
    /// Each distinct user is looked up once and every occurrence of its token
    /// is replaced. Tokens whose user cannot be looked up are left as they are.
    pub async fn rewrite(&self, text: &str) -> String {
        let mut mentions: Vec<(&str, &str)> = Vec::new();
        for caps in USER_MENTION.captures_iter(text) {
            let (Some(token), Some(user_id)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if !mentions.iter().any(|(_, seen)| *seen == user_id.as_str()) {
                mentions.push((token.as_str(), user_id.as_str()));
            }
        }

        let mut rewritten = text.to_string();
        for (token, user_id) in mentions {
            let user = self.resolver.source_user(user_id).await;
            if user.display_name.is_empty() {
                tracing::debug!(user_id = %user_id, "Leaving unresolved mention as-is");
                continue;
            }
            rewritten = rewritten.replace(token, &format!("@{}", user.display_name));
        }
        rewritten
    }
}
