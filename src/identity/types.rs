use crate::mattermost::{Channel, User};

/// A Slack user or channel as seen by the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    /// Slack id (e.g., U09JDBT2MCM, C09NU1KFXHT)
    pub id: String,

    /// User handle or channel name, without prefix
    pub display_name: String,
}

impl ExternalIdentity {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// The Mattermost user or channel an external identity maps to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalIdentity {
    pub id: String,
    pub name: String,
}

impl From<User> for LocalIdentity {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.username,
        }
    }
}

impl From<Channel> for LocalIdentity {
    fn from(channel: Channel) -> Self {
        Self {
            id: channel.id,
            name: channel.name,
        }
    }
}
