use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};

/// Digits kept from a Slack timestamp to obtain epoch milliseconds
const MILLIS_DIGITS: usize = 13;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Slack message timestamp, `"<seconds>.<micros>"`
///
/// Used both as a message's own `ts` and as the `thread_ts` anchor of a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadAnchor(pub String);

impl ThreadAnchor {
    pub fn new(ts: impl Into<String>) -> Self {
        Self(ts.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Epoch milliseconds: the decimal point removed, truncated to 13 digits
    pub fn to_millis(&self) -> Result<i64> {
        ts_to_millis(&self.0)
    }
}

pub fn ts_to_millis(ts: &str) -> Result<i64> {
    let digits = ts.trim().replacen('.', "", 1);
    let head = digits
        .get(..MILLIS_DIGITS)
        .filter(|head| head.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| BridgeError::Parse(format!("invalid Slack timestamp: {:?}", ts)))?;

    head.parse::<i64>()
        .map_err(|e| BridgeError::Parse(format!("invalid Slack timestamp {:?}: {}", ts, e)))
}
