use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Signature verification failed: {0}")]
    Authentication(String),

    #[error("Malformed signature headers: {0}")]
    MalformedHeaders(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Event parse error: {0}")]
    Parse(String),

    #[error("Slack API error: {0}")]
    SlackApi(String),

    #[error("Mattermost API error: {0}")]
    Mattermost(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl BridgeError {
    /// HTTP status returned to the webhook caller when this error aborts a delivery
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::MalformedHeaders(_) => StatusCode::BAD_REQUEST,
            Self::Transport(_) | Self::Parse(_) | Self::Serde(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::SlackApi(_)
            | Self::Mattermost(_)
            | Self::Config(_)
            | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_taxonomy() {
        assert_eq!(
            BridgeError::Authentication("bad".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            BridgeError::MalformedHeaders("missing".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BridgeError::Parse("junk".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            BridgeError::Transport("hmac".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
