use crate::error::{BridgeError, Result};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Settings {
    pub slack: SlackConfig,
    pub mattermost: MattermostConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub bot_token: String,
    pub signing_secret: String,
    /// Maximum accepted request age; zero disables the staleness check
    pub signature_tolerance: Duration,
}

#[derive(Debug, Clone)]
pub struct MattermostConfig {
    pub base_url: String,
    pub token: String,
    pub team_id: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub events_path: String,
}

pub fn load_settings() -> Result<Settings> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    settings_from(|key| std::env::var(key).ok())
}

/// Build settings from an arbitrary variable source
pub fn settings_from<F>(var: F) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let required = |key: &str| {
        var(key)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| BridgeError::Config(format!("{} not set", key)))
    };

    // SLACK_TOKEN is the name older deployments used
    let bot_token = required("SLACK_BOT_TOKEN").or_else(|_| required("SLACK_TOKEN"))?;

    let tolerance_secs: u64 = var("SLACK_SIGNATURE_TOLERANCE_SECS")
        .unwrap_or_else(|| "300".to_string())
        .parse()
        .map_err(|_| BridgeError::Config("Invalid SLACK_SIGNATURE_TOLERANCE_SECS".to_string()))?;

    let slack = SlackConfig {
        bot_token,
        signing_secret: required("SLACK_SIGNING_SECRET")?,
        signature_tolerance: Duration::from_secs(tolerance_secs),
    };

    let mattermost = MattermostConfig {
        base_url: required("MATTERMOST_URL")?.trim_end_matches('/').to_string(),
        token: required("MATTERMOST_TOKEN")?,
        team_id: required("MATTERMOST_TEAM_ID")?,
    };

    let events_path = var("BRIDGE_EVENTS_PATH").unwrap_or_else(|| "/slack/events".to_string());
    if !events_path.starts_with('/') {
        return Err(BridgeError::Config(
            "BRIDGE_EVENTS_PATH must start with '/'".to_string(),
        ));
    }

    let server = ServerConfig {
        bind_addr: var("BRIDGE_BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|_| BridgeError::Config("Invalid BRIDGE_BIND_ADDR".to_string()))?,
        events_path,
    };

    Ok(Settings {
        slack,
        mattermost,
        server,
    })
}
