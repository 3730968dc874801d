use anyhow::Context;
use slack_mm_bridge::bridge::EventDispatcher;
use slack_mm_bridge::config::load_settings;
use slack_mm_bridge::identity::IdentityCache;
use slack_mm_bridge::logging::init_tracing;
use slack_mm_bridge::mattermost::MattermostClient;
use slack_mm_bridge::server::{self, AppState, DispatchTasks};
use slack_mm_bridge::slack::{SignatureVerifier, SlackClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

const STATS_INTERVAL: Duration = Duration::from_secs(600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize rustls crypto provider
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    init_tracing();

    tracing::info!("🚀 Starting Slack → Mattermost bridge");

    // Load configuration
    let settings = load_settings().context("failed to load settings")?;
    tracing::info!("✅ Configuration loaded");
    tracing::debug!(
        "Config: mattermost={}, team={}, bind={}",
        settings.mattermost.base_url,
        settings.mattermost.team_id,
        settings.server.bind_addr
    );

    // Create platform clients
    let slack_client = Arc::new(SlackClient::new(&settings.slack).context("Slack client")?);
    let mattermost_client =
        Arc::new(MattermostClient::new(&settings.mattermost).context("Mattermost client")?);
    tracing::info!("Platform clients created");

    // Identity caches live for the whole process
    let cache = Arc::new(IdentityCache::new());
    let dispatcher = Arc::new(EventDispatcher::new(
        slack_client,
        mattermost_client,
        cache,
        settings.mattermost.team_id.clone(),
    ));
    tracing::info!("Event dispatcher initialized");

    // Periodic cache statistics
    let stats_resolver = dispatcher.resolver().clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(STATS_INTERVAL);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            stats_resolver.log_stats().await;
        }
    });

    let tasks = DispatchTasks::new();
    let state = AppState {
        verifier: Arc::new(SignatureVerifier::new(
            settings.slack.signing_secret.clone(),
            settings.slack.signature_tolerance,
        )),
        dispatcher: dispatcher.clone(),
        tasks: tasks.clone(),
    };

    server::serve(&settings.server, state, async {
        let signal_name = setup_shutdown_handler().await;
        tracing::info!(signal = %signal_name, "Received shutdown signal, draining requests");
    })
    .await
    .context("HTTP server failed")?;

    // Acknowledged events are not redelivered by Slack
    tasks.drain().await;

    dispatcher.resolver().log_stats().await;
    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Setup signal handlers for graceful shutdown
/// Handles SIGINT (Ctrl+C), SIGTERM, and SIGQUIT on Unix systems
async fn setup_shutdown_handler() -> String {
    #[cfg(unix)]
    {
        use signal::unix::{SignalKind, signal};

        let mut sigint = signal(SignalKind::interrupt()).expect("Failed to setup SIGINT handler");
        let mut sigterm = signal(SignalKind::terminate()).expect("Failed to setup SIGTERM handler");
        let mut sigquit = signal(SignalKind::quit()).expect("Failed to setup SIGQUIT handler");

        tokio::select! {
            _ = sigint.recv() => {
                tracing::debug!("Caught SIGINT signal");
                "SIGINT (Ctrl+C)".to_string()
            }
            _ = sigterm.recv() => {
                tracing::debug!("Caught SIGTERM signal");
                "SIGTERM".to_string()
            }
            _ = sigquit.recv() => {
                tracing::debug!("Caught SIGQUIT signal");
                "SIGQUIT".to_string()
            }
        }
    }

    #[cfg(not(unix))]
    {
        // On Windows, only handle Ctrl+C
        signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
        tracing::debug!("Caught Ctrl+C signal");
        "Ctrl+C".to_string()
    }
}
