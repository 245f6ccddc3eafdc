//! Dashboard demo binary.
//!
//! Fetches the user profile once, then subscribes to the status-count
//! notification stream and logs everything: notifications, connection
//! state transitions, and owner-facing faults. Stops cleanly on ctrl-c.

use tracing_subscriber::EnvFilter;

use sse_ingest::config::IngestConfig;
use sse_ingest::endpoint::Endpoint;
use sse_ingest::hub::NotificationHub;
use sse_ingest::profile;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = IngestConfig::from_env();
    tracing::info!(stream = %config.stream_url, "starting sse-ingest demo");

    // One-shot profile fetch; failure is not fatal for the stream.
    let client = reqwest::Client::new();
    match profile::fetch_profile(&client, &config.profile_url).await {
        Ok(user) => tracing::info!(%user, "user profile"),
        Err(err) => tracing::warn!(error = %err, "profile fetch failed"),
    }

    let endpoint = Endpoint::parse(&config.stream_url)?;
    let hub = NotificationHub::new();
    let _subscription = hub.subscribe(|notification| {
        tracing::info!(payload = %notification.payload, "notification");
    });
    let mut faults = hub.take_faults();
    hub.start(endpoint, config.stream_config())?;

    if let Some(mut state_rx) = hub.state_receiver() {
        tokio::spawn(async move {
            while state_rx.changed().await.is_ok() {
                let state = *state_rx.borrow();
                tracing::info!(state = state.as_str(), "connection state");
            }
        });
    }

    if let Some(faults_rx) = faults.as_mut() {
        loop {
            tokio::select! {
                fault = faults_rx.recv() => match fault {
                    Some(fault) => tracing::warn!(%fault, "hub fault"),
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => break,
            }
        }
    } else {
        tokio::signal::ctrl_c().await?;
    }

    hub.stop();
    tracing::info!("stopped");
    Ok(())
}
