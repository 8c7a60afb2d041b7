use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, info};
use tracker::config::TrackerConfig;
use tracker::feed::{ReplayConnector, TrackingFeedError};
use tracker::initializer::{
    ConfigurationError, Credential, CredentialStore, LiveConfig, MemoryCredentialStore, StaticConfigService,
};
use tracker::notify::{AlertSink, NotificationError};
use tracker::proximity::ProximityAlert;
use tracker::route::{OsrmClient, RouteFetchError};
use tracker::view::TrackingView;
use tracker::{SessionContext, SessionEnd, SessionUpdate, TrackingSession};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("tracking could not start: {0}")]
    Config(#[from] ConfigurationError),
    #[error("replay file unusable: {0}")]
    Replay(#[from] TrackingFeedError),
    #[error("routing client unavailable: {0}")]
    Route(#[from] RouteFetchError),
}

#[derive(Parser, Debug)]
#[command(name = "track", about = "Follow a delivery order live from the terminal")]
struct Cli {
    /// Order to track.
    order_id: String,

    #[arg(long, env = "TRACKER_AUTH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(long)]
    api_base_url: Option<String>,

    #[arg(long)]
    config_path: Option<String>,

    #[arg(long)]
    routing_base_url: Option<String>,

    /// Replay recorded tracking records (JSON lines) instead of the live feed.
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Seconds between replayed records.
    #[arg(long, default_value_t = 3)]
    replay_cadence_secs: u32,
}

impl Cli {
    fn apply_overrides(&self, config: &mut TrackerConfig) {
        if let Some(url) = &self.api_base_url {
            config.api_base_url = url.trim_end_matches('/').to_owned();
        }
        if let Some(path) = &self.config_path {
            config.config_path = format!("/{}", path.trim_matches('/'));
        }
        if let Some(url) = &self.routing_base_url {
            config.routing_base_url = url.trim_end_matches('/').to_owned();
        }
    }
}

/// Rings the terminal bell and prints alerts inline.
struct TerminalAlerts;

#[async_trait::async_trait]
impl AlertSink for TerminalAlerts {
    async fn play_cue(&self) -> Result<(), NotificationError> {
        let mut out = std::io::stdout();
        out.write_all(b"\x07")
            .and_then(|()| out.flush())
            .map_err(|e| NotificationError::Playback(e.to_string()))
    }

    fn vibrate(&self, pattern: &[Duration]) {
        debug!(steps = pattern.len(), "vibration not supported on a terminal");
    }

    fn show_alert(&self, alert: &ProximityAlert) {
        println!("\n*** {} ***\n{}  [{}]\n", alert.title, alert.message, alert.dismiss_label);
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = TrackerConfig::from_env()?;
    cli.apply_overrides(&mut config);

    let credentials = MemoryCredentialStore::new(cli.token.clone().and_then(Credential::new));
    let alerts: Arc<dyn AlertSink> = Arc::new(TerminalAlerts);

    let ctx = match &cli.replay {
        Some(path) => {
            let replay = ReplayConnector::from_file(path).await?;
            info!(path = %path.display(), records = replay.len(), "replay loaded");
            let live = LiveConfig {
                database_url: format!("file://{}", path.display()),
                update_cadence_secs: cli.replay_cadence_secs,
            };
            SessionContext::new(
                credentials.load().or_else(|| Credential::new("replay")),
                Arc::new(StaticConfigService::new(live)),
                Arc::new(replay),
                Arc::new(OsrmClient::from_config(&config)?),
                alerts,
            )
            .with_feed_root(&config.feed_root)
            .with_event_queue_capacity(config.event_queue_capacity)
        }
        None => SessionContext::from_config(&config, &credentials, alerts)?,
    };

    let mut session = TrackingSession::start(&ctx, &cli.order_id).await?;
    println!("Tracking order {} (updates every ~{}s)", session.order_id(), session.update_cadence_secs());

    let end = tokio::select! {
        end = session.run(print_update) => Some(end),
        _ = tokio::signal::ctrl_c() => None,
    };
    session.close();

    match end {
        Some(SessionEnd::Delivered) => println!("Order delivered."),
        Some(SessionEnd::FeedClosed) => println!("Tracking feed closed."),
        None => println!("Stopped."),
    }
    Ok(())
}

fn print_update(view: &TrackingView, update: &SessionUpdate) {
    if let Some(fit) = update.camera {
        debug!(region = ?fit.region(), "camera fit");
    }
    println!("{}", status_line(view));
}

fn status_line(view: &TrackingView) -> String {
    let mut parts = vec![view.status_label.clone()];
    if let Some(banner) = &view.banner {
        parts.push(banner.clone());
    } else if let Some(overlay) = view.overlay() {
        if overlay != view.status_label {
            parts.push(overlay);
        }
    }
    if let Some(distance) = &view.distance_left {
        parts.push(format!("{distance} away"));
    }
    if let Some(eta) = &view.eta {
        parts.push(format!("ETA {eta}"));
    }
    if let Some(agent) = view.agent.as_ref().and_then(|a| a.name.as_deref()) {
        parts.push(format!("courier {agent}"));
    }
    let line = parts.join(" | ");
    match &view.last_update_utc {
        Some(at) => format!("[{at} UTC] {line}"),
        None => line,
    }
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
