//! Heartbeat supervision.
//!
//! A single background task scans the registry on a fixed interval,
//! evicts connections whose last client heartbeat is older than the
//! configured timeout, and probes the survivors with a `ping` frame.
//! Eviction reuses the ordinary disconnect path, so an evicted user goes
//! through exactly the same offline transition as a clean close.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::frames::OutboundFrame;
use crate::service::PresenceService;

/// Run the supervisor until the shutdown signal flips.
pub async fn run_supervisor(service: Arc<PresenceService>, mut shutdown: watch::Receiver<bool>) {
    let interval = Duration::from_secs(service.config().heartbeat_interval_seconds);
    let timeout = chrono::Duration::seconds(service.config().heartbeat_timeout_seconds as i64);

    let mut ticker = tokio::time::interval(interval);
    // The first tick fires immediately; skip it so a fresh connection is
    // never probed before the interval has elapsed once.
    ticker.tick().await;

    info!(
        interval_seconds = interval.as_secs(),
        timeout_seconds = timeout.num_seconds(),
        "Heartbeat supervisor started"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                scan(&service, timeout).await;
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    info!("Heartbeat supervisor stopping");
                    return;
                }
            }
        }
    }
}

/// One supervision pass over every live connection.
async fn scan(service: &PresenceService, timeout: chrono::Duration) {
    let probe = match serde_json::to_string(&OutboundFrame::Ping) {
        Ok(probe) => probe,
        Err(e) => {
            warn!(error = %e, "Failed to serialize heartbeat probe");
            return;
        }
    };

    let now = Utc::now();
    for handle in service.registry().all_connections() {
        let silence = now - handle.last_heartbeat().await;
        if silence > timeout {
            warn!(
                socket_id = %handle.id,
                user_id = handle.user_id,
                silent_seconds = silence.num_seconds(),
                "Heartbeat timeout, evicting connection"
            );
            service.disconnect(handle.id).await;
        } else if !handle.send(probe.clone()) {
            debug!(socket_id = %handle.id, "Heartbeat probe delivery failed");
        }
    }
}
