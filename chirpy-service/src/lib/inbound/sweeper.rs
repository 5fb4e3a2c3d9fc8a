use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::domain::session::ports::SessionServicePort;

/// Spawn the periodic purge of expired refresh tokens.
///
/// The first sweep runs immediately. A failed sweep is logged and retried on
/// the next tick.
pub fn spawn_refresh_token_sweeper(
    sessions: Arc<dyn SessionServicePort>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if let Err(e) = sessions.sweep_expired(Utc::now()).await {
                tracing::error!(error = %e, "Refresh token sweep failed");
            }
        }
    })
}
