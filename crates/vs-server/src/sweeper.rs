//! Periodic removal of expired bearer tokens.

use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::context::AppContext;

const SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

/// Runs until `cancel` fires. Sweeps once immediately.
pub async fn run_token_sweeper(ctx: AppContext, cancel: CancellationToken) {
    tracing::debug!("Token sweeper started");

    loop {
        match sweep_once(&ctx) {
            Ok(0) => {}
            Ok(n) => tracing::info!(removed = n, "Removed expired tokens"),
            Err(e) => tracing::error!("Token sweep failed: {e}"),
        }

        tokio::select! {
            _ = tokio::time::sleep(SWEEP_INTERVAL) => {}
            _ = cancel.cancelled() => break,
        }
    }

    tracing::debug!("Token sweeper stopped");
}

pub fn sweep_once(ctx: &AppContext) -> vs_core::Result<usize> {
    let conn = vs_db::pool::get_conn(&ctx.db)?;
    vs_db::queries::auth::delete_expired_tokens(&conn, &Utc::now().to_rfc3339())
}
