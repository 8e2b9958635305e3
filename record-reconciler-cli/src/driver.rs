//! Invocation loop

use std::time::Duration;

use record_reconciler_core::{ReconcileEvent, ReconcileResponse, Reconciler};

/// Invoke once, or with `drive` keep re-invoking with the returned
/// `pass_back_data` until the run finishes or `max_rounds` is reached.
///
/// Returns the last envelope.
pub async fn run(
    reconciler: &Reconciler,
    mut event: ReconcileEvent,
    drive: bool,
    max_rounds: usize,
) -> ReconcileResponse {
    let mut round = 1;
    loop {
        let response = reconciler.handle(&event).await;
        for log in &response.logs {
            if log.is_error {
                tracing::error!(details = %log.details, "{}", log.title);
            } else {
                tracing::info!(details = %log.details, "{}", log.title);
            }
        }

        let (Some(callback_sec), Some(pass_back)) =
            (response.callback_sec, response.pass_back_data.clone())
        else {
            return response;
        };
        if !drive || round >= max_rounds {
            if drive {
                tracing::warn!("Giving up after {round} round(s)");
            }
            return response;
        }

        tracing::info!("Round {round} pending, next check in {callback_sec}s");
        tokio::time::sleep(Duration::from_secs(callback_sec)).await;
        event.pass_back_data = pass_back;
        round += 1;
    }
}
