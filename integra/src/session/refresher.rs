use integra_core::settings::scheduler_interval::SchedulerInterval;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::SessionStore;
use crate::stop_flag::StopFlag;

/// Re-validate the stored credential every `interval` until stopped.
///
/// Revocation on the provider side then signs the user out without any
/// user action. Runs are skipped while nothing is stored.
pub fn spawn_session_refresher(
    store: Arc<SessionStore>,
    interval: SchedulerInterval,
    stop_flag: StopFlag,
) -> JoinHandle<()> {
    let mut scheduler = clokwerk::AsyncScheduler::new();

    {
        let store = store.clone();
        scheduler.every(interval.into()).run(move || {
            let store = store.clone();
            async move {
                if !store.has_stored_credential() {
                    debug!("No stored credential, skipping session re-check");
                    return;
                }
                let session = store.check_session().await;
                debug!("Periodic session re-check done: {:?}", session.status());
            }
        });
    }

    info!("Re-checking the session every {}", interval);
    tokio::spawn(async move {
        while !stop_flag.is_stopped() {
            scheduler.run_pending().await;
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(100)) => {}
                _ = stop_flag.wait() => {}
            }
        }
        debug!("Session refresher stopped");
    })
}
