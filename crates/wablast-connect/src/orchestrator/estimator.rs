//! The cosmetic progress tick.

use std::sync::Arc;

use super::Orchestrator;
use crate::progress::ProgressCurve;
use crate::session::SessionState;
use crate::task::TaskHandle;

impl Orchestrator {
    /// Spawn the tick that creeps the progress bar between poll attempts.
    ///
    /// Each tick adds at most one point, bounded by the next attempt's
    /// curve value. The loop ends itself as soon as the session leaves
    /// `AwaitingScan`; the poller's transitions abort it as well.
    pub(super) fn spawn_estimator(&self, epoch: u64, curve: ProgressCurve) -> TaskHandle {
        let inner = Arc::clone(&self.inner);
        let tick = self.config.progress_tick();

        TaskHandle::new(tokio::spawn(async move {
            loop {
                tokio::time::sleep(tick).await;

                let mut guard = inner.lock().await;
                if guard.epoch != epoch || guard.session.state != SessionState::AwaitingScan {
                    return;
                }

                let bound = curve.creep_bound(guard.session.poll_attempt);
                if guard.session.progress_percent < bound {
                    guard.session.progress_percent += 1;
                }
            }
        }))
    }
}
