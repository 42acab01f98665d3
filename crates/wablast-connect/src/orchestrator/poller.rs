//! Status polling and the post-success dismissal.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{Inner, Orchestrator};
use crate::directory::AccountDirectory;
use crate::progress::ProgressCurve;
use crate::session::{narration_at, ConnectionSession, SessionState};
use crate::task::TaskHandle;

impl Orchestrator {
    /// Spawn the repeating status query for the session at `epoch`.
    ///
    /// Each cycle counts as one attempt, transient query errors included.
    /// Only a positive "connected" answer or the attempt ceiling ends the
    /// loop early; everything else updates narration and the progress
    /// floor and keeps waiting.
    pub(super) fn spawn_poller(
        &self,
        epoch: u64,
        account_key: String,
        curve: ProgressCurve,
    ) -> TaskHandle {
        let inner = Arc::clone(&self.inner);
        let backend = Arc::clone(&self.backend);
        let caller = self.caller.clone();
        let directory = self.directory.clone();
        let interval = self.config.poll_interval();
        let ceiling = self.config.poll_ceiling;
        let grace = self.config.grace_delay();

        TaskHandle::new(tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;

                // Query outside the lock. The session may be replaced while
                // this is in flight; the epoch check below handles that.
                let status = backend.connection_status(&account_key, &caller).await;

                let mut guard = inner.lock().await;
                if guard.epoch != epoch || guard.session.state != SessionState::AwaitingScan {
                    return;
                }

                guard.session.poll_attempt += 1;
                let attempt = guard.session.poll_attempt;

                let connected = match status {
                    Ok(s) => s.is_connected(),
                    Err(e) => {
                        warn!("connect: status query {attempt}/{ceiling} failed: {e}");
                        false
                    }
                };

                if connected {
                    info!("connect: {account_key} linked after {attempt} polls");
                    guard.session.state = SessionState::Connected;
                    guard.session.qr_payload = None;
                    guard.session.progress_percent = 100;
                    guard.session.status_message = "WhatsApp connected.".to_string();
                    guard.clear_timers();
                    let dismissal =
                        spawn_dismissal(Arc::clone(&inner), directory.clone(), epoch, grace);
                    guard.timers.push(dismissal);
                    return;
                }

                if attempt >= ceiling {
                    info!("connect: {account_key} pairing expired after {ceiling} polls");
                    guard.session.state = SessionState::Expired;
                    guard.session.qr_payload = None;
                    guard.session.progress_percent = 0;
                    guard.session.status_message =
                        "The pairing window expired. Retry to get a fresh code.".to_string();
                    guard.clear_timers();
                    return;
                }

                if let Some(text) = narration_at(attempt, ceiling) {
                    guard.session.status_message = text.to_string();
                }
                // The attempt curve is the floor; the tick task only
                // smooths between attempts.
                let floor = curve.at(attempt);
                if guard.session.progress_percent < floor {
                    guard.session.progress_percent = floor;
                }
            }
        }))
    }
}

/// After the success grace delay: refresh the account directory exactly
/// once, then dismiss the session back to idle.
fn spawn_dismissal(
    inner: Arc<Mutex<Inner>>,
    directory: AccountDirectory,
    epoch: u64,
    grace: Duration,
) -> TaskHandle {
    TaskHandle::new(tokio::spawn(async move {
        tokio::time::sleep(grace).await;

        {
            let guard = inner.lock().await;
            if guard.epoch != epoch || guard.session.state != SessionState::Connected {
                return;
            }
        }

        // The refresh runs without the lock held.
        if let Err(e) = directory.refresh().await {
            warn!("connect: post-connect account refresh failed: {e}");
        }

        let mut guard = inner.lock().await;
        if guard.epoch != epoch || guard.session.state != SessionState::Connected {
            return;
        }
        guard.session = ConnectionSession::idle();
        guard.timers.clear();
    }))
}
