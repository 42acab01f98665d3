//! The connection state machine.
//!
//! One orchestrator drives at most one session at a time. A single mutex
//! guards the session together with its epoch and timer handles: every
//! start bumps the epoch and aborts the previous timers before anything
//! else runs, and every timer re-checks its epoch under the lock before
//! touching the session. A result that arrives for a replaced or
//! cancelled session is dropped, never applied.

mod estimator;
mod poller;

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use wablast_core::account::fresh_account_key;
use wablast_core::config::ConnectConfig;
use wablast_core::error::BlastError;
use wablast_core::identity::CallerIdentity;
use wablast_core::traits::Backend;

use crate::directory::AccountDirectory;
use crate::progress::ProgressCurve;
use crate::session::{ConnectionSession, SessionState};
use crate::task::TaskHandle;

struct Inner {
    session: ConnectionSession,
    /// Bumped on every start and cancel. Timers compare it before mutating.
    epoch: u64,
    timers: Vec<TaskHandle>,
}

impl Inner {
    fn clear_timers(&mut self) {
        for timer in self.timers.drain(..) {
            timer.cancel();
        }
    }
}

/// Drives QR acquisition, status polling, and progress estimation for one
/// account link attempt at a time.
pub struct Orchestrator {
    backend: Arc<dyn Backend>,
    caller: CallerIdentity,
    config: ConnectConfig,
    directory: AccountDirectory,
    inner: Arc<Mutex<Inner>>,
}

impl Orchestrator {
    pub fn new(
        backend: Arc<dyn Backend>,
        caller: CallerIdentity,
        config: ConnectConfig,
        directory: AccountDirectory,
    ) -> Self {
        Self {
            backend,
            caller,
            config,
            directory,
            inner: Arc::new(Mutex::new(Inner {
                session: ConnectionSession::idle(),
                epoch: 0,
                timers: Vec::new(),
            })),
        }
    }

    /// Cloned view of the current session. The console polls this.
    pub async fn snapshot(&self) -> ConnectionSession {
        self.inner.lock().await.session.clone()
    }

    /// Link a brand-new account under a freshly minted key. Returns the key.
    pub async fn start_new_account(&self) -> String {
        let key = fresh_account_key();
        self.start(key.clone(), true).await;
        key
    }

    /// Re-link an existing account.
    pub async fn reconnect(&self, account_key: &str) {
        self.start(account_key.to_string(), false).await;
    }

    /// Re-enter acquisition with the same key and flag. Allowed only from
    /// `Expired` or `Failed`.
    pub async fn retry(&self) -> Result<(), BlastError> {
        let (key, is_new) = {
            let inner = self.inner.lock().await;
            if !inner.session.state.can_retry() {
                return Err(BlastError::Session(format!(
                    "nothing to retry in state {:?}",
                    inner.session.state
                )));
            }
            (
                inner.session.account_key.clone(),
                inner.session.is_new_account,
            )
        };
        self.start(key, is_new).await;
        Ok(())
    }

    /// Drop the active session, if any. Idempotent.
    pub async fn cancel(&self) {
        let mut inner = self.inner.lock().await;
        inner.epoch += 1;
        inner.clear_timers();
        inner.session = ConnectionSession::idle();
    }

    /// Tear down the previous session, request a pairing payload, and on
    /// success hand over to the poller and estimator.
    async fn start(&self, account_key: String, is_new_account: bool) {
        let epoch = {
            let mut inner = self.inner.lock().await;
            inner.epoch += 1;
            inner.clear_timers();
            inner.session = ConnectionSession::acquiring(account_key.clone(), is_new_account);
            inner.epoch
        };

        info!("connect: session {epoch} starting for {account_key} (new={is_new_account})");

        // The request runs outside the lock; the epoch decides afterwards
        // whether its result still applies.
        let acquired = self
            .backend
            .request_pairing(&account_key, is_new_account, &self.caller)
            .await;

        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            return;
        }

        match acquired {
            Ok(payload) => {
                inner.session.state = SessionState::AwaitingScan;
                inner.session.qr_payload = Some(payload);
                inner.session.progress_percent = self.config.progress_baseline;
                inner.session.status_message =
                    "Scan the code with the WhatsApp app on your phone.".to_string();

                let curve = ProgressCurve::new(
                    self.config.progress_baseline,
                    self.config.progress_cap,
                    self.config.poll_ceiling,
                );
                let poller = self.spawn_poller(epoch, account_key, curve);
                let estimator = self.spawn_estimator(epoch, curve);
                inner.timers.push(poller);
                inner.timers.push(estimator);
            }
            Err(e) => {
                warn!("connect: pairing request for {account_key} failed: {e}");
                inner.session.state = SessionState::Failed;
                inner.session.qr_payload = None;
                inner.session.status_message =
                    format!("Could not get a pairing code: {e}. Retry when ready.");
            }
        }
    }
}
