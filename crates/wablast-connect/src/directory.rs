//! Authoritative account list and the one-shot actions around it.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use wablast_core::account::AccountRecord;
use wablast_core::error::BlastError;
use wablast_core::identity::CallerIdentity;
use wablast_core::traits::{Backend, LinkStatus};

/// View over the backend's account list.
///
/// The backend owns the data. After any mutating action the list is
/// re-fetched, never patched locally.
#[derive(Clone)]
pub struct AccountDirectory {
    backend: Arc<dyn Backend>,
    caller: CallerIdentity,
    accounts: Arc<Mutex<Vec<AccountRecord>>>,
}

impl AccountDirectory {
    pub fn new(backend: Arc<dyn Backend>, caller: CallerIdentity) -> Self {
        Self {
            backend,
            caller,
            accounts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Replace the cached list with a fresh fetch and return it.
    pub async fn refresh(&self) -> Result<Vec<AccountRecord>, BlastError> {
        let accounts = self.backend.list_accounts(&self.caller).await?;
        *self.accounts.lock().await = accounts.clone();
        Ok(accounts)
    }

    /// The last fetched list. Empty until the first `refresh`.
    pub async fn accounts(&self) -> Vec<AccountRecord> {
        self.accounts.lock().await.clone()
    }

    /// One-shot status query, outside any polling loop.
    pub async fn check_status(&self, account_key: &str) -> Result<LinkStatus, BlastError> {
        self.backend.connection_status(account_key, &self.caller).await
    }

    /// Tear down the backend session, then re-fetch the list.
    pub async fn logout(&self, account_key: &str) -> Result<String, BlastError> {
        let message = self.backend.logout(account_key, &self.caller).await?;
        info!("accounts: {account_key} logged out");
        self.refresh().await?;
        Ok(message)
    }

    /// Start a blast run on `account_key`.
    ///
    /// The account must be connected at this moment: the gate is a fresh
    /// status query, not the cached list. A non-connected account is
    /// rejected here and no blast request reaches the backend.
    pub async fn start_blast(&self, account_key: &str, message: &str) -> Result<String, BlastError> {
        let status = self.check_status(account_key).await?;
        if !status.is_connected() {
            return Err(BlastError::Precondition(format!(
                "{account_key} is not connected (status {:?})",
                status.state
            )));
        }
        self.backend.start_blast(account_key, message, &self.caller).await
    }
}
