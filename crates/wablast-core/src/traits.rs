use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::account::AccountRecord;
use crate::error::BlastError;
use crate::identity::CallerIdentity;

/// Link state of one account session as the backend reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    Connected,
    Connecting,
    Disconnected,
}

impl LinkState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Connecting => "connecting",
            Self::Disconnected => "disconnected",
        }
    }
}

/// Answer to a one-shot status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkStatus {
    pub state: LinkState,
    pub needs_reconnect: bool,
}

impl LinkStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self.state, LinkState::Connected)
    }
}

/// The blast-service backend.
///
/// Every call carries the caller identity; the backend scopes what it
/// returns to that operator.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Open a pairing session for `account_key` and return the QR payload
    /// the operator has to scan.
    async fn request_pairing(
        &self,
        account_key: &str,
        is_new_account: bool,
        caller: &CallerIdentity,
    ) -> Result<String, BlastError>;

    /// Query the current link state of one account session.
    async fn connection_status(
        &self,
        account_key: &str,
        caller: &CallerIdentity,
    ) -> Result<LinkStatus, BlastError>;

    /// Tear down the stored session. Returns the backend's confirmation
    /// message.
    async fn logout(&self, account_key: &str, caller: &CallerIdentity)
        -> Result<String, BlastError>;

    /// All accounts visible to `caller`.
    async fn list_accounts(&self, caller: &CallerIdentity) -> Result<Vec<AccountRecord>, BlastError>;

    /// Start a blast run on an already-connected account.
    async fn start_blast(
        &self,
        account_key: &str,
        message: &str,
        caller: &CallerIdentity,
    ) -> Result<String, BlastError>;
}
