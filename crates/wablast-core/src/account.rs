use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a WhatsApp account as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Older backend builds report this as "active".
    #[serde(alias = "active")]
    Connected,
    Connecting,
    Disconnected,
    Inactive,
}

impl AccountStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Connecting => "connecting",
            Self::Disconnected => "disconnected",
            Self::Inactive => "inactive",
        }
    }
}

/// One WhatsApp account row from the backend directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: i64,
    /// Operator who owns this account.
    pub owner_id: String,
    /// Stable key the backend addresses the session by.
    pub account_key: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub status: AccountStatus,
    /// Set by the backend when the stored session dropped and the account
    /// must be paired again.
    #[serde(default)]
    pub needs_reconnect: bool,
    pub balance: f64,
    #[serde(default)]
    pub sent_count: u64,
    #[serde(default)]
    pub failed_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountRecord {
    pub fn is_connected(&self) -> bool {
        self.status.is_connected()
    }
}

/// Mint a key for a brand-new account: `wa_` plus the current unix
/// timestamp in milliseconds. The backend treats the key as opaque.
pub fn fresh_account_key() -> String {
    format!("wa_{}", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_status_roundtrip() {
        let json = serde_json::to_string(&AccountStatus::Connected).unwrap();
        assert_eq!(json, "\"connected\"");
        let back: AccountStatus = serde_json::from_str("\"disconnected\"").unwrap();
        assert_eq!(back, AccountStatus::Disconnected);
        assert!(!back.is_connected());
    }

    #[test]
    fn test_fresh_account_key_shape() {
        let key = fresh_account_key();
        assert!(key.starts_with("wa_"));
        assert!(key[3..].chars().all(|c| c.is_ascii_digit()));
    }
}
