//! Response contracts for the backend endpoints outside the connection flow.
//!
//! Field names follow the backend's wire shapes; anything the console does
//! not render is left out and ignored during parsing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dashboard counters from `GET /stats/dashboard`.
///
/// `total_users` and `total_wa` are only present for admin callers.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default)]
    pub total_users: Option<u64>,
    #[serde(default)]
    pub total_wa: Option<u64>,
    pub wa_active: u64,
    pub wa_inactive: u64,
    pub sent: u64,
    pub failed: u64,
    /// Absent for callers without a balance; treated as zero.
    #[serde(default)]
    pub saldo: f64,
    #[serde(default)]
    pub recent_blasts: Vec<BlastLog>,
}

/// One row of the recent-blast log embedded in the dashboard payload.
#[derive(Debug, Clone, Deserialize)]
pub struct BlastLog {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub target_phone: String,
    pub message: String,
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Lifecycle of a withdrawal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Processing,
    Completed,
    Rejected,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }
}

/// Owner of a withdrawal request, embedded in the `GET /wd` rows.
#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawalUser {
    pub name: String,
    pub username: String,
}

/// One withdrawal request from `GET /wd`.
#[derive(Debug, Clone, Deserialize)]
pub struct Withdrawal {
    pub id: i64,
    #[serde(default)]
    pub user: Option<WithdrawalUser>,
    pub nominal: f64,
    pub bank_name: String,
    pub bank_account_number: String,
    pub bank_account_holder: String,
    pub status: WithdrawalStatus,
    #[serde(default)]
    pub admin_notes: Option<String>,
    #[serde(default)]
    pub processing_time: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Details for `POST /wd`, a withdrawal against the caller's balance.
///
/// The owner id is filled in from the caller identity at send time.
#[derive(Debug, Clone)]
pub struct NewWithdrawal {
    pub nominal: f64,
    pub bank_name: String,
    pub bank_account_number: String,
    pub bank_account_holder: String,
}

/// One blast target from `GET /targets`.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetRecord {
    pub id: i64,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub group_name: Option<String>,
}

/// Body for `POST /targets`.
#[derive(Debug, Clone, Serialize)]
pub struct NewTarget {
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
}

/// Application settings from `GET /app/first`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(rename = "nama_app")]
    pub app_name: String,
    pub delay_min: u64,
    pub delay_max: u64,
    #[serde(rename = "poin_per_success")]
    pub points_per_success: u32,
    #[serde(rename = "pesan_wa_default")]
    pub default_message: String,
}
