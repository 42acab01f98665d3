//! HTTP implementation of the backend contract.
//!
//! Every request carries the caller's `x-user-id` / `x-user-level` headers;
//! the backend scopes what it returns to that operator.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use wablast_core::account::{AccountRecord, AccountStatus};
use wablast_core::config::BackendConfig;
use wablast_core::error::BlastError;
use wablast_core::identity::CallerIdentity;
use wablast_core::traits::{Backend, LinkState, LinkStatus};

use crate::types::{
    AppSettings, DashboardStats, NewTarget, NewWithdrawal, TargetRecord, Withdrawal,
    WithdrawalStatus,
};

/// HTTP client for the blast-service backend.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Create from config values.
    pub fn new(config: &BackendConfig) -> Result<Self, BlastError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BlastError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConnectRequest<'a> {
    user_id: &'a str,
    wa_id: &'a str,
    is_new: bool,
}

#[derive(Deserialize)]
struct ConnectResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    qr: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct StatusResponse {
    status: LinkState,
    #[serde(default)]
    needs_reconnect: bool,
}

#[derive(Deserialize)]
struct SimpleResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BlastRequest<'a> {
    user_id: &'a str,
    wa_id: &'a str,
    message: &'a str,
}

#[derive(Serialize)]
struct WithdrawalDecision<'a> {
    status: &'a str,
    admin_notes: &'a str,
}

#[derive(Serialize)]
struct WithdrawalSubmission<'a> {
    id_user: i64,
    nominal: f64,
    bank_name: &'a str,
    bank_account_number: &'a str,
    bank_account_holder: &'a str,
}

/// The withdrawal table keys its owner column numerically, so the
/// caller's id must parse.
fn caller_numeric_id(caller: &CallerIdentity) -> Result<i64, BlastError> {
    caller.user_id.parse().map_err(|_| {
        BlastError::Config(format!(
            "caller user_id {:?} is not numeric",
            caller.user_id
        ))
    })
}

/// One account row as the backend serves it from `GET /wa/accounts`.
#[derive(Deserialize)]
struct AccountRow {
    id: i64,
    user_id: i64,
    wa_id: String,
    name: String,
    #[serde(default)]
    phone: Option<String>,
    status: AccountStatus,
    #[serde(default)]
    needs_reconnect: bool,
    #[serde(default)]
    saldo: f64,
    #[serde(default)]
    sent: u64,
    #[serde(default)]
    failed: u64,
    created_at: DateTime<Utc>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl AccountRow {
    fn into_record(self) -> AccountRecord {
        let updated_at = self.updated_at.unwrap_or(self.created_at);
        AccountRecord {
            id: self.id,
            owner_id: self.user_id.to_string(),
            account_key: self.wa_id,
            display_name: self.name,
            phone: self.phone,
            status: self.status,
            needs_reconnect: self.needs_reconnect,
            balance: self.saldo,
            sent_count: self.sent,
            failed_count: self.failed,
            created_at: self.created_at,
            updated_at,
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn request_pairing(
        &self,
        account_key: &str,
        is_new_account: bool,
        caller: &CallerIdentity,
    ) -> Result<String, BlastError> {
        let url = format!("{}/wa/connect", self.base_url);
        let body = ConnectRequest {
            user_id: &caller.user_id,
            wa_id: account_key,
            is_new: is_new_account,
        };

        debug!("backend: POST {url} key={account_key} new={is_new_account}");

        let resp = self
            .client
            .post(&url)
            .header("x-user-id", &caller.user_id)
            .header("x-user-level", caller.role.level())
            .json(&body)
            .send()
            .await
            .map_err(|e| BlastError::Backend(format!("connect request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(BlastError::Backend(format!(
                "connect returned {status}: {text}"
            )));
        }

        let parsed: ConnectResponse = resp
            .json()
            .await
            .map_err(|e| BlastError::MalformedResponse(format!("connect: {e}")))?;

        if !parsed.success {
            return Err(BlastError::Backend(parsed.message.unwrap_or_else(|| {
                "backend refused the pairing request".to_string()
            })));
        }

        parsed.qr.ok_or_else(|| {
            BlastError::MalformedResponse("connect: success without a qr payload".to_string())
        })
    }

    async fn connection_status(
        &self,
        account_key: &str,
        caller: &CallerIdentity,
    ) -> Result<LinkStatus, BlastError> {
        let url = format!("{}/wa/status/{account_key}", self.base_url);

        debug!("backend: GET {url}");

        let resp = self
            .client
            .get(&url)
            .header("x-user-id", &caller.user_id)
            .header("x-user-level", caller.role.level())
            .send()
            .await
            .map_err(|e| BlastError::Backend(format!("status query failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(BlastError::Backend(format!(
                "status returned {status}: {text}"
            )));
        }

        let parsed: StatusResponse = resp
            .json()
            .await
            .map_err(|e| BlastError::MalformedResponse(format!("status: {e}")))?;

        Ok(LinkStatus {
            state: parsed.status,
            needs_reconnect: parsed.needs_reconnect,
        })
    }

    async fn logout(
        &self,
        account_key: &str,
        caller: &CallerIdentity,
    ) -> Result<String, BlastError> {
        let url = format!("{}/wa/logout/{account_key}", self.base_url);

        let resp = self
            .client
            .post(&url)
            .header("x-user-id", &caller.user_id)
            .header("x-user-level", caller.role.level())
            .send()
            .await
            .map_err(|e| BlastError::Backend(format!("logout failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(BlastError::Backend(format!(
                "logout returned {status}: {text}"
            )));
        }

        let parsed: SimpleResponse = resp
            .json()
            .await
            .map_err(|e| BlastError::MalformedResponse(format!("logout: {e}")))?;

        if !parsed.success {
            return Err(BlastError::Backend(
                parsed
                    .message
                    .unwrap_or_else(|| "backend refused the logout".to_string()),
            ));
        }

        Ok(parsed.message.unwrap_or_else(|| "logged out".to_string()))
    }

    async fn list_accounts(&self, caller: &CallerIdentity) -> Result<Vec<AccountRecord>, BlastError> {
        let url = format!("{}/wa/accounts", self.base_url);

        let resp = self
            .client
            .get(&url)
            .header("x-user-id", &caller.user_id)
            .header("x-user-level", caller.role.level())
            .send()
            .await
            .map_err(|e| BlastError::Backend(format!("account list failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(BlastError::Backend(format!(
                "account list returned {status}: {text}"
            )));
        }

        let rows: Vec<AccountRow> = resp
            .json()
            .await
            .map_err(|e| BlastError::MalformedResponse(format!("accounts: {e}")))?;

        Ok(rows.into_iter().map(AccountRow::into_record).collect())
    }

    async fn start_blast(
        &self,
        account_key: &str,
        message: &str,
        caller: &CallerIdentity,
    ) -> Result<String, BlastError> {
        let url = format!("{}/blast/start", self.base_url);
        let body = BlastRequest {
            user_id: &caller.user_id,
            wa_id: account_key,
            message,
        };

        debug!("backend: POST {url} key={account_key}");

        let resp = self
            .client
            .post(&url)
            .header("x-user-id", &caller.user_id)
            .header("x-user-level", caller.role.level())
            .json(&body)
            .send()
            .await
            .map_err(|e| BlastError::Backend(format!("blast start failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(BlastError::Backend(format!(
                "blast start returned {status}: {text}"
            )));
        }

        let parsed: SimpleResponse = resp
            .json()
            .await
            .map_err(|e| BlastError::MalformedResponse(format!("blast: {e}")))?;

        if !parsed.success {
            return Err(BlastError::Backend(
                parsed
                    .message
                    .unwrap_or_else(|| "backend refused the blast".to_string()),
            ));
        }

        Ok(parsed
            .message
            .unwrap_or_else(|| "blast started".to_string()))
    }
}

impl HttpBackend {
    /// Dashboard counters. Admin callers get the service-wide fields.
    pub async fn dashboard_stats(
        &self,
        caller: &CallerIdentity,
    ) -> Result<DashboardStats, BlastError> {
        let url = format!("{}/stats/dashboard", self.base_url);

        let resp = self
            .client
            .get(&url)
            .header("x-user-id", &caller.user_id)
            .header("x-user-level", caller.role.level())
            .send()
            .await
            .map_err(|e| BlastError::Backend(format!("stats failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(BlastError::Backend(format!(
                "stats returned {status}: {text}"
            )));
        }

        resp.json()
            .await
            .map_err(|e| BlastError::MalformedResponse(format!("stats: {e}")))
    }

    /// Withdrawal requests visible to the caller.
    pub async fn list_withdrawals(
        &self,
        caller: &CallerIdentity,
    ) -> Result<Vec<Withdrawal>, BlastError> {
        let url = format!("{}/wd", self.base_url);

        let resp = self
            .client
            .get(&url)
            .header("x-user-id", &caller.user_id)
            .header("x-user-level", caller.role.level())
            .send()
            .await
            .map_err(|e| BlastError::Backend(format!("withdrawal list failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(BlastError::Backend(format!(
                "withdrawal list returned {status}: {text}"
            )));
        }

        resp.json()
            .await
            .map_err(|e| BlastError::MalformedResponse(format!("withdrawals: {e}")))
    }

    /// Submit a withdrawal request against the caller's balance.
    pub async fn request_withdrawal(
        &self,
        request: &NewWithdrawal,
        caller: &CallerIdentity,
    ) -> Result<String, BlastError> {
        let url = format!("{}/wd", self.base_url);
        let body = WithdrawalSubmission {
            id_user: caller_numeric_id(caller)?,
            nominal: request.nominal,
            bank_name: &request.bank_name,
            bank_account_number: &request.bank_account_number,
            bank_account_holder: &request.bank_account_holder,
        };

        debug!("backend: POST {url} nominal={}", request.nominal);

        let resp = self
            .client
            .post(&url)
            .header("x-user-id", &caller.user_id)
            .header("x-user-level", caller.role.level())
            .json(&body)
            .send()
            .await
            .map_err(|e| BlastError::Backend(format!("withdrawal request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(BlastError::Backend(format!(
                "withdrawal request returned {status}: {text}"
            )));
        }

        let parsed: SimpleResponse = resp
            .json()
            .await
            .map_err(|e| BlastError::MalformedResponse(format!("withdrawal request: {e}")))?;

        Ok(parsed
            .message
            .unwrap_or_else(|| "withdrawal requested".to_string()))
    }

    /// Move a withdrawal request to a new status with a note.
    pub async fn decide_withdrawal(
        &self,
        id: i64,
        status: WithdrawalStatus,
        notes: &str,
        caller: &CallerIdentity,
    ) -> Result<String, BlastError> {
        let url = format!("{}/wd/{id}/status", self.base_url);
        let body = WithdrawalDecision {
            status: status.as_str(),
            admin_notes: notes,
        };

        let resp = self
            .client
            .put(&url)
            .header("x-user-id", &caller.user_id)
            .header("x-user-level", caller.role.level())
            .json(&body)
            .send()
            .await
            .map_err(|e| BlastError::Backend(format!("withdrawal update failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(BlastError::Backend(format!(
                "withdrawal update returned {status}: {text}"
            )));
        }

        let parsed: SimpleResponse = resp
            .json()
            .await
            .map_err(|e| BlastError::MalformedResponse(format!("withdrawal update: {e}")))?;

        Ok(parsed
            .message
            .unwrap_or_else(|| "withdrawal updated".to_string()))
    }

    /// Blast targets visible to the caller.
    pub async fn list_targets(
        &self,
        caller: &CallerIdentity,
    ) -> Result<Vec<TargetRecord>, BlastError> {
        let url = format!("{}/targets", self.base_url);

        let resp = self
            .client
            .get(&url)
            .header("x-user-id", &caller.user_id)
            .header("x-user-level", caller.role.level())
            .send()
            .await
            .map_err(|e| BlastError::Backend(format!("target list failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(BlastError::Backend(format!(
                "target list returned {status}: {text}"
            )));
        }

        resp.json()
            .await
            .map_err(|e| BlastError::MalformedResponse(format!("targets: {e}")))
    }

    /// Add one blast target.
    pub async fn add_target(
        &self,
        target: &NewTarget,
        caller: &CallerIdentity,
    ) -> Result<(), BlastError> {
        let url = format!("{}/targets", self.base_url);

        let resp = self
            .client
            .post(&url)
            .header("x-user-id", &caller.user_id)
            .header("x-user-level", caller.role.level())
            .json(target)
            .send()
            .await
            .map_err(|e| BlastError::Backend(format!("target add failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(BlastError::Backend(format!(
                "target add returned {status}: {text}"
            )));
        }

        Ok(())
    }

    /// Remove one blast target by id.
    pub async fn remove_target(&self, id: i64, caller: &CallerIdentity) -> Result<(), BlastError> {
        let url = format!("{}/targets/{id}", self.base_url);

        let resp = self
            .client
            .delete(&url)
            .header("x-user-id", &caller.user_id)
            .header("x-user-level", caller.role.level())
            .send()
            .await
            .map_err(|e| BlastError::Backend(format!("target remove failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(BlastError::Backend(format!(
                "target remove returned {status}: {text}"
            )));
        }

        Ok(())
    }

    /// Application settings. The backend serves these unauthenticated.
    pub async fn app_settings(&self) -> Result<AppSettings, BlastError> {
        let url = format!("{}/app/first", self.base_url);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BlastError::Backend(format!("app settings failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(BlastError::Backend(format!(
                "app settings returned {status}: {text}"
            )));
        }

        resp.json()
            .await
            .map_err(|e| BlastError::MalformedResponse(format!("app settings: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wablast_core::identity::CallerRole;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let backend = HttpBackend::new(&BackendConfig {
            base_url: "http://localhost:3000/".to_string(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(backend.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_connect_request_serialization() {
        let body = ConnectRequest {
            user_id: "7",
            wa_id: "wa_1700000000000",
            is_new: true,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["userId"], "7");
        assert_eq!(json["waId"], "wa_1700000000000");
        assert_eq!(json["isNew"], true);
    }

    #[test]
    fn test_blast_request_serialization() {
        let body = BlastRequest {
            user_id: "7",
            wa_id: "wa_1",
            message: "halo",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["userId"], "7");
        assert_eq!(json["waId"], "wa_1");
        assert_eq!(json["message"], "halo");
    }

    #[test]
    fn test_status_response_parsing() {
        let parsed: StatusResponse =
            serde_json::from_str(r#"{"status":"connecting"}"#).unwrap();
        assert_eq!(parsed.status, LinkState::Connecting);
        assert!(!parsed.needs_reconnect);

        let parsed: StatusResponse =
            serde_json::from_str(r#"{"status":"disconnected","needs_reconnect":true}"#).unwrap();
        assert_eq!(parsed.status, LinkState::Disconnected);
        assert!(parsed.needs_reconnect);
    }

    #[test]
    fn test_status_response_rejects_unknown_state() {
        let parsed: Result<StatusResponse, _> = serde_json::from_str(r#"{"status":"banana"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_account_row_mapping() {
        let json = r#"{
            "id": 3,
            "user_id": 12,
            "wa_id": "wa_1700000000000",
            "name": "Toko Andi",
            "status": "active",
            "saldo": 1500.5,
            "sent": 42,
            "created_at": "2025-01-15T08:30:00Z"
        }"#;
        let row: AccountRow = serde_json::from_str(json).unwrap();
        let record = row.into_record();
        assert_eq!(record.owner_id, "12");
        assert_eq!(record.account_key, "wa_1700000000000");
        assert_eq!(record.status, AccountStatus::Connected, "active maps to connected");
        assert!(!record.needs_reconnect);
        assert_eq!(record.balance, 1500.5);
        assert_eq!(record.sent_count, 42);
        assert_eq!(record.failed_count, 0);
        assert_eq!(record.updated_at, record.created_at);
    }

    #[test]
    fn test_connect_response_defaults() {
        let parsed: ConnectResponse = serde_json::from_str("{}").unwrap();
        assert!(!parsed.success);
        assert!(parsed.qr.is_none());
        assert!(parsed.message.is_none());
    }

    #[test]
    fn test_withdrawal_decision_serialization() {
        let body = WithdrawalDecision {
            status: WithdrawalStatus::Completed.as_str(),
            admin_notes: "transferred",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["admin_notes"], "transferred");
    }

    #[test]
    fn test_withdrawal_submission_serialization() {
        let body = WithdrawalSubmission {
            id_user: 7,
            nominal: 50_000.0,
            bank_name: "BCA",
            bank_account_number: "1234567890",
            bank_account_holder: "Andi Wijaya",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["id_user"], 7);
        assert_eq!(json["nominal"], 50_000.0);
        assert_eq!(json["bank_name"], "BCA");
        assert_eq!(json["bank_account_number"], "1234567890");
        assert_eq!(json["bank_account_holder"], "Andi Wijaya");
    }

    #[test]
    fn test_caller_numeric_id_requires_digits() {
        let op = CallerIdentity::new("7", CallerRole::Operator);
        assert_eq!(caller_numeric_id(&op).unwrap(), 7);

        let bad = CallerIdentity::new("ops-7", CallerRole::Operator);
        assert!(matches!(
            caller_numeric_id(&bad),
            Err(BlastError::Config(_))
        ));
    }

    #[test]
    fn test_caller_headers_source_values() {
        let admin = CallerIdentity::new("1", CallerRole::Admin);
        assert_eq!(admin.role.level(), "1");
        let op = CallerIdentity::new("9", CallerRole::Operator);
        assert_eq!(op.role.level(), "2");
    }
}
