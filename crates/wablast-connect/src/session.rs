//! Connection session data model.

use serde::{Deserialize, Serialize};

/// Where a connection attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No session in flight.
    Idle,
    /// Pairing payload requested, nothing to show yet.
    AcquiringQr,
    /// QR on screen, waiting for the operator's phone.
    AwaitingScan,
    Connected,
    /// Poll ceiling reached without a link.
    Expired,
    /// The pairing request itself failed.
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Connected | Self::Expired | Self::Failed)
    }

    /// Retry re-enters acquisition only from these states.
    pub fn can_retry(&self) -> bool {
        matches!(self, Self::Expired | Self::Failed)
    }
}

/// One in-flight attempt to link a WhatsApp account.
///
/// Mutated only by the orchestrator and the timers it owns; everything
/// else sees cloned snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSession {
    pub account_key: String,
    /// Create flow vs. reconnect flow. Affects the backend payload and the
    /// narration, nothing else.
    pub is_new_account: bool,
    /// Present only while `state == AwaitingScan`.
    pub qr_payload: Option<String>,
    pub state: SessionState,
    /// Cosmetic. Reaches 100 only through a confirmed link.
    pub progress_percent: u8,
    /// Completed poll cycles. Resets to 0 on every session start.
    pub poll_attempt: u32,
    pub status_message: String,
}

impl ConnectionSession {
    /// The empty session: nothing running, nothing to show.
    pub fn idle() -> Self {
        Self {
            account_key: String::new(),
            is_new_account: false,
            qr_payload: None,
            state: SessionState::Idle,
            progress_percent: 0,
            poll_attempt: 0,
            status_message: String::new(),
        }
    }

    /// A session entering the acquisition phase.
    pub fn acquiring(account_key: String, is_new_account: bool) -> Self {
        let status_message = if is_new_account {
            "Requesting a pairing code for the new account...".to_string()
        } else {
            format!("Requesting a pairing code for {account_key}...")
        };
        Self {
            account_key,
            is_new_account,
            qr_payload: None,
            state: SessionState::AcquiringQr,
            progress_percent: 0,
            poll_attempt: 0,
            status_message,
        }
    }
}

/// Reassurance text at the quarter, half, and three-quarter marks of the
/// poll ceiling. Returns `None` between checkpoints.
pub fn narration_at(attempt: u32, ceiling: u32) -> Option<&'static str> {
    if attempt == ceiling / 4 {
        Some("Still waiting for the scan. The code is active.")
    } else if attempt == ceiling / 2 {
        Some("Halfway through the wait. Open WhatsApp and scan the code.")
    } else if attempt == ceiling * 3 / 4 {
        Some("The code expires soon. Scan it now to finish linking.")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_session_is_blank() {
        let s = ConnectionSession::idle();
        assert_eq!(s.state, SessionState::Idle);
        assert!(s.account_key.is_empty());
        assert!(s.qr_payload.is_none());
        assert_eq!(s.progress_percent, 0);
        assert_eq!(s.poll_attempt, 0);
    }

    #[test]
    fn test_acquiring_narrates_reconnect_with_key() {
        let s = ConnectionSession::acquiring("wa_123".to_string(), false);
        assert_eq!(s.state, SessionState::AcquiringQr);
        assert!(s.status_message.contains("wa_123"));

        let s = ConnectionSession::acquiring("wa_456".to_string(), true);
        assert!(s.status_message.contains("new account"));
    }

    #[test]
    fn test_terminal_and_retry_states() {
        assert!(SessionState::Connected.is_terminal());
        assert!(SessionState::Expired.is_terminal());
        assert!(SessionState::Failed.is_terminal());
        assert!(!SessionState::AwaitingScan.is_terminal());

        assert!(SessionState::Expired.can_retry());
        assert!(SessionState::Failed.can_retry());
        assert!(!SessionState::Connected.can_retry());
        assert!(!SessionState::Idle.can_retry());
    }

    #[test]
    fn test_narration_checkpoints_for_reference_ceiling() {
        assert!(narration_at(10, 40).is_some());
        assert!(narration_at(20, 40).is_some());
        assert!(narration_at(30, 40).is_some());
        for attempt in [1, 9, 11, 19, 21, 29, 31, 39, 40] {
            assert!(narration_at(attempt, 40).is_none(), "attempt {attempt}");
        }
    }

    #[test]
    fn test_narration_checkpoints_are_distinct() {
        let texts: Vec<_> = [10, 20, 30]
            .iter()
            .map(|a| narration_at(*a, 40).unwrap())
            .collect();
        assert_ne!(texts[0], texts[1]);
        assert_ne!(texts[1], texts[2]);
    }

    #[test]
    fn test_session_state_serde_names() {
        let json = serde_json::to_string(&SessionState::AwaitingScan).unwrap();
        assert_eq!(json, "\"awaiting_scan\"");
        let back: SessionState = serde_json::from_str("\"acquiring_qr\"").unwrap();
        assert_eq!(back, SessionState::AcquiringQr);
    }
}
