//! Terminal rendering for the connect flow and the account table.

use std::time::Duration;

use wablast_connect::qr;
use wablast_connect::{AccountDirectory, Orchestrator, SessionState};
use wablast_core::account::AccountRecord;

/// How often the console re-reads the session snapshot.
const RENDER_INTERVAL: Duration = Duration::from_millis(300);

/// Drive one connect or reconnect flow to its end.
///
/// Prints the QR block once when the payload appears, prints the status
/// line whenever it changes, and ends with the refreshed account table
/// on success. The terminal failure states come back as errors so the
/// process exits non-zero.
pub async fn run_connect_flow(
    orchestrator: &Orchestrator,
    directory: &AccountDirectory,
    poll_ceiling: u32,
    save_qr: Option<&str>,
) -> anyhow::Result<()> {
    let mut qr_shown = false;
    let mut last_line = String::new();

    loop {
        tokio::time::sleep(RENDER_INTERVAL).await;
        let snapshot = orchestrator.snapshot().await;

        if !qr_shown {
            if let Some(payload) = snapshot.qr_payload.as_deref() {
                println!("{}", qr::render_terminal(payload)?);
                if let Some(path) = save_qr {
                    std::fs::write(path, qr::render_png(payload)?)?;
                    println!("QR saved to {path}");
                }
                qr_shown = true;
            }
        }

        if !snapshot.status_message.is_empty() {
            let line = format!(
                "[{:>3}%] {} (attempt {}/{})",
                snapshot.progress_percent,
                snapshot.status_message,
                snapshot.poll_attempt,
                poll_ceiling
            );
            if line != last_line {
                println!("{line}");
                last_line = line;
            }
        }

        match snapshot.state {
            // A connected session dismisses itself to idle after the
            // grace delay, refreshing the directory on the way. The
            // whole dismissal can land between two snapshots, so idle
            // alone means the flow is done.
            SessionState::Idle => {
                print_accounts(&directory.accounts().await);
                return Ok(());
            }
            SessionState::Expired | SessionState::Failed => {
                anyhow::bail!("{}", snapshot.status_message);
            }
            _ => {}
        }
    }
}

/// Plain fixed-width account table.
pub fn print_accounts(accounts: &[AccountRecord]) {
    if accounts.is_empty() {
        println!("No accounts.");
        return;
    }
    println!(
        "{:<22} {:<20} {:<16} {:<14} {:>10}",
        "KEY", "NAME", "PHONE", "STATUS", "BALANCE"
    );
    for account in accounts {
        let status = if account.needs_reconnect {
            format!("{} (relink)", account.status.as_str())
        } else {
            account.status.as_str().to_string()
        };
        println!(
            "{:<22} {:<20} {:<16} {:<14} {:>10.2}",
            account.account_key,
            account.display_name,
            account.phone.as_deref().unwrap_or("-"),
            status,
            account.balance
        );
    }
}
