mod console;

use clap::{Parser, Subcommand};
use std::sync::Arc;
use wablast_client::types::{NewTarget, NewWithdrawal, WithdrawalStatus};
use wablast_client::HttpBackend;
use wablast_connect::{AccountDirectory, Orchestrator};
use wablast_core::config;
use wablast_core::identity::CallerIdentity;

#[derive(Parser)]
#[command(
    name = "wablast",
    version,
    about = "Operator console for a WhatsApp blast service"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// List WhatsApp accounts with their link status.
    Accounts,
    /// Link a new WhatsApp account by scanning a QR code.
    Connect {
        /// Also write the QR code to this path as a PNG.
        #[arg(long)]
        save_qr: Option<String>,
    },
    /// Re-link an existing account.
    Reconnect {
        /// Account key, e.g. wa_1700000000000.
        key: String,
        /// Also write the QR code to this path as a PNG.
        #[arg(long)]
        save_qr: Option<String>,
    },
    /// One-shot link status query for an account.
    Status {
        /// Account key.
        key: String,
    },
    /// Tear down an account's session on the backend.
    Logout {
        /// Account key.
        key: String,
    },
    /// Start a blast run on a connected account.
    Blast {
        /// Account key.
        key: String,
        /// Message text; when absent, the configured default is used.
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Dashboard statistics.
    Stats,
    /// Withdrawal requests.
    Withdrawals {
        #[command(subcommand)]
        action: WithdrawalAction,
    },
    /// Blast target lists.
    Targets {
        #[command(subcommand)]
        action: TargetAction,
    },
    /// App settings stored on the backend.
    Settings,
}

#[derive(Subcommand)]
enum WithdrawalAction {
    /// List withdrawal requests (admin only).
    List,
    /// Submit a withdrawal request against the caller's balance.
    Request {
        /// Amount to withdraw.
        amount: f64,
        /// Destination bank name.
        #[arg(long)]
        bank: String,
        /// Destination account number.
        #[arg(long)]
        account: String,
        /// Account holder name as registered at the bank.
        #[arg(long)]
        holder: String,
    },
    /// Set a request's status (admin only).
    Decide {
        /// Withdrawal id.
        id: i64,
        /// pending, processing, completed or rejected.
        status: String,
        /// Note shown to the requesting operator.
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand)]
enum TargetAction {
    /// List blast targets.
    List,
    /// Add a blast target.
    Add {
        name: String,
        phone: String,
        /// Optional group label.
        #[arg(long)]
        group: Option<String>,
    },
    /// Remove a blast target.
    Remove {
        /// Target id.
        id: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (cfg, cfg_found) = config::load(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.console.log_level)),
        )
        .init();
    if !cfg_found {
        tracing::info!("Config file not found at {}, using defaults", cli.config);
    }

    let backend = Arc::new(HttpBackend::new(&cfg.backend)?);
    let caller = cfg.caller.identity();
    let directory = AccountDirectory::new(backend.clone(), caller.clone());
    tracing::debug!("using backend at {}", cfg.backend.base_url);

    match cli.command {
        Commands::Accounts => {
            let accounts = directory.refresh().await?;
            console::print_accounts(&accounts);
        }
        Commands::Connect { save_qr } => {
            let orch = Orchestrator::new(
                backend.clone(),
                caller,
                cfg.connect.clone(),
                directory.clone(),
            );
            println!("Linking a new account...");
            let key = orch.start_new_account().await;
            println!("Account key: {key}");
            console::run_connect_flow(
                &orch,
                &directory,
                cfg.connect.poll_ceiling,
                save_qr.as_deref(),
            )
            .await?;
        }
        Commands::Reconnect { key, save_qr } => {
            let orch = Orchestrator::new(
                backend.clone(),
                caller,
                cfg.connect.clone(),
                directory.clone(),
            );
            println!("Re-linking {key}...");
            orch.reconnect(&key).await;
            console::run_connect_flow(
                &orch,
                &directory,
                cfg.connect.poll_ceiling,
                save_qr.as_deref(),
            )
            .await?;
        }
        Commands::Status { key } => {
            let status = directory.check_status(&key).await?;
            println!("{key}: {}", status.state.as_str());
            if status.needs_reconnect {
                println!("The stored session dropped. Run `wablast reconnect {key}`.");
            }
        }
        Commands::Logout { key } => {
            let message = directory.logout(&key).await?;
            println!("{message}");
            console::print_accounts(&directory.accounts().await);
        }
        Commands::Blast { key, message } => {
            let text = match message {
                Some(m) => m,
                None if !cfg.blast.default_message.is_empty() => cfg.blast.default_message.clone(),
                None => backend.app_settings().await?.default_message,
            };
            let reply = directory.start_blast(&key, &text).await?;
            println!("{reply}");
        }
        Commands::Stats => {
            let stats = backend.dashboard_stats(&caller).await?;
            println!("{} dashboard\n", cfg.console.name);
            if let Some(total) = stats.total_users {
                println!("  users: {total}");
            }
            if let Some(total) = stats.total_wa {
                println!("  wa accounts: {total}");
            }
            println!("  wa active: {}", stats.wa_active);
            println!("  wa inactive: {}", stats.wa_inactive);
            println!("  sent: {}", stats.sent);
            println!("  failed: {}", stats.failed);
            println!("  saldo: {:.2}", stats.saldo);
            if !stats.recent_blasts.is_empty() {
                println!("\nRecent blasts:");
                for log in &stats.recent_blasts {
                    println!(
                        "  #{:<6} {:<16} {:<10} {}",
                        log.id,
                        log.target_phone,
                        log.status,
                        log.error.as_deref().unwrap_or("")
                    );
                }
            }
        }
        Commands::Withdrawals { action } => match action {
            WithdrawalAction::List => {
                require_admin(&caller)?;
                let rows = backend.list_withdrawals(&caller).await?;
                if rows.is_empty() {
                    println!("No withdrawal requests.");
                }
                for wd in rows {
                    let who = wd
                        .user
                        .as_ref()
                        .map(|u| u.username.as_str())
                        .unwrap_or("unknown");
                    println!(
                        "  #{:<6} {:<16} {:>12.2} {:<12} {} / {} ({})",
                        wd.id,
                        who,
                        wd.nominal,
                        wd.status.as_str(),
                        wd.bank_name,
                        wd.bank_account_number,
                        wd.bank_account_holder
                    );
                }
            }
            WithdrawalAction::Request {
                amount,
                bank,
                account,
                holder,
            } => {
                if amount <= 0.0 {
                    anyhow::bail!("withdrawal amount must be positive");
                }
                let request = NewWithdrawal {
                    nominal: amount,
                    bank_name: bank,
                    bank_account_number: account,
                    bank_account_holder: holder,
                };
                let message = backend.request_withdrawal(&request, &caller).await?;
                println!("{message}");
            }
            WithdrawalAction::Decide { id, status, notes } => {
                require_admin(&caller)?;
                let status = parse_withdrawal_status(&status)?;
                let message = backend
                    .decide_withdrawal(id, status, notes.as_deref().unwrap_or(""), &caller)
                    .await?;
                println!("{message}");
            }
        },
        Commands::Targets { action } => match action {
            TargetAction::List => {
                let targets = backend.list_targets(&caller).await?;
                if targets.is_empty() {
                    println!("No targets.");
                }
                for target in targets {
                    println!(
                        "  #{:<6} {:<20} {:<16} {}",
                        target.id,
                        target.name,
                        target.phone,
                        target.group_name.as_deref().unwrap_or("-")
                    );
                }
            }
            TargetAction::Add { name, phone, group } => {
                let target = NewTarget {
                    name,
                    phone,
                    group_name: group,
                };
                backend.add_target(&target, &caller).await?;
                println!("Target added.");
            }
            TargetAction::Remove { id } => {
                backend.remove_target(id, &caller).await?;
                println!("Target {id} removed.");
            }
        },
        Commands::Settings => {
            let settings = backend.app_settings().await?;
            println!("App settings\n");
            println!("  name: {}", settings.app_name);
            println!(
                "  blast delay: {}..{} ms",
                settings.delay_min, settings.delay_max
            );
            println!("  points per success: {}", settings.points_per_success);
            println!("  default message: {}", settings.default_message);
        }
    }

    Ok(())
}

/// Reject operator callers for admin-scoped commands.
fn require_admin(caller: &CallerIdentity) -> anyhow::Result<()> {
    if caller.role.is_admin() {
        return Ok(());
    }
    anyhow::bail!(
        "this command requires the admin role. \
         Set role = \"admin\" under [caller] in config.toml."
    )
}

/// Map the CLI status word onto the wire enum.
fn parse_withdrawal_status(value: &str) -> anyhow::Result<WithdrawalStatus> {
    match value {
        "pending" => Ok(WithdrawalStatus::Pending),
        "processing" => Ok(WithdrawalStatus::Processing),
        "completed" => Ok(WithdrawalStatus::Completed),
        "rejected" => Ok(WithdrawalStatus::Rejected),
        other => anyhow::bail!("unsupported withdrawal status: {other}"),
    }
}
