//! # wablast-connect
//!
//! The account connection state machine: QR pairing, poll-until-connected
//! with an attempt ceiling, cosmetic progress, and guaranteed timer
//! cleanup. One orchestrator drives at most one session at a time.

pub mod directory;
pub mod orchestrator;
pub mod progress;
pub mod qr;
pub mod session;
pub mod task;


pub use directory::AccountDirectory;
pub use orchestrator::Orchestrator;
pub use session::{ConnectionSession, SessionState};
