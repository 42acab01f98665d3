//! # wablast-core
//!
//! Core types, traits, configuration, and error handling for the wablast
//! operator console.

pub mod account;
pub mod config;
pub mod error;
pub mod identity;
pub mod traits;
