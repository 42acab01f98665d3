//! # wablast-client
//!
//! Typed HTTP client for the wablast backend.

pub mod http;
pub mod types;

pub use http::HttpBackend;
