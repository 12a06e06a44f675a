//! civic-core library.
//!
//! Citizen issue reports, their lifecycle, and the views derived from them.
//!
//! Store operations return [`CivicError`]; config and I/O helpers use
//! `anyhow::Result`. Logging goes through `tracing`.

pub mod capture;
pub mod config;
pub mod error;
pub mod lock;
pub mod marker;
pub mod model;
pub mod seed;
pub mod storage;
pub mod store;
pub mod view;

pub use error::{CivicError, ErrorCode};
pub use store::IssueStore;
