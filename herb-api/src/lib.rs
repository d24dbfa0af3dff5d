//! herb-api: REST façade over the HerbTrace herb batch ledger
//!
//! Translates HTTP requests into herb-asset contract calls through a
//! [`LedgerClient`](ledger::LedgerClient) and renders results in a uniform
//! `{success, message, data?, error?}` envelope.

pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod routes;
pub mod supply_chain;

pub use config::Config;
pub use error::{ApiError, ApiResult, LedgerError};
pub use routes::{create_router, AppState};
