//! Ledger clients - how the API reaches the herb-asset contract
//!
//! - [`CliLedgerClient`]: one network CLI process per call, output scraped for results
//! - [`LocalLedgerClient`]: the contract in-process over an in-memory world state
//!
//! Handlers only see the [`LedgerClient`] trait.

pub mod cli;
pub mod local;
pub mod scrape;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{LedgerBackend, LedgerConfig};
use crate::error::LedgerError;
use crate::models::HerbBatch;

pub use cli::CliLedgerClient;
pub use local::LocalLedgerClient;

/// Herb batch operations the API needs from the ledger.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn herb_batch_exists(&self, id: &str) -> Result<bool, LedgerError>;

    async fn create_herb_batch(&self, batch: &HerbBatch) -> Result<(), LedgerError>;

    async fn read_herb_batch(&self, id: &str) -> Result<HerbBatch, LedgerError>;

    async fn get_all_herb_batches(&self) -> Result<Vec<HerbBatch>, LedgerError>;

    async fn update_herb_batch_status(&self, id: &str, new_status: &str)
        -> Result<(), LedgerError>;

    /// Returns the owner in effect before the transfer.
    async fn transfer_herb_batch(&self, id: &str, new_owner: &str) -> Result<String, LedgerError>;

    /// Short name for logs
    fn backend_name(&self) -> &'static str;
}

/// Build the client selected by configuration.
pub fn build_client(config: &LedgerConfig) -> Result<Arc<dyn LedgerClient>, LedgerError> {
    match config.backend {
        LedgerBackend::Cli => Ok(Arc::new(CliLedgerClient::new(config))),
        LedgerBackend::Local => {
            let client = if config.seed_on_start {
                LocalLedgerClient::seeded()?
            } else {
                LocalLedgerClient::new()
            };
            Ok(Arc::new(client))
        }
    }
}
