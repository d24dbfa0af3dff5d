//! LocalLedgerClient - the contract in-process
//!
//! Calls contract operations directly with typed values instead of going
//! through a CLI and parsing text. Each mutating call runs inside a
//! [`StagedState`] and commits only on success; calls are serialized by a
//! mutex, which stands in for the network's transaction ordering.

use async_trait::async_trait;
use herb_asset::error::Result as ContractResult;
use herb_asset::{HerbContract, MemoryWorldState, StagedState};
use tokio::sync::Mutex;
use tracing::info;

use super::LedgerClient;
use crate::error::LedgerError;
use crate::models::HerbBatch;

/// In-memory ledger backed by the herb-asset contract.
#[derive(Debug, Default)]
pub struct LocalLedgerClient {
    contract: HerbContract,
    state: Mutex<MemoryWorldState>,
}

impl LocalLedgerClient {
    pub fn new() -> Self {
        Self::with_state(MemoryWorldState::new())
    }

    pub fn with_state(state: MemoryWorldState) -> Self {
        Self {
            contract: HerbContract::new(),
            state: Mutex::new(state),
        }
    }

    /// A ledger preloaded with the contract's example batches.
    pub fn seeded() -> Result<Self, LedgerError> {
        let contract = HerbContract::new();
        let mut state = MemoryWorldState::new();
        contract.init_ledger(&mut state)?;
        info!(entries = state.len(), "local ledger seeded");
        Ok(Self::with_state(state))
    }

    async fn transact<T>(
        &self,
        op: impl FnOnce(&HerbContract, &mut StagedState<'_, MemoryWorldState>) -> ContractResult<T>,
    ) -> Result<T, LedgerError> {
        let mut state = self.state.lock().await;
        let mut staged = StagedState::new(&mut *state);
        let value = op(&self.contract, &mut staged)?;
        staged
            .commit()
            .map_err(|e| LedgerError::Internal(format!("failed to commit: {e}")))?;
        Ok(value)
    }

    async fn read<T>(
        &self,
        op: impl FnOnce(&HerbContract, &MemoryWorldState) -> ContractResult<T>,
    ) -> Result<T, LedgerError> {
        let state = self.state.lock().await;
        Ok(op(&self.contract, &state)?)
    }
}

#[async_trait]
impl LedgerClient for LocalLedgerClient {
    async fn herb_batch_exists(&self, id: &str) -> Result<bool, LedgerError> {
        self.read(|contract, state| contract.herb_batch_exists(state, id))
            .await
    }

    async fn create_herb_batch(&self, batch: &HerbBatch) -> Result<(), LedgerError> {
        let record = herb_asset::HerbBatch::from(batch.clone());
        self.transact(|contract, state| contract.create_herb_batch(state, record))
            .await
    }

    async fn read_herb_batch(&self, id: &str) -> Result<HerbBatch, LedgerError> {
        self.read(|contract, state| contract.read_herb_batch(state, id))
            .await
            .map(HerbBatch::from)
    }

    async fn get_all_herb_batches(&self) -> Result<Vec<HerbBatch>, LedgerError> {
        let batches = self
            .read(|contract, state| contract.get_all_herb_batches(state))
            .await?;
        Ok(batches.into_iter().map(HerbBatch::from).collect())
    }

    async fn update_herb_batch_status(
        &self,
        id: &str,
        new_status: &str,
    ) -> Result<(), LedgerError> {
        self.transact(|contract, state| contract.update_herb_batch_status(state, id, new_status))
            .await
    }

    async fn transfer_herb_batch(&self, id: &str, new_owner: &str) -> Result<String, LedgerError> {
        self.transact(|contract, state| contract.transfer_herb_batch(state, id, new_owner))
            .await
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}
