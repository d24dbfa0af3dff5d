//! Herb batch contract
//!
//! Flat CRUD over two record types. Every operation receives the world state
//! handle explicitly and touches at most one key, except `init_ledger`
//! (seeds a fixed set) and the list queries (read-only scans).
//!
//! Herb batches live under their ID as a simple key. Transport events live
//! under a composite key so that herb batch listings never see them.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{ContractError, Result};
use crate::state::{create_composite_key, WorldState};
use crate::types::{HerbBatch, TransportEvent};

const HERB_BATCH: &str = "herb batch";
const TRANSPORT_EVENT: &str = "transport event";

/// Object type used for transport event composite keys.
pub const TRANSPORT_EVENT_OBJECT_TYPE: &str = "TransportEvent";

/// Example batches written by [`HerbContract::init_ledger`].
pub fn seed_batches() -> Vec<HerbBatch> {
    [
        ("batch1", "Withania somnifera", "Kerala Ayurveda Farms", "2024-08-15", "Ravi Sharma", "Harvested"),
        ("batch2", "Curcuma longa", "Tamil Nadu Spice Co", "2024-08-20", "Priya Patel", "In-Transit"),
        ("batch3", "Ocimum tenuiflorum", "Maharashtra Herbs", "2024-07-30", "Suresh Kumar", "Certified"),
        ("batch4", "Bacopa monnieri", "Uttarakhand Organics", "2024-08-10", "Anjali Singh", "Harvested"),
        ("batch5", "Centella asiatica", "Karnataka Medicinals", "2024-08-25", "Vikram Joshi", "In-Transit"),
        ("batch6", "Tinospora cordifolia", "Rajasthan Herb Gardens", "2024-08-12", "Meera Gupta", "Certified"),
    ]
    .into_iter()
    .map(|(id, botanical_name, farm, harvest_date, owner, status)| HerbBatch {
        id: id.to_string(),
        botanical_name: botanical_name.to_string(),
        farm: farm.to_string(),
        harvest_date: harvest_date.to_string(),
        owner: owner.to_string(),
        status: status.to_string(),
    })
    .collect()
}

/// The herb batch contract. Stateless: all state lives in the handle.
#[derive(Debug, Default, Clone, Copy)]
pub struct HerbContract;

impl HerbContract {
    pub fn new() -> Self {
        Self
    }

    // ========================================================================
    // LEDGER BOOTSTRAP
    // ========================================================================

    /// Writes the example batches, overwriting any existing records with the
    /// same IDs.
    pub fn init_ledger<S: WorldState>(&self, state: &mut S) -> Result<()> {
        for batch in seed_batches() {
            put_record(state, &batch.id, HERB_BATCH, &batch)?;
        }
        debug!("ledger seeded with example herb batches");
        Ok(())
    }

    // ========================================================================
    // HERB BATCH FUNCTIONS
    // ========================================================================

    /// Issues a new herb batch. Fails if the ID is already taken.
    pub fn create_herb_batch<S: WorldState>(&self, state: &mut S, batch: HerbBatch) -> Result<()> {
        validate_id(&batch.id)?;
        if self.herb_batch_exists(state, &batch.id)? {
            return Err(ContractError::AlreadyExists {
                kind: HERB_BATCH,
                id: batch.id,
            });
        }

        put_record(state, &batch.id, HERB_BATCH, &batch)?;
        debug!(batch_id = %batch.id, "herb batch created");
        Ok(())
    }

    pub fn read_herb_batch<S: WorldState>(&self, state: &S, id: &str) -> Result<HerbBatch> {
        get_record(state, id, HERB_BATCH)?.ok_or_else(|| ContractError::NotFound {
            kind: HERB_BATCH,
            id: id.to_string(),
        })
    }

    /// Overwrites every field of an existing batch.
    pub fn update_herb_batch<S: WorldState>(&self, state: &mut S, batch: HerbBatch) -> Result<()> {
        if !self.herb_batch_exists(state, &batch.id)? {
            return Err(ContractError::NotFound {
                kind: HERB_BATCH,
                id: batch.id,
            });
        }

        put_record(state, &batch.id, HERB_BATCH, &batch)
    }

    pub fn delete_herb_batch<S: WorldState>(&self, state: &mut S, id: &str) -> Result<()> {
        if !self.herb_batch_exists(state, id)? {
            return Err(ContractError::NotFound {
                kind: HERB_BATCH,
                id: id.to_string(),
            });
        }

        state.del_state(id)?;
        debug!(batch_id = %id, "herb batch deleted");
        Ok(())
    }

    pub fn herb_batch_exists<S: WorldState>(&self, state: &S, id: &str) -> Result<bool> {
        Ok(state.get_state(id)?.is_some())
    }

    /// Changes the owner and returns the previous one.
    pub fn transfer_herb_batch<S: WorldState>(
        &self,
        state: &mut S,
        id: &str,
        new_owner: &str,
    ) -> Result<String> {
        let mut batch = self.read_herb_batch(state, id)?;

        let old_owner = std::mem::replace(&mut batch.owner, new_owner.to_string());
        put_record(state, id, HERB_BATCH, &batch)?;

        debug!(batch_id = %id, old_owner = %old_owner, new_owner = %new_owner, "herb batch transferred");
        Ok(old_owner)
    }

    /// Rewrites only the status field.
    pub fn update_herb_batch_status<S: WorldState>(
        &self,
        state: &mut S,
        id: &str,
        new_status: &str,
    ) -> Result<()> {
        let mut batch = self.read_herb_batch(state, id)?;
        batch.status = new_status.to_string();
        put_record(state, id, HERB_BATCH, &batch)
    }

    /// Every herb batch in key order. One undecodable value fails the whole
    /// listing.
    pub fn get_all_herb_batches<S: WorldState>(&self, state: &S) -> Result<Vec<HerbBatch>> {
        state
            .get_state_by_range("", "")?
            .into_iter()
            .map(|(_, value)| decode(&value, HERB_BATCH))
            .collect()
    }

    // ========================================================================
    // TRANSPORT EVENT FUNCTIONS
    // ========================================================================

    pub fn create_transport_event<S: WorldState>(
        &self,
        state: &mut S,
        event: TransportEvent,
    ) -> Result<()> {
        validate_id(&event.transport_id)?;
        if self.transport_event_exists(state, &event.transport_id)? {
            return Err(ContractError::AlreadyExists {
                kind: TRANSPORT_EVENT,
                id: event.transport_id,
            });
        }

        let key = transport_event_key(&event.transport_id)?;
        put_record(state, &key, TRANSPORT_EVENT, &event)?;
        debug!(
            transport_id = %event.transport_id,
            batches = event.batch_ids.len(),
            "transport event created"
        );
        Ok(())
    }

    pub fn read_transport_event<S: WorldState>(
        &self,
        state: &S,
        transport_id: &str,
    ) -> Result<TransportEvent> {
        let key = transport_event_key(transport_id)?;
        get_record(state, &key, TRANSPORT_EVENT)?.ok_or_else(|| ContractError::NotFound {
            kind: TRANSPORT_EVENT,
            id: transport_id.to_string(),
        })
    }

    pub fn transport_event_exists<S: WorldState>(
        &self,
        state: &S,
        transport_id: &str,
    ) -> Result<bool> {
        let key = transport_event_key(transport_id)?;
        Ok(state.get_state(&key)?.is_some())
    }

    /// Every transport event in key order.
    pub fn get_all_transport_events<S: WorldState>(
        &self,
        state: &S,
    ) -> Result<Vec<TransportEvent>> {
        state
            .get_state_by_partial_composite_key(TRANSPORT_EVENT_OBJECT_TYPE, &[])?
            .into_iter()
            .map(|(_, value)| decode(&value, TRANSPORT_EVENT))
            .collect()
    }
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn transport_event_key(transport_id: &str) -> Result<String> {
    Ok(create_composite_key(
        TRANSPORT_EVENT_OBJECT_TYPE,
        &[transport_id],
    )?)
}

/// Simple keys must be non-empty and stay out of the composite key namespace.
fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(ContractError::InvalidArgument("ID must not be empty".to_string()));
    }
    if id.starts_with('\u{0}') {
        return Err(ContractError::InvalidArgument(format!(
            "ID {id:?} must not start with a null character"
        )));
    }
    Ok(())
}

fn get_record<S: WorldState, T: DeserializeOwned>(
    state: &S,
    key: &str,
    kind: &'static str,
) -> Result<Option<T>> {
    state
        .get_state(key)?
        .map(|bytes| decode(&bytes, kind))
        .transpose()
}

fn put_record<S: WorldState, T: Serialize>(
    state: &mut S,
    key: &str,
    kind: &'static str,
    record: &T,
) -> Result<()> {
    let bytes =
        serde_json::to_vec(record).map_err(|source| ContractError::Encode { kind, source })?;
    state.put_state(key, bytes)?;
    Ok(())
}

fn decode<T: DeserializeOwned>(bytes: &[u8], kind: &'static str) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|source| ContractError::Decode { kind, source })
}
