//! Invocation surface: positional string arguments in, payload string out
//!
//! This is what a host runtime (or the `herb-ledger` CLI) calls. Requests
//! arrive as `{"function": "...", "Args": [...]}`; each call runs inside a
//! [`StagedState`] so that a failed call leaves the world state untouched.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::contract::HerbContract;
use crate::error::{ContractError, Result};
use crate::state::{StagedState, WorldState};
use crate::types::{HerbBatch, TransportEvent};

/// Wire form of a contract invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeInput {
    pub function: String,
    #[serde(rename = "Args", alias = "args", default)]
    pub args: Vec<String>,
}

impl ChaincodeInput {
    pub fn new(function: Function, args: Vec<String>) -> Self {
        Self {
            function: function.name().to_string(),
            args,
        }
    }
}

/// Functions exposed by the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    InitLedger,
    CreateHerbBatch,
    ReadHerbBatch,
    UpdateHerbBatch,
    DeleteHerbBatch,
    HerbBatchExists,
    TransferHerbBatch,
    GetAllHerbBatches,
    UpdateHerbBatchStatus,
    CreateTransportEvent,
    ReadTransportEvent,
    TransportEventExists,
    GetAllTransportEvents,
}

impl Function {
    pub const ALL: [Function; 13] = [
        Function::InitLedger,
        Function::CreateHerbBatch,
        Function::ReadHerbBatch,
        Function::UpdateHerbBatch,
        Function::DeleteHerbBatch,
        Function::HerbBatchExists,
        Function::TransferHerbBatch,
        Function::GetAllHerbBatches,
        Function::UpdateHerbBatchStatus,
        Function::CreateTransportEvent,
        Function::ReadTransportEvent,
        Function::TransportEventExists,
        Function::GetAllTransportEvents,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::InitLedger => "InitLedger",
            Self::CreateHerbBatch => "CreateHerbBatch",
            Self::ReadHerbBatch => "ReadHerbBatch",
            Self::UpdateHerbBatch => "UpdateHerbBatch",
            Self::DeleteHerbBatch => "DeleteHerbBatch",
            Self::HerbBatchExists => "HerbBatchExists",
            Self::TransferHerbBatch => "TransferHerbBatch",
            Self::GetAllHerbBatches => "GetAllHerbBatches",
            Self::UpdateHerbBatchStatus => "UpdateHerbBatchStatus",
            Self::CreateTransportEvent => "CreateTransportEvent",
            Self::ReadTransportEvent => "ReadTransportEvent",
            Self::TransportEventExists => "TransportEventExists",
            Self::GetAllTransportEvents => "GetAllTransportEvents",
        }
    }

    /// Number of positional arguments the function takes.
    pub fn arity(&self) -> usize {
        match self {
            Self::InitLedger | Self::GetAllHerbBatches | Self::GetAllTransportEvents => 0,
            Self::ReadHerbBatch
            | Self::DeleteHerbBatch
            | Self::HerbBatchExists
            | Self::CreateTransportEvent
            | Self::ReadTransportEvent
            | Self::TransportEventExists => 1,
            Self::TransferHerbBatch | Self::UpdateHerbBatchStatus => 2,
            Self::CreateHerbBatch | Self::UpdateHerbBatch => 6,
        }
    }

    /// True for functions that never write.
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Self::ReadHerbBatch
                | Self::HerbBatchExists
                | Self::GetAllHerbBatches
                | Self::ReadTransportEvent
                | Self::TransportEventExists
                | Self::GetAllTransportEvents
        )
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Function {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|function| function.name() == s)
            .ok_or_else(|| ContractError::UnknownFunction(s.to_string()))
    }
}

/// Runs one invocation against `state`, committing its writes only on success.
pub fn invoke<S: WorldState>(
    contract: &HerbContract,
    state: &mut S,
    input: &ChaincodeInput,
) -> Result<String> {
    let function: Function = input.function.parse()?;
    if input.args.len() != function.arity() {
        return Err(ContractError::ArgumentCount {
            function: input.function.clone(),
            expected: function.arity(),
            actual: input.args.len(),
        });
    }

    let mut staged = StagedState::new(state);
    let payload = execute(contract, &mut staged, function, &input.args)?;

    let writes = staged.pending_writes();
    staged.commit()?;

    debug!(function = %function, writes, "invocation committed");
    Ok(payload)
}

fn execute<S: WorldState>(
    contract: &HerbContract,
    state: &mut S,
    function: Function,
    args: &[String],
) -> Result<String> {
    match function {
        Function::InitLedger => {
            contract.init_ledger(state)?;
            Ok(String::new())
        }
        Function::CreateHerbBatch => {
            contract.create_herb_batch(state, herb_batch_from_args(args))?;
            Ok(String::new())
        }
        Function::ReadHerbBatch => to_payload(&contract.read_herb_batch(state, &args[0])?),
        Function::UpdateHerbBatch => {
            contract.update_herb_batch(state, herb_batch_from_args(args))?;
            Ok(String::new())
        }
        Function::DeleteHerbBatch => {
            contract.delete_herb_batch(state, &args[0])?;
            Ok(String::new())
        }
        Function::HerbBatchExists => Ok(contract.herb_batch_exists(state, &args[0])?.to_string()),
        Function::TransferHerbBatch => contract.transfer_herb_batch(state, &args[0], &args[1]),
        Function::GetAllHerbBatches => to_payload(&contract.get_all_herb_batches(state)?),
        Function::UpdateHerbBatchStatus => {
            contract.update_herb_batch_status(state, &args[0], &args[1])?;
            Ok(String::new())
        }
        Function::CreateTransportEvent => {
            let event: TransportEvent = serde_json::from_str(&args[0]).map_err(|e| {
                ContractError::InvalidArgument(format!("transport event JSON: {e}"))
            })?;
            contract.create_transport_event(state, event)?;
            Ok(String::new())
        }
        Function::ReadTransportEvent => {
            to_payload(&contract.read_transport_event(state, &args[0])?)
        }
        Function::TransportEventExists => {
            Ok(contract.transport_event_exists(state, &args[0])?.to_string())
        }
        Function::GetAllTransportEvents => to_payload(&contract.get_all_transport_events(state)?),
    }
}

/// Positional order: id, botanicalName, farm, harvestDate, owner, status.
fn herb_batch_from_args(args: &[String]) -> HerbBatch {
    HerbBatch {
        id: args[0].clone(),
        botanical_name: args[1].clone(),
        farm: args[2].clone(),
        harvest_date: args[3].clone(),
        owner: args[4].clone(),
        status: args[5].clone(),
    }
}

fn to_payload<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|source| ContractError::Encode {
        kind: "payload",
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::state::MemoryWorldState;

    fn call(state: &mut MemoryWorldState, function: &str, args: &[&str]) -> Result<String> {
        let input = ChaincodeInput {
            function: function.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        };
        invoke(&HerbContract::new(), state, &input)
    }

    #[test]
    fn test_decodes_wire_input() {
        let input: ChaincodeInput =
            serde_json::from_str(r#"{"function":"ReadHerbBatch","Args":["batch1"]}"#).unwrap();
        assert_eq!(input.function, "ReadHerbBatch");
        assert_eq!(input.args, vec!["batch1"]);

        let input: ChaincodeInput = serde_json::from_str(r#"{"function":"InitLedger"}"#).unwrap();
        assert!(input.args.is_empty());
    }

    #[test]
    fn test_function_names_round_trip() {
        for function in Function::ALL {
            assert_eq!(function.name().parse::<Function>().unwrap(), function);
        }
    }

    #[test]
    fn test_scenario_over_wire() {
        let mut state = MemoryWorldState::new();

        let payload = call(
            &mut state,
            "CreateHerbBatch",
            &["b1", "Ocimum", "F1", "2024-01-01", "A", "Harvested"],
        )
        .unwrap();
        assert!(payload.is_empty());

        let payload = call(&mut state, "ReadHerbBatch", &["b1"]).unwrap();
        assert_eq!(
            payload,
            r#"{"ID":"b1","botanicalName":"Ocimum","farm":"F1","harvestDate":"2024-01-01","owner":"A","status":"Harvested"}"#
        );

        call(&mut state, "UpdateHerbBatchStatus", &["b1", "In-Transit"]).unwrap();
        let old_owner = call(&mut state, "TransferHerbBatch", &["b1", "B"]).unwrap();
        assert_eq!(old_owner, "A");

        let payload = call(&mut state, "ReadHerbBatch", &["b1"]).unwrap();
        let batch: HerbBatch = serde_json::from_str(&payload).unwrap();
        assert_eq!(batch.status, "In-Transit");
        assert_eq!(batch.owner, "B");

        assert_eq!(call(&mut state, "HerbBatchExists", &["b1"]).unwrap(), "true");
        assert_eq!(call(&mut state, "HerbBatchExists", &["b2"]).unwrap(), "false");
    }

    #[test]
    fn test_rejects_unknown_function_and_bad_arity() {
        let mut state = MemoryWorldState::new();

        let err = call(&mut state, "MintTokens", &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);

        let err = call(&mut state, "ReadHerbBatch", &[]).unwrap_err();
        assert!(matches!(
            err,
            ContractError::ArgumentCount {
                expected: 1,
                actual: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_failed_invocation_writes_nothing() {
        let mut state = MemoryWorldState::new();
        call(&mut state, "InitLedger", &[]).unwrap();
        let before = state.clone();

        let err = call(
            &mut state,
            "CreateHerbBatch",
            &["batch1", "X", "Y", "Z", "W", "Harvested"],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(state, before);
    }

    #[test]
    fn test_transport_event_over_wire() {
        let mut state = MemoryWorldState::new();
        let event = r#"{
            "transportId": "t1",
            "batchIds": ["batch1"],
            "provenanceRef": "prov-1",
            "transporterId": "truck-9",
            "origin": {"latitude": 10.5, "longitude": 76.2, "address": "Kochi"},
            "destination": {"latitude": 12.9, "longitude": 77.6, "address": "Bengaluru"},
            "startTime": "2024-08-16T06:00:00Z",
            "endTime": "2024-08-16T18:00:00Z",
            "conditions": {"temperature": 24.0, "humidity": 60.0, "weather": "Clear"},
            "sealed": false,
            "notes": "fragile"
        }"#;

        call(&mut state, "CreateTransportEvent", &[event]).unwrap();
        assert_eq!(call(&mut state, "TransportEventExists", &["t1"]).unwrap(), "true");

        let payload = call(&mut state, "ReadTransportEvent", &["t1"]).unwrap();
        let read: TransportEvent = serde_json::from_str(&payload).unwrap();
        assert_eq!(read.notes, "fragile");

        let err = call(&mut state, "CreateTransportEvent", &["{not json"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);

        assert_eq!(call(&mut state, "GetAllHerbBatches", &[]).unwrap(), "[]");
    }
}
