//! herb-asset: supply chain contract for herb batches and transport events
//!
//! The contract is host-agnostic. Instead of reaching for an ambient
//! transaction context, every operation takes a [`WorldState`] handle:
//!
//! ```
//! use herb_asset::{HerbBatch, HerbContract, MemoryWorldState};
//!
//! let contract = HerbContract::new();
//! let mut state = MemoryWorldState::new();
//!
//! contract
//!     .create_herb_batch(
//!         &mut state,
//!         HerbBatch {
//!             id: "b1".into(),
//!             botanical_name: "Ocimum".into(),
//!             farm: "F1".into(),
//!             harvest_date: "2024-01-01".into(),
//!             owner: "A".into(),
//!             status: "Harvested".into(),
//!         },
//!     )
//!     .unwrap();
//!
//! let old_owner = contract.transfer_herb_batch(&mut state, "b1", "B").unwrap();
//! assert_eq!(old_owner, "A");
//! ```
//!
//! Hosts that speak positional string arguments go through [`dispatch::invoke`].

pub mod contract;
pub mod dispatch;
pub mod error;
pub mod state;
pub mod types;

pub use contract::HerbContract;
pub use dispatch::{invoke, ChaincodeInput, Function};
pub use error::{ContractError, ErrorKind, StateError};
pub use state::{MemoryWorldState, StagedState, WorldState};
pub use types::{EnvironmentalConditions, GeoPoint, HerbBatch, HerbStatus, TransportEvent};
