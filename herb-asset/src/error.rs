//! Error types for herb-asset

use thiserror::Error;

/// Failures raised by a world state implementation.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures raised by contract operations.
///
/// The messages for `NotFound` and `AlreadyExists` are part of the wire
/// contract: CLI callers match on "does not exist" and "already exists".
#[derive(Error, Debug)]
pub enum ContractError {
    #[error("the {kind} {id} does not exist")]
    NotFound { kind: &'static str, id: String },

    #[error("the {kind} {id} already exists")]
    AlreadyExists { kind: &'static str, id: String },

    #[error("failed to read from world state: {0}")]
    State(#[from] StateError),

    #[error("failed to decode {kind}: {source}")]
    Decode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {kind}: {source}")]
    Encode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("incorrect number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Coarse classification used by callers that map errors onto transport codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Invalid,
    Internal,
}

impl ContractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::Conflict,
            Self::UnknownFunction(_) | Self::ArgumentCount { .. } | Self::InvalidArgument(_) => {
                ErrorKind::Invalid
            }
            Self::State(_) | Self::Decode { .. } | Self::Encode { .. } => ErrorKind::Internal,
        }
    }
}

pub type StateResult<T> = std::result::Result<T, StateError>;

pub type Result<T> = std::result::Result<T, ContractError>;
