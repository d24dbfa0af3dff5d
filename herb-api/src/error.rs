//! Error types for herb-api
//!
//! Two layers:
//! - [`LedgerError`]: what a ledger client reports
//! - [`ApiError`]: what an HTTP client sees, rendered as the standard envelope

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use herb_asset::{ContractError, ErrorKind};

use crate::models::ApiResponse;

/// Failures reported by a [`LedgerClient`](crate::ledger::LedgerClient).
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// The contract refused the call's arguments
    #[error("{0}")]
    Rejected(String),

    /// The process could not be started or exited unsuccessfully
    #[error("{0}")]
    Command(String),

    /// The process succeeded but its output could not be understood
    #[error("{0}")]
    Output(String),

    #[error("ledger call timed out after {0}s")]
    Timeout(u64),

    #[error("{0}")]
    Internal(String),
}

impl From<ContractError> for LedgerError {
    fn from(err: ContractError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::NotFound => Self::NotFound(message),
            ErrorKind::Conflict => Self::Conflict(message),
            ErrorKind::Invalid => Self::Rejected(message),
            ErrorKind::Internal => Self::Internal(message),
        }
    }
}

/// Error returned from HTTP handlers.
///
/// `message` is the human summary; `detail` carries the underlying error
/// text verbatim, including raw ledger output.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest {
        message: String,
        detail: Option<String>,
    },

    #[error("{message}")]
    NotFound {
        message: String,
        detail: Option<String>,
    },

    #[error("{message}")]
    Conflict {
        message: String,
        detail: Option<String>,
    },

    #[error("{message}")]
    Internal {
        message: String,
        detail: Option<String>,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>, detail: Option<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            detail,
        }
    }

    /// Maps a ledger failure, using `context` as the message for failures
    /// that are not the caller's fault.
    pub fn from_ledger(context: &str, err: LedgerError) -> Self {
        let detail = Some(err.to_string());
        match err {
            LedgerError::NotFound(_) => Self::NotFound {
                message: "Herb batch not found".to_string(),
                detail,
            },
            LedgerError::Conflict(_) => Self::Conflict {
                message: "Herb batch with this ID already exists".to_string(),
                detail,
            },
            LedgerError::Rejected(_) => Self::BadRequest {
                message: context.to_string(),
                detail,
            },
            LedgerError::Command(_)
            | LedgerError::Output(_)
            | LedgerError::Timeout(_)
            | LedgerError::Internal(_) => Self::Internal {
                message: context.to_string(),
                detail,
            },
        }
    }

    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (message, detail) = match self {
            Self::BadRequest { message, detail }
            | Self::NotFound { message, detail }
            | Self::Conflict { message, detail }
            | Self::Internal { message, detail } => (message, detail),
        };

        if status.is_server_error() {
            tracing::warn!(status = %status, message = %message, detail = ?detail, "request failed");
        }

        (status, Json(ApiResponse::<()>::failure(message, detail))).into_response()
    }
}

/// Result type alias for handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_errors_map_to_status_codes() {
        let cases = [
            (LedgerError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (LedgerError::Conflict("dup".into()), StatusCode::CONFLICT),
            (LedgerError::Rejected("bad".into()), StatusCode::BAD_REQUEST),
            (LedgerError::Command("exit 1".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (LedgerError::Output("garbage".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (LedgerError::Timeout(5), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from_ledger("Failed", err).status_code(), expected);
        }
    }

    #[test]
    fn test_detail_keeps_raw_error_text() {
        let err = ApiError::from_ledger(
            "Failed to update herb batch status",
            LedgerError::Command("exit status 1, output: peer not reachable".into()),
        );
        match err {
            ApiError::Internal { message, detail } => {
                assert_eq!(message, "Failed to update herb batch status");
                assert_eq!(detail.as_deref(), Some("exit status 1, output: peer not reachable"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_contract_errors_convert_by_kind() {
        let err: LedgerError = ContractError::NotFound {
            kind: "herb batch",
            id: "b1".into(),
        }
        .into();
        assert!(matches!(err, LedgerError::NotFound(ref m) if m == "the herb batch b1 does not exist"));

        let err: LedgerError = ContractError::UnknownFunction("Nope".into()).into();
        assert!(matches!(err, LedgerError::Rejected(_)));
    }
}
