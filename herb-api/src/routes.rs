//! HTTP routes
//!
//! Handlers validate input, make one ledger call (two for create) and wrap
//! the result in the standard [`ApiResponse`] envelope.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use herb_asset::HerbStatus;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::ledger::LedgerClient;
use crate::models::{
    ApiResponse, CreateHerbBatchRequest, HerbBatch, TransferRequest, UpdateStatusRequest,
};
use crate::supply_chain::{build_timeline, calculate_stats};

const SERVICE_NAME: &str = "HerbTrace Blockchain API";
const API_VERSION: &str = "1.0.0";

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn LedgerClient>,
}

impl AppState {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        // Herb batches
        .route("/api/herbs", post(create_herb_batch).get(list_herb_batches))
        .route("/api/herbs/:id", get(get_herb_batch))
        .route("/api/herbs/:id/status", put(update_herb_batch_status))
        .route("/api/herbs/:id/transfer", put(transfer_herb_batch))
        .route("/api/herbs/:id/supply-chain", get(get_supply_chain))
        .route("/api/stats", get(get_stats))
        // Supply chain shortcuts
        .route("/api/supply-chain/harvest", post(record_harvest))
        .route("/api/supply-chain/transport/:id", put(start_transport))
        .route("/api/supply-chain/lab-receive/:id", put(receive_at_lab))
        .route("/api/supply-chain/certify/:id", put(certify))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

type Reply = (StatusCode, Json<ApiResponse<Value>>);

fn ok(message: &str, data: Value) -> Reply {
    (StatusCode::OK, Json(ApiResponse::ok(message, data)))
}

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::bad_request("Invalid request payload", Some(rejection.body_text())))
}

// === Service ===

/// GET /
pub async fn index() -> impl IntoResponse {
    Json(json!({
        "service": SERVICE_NAME,
        "version": API_VERSION,
        "description": "API for Ayurvedic Supply Chain Management on Hyperledger Fabric",
        "endpoints": {
            "health": "GET /health",
            "herbs": {
                "create": "POST /api/herbs",
                "getAll": "GET /api/herbs",
                "getById": "GET /api/herbs/:id",
                "updateStatus": "PUT /api/herbs/:id/status",
                "transfer": "PUT /api/herbs/:id/transfer",
                "supplyChain": "GET /api/herbs/:id/supply-chain"
            },
            "stats": "GET /api/stats",
            "supplyChain": {
                "harvest": "POST /api/supply-chain/harvest",
                "transport": "PUT /api/supply-chain/transport/:id",
                "labReceive": "PUT /api/supply-chain/lab-receive/:id",
                "certify": "PUT /api/supply-chain/certify/:id"
            }
        }
    }))
}

/// GET /health
pub async fn health() -> Json<ApiResponse<Value>> {
    Json(ApiResponse::ok(
        "HerbTrace API is running",
        json!({
            "status": "healthy",
            "service": SERVICE_NAME,
            "version": API_VERSION,
        }),
    ))
}

// === Herb batches ===

/// POST /api/herbs
pub async fn create_herb_batch(
    State(state): State<AppState>,
    payload: Result<Json<CreateHerbBatchRequest>, JsonRejection>,
) -> ApiResult<Reply> {
    let req = parse_body(payload)?;
    req.validate()?;
    create_batch(&state, req.into()).await
}

/// Existence check then create. Two concurrent creates of one ID can both
/// pass the check; the contract's own check rejects the second.
async fn create_batch(state: &AppState, batch: HerbBatch) -> ApiResult<Reply> {
    let exists = state
        .ledger
        .herb_batch_exists(&batch.id)
        .await
        .map_err(|e| ApiError::from_ledger("Failed to check if herb batch exists", e))?;
    if exists {
        return Err(ApiError::Conflict {
            message: "Herb batch with this ID already exists".to_string(),
            detail: None,
        });
    }

    state
        .ledger
        .create_herb_batch(&batch)
        .await
        .map_err(|e| ApiError::from_ledger("Failed to create herb batch on blockchain", e))?;

    info!(batch_id = %batch.id, status = %batch.status, "herb batch created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Herb batch created successfully",
            json!({
                "batchId": batch.id,
                "status": "Created on blockchain",
            }),
        )),
    ))
}

/// GET /api/herbs
pub async fn list_herb_batches(State(state): State<AppState>) -> ApiResult<Reply> {
    let batches = state
        .ledger
        .get_all_herb_batches()
        .await
        .map_err(|e| ApiError::from_ledger("Failed to retrieve herb batches", e))?;

    let count = batches.len();
    Ok(ok(
        "Herb batches retrieved successfully",
        json!({ "batches": batches, "count": count }),
    ))
}

/// GET /api/herbs/:id
pub async fn get_herb_batch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Reply> {
    let batch = read_batch(&state, &id).await?;
    Ok(ok("Herb batch retrieved successfully", json!(batch)))
}

async fn read_batch(state: &AppState, id: &str) -> ApiResult<HerbBatch> {
    state
        .ledger
        .read_herb_batch(id)
        .await
        .map_err(|e| ApiError::from_ledger("Failed to retrieve herb batch", e))
}

/// PUT /api/herbs/:id/status
pub async fn update_herb_batch_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> ApiResult<Reply> {
    let req = parse_body(payload)?;
    req.validate()?;

    if req.new_status.parse::<HerbStatus>().is_err() {
        let valid: Vec<&str> = HerbStatus::ALL.iter().map(HerbStatus::as_str).collect();
        return Err(ApiError::bad_request(
            format!("Invalid status. Valid statuses are: {}", valid.join(", ")),
            None,
        ));
    }

    state
        .ledger
        .update_herb_batch_status(&id, &req.new_status)
        .await
        .map_err(|e| ApiError::from_ledger("Failed to update herb batch status", e))?;

    info!(batch_id = %id, new_status = %req.new_status, "herb batch status updated");

    Ok(ok(
        "Herb batch status updated successfully",
        json!({ "batchId": id, "newStatus": req.new_status }),
    ))
}

/// PUT /api/herbs/:id/transfer
pub async fn transfer_herb_batch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> ApiResult<Reply> {
    let req = parse_body(payload)?;
    req.validate()?;

    let old_owner = state
        .ledger
        .transfer_herb_batch(&id, &req.new_owner)
        .await
        .map_err(|e| ApiError::from_ledger("Failed to transfer herb batch", e))?;

    info!(batch_id = %id, old_owner = %old_owner, new_owner = %req.new_owner, "herb batch transferred");

    Ok(ok(
        "Herb batch transferred successfully",
        json!({ "batchId": id, "oldOwner": old_owner, "newOwner": req.new_owner }),
    ))
}

/// GET /api/herbs/:id/supply-chain
pub async fn get_supply_chain(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Reply> {
    let batch = read_batch(&state, &id).await?;
    let timeline = build_timeline(&batch);

    Ok(ok(
        "Supply chain status retrieved successfully",
        json!({ "batchInfo": batch, "timeline": timeline }),
    ))
}

/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Reply> {
    let batches = state
        .ledger
        .get_all_herb_batches()
        .await
        .map_err(|e| ApiError::from_ledger("Failed to retrieve statistics", e))?;

    Ok(ok("Statistics retrieved successfully", json!(calculate_stats(&batches))))
}

// === Supply chain shortcuts ===

/// POST /api/supply-chain/harvest
///
/// Same body as POST /api/herbs; `status` may be omitted and is always
/// recorded as Harvested.
pub async fn record_harvest(
    State(state): State<AppState>,
    payload: Result<Json<CreateHerbBatchRequest>, JsonRejection>,
) -> ApiResult<Reply> {
    let mut req = parse_body(payload)?;
    req.status = HerbStatus::Harvested.to_string();
    req.validate()?;
    create_batch(&state, req.into()).await
}

/// PUT /api/supply-chain/transport/:id
pub async fn start_transport(Path(id): Path<String>) -> Json<Value> {
    status_hint(&id, "picked up for transport", HerbStatus::InTransit)
}

/// PUT /api/supply-chain/lab-receive/:id
pub async fn receive_at_lab(Path(id): Path<String>) -> Json<Value> {
    status_hint(&id, "received at lab", HerbStatus::LabTesting)
}

/// PUT /api/supply-chain/certify/:id
pub async fn certify(Path(id): Path<String>) -> Json<Value> {
    status_hint(&id, "certified", HerbStatus::Certified)
}

/// These routes change nothing; they point at the status endpoint.
fn status_hint(id: &str, event: &str, status: HerbStatus) -> Json<Value> {
    Json(json!({
        "message": format!("Herb batch {id} {event}"),
        "action": format!("Use PUT /api/herbs/{id}/status with newStatus: '{status}'"),
    }))
}
