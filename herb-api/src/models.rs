//! Request and response bodies

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Standard envelope for every herb API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error,
        }
    }
}

/// A herb batch as the API presents it.
///
/// Ledger output spells the key `ID`; the API spells it `id`. Both are
/// accepted on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HerbBatch {
    #[serde(alias = "ID")]
    pub id: String,
    pub botanical_name: String,
    pub farm: String,
    pub harvest_date: String,
    pub owner: String,
    pub status: String,
}

impl From<herb_asset::HerbBatch> for HerbBatch {
    fn from(batch: herb_asset::HerbBatch) -> Self {
        Self {
            id: batch.id,
            botanical_name: batch.botanical_name,
            farm: batch.farm,
            harvest_date: batch.harvest_date,
            owner: batch.owner,
            status: batch.status,
        }
    }
}

impl From<HerbBatch> for herb_asset::HerbBatch {
    fn from(batch: HerbBatch) -> Self {
        Self {
            id: batch.id,
            botanical_name: batch.botanical_name,
            farm: batch.farm,
            harvest_date: batch.harvest_date,
            owner: batch.owner,
            status: batch.status,
        }
    }
}

/// POST /api/herbs body. Every field is required and must be non-empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateHerbBatchRequest {
    pub id: String,
    pub botanical_name: String,
    pub farm: String,
    pub harvest_date: String,
    pub owner: String,
    pub status: String,
}

impl CreateHerbBatchRequest {
    pub fn validate(&self) -> ApiResult<()> {
        require(&[
            ("id", &self.id),
            ("botanicalName", &self.botanical_name),
            ("farm", &self.farm),
            ("harvestDate", &self.harvest_date),
            ("owner", &self.owner),
            ("status", &self.status),
        ])
    }
}

impl From<CreateHerbBatchRequest> for HerbBatch {
    fn from(req: CreateHerbBatchRequest) -> Self {
        Self {
            id: req.id,
            botanical_name: req.botanical_name,
            farm: req.farm,
            harvest_date: req.harvest_date,
            owner: req.owner,
            status: req.status,
        }
    }
}

/// PUT /api/herbs/:id/status body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateStatusRequest {
    pub new_status: String,
}

impl UpdateStatusRequest {
    pub fn validate(&self) -> ApiResult<()> {
        require(&[("newStatus", &self.new_status)])
    }
}

/// PUT /api/herbs/:id/transfer body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransferRequest {
    pub new_owner: String,
}

impl TransferRequest {
    pub fn validate(&self) -> ApiResult<()> {
        require(&[("newOwner", &self.new_owner)])
    }
}

fn require(fields: &[(&str, &String)]) -> ApiResult<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::bad_request(
            "Invalid request payload",
            Some(format!("missing required fields: {}", missing.join(", "))),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_omits_absent_fields() {
        let json = serde_json::to_value(ApiResponse::<()>::failure("nope", None)).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "message": "nope"}));

        let json = serde_json::to_value(ApiResponse::ok("fine", 3)).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "message": "fine", "data": 3}));
    }

    #[test]
    fn test_herb_batch_accepts_ledger_spelling() {
        let batch: HerbBatch = serde_json::from_str(
            r#"{"ID":"b1","botanicalName":"Ocimum","farm":"F1","harvestDate":"2024-01-01","owner":"A","status":"Harvested"}"#,
        )
        .unwrap();
        assert_eq!(batch.id, "b1");

        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(json["id"], "b1");
        assert!(json.get("ID").is_none());
    }

    #[test]
    fn test_create_request_lists_missing_fields() {
        let req: CreateHerbBatchRequest =
            serde_json::from_str(r#"{"id":"b1","farm":"F1","owner":"  "}"#).unwrap();

        match req.validate().unwrap_err() {
            ApiError::BadRequest { detail, .. } => assert_eq!(
                detail.as_deref(),
                Some("missing required fields: botanicalName, harvestDate, owner, status")
            ),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_status_request_requires_value() {
        let req: UpdateStatusRequest = serde_json::from_str("{}").unwrap();
        assert!(req.validate().is_err());

        let req: UpdateStatusRequest = serde_json::from_str(r#"{"newStatus":"Lost"}"#).unwrap();
        assert!(req.validate().is_ok());
    }
}
