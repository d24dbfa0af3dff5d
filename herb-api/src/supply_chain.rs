//! Derived, read-only views over herb batches
//!
//! Nothing here is persisted; both views are recomputed from the current
//! records on every request.

use std::collections::BTreeMap;

use herb_asset::HerbStatus;
use serde::Serialize;

use crate::models::HerbBatch;

/// One stage of a batch's supply chain timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineStage {
    pub stage: String,
    pub status: String,
    pub actor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub description: String,
}

/// Farming stage, plus one stage describing where the batch is now when the
/// status is In-Transit, Lab-Testing or Certified.
pub fn build_timeline(batch: &HerbBatch) -> Vec<TimelineStage> {
    let mut timeline = vec![TimelineStage {
        stage: "Farming".to_string(),
        status: "Completed".to_string(),
        actor: batch.owner.clone(),
        location: Some(batch.farm.clone()),
        date: Some(batch.harvest_date.clone()),
        description: "Herbs harvested from certified organic farm".to_string(),
    }];

    let current = match batch.status.parse::<HerbStatus>() {
        Ok(HerbStatus::InTransit) => Some((
            "Transportation",
            "In Progress",
            "Herbs in transit to next stage",
        )),
        Ok(HerbStatus::LabTesting) => Some((
            "Quality Testing",
            "In Progress",
            "Quality testing and certification in progress",
        )),
        Ok(HerbStatus::Certified) => Some((
            "Certification",
            "Completed",
            "Quality certification completed",
        )),
        _ => None,
    };

    if let Some((stage, status, description)) = current {
        timeline.push(TimelineStage {
            stage: stage.to_string(),
            status: status.to_string(),
            actor: batch.owner.clone(),
            location: None,
            date: None,
            description: description.to_string(),
        });
    }

    timeline
}

/// Aggregate counts for GET /api/stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyChainStats {
    pub total_batches: usize,
    pub status_breakdown: BTreeMap<String, usize>,
    pub farm_breakdown: BTreeMap<String, usize>,
    /// Batches in transit, in lab testing or in processing
    pub active_supply_chain: usize,
}

pub fn calculate_stats(batches: &[HerbBatch]) -> SupplyChainStats {
    let mut status_breakdown: BTreeMap<String, usize> = BTreeMap::new();
    let mut farm_breakdown: BTreeMap<String, usize> = BTreeMap::new();

    for batch in batches {
        *status_breakdown.entry(batch.status.clone()).or_default() += 1;
        *farm_breakdown.entry(batch.farm.clone()).or_default() += 1;
    }

    let active_supply_chain = [
        HerbStatus::InTransit,
        HerbStatus::LabTesting,
        HerbStatus::Processing,
    ]
    .iter()
    .map(|status| status_breakdown.get(status.as_str()).copied().unwrap_or(0))
    .sum();

    SupplyChainStats {
        total_batches: batches.len(),
        status_breakdown,
        farm_breakdown,
        active_supply_chain,
    }
}
