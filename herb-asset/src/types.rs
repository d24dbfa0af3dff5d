//! Record types stored in the world state
//!
//! - HerbBatch: one harvested lot moving through the supply chain
//! - TransportEvent: a shipment of one or more batches between two points

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Herb Status
// =============================================================================

/// Supply chain stage of a herb batch.
///
/// Records keep `status` as a plain string; this enum is the fixed vocabulary
/// used to validate status updates and to drive presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HerbStatus {
    Harvested,
    #[serde(rename = "In-Transit")]
    InTransit,
    #[serde(rename = "Lab-Testing")]
    LabTesting,
    Certified,
    Processing,
    Packaged,
    Distributed,
    Delivered,
}

impl HerbStatus {
    pub const ALL: [HerbStatus; 8] = [
        HerbStatus::Harvested,
        HerbStatus::InTransit,
        HerbStatus::LabTesting,
        HerbStatus::Certified,
        HerbStatus::Processing,
        HerbStatus::Packaged,
        HerbStatus::Distributed,
        HerbStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Harvested => "Harvested",
            Self::InTransit => "In-Transit",
            Self::LabTesting => "Lab-Testing",
            Self::Certified => "Certified",
            Self::Processing => "Processing",
            Self::Packaged => "Packaged",
            Self::Distributed => "Distributed",
            Self::Delivered => "Delivered",
        }
    }
}

impl fmt::Display for HerbStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the eight status values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid status {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for HerbStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

// =============================================================================
// Herb Batch
// =============================================================================

/// The core asset of the supply chain.
///
/// Field order is fixed so that every peer produces byte-identical JSON for
/// the same record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HerbBatch {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "botanicalName")]
    pub botanical_name: String,
    pub farm: String,
    #[serde(rename = "harvestDate")]
    pub harvest_date: String,
    pub owner: String,
    pub status: String,
}

// =============================================================================
// Transport Event
// =============================================================================

/// A geographic endpoint of a shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
}

/// Conditions recorded during a shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalConditions {
    pub temperature: f64,
    pub humidity: f64,
    pub weather: String,
}

/// Movement of one or more batches from origin to destination.
///
/// `batch_ids` is not checked against existing herb batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportEvent {
    pub transport_id: String,
    pub batch_ids: Vec<String>,
    pub provenance_ref: String,
    pub transporter_id: String,
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub start_time: String,
    pub end_time: String,
    pub conditions: EnvironmentalConditions,
    pub sealed: bool,
    #[serde(default)]
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in HerbStatus::ALL {
            assert_eq!(status.as_str().parse::<HerbStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_status_rejects_unknown_values() {
        assert!("Lost".parse::<HerbStatus>().is_err());
        assert!("in-transit".parse::<HerbStatus>().is_err());
        assert!("In Transit".parse::<HerbStatus>().is_err());
        assert_eq!("In-Transit".parse::<HerbStatus>(), Ok(HerbStatus::InTransit));
    }

    #[test]
    fn test_status_serializes_with_hyphen() {
        let json = serde_json::to_string(&HerbStatus::LabTesting).unwrap();
        assert_eq!(json, "\"Lab-Testing\"");
    }

    #[test]
    fn test_herb_batch_json_field_order() {
        let batch = HerbBatch {
            id: "b1".to_string(),
            botanical_name: "Ocimum".to_string(),
            farm: "F1".to_string(),
            harvest_date: "2024-01-01".to_string(),
            owner: "A".to_string(),
            status: "Harvested".to_string(),
        };

        let json = serde_json::to_string(&batch).unwrap();
        assert_eq!(
            json,
            r#"{"ID":"b1","botanicalName":"Ocimum","farm":"F1","harvestDate":"2024-01-01","owner":"A","status":"Harvested"}"#
        );
    }

    #[test]
    fn test_transport_event_notes_default() {
        let json = r#"{
            "transportId": "t1",
            "batchIds": ["batch1"],
            "provenanceRef": "prov-1",
            "transporterId": "truck-9",
            "origin": {"latitude": 10.5, "longitude": 76.2, "address": "Kochi"},
            "destination": {"latitude": 12.9, "longitude": 77.6, "address": "Bengaluru"},
            "startTime": "2024-08-16T06:00:00Z",
            "endTime": "2024-08-16T18:00:00Z",
            "conditions": {"temperature": 24.0, "humidity": 60.0, "weather": "Clear"},
            "sealed": true
        }"#;

        let event: TransportEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.transport_id, "t1");
        assert!(event.notes.is_empty());
        assert!(event.sealed);
    }
}
