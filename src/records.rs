//! Raw and enriched record types for the GPS and taxi corpora.
//!
//! Raw records deserialize directly from the source CSV column names.
//! Enriched records are created exactly once per raw record and are what the
//! store persists and the aggregator reads back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single raw GPS sample as it appears in the source CSV.
#[derive(Debug, Clone, Deserialize)]
pub struct RawGpsPoint {
    #[serde(rename = "randomized_id", default)]
    pub id: Option<String>,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
    #[serde(rename = "alt")]
    pub altitude: f64,
    /// Speed in metres per second.
    #[serde(rename = "spd")]
    pub speed: f64,
    #[serde(rename = "azm")]
    pub azimuth: f64,
}

/// A single raw taxi trip as it appears in the source CSV.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTripRecord {
    #[serde(rename = "trip_duration_sec")]
    pub duration_sec: i64,
    #[serde(rename = "trip_duration_min")]
    pub duration_min: f64,
    #[serde(rename = "distance_traveled_Km")]
    pub distance_km: f64,
    #[serde(rename = "KPH")]
    pub speed_kph: f64,
    #[serde(rename = "wait_time_cost")]
    pub wait_cost: f64,
    pub distance_cost: f64,
    #[serde(rename = "total_fare_new")]
    pub fare: f64,
    #[serde(rename = "num_of_passengers")]
    pub passenger_count: u32,
    pub surge_applied: bool,
}

/// A GPS point with classification labels attached.
///
/// Label fields are `None` only when the oracle answered with free text that
/// carried no usable classification; the fallback path always fills them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedGpsPoint {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub speed: f64,
    pub azimuth: f64,

    pub area_label: Option<String>,
    pub activity_label: Option<String>,
    pub road_type_label: Option<String>,

    /// Oracle insight text, or an error description on fallback.
    pub insights: String,
    pub processed_at: DateTime<Utc>,
}

/// A taxi trip with classification labels attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedTripRecord {
    pub duration_sec: i64,
    pub duration_min: f64,
    pub distance_km: f64,
    pub speed_kph: f64,
    pub wait_cost: f64,
    pub distance_cost: f64,
    pub fare: f64,
    pub passenger_count: u32,
    pub surge_applied: bool,

    pub trip_length_label: Option<String>,
    pub price_label: Option<String>,
    /// Part of the persisted schema but not derived by any component.
    pub time_of_day: Option<String>,
    pub efficiency_score: Option<f64>,

    pub insights: String,
    pub processed_at: DateTime<Utc>,
}
