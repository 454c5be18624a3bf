//! CSV loaders for the raw record sources.
//!
//! Each loader reads the file in full before any batching happens, so the
//! driver always knows the total batch count up front.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::records::{RawGpsPoint, RawTripRecord};

/// Loads all GPS points from a CSV file with the source column names
/// (`randomized_id, lat, lng, alt, spd, azm`).
pub fn load_gps_points(path: impl AsRef<Path>) -> Result<Vec<RawGpsPoint>> {
    let path = path.as_ref();
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open GPS CSV {}", path.display()))?;

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: RawGpsPoint = result?;
        records.push(record);
    }

    info!(count = records.len(), path = %path.display(), "GPS points loaded");
    Ok(records)
}

/// Loads all taxi trips from a CSV file with the source column names
/// (`trip_duration_sec, trip_duration_min, distance_traveled_Km, KPH, ...`).
pub fn load_trip_records(path: impl AsRef<Path>) -> Result<Vec<RawTripRecord>> {
    let path = path.as_ref();
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open trip CSV {}", path.display()))?;

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: RawTripRecord = result?;
        records.push(record);
    }

    info!(count = records.len(), path = %path.display(), "Trip records loaded");
    Ok(records)
}
