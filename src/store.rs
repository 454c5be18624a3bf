//! CSV/JSON persistence for the enriched corpus and its metrics.
//!
//! Record files are append-only CSVs (headers written on creation); metrics
//! are a single JSON document overwritten on every aggregation run. A row
//! that fails to serialize is logged and skipped — it never aborts the rest
//! of the batch.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use csv::WriterBuilder;

use crate::metrics::AggregateMetrics;
use crate::records::{EnrichedGpsPoint, EnrichedTripRecord};

const GPS_FILE: &str = "gps.csv";
const TRIPS_FILE: &str = "trips.csv";
const METRICS_FILE: &str = "metrics.json";

pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    /// Opens (and creates if necessary) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Appends enriched GPS points, returning how many were saved.
    pub fn save_gps(&self, records: &[EnrichedGpsPoint]) -> Result<usize> {
        self.append_rows(GPS_FILE, records)
    }

    /// Appends enriched trips, returning how many were saved.
    pub fn save_trips(&self, records: &[EnrichedTripRecord]) -> Result<usize> {
        self.append_rows(TRIPS_FILE, records)
    }

    /// Replaces the stored metrics wholesale, returning the metric count.
    pub fn save_metrics(&self, metrics: &AggregateMetrics) -> Result<usize> {
        let path = self.dir.join(METRICS_FILE);
        let body = serde_json::to_vec_pretty(metrics)?;
        std::fs::write(&path, body)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(metrics.len())
    }

    /// Loads GPS points, optionally filtered by area label.
    pub fn load_gps(&self, area: Option<&str>) -> Result<Vec<EnrichedGpsPoint>> {
        let rows: Vec<EnrichedGpsPoint> = self.load_rows(GPS_FILE)?;
        Ok(match area {
            Some(area) => rows
                .into_iter()
                .filter(|r| r.area_label.as_deref() == Some(area))
                .collect(),
            None => rows,
        })
    }

    /// Loads trips, optionally filtered by trip-length label.
    pub fn load_trips(&self, trip_length: Option<&str>) -> Result<Vec<EnrichedTripRecord>> {
        let rows: Vec<EnrichedTripRecord> = self.load_rows(TRIPS_FILE)?;
        Ok(match trip_length {
            Some(label) => rows
                .into_iter()
                .filter(|r| r.trip_length_label.as_deref() == Some(label))
                .collect(),
            None => rows,
        })
    }

    /// Loads the latest stored metrics. An absent file reads as empty.
    pub fn load_metrics(&self) -> Result<AggregateMetrics> {
        let path = self.dir.join(METRICS_FILE);
        if !path.exists() {
            return Ok(AggregateMetrics::default());
        }
        let file = File::open(&path)?;
        Ok(serde_json::from_reader(file)?)
    }

    fn append_rows<T: serde::Serialize>(&self, name: &str, rows: &[T]) -> Result<usize> {
        let path = self.dir.join(name);
        let file_exists = path.exists();
        debug!(path = %path.display(), file_exists, rows = rows.len(), "Appending records");

        let file = OpenOptions::new().append(true).create(true).open(&path)?;

        let mut writer = WriterBuilder::new()
            .has_headers(!file_exists) // IMPORTANT when appending
            .from_writer(file);

        let mut saved = 0;
        for row in rows {
            match writer.serialize(row) {
                Ok(()) => saved += 1,
                Err(e) => {
                    error!(error = %e, "Failed to save record, skipping");
                }
            }
        }
        writer.flush()?;

        Ok(saved)
    }

    fn load_rows<T: for<'de> serde::Deserialize<'de>>(&self, name: &str) -> Result<Vec<T>> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let mut rdr = csv::Reader::from_reader(file);

        let mut rows = Vec::new();
        for result in rdr.deserialize() {
            let record: T = result?;
            rows.push(record);
        }

        Ok(rows)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics;
    use chrono::Utc;
    use std::env;
    use std::fs;

    fn temp_store(name: &str) -> CsvStore {
        let dir = format!("{}/taxi_insights_{}", env::temp_dir().display(), name);
        let _ = fs::remove_dir_all(&dir); // clean up any prior run
        CsvStore::open(dir).unwrap()
    }

    fn gps(id: &str, area: &str) -> EnrichedGpsPoint {
        EnrichedGpsPoint {
            id: id.to_string(),
            latitude: 51.10,
            longitude: 71.43,
            altitude: 350.0,
            speed: 4.2,
            azimuth: 10.0,
            area_label: Some(area.to_string()),
            activity_label: Some("Medium".to_string()),
            road_type_label: None,
            insights: "quiet segment, light traffic".to_string(),
            processed_at: Utc::now(),
        }
    }

    fn trip(label: &str) -> EnrichedTripRecord {
        EnrichedTripRecord {
            duration_sec: 900,
            duration_min: 15.0,
            distance_km: 6.0,
            speed_kph: 24.0,
            wait_cost: 1.0,
            distance_cost: 4.0,
            fare: 9.0,
            passenger_count: 1,
            surge_applied: true,
            trip_length_label: Some(label.to_string()),
            price_label: Some("Low".to_string()),
            time_of_day: None,
            efficiency_score: Some(0.7),
            insights: String::new(),
            processed_at: Utc::now(),
        }
    }

    #[test]
    fn test_save_and_load_gps_roundtrip() {
        let store = temp_store("gps_roundtrip");

        let saved = store.save_gps(&[gps("a", "North"), gps("b", "South")]).unwrap();
        assert_eq!(saved, 2);

        let rows = store.load_gps(None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "a");
        assert_eq!(rows[0].insights, "quiet segment, light traffic");
        assert!(rows[0].road_type_label.is_none());

        fs::remove_dir_all(store.dir()).unwrap();
    }

    #[test]
    fn test_append_keeps_single_header() {
        let store = temp_store("gps_append");

        store.save_gps(&[gps("a", "North")]).unwrap();
        store.save_gps(&[gps("b", "North")]).unwrap();

        assert_eq!(store.load_gps(None).unwrap().len(), 2);

        let content = fs::read_to_string(store.dir().join("gps.csv")).unwrap();
        let header_count = content.lines().filter(|l| l.contains("area_label")).count();
        assert_eq!(header_count, 1);

        fs::remove_dir_all(store.dir()).unwrap();
    }

    #[test]
    fn test_filtered_reads() {
        let store = temp_store("filters");

        store
            .save_gps(&[gps("a", "North"), gps("b", "South"), gps("c", "North")])
            .unwrap();
        store.save_trips(&[trip("Short"), trip("Long")]).unwrap();

        assert_eq!(store.load_gps(Some("North")).unwrap().len(), 2);
        assert_eq!(store.load_gps(Some("Center")).unwrap().len(), 0);
        assert_eq!(store.load_trips(Some("Long")).unwrap().len(), 1);

        fs::remove_dir_all(store.dir()).unwrap();
    }

    #[test]
    fn test_missing_files_read_as_empty() {
        let store = temp_store("empty_reads");

        assert!(store.load_gps(None).unwrap().is_empty());
        assert!(store.load_trips(None).unwrap().is_empty());
        assert!(store.load_metrics().unwrap().is_empty());

        fs::remove_dir_all(store.dir()).unwrap();
    }

    #[test]
    fn test_metrics_overwrite_replaces_prior_run() {
        let store = temp_store("metrics_overwrite");

        let first = metrics::aggregate(&[gps("a", "North")], &[]);
        assert_eq!(store.save_metrics(&first).unwrap(), first.len());

        let second = metrics::aggregate(&[], &[]);
        store.save_metrics(&second).unwrap();

        let loaded = store.load_metrics().unwrap();
        assert_eq!(loaded.value("gps_points_count"), Some(0.0));

        fs::remove_dir_all(store.dir()).unwrap();
    }
}
