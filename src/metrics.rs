//! Aggregate fleet statistics over the enriched corpus.
//!
//! Metrics are recomputed wholesale on every run; the latest run replaces
//! whatever the store held before. Every division-by-zero case degrades to
//! zero rather than erroring.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::records::{EnrichedGpsPoint, EnrichedTripRecord};
use crate::store::CsvStore;

/// Fixed KZT-per-USD conversion used for the tenge metrics.
pub const TENGE_PER_USD: f64 = 541.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricKind {
    #[serde(rename = "GPS")]
    Gps,
    #[serde(rename = "TAXI")]
    Taxi,
    #[serde(rename = "CALCULATED")]
    Calculated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metric {
    pub value: f64,
    pub kind: MetricKind,
    pub description: String,
    pub calculated_at: DateTime<Utc>,
}

/// Named mapping of metric name to value, kind, and description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub metrics: BTreeMap<String, Metric>,
}

impl AggregateMetrics {
    pub fn value(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).map(|m| m.value)
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    fn insert(&mut self, name: &str, value: f64, kind: MetricKind, description: &str) {
        self.metrics.insert(
            name.to_string(),
            Metric {
                value,
                kind,
                description: description.to_string(),
                calculated_at: Utc::now(),
            },
        );
    }
}

/// Computes summary metrics from already-enriched records.
pub fn aggregate(gps: &[EnrichedGpsPoint], trips: &[EnrichedTripRecord]) -> AggregateMetrics {
    let mut out = AggregateMetrics::default();

    let moving: Vec<f64> = gps.iter().filter(|p| p.speed > 0.0).map(|p| p.speed).collect();
    let avg_speed_mps = mean(&moving);

    let avg_fare = mean(&trips.iter().map(|t| t.fare).collect::<Vec<_>>());
    let avg_duration = mean(&trips.iter().map(|t| t.duration_min).collect::<Vec<_>>());
    let avg_distance = mean(&trips.iter().map(|t| t.distance_km).collect::<Vec<_>>());

    let surge_count = trips.iter().filter(|t| t.surge_applied).count();
    let surge_percentage = pct(surge_count, trips.len());

    let avg_fare_tenge = avg_fare * TENGE_PER_USD;
    let price_per_km_tenge = if avg_distance > 0.0 {
        avg_fare_tenge / avg_distance
    } else {
        0.0
    };

    out.insert(
        "gps_points_count",
        gps.len() as f64,
        MetricKind::Gps,
        "Number of enriched GPS points",
    );
    out.insert(
        "avg_speed_mps",
        avg_speed_mps,
        MetricKind::Gps,
        "Average speed (m/s) over GPS points with positive speed",
    );
    out.insert(
        "avg_speed_kmh",
        avg_speed_mps * 3.6,
        MetricKind::Calculated,
        "Average moving speed converted to km/h",
    );
    out.insert(
        "taxi_trips_count",
        trips.len() as f64,
        MetricKind::Taxi,
        "Number of enriched taxi trips",
    );
    out.insert(
        "avg_fare_usd",
        avg_fare,
        MetricKind::Taxi,
        "Average trip fare in USD",
    );
    out.insert(
        "avg_fare_tenge",
        avg_fare_tenge,
        MetricKind::Calculated,
        "Average trip fare converted to tenge",
    );
    out.insert(
        "avg_trip_duration_min",
        avg_duration,
        MetricKind::Taxi,
        "Average trip duration in minutes",
    );
    out.insert(
        "avg_distance_km",
        avg_distance,
        MetricKind::Taxi,
        "Average trip distance in km",
    );
    out.insert(
        "surge_percentage",
        surge_percentage,
        MetricKind::Calculated,
        "Share of trips with surge pricing applied",
    );
    out.insert(
        "price_per_km_tenge",
        price_per_km_tenge,
        MetricKind::Calculated,
        "Average fare in tenge per km driven",
    );

    out
}

/// Scans the full enriched corpus from the store and aggregates it.
pub fn compute_aggregates(store: &CsvStore) -> Result<AggregateMetrics> {
    let gps = store.load_gps(None)?;
    let trips = store.load_trips(None)?;
    Ok(aggregate(&gps, &trips))
}

/// Arithmetic mean; 0.0 for empty input.
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Percentage of `part` in `total`; 0.0 when `total` is zero.
fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn gps(speed: f64) -> EnrichedGpsPoint {
        EnrichedGpsPoint {
            id: "p".to_string(),
            latitude: 51.10,
            longitude: 71.43,
            altitude: 350.0,
            speed,
            azimuth: 0.0,
            area_label: Some("Center".to_string()),
            activity_label: Some("Low".to_string()),
            road_type_label: Some("Unknown".to_string()),
            insights: String::new(),
            processed_at: Utc::now(),
        }
    }

    fn trip(fare: f64, duration_min: f64, distance_km: f64, surge: bool) -> EnrichedTripRecord {
        EnrichedTripRecord {
            duration_sec: (duration_min * 60.0) as i64,
            duration_min,
            distance_km,
            speed_kph: 40.0,
            wait_cost: 1.0,
            distance_cost: 4.0,
            fare,
            passenger_count: 1,
            surge_applied: surge,
            trip_length_label: Some("Medium".to_string()),
            price_label: Some("Medium".to_string()),
            time_of_day: None,
            efficiency_score: Some(0.8),
            insights: String::new(),
            processed_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_corpus_degrades_to_zero() {
        let m = aggregate(&[], &[]);

        assert_eq!(m.value("gps_points_count"), Some(0.0));
        assert_eq!(m.value("taxi_trips_count"), Some(0.0));
        assert_eq!(m.value("avg_fare_usd"), Some(0.0));
        assert_eq!(m.value("surge_percentage"), Some(0.0));
        assert_eq!(m.value("price_per_km_tenge"), Some(0.0));
        assert_eq!(m.len(), 10);
    }

    #[test]
    fn test_avg_speed_ignores_stationary_points() {
        let points = vec![gps(0.0), gps(10.0), gps(20.0)];
        let m = aggregate(&points, &[]);

        assert_eq!(m.value("avg_speed_mps"), Some(15.0));
        assert_eq!(m.value("avg_speed_kmh"), Some(54.0));
        assert_eq!(m.value("gps_points_count"), Some(3.0));
    }

    #[test]
    fn test_all_stationary_points_average_zero() {
        let m = aggregate(&[gps(0.0), gps(0.0)], &[]);
        assert_eq!(m.value("avg_speed_mps"), Some(0.0));
    }

    #[test]
    fn test_trip_metrics() {
        let trips = vec![
            trip(10.0, 20.0, 5.0, true),
            trip(20.0, 40.0, 15.0, false),
        ];
        let m = aggregate(&[], &trips);

        assert_eq!(m.value("avg_fare_usd"), Some(15.0));
        assert_eq!(m.value("avg_fare_tenge"), Some(15.0 * TENGE_PER_USD));
        assert_eq!(m.value("avg_trip_duration_min"), Some(30.0));
        assert_eq!(m.value("avg_distance_km"), Some(10.0));
        assert_eq!(m.value("surge_percentage"), Some(50.0));
        assert_eq!(
            m.value("price_per_km_tenge"),
            Some(15.0 * TENGE_PER_USD / 10.0)
        );
    }

    #[test]
    fn test_metric_kinds() {
        let m = aggregate(&[gps(1.0)], &[trip(5.0, 10.0, 2.0, false)]);

        assert_eq!(m.metrics["gps_points_count"].kind, MetricKind::Gps);
        assert_eq!(m.metrics["avg_fare_usd"].kind, MetricKind::Taxi);
        assert_eq!(m.metrics["avg_speed_kmh"].kind, MetricKind::Calculated);
    }
}
