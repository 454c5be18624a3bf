//! Sequential batch driver over the enrichment engine.
//!
//! Batches are contiguous in-order slices; each is fully enriched before the
//! next begins. Progress lives in a caller-owned [`BatchProgress`] that the
//! driver advances once per batch.

use tracing::info;

use crate::enrich::EnrichmentEngine;
use crate::oracle::Oracle;
use crate::records::{EnrichedGpsPoint, EnrichedTripRecord, RawGpsPoint, RawTripRecord};

/// Caller-owned progress state, updated by the driver after each batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
}

impl BatchProgress {
    /// Progress tracker for `record_count` records split into batches of
    /// `batch_size`.
    pub fn for_records(record_count: usize, batch_size: usize) -> Self {
        Self {
            completed: 0,
            total: record_count.div_ceil(batch_size.max(1)),
        }
    }

    pub fn advance(&mut self) {
        self.completed += 1;
    }

    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Enriches GPS points in sequential batches, advancing `progress` after
/// each one.
pub async fn enrich_gps_in_batches<O: Oracle>(
    engine: &EnrichmentEngine<O>,
    records: &[RawGpsPoint],
    batch_size: usize,
    progress: &mut BatchProgress,
) -> Vec<EnrichedGpsPoint> {
    let mut out = Vec::with_capacity(records.len());

    for chunk in records.chunks(batch_size.max(1)) {
        out.extend(engine.enrich_gps(chunk).await);
        progress.advance();
        info!(
            batch = progress.completed,
            total = progress.total,
            records = out.len(),
            "GPS batch enriched"
        );
    }

    out
}

/// Enriches taxi trips in sequential batches, advancing `progress` after
/// each one.
pub async fn enrich_trips_in_batches<O: Oracle>(
    engine: &EnrichmentEngine<O>,
    records: &[RawTripRecord],
    batch_size: usize,
    progress: &mut BatchProgress,
) -> Vec<EnrichedTripRecord> {
    let mut out = Vec::with_capacity(records.len());

    for chunk in records.chunks(batch_size.max(1)) {
        out.extend(engine.enrich_trips(chunk).await);
        progress.advance();
        info!(
            batch = progress.completed,
            total = progress.total,
            records = out.len(),
            "Trip batch enriched"
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingOracle(AtomicUsize);

    #[async_trait]
    impl Oracle for CountingOracle {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok("not json".to_string())
        }
    }

    fn points(n: usize) -> Vec<RawGpsPoint> {
        (0..n)
            .map(|i| RawGpsPoint {
                id: Some(i.to_string()),
                latitude: 51.10,
                longitude: 71.43,
                altitude: 350.0,
                speed: 5.0,
                azimuth: 0.0,
            })
            .collect()
    }

    #[test]
    fn test_batch_count_rounds_up() {
        assert_eq!(BatchProgress::for_records(2500, 1000).total, 3);
        assert_eq!(BatchProgress::for_records(2000, 1000).total, 2);
        assert_eq!(BatchProgress::for_records(1, 1000).total, 1);
        assert_eq!(BatchProgress::for_records(0, 1000).total, 0);
    }

    #[test]
    fn test_fraction_degrades_to_zero() {
        assert_eq!(BatchProgress::for_records(0, 10).fraction(), 0.0);
    }

    #[tokio::test]
    async fn test_driver_processes_all_batches_in_order() {
        let engine = EnrichmentEngine::new(CountingOracle(AtomicUsize::new(0)));
        let records = points(25);
        let mut progress = BatchProgress::for_records(records.len(), 10);

        let enriched = enrich_gps_in_batches(&engine, &records, 10, &mut progress).await;

        assert_eq!(enriched.len(), 25);
        assert_eq!(progress.completed, 3);
        assert_eq!(progress.total, 3);
        assert_eq!(progress.fraction(), 1.0);
        // original order preserved
        assert_eq!(enriched[0].id, "0");
        assert_eq!(enriched[24].id, "24");
    }

    #[tokio::test]
    async fn test_zero_batch_size_is_clamped() {
        let engine = EnrichmentEngine::new(CountingOracle(AtomicUsize::new(0)));
        let records = points(3);
        let mut progress = BatchProgress::for_records(records.len(), 0);

        let enriched = enrich_gps_in_batches(&engine, &records, 0, &mut progress).await;
        assert_eq!(enriched.len(), 3);
        assert_eq!(progress.completed, progress.total);
    }
}
