//! The enrichment engine: oracle-first classification with a deterministic
//! fallback.
//!
//! Every raw record produces exactly one enriched record. An oracle transport
//! failure switches that record (and only that record) to the rule-based
//! labels from [`crate::classify`]; a reply that is not valid JSON keeps the
//! raw text as the insight. Neither case propagates an error.

use chrono::Utc;
use tracing::{debug, error};

use crate::classify;
use crate::oracle::reply::{self, FreeTextReply, GpsReply, Reply, TripReply};
use crate::oracle::Oracle;
use crate::records::{EnrichedGpsPoint, EnrichedTripRecord, RawGpsPoint, RawTripRecord};

/// Per-record classification outcome, chosen explicitly by the engine.
#[derive(Debug)]
pub enum Outcome<T> {
    /// The oracle answered with the expected structured shape.
    Classified(T),
    /// The oracle answered, but with free text instead of structure.
    Unstructured(FreeTextReply),
    /// The oracle call failed; rules supply the labels.
    Fallback(String),
}

pub struct EnrichmentEngine<O> {
    oracle: O,
}

impl<O: Oracle> EnrichmentEngine<O> {
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }

    /// Enriches a batch of GPS points. Output has the same length and order
    /// as the input.
    pub async fn enrich_gps(&self, batch: &[RawGpsPoint]) -> Vec<EnrichedGpsPoint> {
        let mut out = Vec::with_capacity(batch.len());
        for (idx, point) in batch.iter().enumerate() {
            let outcome = self.classify_gps(point, idx).await;
            out.push(merge_gps(point, idx, outcome));
        }
        out
    }

    /// Enriches a batch of taxi trips. Output has the same length and order
    /// as the input.
    pub async fn enrich_trips(&self, batch: &[RawTripRecord]) -> Vec<EnrichedTripRecord> {
        let mut out = Vec::with_capacity(batch.len());
        for (idx, trip) in batch.iter().enumerate() {
            let outcome = self.classify_trip(trip, idx).await;
            out.push(merge_trip(trip, outcome));
        }
        out
    }

    async fn classify_gps(&self, point: &RawGpsPoint, idx: usize) -> Outcome<GpsReply> {
        let prompt = gps_prompt(point, idx);
        match self.oracle.complete(&prompt).await {
            Ok(text) => {
                debug!(idx, bytes = text.len(), "Oracle reply received");
                match reply::parse::<GpsReply>(&text) {
                    Reply::Structured(r) => Outcome::Classified(r),
                    Reply::FreeText(f) => Outcome::Unstructured(f),
                }
            }
            Err(e) => {
                error!(idx, error = %e, "GPS oracle call failed, using rule fallback");
                Outcome::Fallback(e.to_string())
            }
        }
    }

    async fn classify_trip(&self, trip: &RawTripRecord, idx: usize) -> Outcome<TripReply> {
        let prompt = trip_prompt(trip, idx);
        match self.oracle.complete(&prompt).await {
            Ok(text) => {
                debug!(idx, bytes = text.len(), "Oracle reply received");
                match reply::parse::<TripReply>(&text) {
                    Reply::Structured(r) => Outcome::Classified(r),
                    Reply::FreeText(f) => Outcome::Unstructured(f),
                }
            }
            Err(e) => {
                error!(idx, error = %e, "Trip oracle call failed, using rule fallback");
                Outcome::Fallback(e.to_string())
            }
        }
    }
}

fn gps_prompt(point: &RawGpsPoint, idx: usize) -> String {
    let context = format!("GPS point {} of batch, speed: {:.2} m/s", idx, point.speed);
    format!(
        "Analyze this GPS data point and provide insights:\n\
         Latitude: {}\n\
         Longitude: {}\n\
         Altitude: {}\n\
         Speed: {} m/s\n\
         Azimuth: {}\n\
         Context: {}\n\n\
         Please provide:\n\
         1. Area classification (North/Center/South based on latitude)\n\
         2. Activity level (High/Medium/Low based on speed and context)\n\
         3. Road type prediction (Highway/Street/Residential)\n\
         4. Any interesting patterns or insights\n\n\
         Return as JSON with keys: area_classification, activity_level, road_type, insights",
        point.latitude, point.longitude, point.altitude, point.speed, point.azimuth, context
    )
}

fn trip_prompt(trip: &RawTripRecord, idx: usize) -> String {
    let context = format!(
        "Taxi trip {} of batch, {} passengers",
        idx, trip.passenger_count
    );
    format!(
        "Analyze this taxi trip data and provide insights:\n\
         Duration: {} minutes\n\
         Distance: {} km\n\
         Speed: {} km/h\n\
         Fare: {} USD\n\
         Passengers: {}\n\
         Surge pricing: {}\n\
         Context: {}\n\n\
         Please provide:\n\
         1. Trip category (Short/Medium/Long based on duration and distance)\n\
         2. Price category (Low/Medium/High/Premium based on fare per km)\n\
         3. Time efficiency score (0-1 based on speed and duration)\n\
         4. Any interesting patterns or insights\n\n\
         Return as JSON with keys: trip_category, price_category, efficiency_score, insights",
        trip.duration_min,
        trip.distance_km,
        trip.speed_kph,
        trip.fare,
        trip.passenger_count,
        trip.surge_applied,
        context
    )
}

/// Merges a classification outcome with the original GPS fields.
fn merge_gps(point: &RawGpsPoint, idx: usize, outcome: Outcome<GpsReply>) -> EnrichedGpsPoint {
    let id = point.id.clone().unwrap_or_else(|| idx.to_string());

    let (area, activity, road, insights, processed_at) = match outcome {
        Outcome::Classified(r) => (
            Some(r.area_classification),
            Some(r.activity_level),
            r.road_type,
            reply::insight_text(&r.insights),
            Utc::now(),
        ),
        Outcome::Unstructured(f) => (None, None, None, f.insights, f.processed_at),
        Outcome::Fallback(reason) => (
            Some(classify::area(point.latitude).as_str().to_string()),
            Some(classify::activity(point.speed).as_str().to_string()),
            Some(classify::ROAD_TYPE_UNKNOWN.to_string()),
            format!("Error processing: {reason}"),
            Utc::now(),
        ),
    };

    EnrichedGpsPoint {
        id,
        latitude: point.latitude,
        longitude: point.longitude,
        altitude: point.altitude,
        speed: point.speed,
        azimuth: point.azimuth,
        area_label: area,
        activity_label: activity,
        road_type_label: road,
        insights,
        processed_at,
    }
}

/// Merges a classification outcome with the original trip fields.
fn merge_trip(trip: &RawTripRecord, outcome: Outcome<TripReply>) -> EnrichedTripRecord {
    let (length, price, efficiency, insights, processed_at) = match outcome {
        Outcome::Classified(r) => (
            Some(r.trip_category),
            Some(r.price_category),
            r.efficiency_score,
            reply::insight_text(&r.insights),
            Utc::now(),
        ),
        Outcome::Unstructured(f) => (None, None, None, f.insights, f.processed_at),
        Outcome::Fallback(reason) => (
            Some(classify::trip_length(trip.duration_min).as_str().to_string()),
            Some(
                classify::price_tier(trip.fare, trip.distance_km)
                    .as_str()
                    .to_string(),
            ),
            Some(classify::efficiency(trip.speed_kph, trip.duration_min)),
            format!("Error processing: {reason}"),
            Utc::now(),
        ),
    };

    EnrichedTripRecord {
        duration_sec: trip.duration_sec,
        duration_min: trip.duration_min,
        distance_km: trip.distance_km,
        speed_kph: trip.speed_kph,
        wait_cost: trip.wait_cost,
        distance_cost: trip.distance_cost,
        fare: trip.fare,
        passenger_count: trip.passenger_count,
        surge_applied: trip.surge_applied,
        trip_length_label: length,
        price_label: price,
        time_of_day: None,
        efficiency_score: efficiency,
        insights,
        processed_at,
    }
}
