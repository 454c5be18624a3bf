//! Deterministic classification rules.
//!
//! These are the fallback labels used when the oracle is unavailable. Pure
//! functions, total over their domains.

use std::fmt;

/// Road type has no deterministic rule; the fallback is always this literal.
pub const ROAD_TYPE_UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Area {
    North,
    Center,
    South,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripLength {
    Short,
    Medium,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceTier {
    Low,
    Medium,
    High,
    Premium,
    Unknown,
}

impl Area {
    pub fn as_str(self) -> &'static str {
        match self {
            Area::North => "North",
            Area::Center => "Center",
            Area::South => "South",
        }
    }
}

impl Activity {
    pub fn as_str(self) -> &'static str {
        match self {
            Activity::High => "High",
            Activity::Medium => "Medium",
            Activity::Low => "Low",
        }
    }
}

impl TripLength {
    pub fn as_str(self) -> &'static str {
        match self {
            TripLength::Short => "Short",
            TripLength::Medium => "Medium",
            TripLength::Long => "Long",
        }
    }
}

impl PriceTier {
    pub fn as_str(self) -> &'static str {
        match self {
            PriceTier::Low => "Low",
            PriceTier::Medium => "Medium",
            PriceTier::High => "High",
            PriceTier::Premium => "Premium",
            PriceTier::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TripLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a latitude into a city area. Exact boundary values fall into
/// `Center` because the comparisons are strict.
pub fn area(latitude: f64) -> Area {
    if latitude > 51.12 {
        Area::North
    } else if latitude < 51.08 {
        Area::South
    } else {
        Area::Center
    }
}

/// Classifies activity from speed in metres per second.
pub fn activity(speed_mps: f64) -> Activity {
    if speed_mps > 10.0 {
        Activity::High
    } else if speed_mps > 3.0 {
        Activity::Medium
    } else {
        Activity::Low
    }
}

/// Classifies a trip by its duration in minutes.
pub fn trip_length(duration_min: f64) -> TripLength {
    if duration_min < 10.0 {
        TripLength::Short
    } else if duration_min < 30.0 {
        TripLength::Medium
    } else {
        TripLength::Long
    }
}

/// Classifies fare-per-km into a price tier. A non-positive distance makes
/// the rate undefined, so the tier is `Unknown`.
pub fn price_tier(fare: f64, distance_km: f64) -> PriceTier {
    if distance_km <= 0.0 {
        return PriceTier::Unknown;
    }
    let rate = fare / distance_km;
    if rate < 2.0 {
        PriceTier::Low
    } else if rate < 5.0 {
        PriceTier::Medium
    } else if rate < 10.0 {
        PriceTier::High
    } else {
        PriceTier::Premium
    }
}

/// Trip efficiency in `[0, 1]`: half from how close the average speed is to
/// 60 km/h, half from how far the duration stays under the 15–45 min window.
pub fn efficiency(speed_kph: f64, duration_min: f64) -> f64 {
    let speed_score = (speed_kph / 60.0).min(1.0);
    let duration_score = (1.0 - (duration_min - 15.0) / 30.0).max(0.0);
    ((speed_score + duration_score) / 2.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_partitions() {
        assert_eq!(area(51.20), Area::North);
        assert_eq!(area(51.121), Area::North);
        assert_eq!(area(51.10), Area::Center);
        assert_eq!(area(51.05), Area::South);
        assert_eq!(area(-10.0), Area::South);
    }

    #[test]
    fn test_area_boundary_ties_go_to_center() {
        assert_eq!(area(51.12), Area::Center);
        assert_eq!(area(51.08), Area::Center);
    }

    #[test]
    fn test_activity_thresholds() {
        assert_eq!(activity(15.0), Activity::High);
        assert_eq!(activity(10.0), Activity::Medium);
        assert_eq!(activity(3.0), Activity::Low);
        assert_eq!(activity(0.0), Activity::Low);
        assert_eq!(activity(-1.0), Activity::Low);
    }

    #[test]
    fn test_trip_length_thresholds() {
        assert_eq!(trip_length(5.0), TripLength::Short);
        assert_eq!(trip_length(10.0), TripLength::Medium);
        assert_eq!(trip_length(29.9), TripLength::Medium);
        assert_eq!(trip_length(30.0), TripLength::Long);
    }

    #[test]
    fn test_price_tier_zero_distance_is_unknown() {
        assert_eq!(price_tier(10.0, 0.0), PriceTier::Unknown);
        assert_eq!(price_tier(10.0, -1.0), PriceTier::Unknown);
    }

    #[test]
    fn test_price_tier_rate_boundaries() {
        // rate of exactly 2.0 is not < 2, so it lands in Medium
        assert_eq!(price_tier(4.0, 2.0), PriceTier::Medium);
        assert_eq!(price_tier(1.9, 1.0), PriceTier::Low);
        assert_eq!(price_tier(5.0, 1.0), PriceTier::High);
        assert_eq!(price_tier(10.0, 1.0), PriceTier::Premium);
    }

    #[test]
    fn test_efficiency_in_unit_interval() {
        for (kph, min) in [
            (0.0, 0.0),
            (60.0, 15.0),
            (120.0, 5.0),
            (-20.0, 500.0),
            (30.0, 45.0),
        ] {
            let e = efficiency(kph, min);
            assert!((0.0..=1.0).contains(&e), "efficiency({kph}, {min}) = {e}");
        }
    }

    #[test]
    fn test_efficiency_ideal_trip() {
        // 60 km/h for 15 minutes scores both halves at 1.0
        assert_eq!(efficiency(60.0, 15.0), 1.0);
    }
}
