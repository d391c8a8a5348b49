//! Core data types for the geolocation engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Point in geodetic coordinates (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// True when both coordinates are finite and inside the geodetic ranges.
    pub fn is_in_range(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// One anchor's report of the target at a given moment.
///
/// Anchor coordinates are optional on the wire; an observation without a
/// usable position is dropped before estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub anchor_id: String,
    #[serde(default)]
    pub anchor_lat: Option<f64>,
    #[serde(default)]
    pub anchor_lon: Option<f64>,
    /// Received signal strength (dBm)
    #[serde(default)]
    pub rssi_dbm: Option<f64>,
    /// Carrier frequency (MHz), informational only
    #[serde(default)]
    pub frequency_mhz: Option<f64>,
}

impl Observation {
    pub fn new(anchor_id: impl Into<String>, lat: f64, lon: f64, rssi_dbm: Option<f64>) -> Self {
        Self {
            anchor_id: anchor_id.into(),
            anchor_lat: Some(lat),
            anchor_lon: Some(lon),
            rssi_dbm,
            frequency_mhz: None,
        }
    }

    pub fn with_frequency(mut self, frequency_mhz: f64) -> Self {
        self.frequency_mhz = Some(frequency_mhz);
        self
    }

    /// Anchor position if both coordinates are present.
    pub fn anchor_position(&self) -> Option<GeoPoint> {
        match (self.anchor_lat, self.anchor_lon) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        }
    }
}

/// Observation that survived validation: position and signal are resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidObservation {
    pub anchor_id: String,
    pub position: GeoPoint,
    pub rssi_dbm: f64,
}

/// Which estimator produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationMethod {
    SingleAnchor,
    TwoAnchorMidpoint,
    TwoAnchorWeighted,
    TwoAnchorIntersection,
    Trilateration,
}

impl EstimationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstimationMethod::SingleAnchor => "single_anchor",
            EstimationMethod::TwoAnchorMidpoint => "two_anchor_midpoint",
            EstimationMethod::TwoAnchorWeighted => "two_anchor_weighted",
            EstimationMethod::TwoAnchorIntersection => "two_anchor_intersection",
            EstimationMethod::Trilateration => "trilateration",
        }
    }
}

impl fmt::Display for EstimationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estimated target distance from one anchor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorDistance {
    pub anchor_id: String,
    pub distance_m: f64,
}

/// Output of an estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimationResult {
    pub position: GeoPoint,
    pub confidence_radius_m: f64,
    pub method: EstimationMethod,
    pub estimated_distances: Vec<AnchorDistance>,
    /// Mean |distance residual| after solving, trilateration only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_residual_error_m: Option<f64>,
    /// Anchor baseline length, two-anchor estimates only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_separation_m: Option<f64>,
}

/// Spoofing verdict. All fields are `None` when no opinion could be formed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpoofingAssessment {
    pub score: Option<f64>,
    pub suspected: Option<bool>,
    pub reason: Option<String>,
}

impl SpoofingAssessment {
    pub fn no_opinion() -> Self {
        Self::default()
    }

    pub fn has_opinion(&self) -> bool {
        self.score.is_some()
    }
}
