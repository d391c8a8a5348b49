//! Request and response types for the estimation service

use serde::{Deserialize, Serialize};

use crate::core::{EstimationResult, GeoPoint, Observation, SpoofingAssessment};

/// One estimation call: the observation set plus an optional self-reported
/// position of the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub observations: Vec<Observation>,
    #[serde(default)]
    pub reference: Option<GeoPoint>,
}

impl EstimateRequest {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations, reference: None }
    }

    pub fn with_reference(mut self, reference: GeoPoint) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Composite result of one estimation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationEstimate {
    pub estimate: EstimationResult,
    /// Self-reported position the estimate was compared against
    pub reference: Option<GeoPoint>,
    /// Haversine distance reference -> estimate (m)
    pub error_meters: Option<f64>,
    pub spoofing: SpoofingAssessment,
    /// Observations that took part after validation
    pub anchors_used: usize,
    /// Observations dropped by validation
    pub anchors_dropped: usize,
}

impl LocationEstimate {
    pub fn is_spoofing_suspected(&self) -> bool {
        self.spoofing.suspected.unwrap_or(false)
    }
}
