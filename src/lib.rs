//! RF Geolocation Engine
//!
//! Estimates the position of a transmitter from signal-strength reports of
//! fixed receivers ("anchors") and scores how far a self-reported position
//! strays from that estimate.

pub mod core;
pub mod algorithms;
pub mod validation;
pub mod utils;
pub mod api;

// Re-export commonly used types
pub use crate::core::{
    AnchorDistance, EstimationMethod, EstimationResult, GeoPoint, Observation, SpoofingAssessment,
};
pub use algorithms::{DistanceModel, MultiAnchorTrilaterator, SpoofingScorer};
pub use validation::{EngineResult, EstimationError};
pub use utils::config::{
    ConfigError, EngineConfig, MissingSignalPolicy, PathLossConfig, SolverConfig, SpoofingConfig,
    TwoAnchorConfig, TwoAnchorStrategy,
};
pub use api::{
    EstimateRequest, LocationEstimate, LocationEstimationService, OutputFormat,
};
