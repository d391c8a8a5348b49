//! Observation validation and error types

pub mod data;
pub mod error;

pub use data::{FilterOutcome, ObservationValidator, RejectionReason};
pub use error::{EngineResult, EstimationError};
