//! Estimation service and its request/response surface

pub mod service;
pub mod types;
pub mod formatting;

pub use service::LocationEstimationService;
pub use types::{EstimateRequest, LocationEstimate};
pub use formatting::{
    formatter_for, CsvFormatter, EstimateFormatter, JsonFormatter, OutputFormat, TextFormatter,
};
