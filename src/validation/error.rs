use thiserror::Error;

use crate::utils::config::ConfigError;

/// Result type for estimation operations
pub type EngineResult<T> = Result<T, EstimationError>;

/// Errors surfaced by the estimation engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimationError {
    /// No observation survived validation
    #[error("insufficient data: {supplied} observation(s) supplied, {dropped} dropped, none usable")]
    InsufficientData { supplied: usize, dropped: usize },

    /// Engine configuration rejected before running
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl EstimationError {
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, EstimationError::InsufficientData { .. })
    }
}
