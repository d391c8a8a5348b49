//! Location estimation entry point
//!
//! Validates the observation set, routes it to the estimator matching the
//! number of usable observations and, when a self-reported position is
//! supplied, scores the divergence. Stateless: one service may be shared
//! across threads.

use crate::algorithms::geodesic;
use crate::algorithms::path_loss::DistanceModel;
use crate::algorithms::spoofing::SpoofingScorer;
use crate::algorithms::trilateration::MultiAnchorTrilaterator;
use crate::algorithms::{single_anchor, two_anchor};
use crate::api::types::{EstimateRequest, LocationEstimate};
use crate::core::{EstimationResult, GeoPoint, Observation, ValidObservation};
use crate::utils::config::EngineConfig;
use crate::validation::data::{FilterOutcome, ObservationValidator};
use crate::validation::error::{EngineResult, EstimationError};

#[derive(Debug, Clone)]
pub struct LocationEstimationService {
    config: EngineConfig,
    model: DistanceModel,
    validator: ObservationValidator,
    scorer: SpoofingScorer,
}

impl LocationEstimationService {
    /// Build a service, rejecting invalid configuration up front.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.ensure_valid()?;
        Ok(Self::assemble(config))
    }

    fn assemble(config: EngineConfig) -> Self {
        Self {
            model: DistanceModel::from_config(&config.path_loss),
            validator: ObservationValidator::new(config.missing_signal),
            scorer: SpoofingScorer::new(config.spoofing.clone()),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn distance_model(&self) -> &DistanceModel {
        &self.model
    }

    /// Estimate a position from raw observations, without spoofing analysis.
    pub fn estimate_position(&self, observations: &[Observation]) -> EngineResult<EstimationResult> {
        let outcome = self.usable_observations(observations)?;
        Ok(self.route(&outcome.valid))
    }

    /// Full estimation call.
    pub fn estimate(&self, request: &EstimateRequest) -> EngineResult<LocationEstimate> {
        self.estimate_with_reference(&request.observations, request.reference)
    }

    pub fn estimate_with_reference(
        &self,
        observations: &[Observation],
        reference: Option<GeoPoint>,
    ) -> EngineResult<LocationEstimate> {
        let outcome = self.usable_observations(observations)?;
        let estimate = self.route(&outcome.valid);
        let error_meters = reference.map(|r| geodesic::distance_between(&r, &estimate.position));
        let spoofing = self
            .scorer
            .assess(error_meters, estimate.confidence_radius_m, outcome.valid.len());

        Ok(LocationEstimate {
            estimate,
            reference,
            error_meters,
            spoofing,
            anchors_used: outcome.valid.len(),
            anchors_dropped: outcome.rejected.len(),
        })
    }

    /// Filter the raw observations; fails when none survive.
    fn usable_observations(&self, observations: &[Observation]) -> EngineResult<FilterOutcome> {
        let outcome = self.validator.filter(observations);
        if outcome.valid.is_empty() {
            return Err(EstimationError::InsufficientData {
                supplied: outcome.supplied(),
                dropped: outcome.rejected.len(),
            });
        }
        Ok(outcome)
    }

    fn route(&self, observations: &[ValidObservation]) -> EstimationResult {
        log::debug!("estimating from {} observation(s)", observations.len());
        match observations {
            [single] => single_anchor::estimate(single, &self.model),
            [first, second] => two_anchor::estimate(first, second, &self.model, &self.config.two_anchor),
            _ => MultiAnchorTrilaterator::new(&self.model, &self.config.solver).estimate(observations),
        }
    }
}

impl Default for LocationEstimationService {
    fn default() -> Self {
        Self::assemble(EngineConfig::default())
    }
}
