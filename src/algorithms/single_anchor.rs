//! Degenerate case: exactly one usable observation

use crate::algorithms::path_loss::DistanceModel;
use crate::core::{AnchorDistance, EstimationMethod, EstimationResult, ValidObservation};

/// The target is somewhere within the modelled distance of the only anchor.
pub fn estimate(observation: &ValidObservation, model: &DistanceModel) -> EstimationResult {
    let distance_m = model.rssi_to_distance(Some(observation.rssi_dbm));

    EstimationResult {
        position: observation.position,
        confidence_radius_m: distance_m,
        method: EstimationMethod::SingleAnchor,
        estimated_distances: vec![AnchorDistance {
            anchor_id: observation.anchor_id.clone(),
            distance_m,
        }],
        mean_residual_error_m: None,
        anchor_separation_m: None,
    }
}
