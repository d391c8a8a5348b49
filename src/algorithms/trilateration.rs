//! Iterative trilateration for three or more observations
//!
//! Minimises `sum((current_distance_i - d_i)^2)` by fixed-budget gradient
//! descent directly in (lat, lon). Offsets are scaled to meters with flat
//! mid-latitude factors, stepped, and scaled back to degrees. The gradient
//! is averaged over the anchors so the step size does not grow with the
//! anchor count. The loop always runs its full iteration budget.

use nalgebra::{Matrix2, Vector2};

use crate::algorithms::geodesic;
use crate::algorithms::path_loss::DistanceModel;
use crate::core::{AnchorDistance, EstimationMethod, EstimationResult, GeoPoint, ValidObservation};
use crate::utils::config::SolverConfig;

/// Guard on the live distance used as a gradient divisor (m)
const MIN_GRADIENT_DISTANCE_M: f64 = 1.0;

/// Anchor spread (m) below which the fix is essentially a single-anchor one
const COLOCATED_SPREAD_M: f64 = 10.0;

/// Ratio of minor to major anchor spread below which geometry is flagged
const COLLINEAR_RATIO: f64 = 0.01;

struct RangedAnchor<'a> {
    id: &'a str,
    /// (lat, lon) in degrees
    coords: Vector2<f64>,
    distance_m: f64,
}

/// Solves for the target position from three or more ranged anchors.
pub struct MultiAnchorTrilaterator<'a> {
    model: &'a DistanceModel,
    config: &'a SolverConfig,
}

impl<'a> MultiAnchorTrilaterator<'a> {
    pub fn new(model: &'a DistanceModel, config: &'a SolverConfig) -> Self {
        Self { model, config }
    }

    pub fn estimate(&self, observations: &[ValidObservation]) -> EstimationResult {
        let anchors: Vec<RangedAnchor<'_>> = observations
            .iter()
            .map(|obs| RangedAnchor {
                id: &obs.anchor_id,
                coords: Vector2::new(obs.position.lat, obs.position.lon),
                distance_m: self.model.rssi_to_distance(Some(obs.rssi_dbm)),
            })
            .collect();

        check_geometry(observations);

        let initial = weighted_centroid(&anchors);
        let solution = self.refine(initial, &anchors);

        let residual_sum: f64 = anchors
            .iter()
            .map(|anchor| (distance_to(&solution, &anchor.coords) - anchor.distance_m).abs())
            .sum();
        let n = anchors.len() as f64;
        let mean_residual = residual_sum / n;

        let confidence_radius_m = (mean_residual * (2.0 / n) + self.config.base_radius_m)
            .clamp(self.config.min_radius_m, self.config.max_radius_m);

        log::debug!(
            "trilateration over {} anchors: ({:.6}, {:.6}), mean residual {:.1} m, radius {:.1} m",
            anchors.len(),
            solution.x,
            solution.y,
            mean_residual,
            confidence_radius_m
        );

        EstimationResult {
            position: GeoPoint::new(solution.x, solution.y),
            confidence_radius_m,
            method: EstimationMethod::Trilateration,
            estimated_distances: anchors
                .iter()
                .map(|anchor| AnchorDistance {
                    anchor_id: anchor.id.to_string(),
                    distance_m: anchor.distance_m,
                })
                .collect(),
            mean_residual_error_m: Some(mean_residual),
            anchor_separation_m: None,
        }
    }

    fn refine(&self, initial: Vector2<f64>, anchors: &[RangedAnchor<'_>]) -> Vector2<f64> {
        let scale = Vector2::new(self.config.meters_per_deg_lat, self.config.meters_per_deg_lon);
        let mut estimate = initial;
        let mut learning_rate = self.config.learning_rate;
        let n = anchors.len() as f64;

        for iteration in 0..self.config.iterations {
            let mut gradient = Vector2::<f64>::zeros();
            for anchor in anchors {
                let current = distance_to(&estimate, &anchor.coords).max(MIN_GRADIENT_DISTANCE_M);
                let error = current - anchor.distance_m;
                let offset_m = (anchor.coords - estimate).component_mul(&scale);
                gradient += offset_m * (error / current);
            }

            let step = gradient * (learning_rate / n);
            estimate += step.component_div(&scale);

            if iteration % 50 == 0 {
                log::trace!(
                    "iteration {}: ({:.7}, {:.7}) step {:.3} m, lr {:.4}",
                    iteration,
                    estimate.x,
                    estimate.y,
                    step.norm(),
                    learning_rate
                );
            }

            if iteration > self.config.decay_after {
                learning_rate *= self.config.decay_factor;
            }
        }

        estimate
    }
}

/// Inverse-distance weighted centroid, `w_i = 1 / (d_i + 1)`
fn weighted_centroid(anchors: &[RangedAnchor<'_>]) -> Vector2<f64> {
    let (sum, total_weight) = anchors.iter().fold((Vector2::<f64>::zeros(), 0.0), |(sum, total), anchor| {
        let weight = 1.0 / (anchor.distance_m + 1.0);
        (sum + anchor.coords * weight, total + weight)
    });
    sum / total_weight
}

fn distance_to(estimate: &Vector2<f64>, coords: &Vector2<f64>) -> f64 {
    geodesic::distance(estimate.x, estimate.y, coords.x, coords.y)
}

/// Warn when the anchor layout cannot constrain a 2D fix well.
fn check_geometry(observations: &[ValidObservation]) {
    let Some(reference) = observations.first().map(|obs| obs.position) else {
        return;
    };
    let points: Vec<Vector2<f64>> = observations
        .iter()
        .map(|obs| geodesic::to_local(&obs.position, &reference))
        .collect();

    let n = points.len() as f64;
    let mean = points.iter().fold(Vector2::<f64>::zeros(), |acc, p| acc + p) / n;
    let scatter = points.iter().fold(Matrix2::<f64>::zeros(), |acc, p| {
        let d = p - mean;
        acc + d * d.transpose()
    }) / n;

    let eigen = scatter.symmetric_eigen();
    let major = eigen.eigenvalues.max().max(0.0).sqrt();
    let minor = eigen.eigenvalues.min().max(0.0).sqrt();

    if major < COLOCATED_SPREAD_M {
        log::warn!(
            "{} anchors span only {:.1} m; estimate is little better than a single-anchor fix",
            observations.len(),
            major
        );
    } else if minor < COLLINEAR_RATIO * major {
        log::warn!(
            "anchors are nearly collinear (spread {:.1} m x {:.1} m); estimate may be mirrored across the anchor line",
            major,
            minor
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_around(center: &GeoPoint, half_side_m: f64) -> Vec<GeoPoint> {
        [(1.0, 1.0), (-1.0, 1.0), (1.0, -1.0), (-1.0, -1.0)]
            .iter()
            .map(|(e, n)| geodesic::from_local(&Vector2::new(e * half_side_m, n * half_side_m), center))
            .collect()
    }

    fn ranged_observations(anchors: &[GeoPoint], target: &GeoPoint, model: &DistanceModel) -> Vec<ValidObservation> {
        anchors
            .iter()
            .enumerate()
            .map(|(i, position)| ValidObservation {
                anchor_id: format!("kit-{}", i + 1),
                position: *position,
                rssi_dbm: model.distance_to_rssi(geodesic::distance_between(position, target)),
            })
            .collect()
    }

    #[test]
    fn test_converges_at_square_center() {
        let model = DistanceModel::default();
        let config = SolverConfig::default();
        let truth = GeoPoint::new(34.05, -118.24);
        let anchors = square_around(&truth, 250.0);
        let observations = ranged_observations(&anchors, &truth, &model);

        let result = MultiAnchorTrilaterator::new(&model, &config).estimate(&observations);

        assert_eq!(result.method, EstimationMethod::Trilateration);
        assert!(geodesic::distance_between(&result.position, &truth) < 10.0);
        assert!(result.mean_residual_error_m.unwrap() < 1.0);
        assert!(result.confidence_radius_m >= 50.0 && result.confidence_radius_m < 51.0);
        assert_eq!(result.estimated_distances.len(), 4);
        assert_eq!(result.estimated_distances[2].anchor_id, "kit-3");
    }

    #[test]
    fn test_converges_off_center() {
        let model = DistanceModel::default();
        let config = SolverConfig::default();
        let center = GeoPoint::new(34.05, -118.24);
        let truth = geodesic::from_local(&Vector2::new(60.0, -40.0), &center);
        let anchors = square_around(&center, 250.0);
        let observations = ranged_observations(&anchors, &truth, &model);

        let result = MultiAnchorTrilaterator::new(&model, &config).estimate(&observations);

        assert!(geodesic::distance_between(&result.position, &truth) < 10.0);
        assert!(result.mean_residual_error_m.unwrap() < 1.0);
    }

    fn ring_around(center: &GeoPoint, radius_m: f64, count: usize) -> Vec<GeoPoint> {
        (0..count)
            .map(|k| {
                let bearing = 2.0 * std::f64::consts::PI * k as f64 / count as f64;
                geodesic::from_local(&Vector2::new(radius_m * bearing.cos(), radius_m * bearing.sin()), center)
            })
            .collect()
    }

    #[test]
    fn test_twelve_anchor_ring_stays_stable() {
        let model = DistanceModel::default();
        let config = SolverConfig::default();
        let center = GeoPoint::new(34.05, -118.24);
        let truth = geodesic::from_local(&Vector2::new(60.0, -40.0), &center);
        let observations = ranged_observations(&ring_around(&center, 300.0, 12), &truth, &model);

        let result = MultiAnchorTrilaterator::new(&model, &config).estimate(&observations);

        assert!(geodesic::distance_between(&result.position, &truth) < 10.0);
        assert!(result.mean_residual_error_m.unwrap() < 1.0);
        assert!(result.confidence_radius_m < 51.0);
    }

    #[test]
    fn test_clustered_anchors_far_target() {
        let model = DistanceModel::default();
        let config = SolverConfig::default();
        let center = GeoPoint::new(34.05, -118.24);
        let truth = geodesic::from_local(&Vector2::new(1500.0, 0.0), &center);
        let observations = ranged_observations(&ring_around(&center, 75.0, 6), &truth, &model);

        let result = MultiAnchorTrilaterator::new(&model, &config).estimate(&observations);

        assert!(geodesic::distance_between(&result.position, &truth) < 10.0);
        assert!(result.mean_residual_error_m.unwrap() < 1.0);
    }

    #[test]
    fn test_three_anchors() {
        let model = DistanceModel::new(0.0, 3.0);
        let config = SolverConfig::default();
        let origin = GeoPoint::new(51.5, -0.12);
        let anchors = vec![
            geodesic::from_local(&Vector2::new(0.0, 0.0), &origin),
            geodesic::from_local(&Vector2::new(600.0, 0.0), &origin),
            geodesic::from_local(&Vector2::new(300.0, 500.0), &origin),
        ];
        let truth = geodesic::from_local(&Vector2::new(280.0, 200.0), &origin);
        let observations = ranged_observations(&anchors, &truth, &model);

        let result = MultiAnchorTrilaterator::new(&model, &config).estimate(&observations);

        assert!(geodesic::distance_between(&result.position, &truth) < 10.0);
        assert!(result.confidence_radius_m <= 2000.0);
    }

    #[test]
    fn test_inconsistent_ranges_widen_radius() {
        let model = DistanceModel::default();
        let config = SolverConfig::default();
        let truth = GeoPoint::new(34.05, -118.24);
        let anchors = square_around(&truth, 250.0);
        // Every anchor claims the target is 3 km away
        let observations: Vec<ValidObservation> = anchors
            .iter()
            .enumerate()
            .map(|(i, position)| ValidObservation {
                anchor_id: format!("kit-{}", i + 1),
                position: *position,
                rssi_dbm: model.distance_to_rssi(3000.0),
            })
            .collect();

        let result = MultiAnchorTrilaterator::new(&model, &config).estimate(&observations);
        let residual = result.mean_residual_error_m.unwrap();

        assert!(residual > 100.0);
        assert!(result.confidence_radius_m > 50.0);
        assert!(result.confidence_radius_m <= 2000.0);
        assert!(result.position.lat.is_finite() && result.position.lon.is_finite());
    }

    #[test]
    fn test_deterministic() {
        let model = DistanceModel::default();
        let config = SolverConfig::default();
        let center = GeoPoint::new(34.05, -118.24);
        let anchors = square_around(&center, 400.0);
        let observations: Vec<ValidObservation> = anchors
            .iter()
            .zip([-65.0, -72.0, -70.0, -75.0])
            .enumerate()
            .map(|(i, (position, rssi))| ValidObservation {
                anchor_id: format!("kit-{}", i + 1),
                position: *position,
                rssi_dbm: rssi,
            })
            .collect();

        let trilaterator = MultiAnchorTrilaterator::new(&model, &config);
        let first = trilaterator.estimate(&observations);
        let second = trilaterator.estimate(&observations);
        assert_eq!(first, second);
    }
}
