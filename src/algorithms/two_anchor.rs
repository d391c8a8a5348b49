//! Two-observation fix
//!
//! Two ranges cannot pin down a unique point: the target could sit on either
//! side of the anchor baseline. The default estimate is an inverse-distance
//! weighted centroid of the two anchors, which always lies on the baseline.
//! The circle-intersection strategy places the fix on one of the two range
//! circle crossings instead.

use nalgebra::Vector2;

use crate::algorithms::geodesic;
use crate::algorithms::path_loss::DistanceModel;
use crate::core::{AnchorDistance, EstimationMethod, EstimationResult, GeoPoint, ValidObservation};
use crate::utils::config::{TwoAnchorConfig, TwoAnchorStrategy};

/// Candidates closer together than this are treated as equidistant (m)
const TIE_TOLERANCE_M: f64 = 1e-6;

pub fn estimate(
    first: &ValidObservation,
    second: &ValidObservation,
    model: &DistanceModel,
    config: &TwoAnchorConfig,
) -> EstimationResult {
    let d1 = model.rssi_to_distance(Some(first.rssi_dbm));
    let d2 = model.rssi_to_distance(Some(second.rssi_dbm));
    let p1 = first.position;
    let p2 = second.position;

    let separation = geodesic::distance_between(&p1, &p2);
    let estimated_distances = vec![
        AnchorDistance { anchor_id: first.anchor_id.clone(), distance_m: d1 },
        AnchorDistance { anchor_id: second.anchor_id.clone(), distance_m: d2 },
    ];

    if separation < config.min_separation_m {
        log::debug!(
            "anchors {} and {} are {:.1} m apart, using midpoint",
            first.anchor_id, second.anchor_id, separation
        );
        return EstimationResult {
            position: GeoPoint::new((p1.lat + p2.lat) / 2.0, (p1.lon + p2.lon) / 2.0),
            confidence_radius_m: d1.max(d2),
            method: EstimationMethod::TwoAnchorMidpoint,
            estimated_distances,
            mean_residual_error_m: None,
            anchor_separation_m: Some(separation),
        };
    }

    let w1 = 1.0 / (d1 + 1.0);
    let w2 = 1.0 / (d2 + 1.0);
    let total = w1 + w2;
    let centroid = GeoPoint::new(
        (p1.lat * w1 + p2.lat * w2) / total,
        (p1.lon * w1 + p2.lon * w2) / total,
    );

    // Lower bound wins when the baseline is shorter than twice the floor
    let confidence_radius_m = ((d1 + d2) / 2.0 * 0.5)
        .min(separation / 2.0)
        .max(config.min_radius_m);

    let (position, method) = match config.strategy {
        TwoAnchorStrategy::WeightedCentroid => (centroid, EstimationMethod::TwoAnchorWeighted),
        TwoAnchorStrategy::CircleIntersection => match intersect(&p1, d1, &p2, d2, &centroid) {
            Some(point) => (point, EstimationMethod::TwoAnchorIntersection),
            None => {
                log::debug!(
                    "range circles of {} and {} do not cross, keeping weighted centroid",
                    first.anchor_id, second.anchor_id
                );
                (centroid, EstimationMethod::TwoAnchorWeighted)
            }
        },
    };

    EstimationResult {
        position,
        confidence_radius_m,
        method,
        estimated_distances,
        mean_residual_error_m: None,
        anchor_separation_m: Some(separation),
    }
}

/// Crossing of the two range circles nearest `hint`, on the local plane
/// anchored at `p1`. Mirror-image candidates tie; the one to the left of
/// the `p1 -> p2` baseline is taken.
fn intersect(p1: &GeoPoint, r1: f64, p2: &GeoPoint, r2: f64, hint: &GeoPoint) -> Option<GeoPoint> {
    let b = geodesic::to_local(p2, p1);
    let d = b.norm();
    if d <= f64::EPSILON || d > r1 + r2 || d < (r1 - r2).abs() {
        return None;
    }

    let a = (r1 * r1 - r2 * r2 + d * d) / (2.0 * d);
    let h = (r1 * r1 - a * a).max(0.0).sqrt();
    let unit = b / d;
    let base = unit * a;
    let perp = Vector2::new(-unit.y, unit.x);

    let left = base + perp * h;
    let right = base - perp * h;
    let target = geodesic::to_local(hint, p1);

    let chosen = if (right - target).norm() + TIE_TOLERANCE_M < (left - target).norm() {
        right
    } else {
        left
    };
    Some(geodesic::from_local(&chosen, p1))
}
