//! Spoofing score: how far a self-reported position strays from the
//! signal-based estimate, relative to the estimate's own uncertainty.

use crate::core::SpoofingAssessment;
use crate::utils::config::SpoofingConfig;

/// Scores divergence between a reference position and an estimate.
#[derive(Debug, Clone, Default)]
pub struct SpoofingScorer {
    config: SpoofingConfig,
}

impl SpoofingScorer {
    pub fn new(config: SpoofingConfig) -> Self {
        Self { config }
    }

    /// Never fails: missing inputs yield an all-`None` assessment.
    pub fn assess(
        &self,
        error_meters: Option<f64>,
        confidence_radius_m: f64,
        num_anchors: usize,
    ) -> SpoofingAssessment {
        let error_meters = match error_meters {
            Some(error) if error.is_finite() && confidence_radius_m > 0.0 => error,
            _ => return SpoofingAssessment::no_opinion(),
        };

        let ratio = error_meters / confidence_radius_m;
        let score = round2((base_score(ratio) * anchor_factor(num_anchors)).min(1.0));
        let suspected = score >= self.config.suspected_threshold;

        let reason = if suspected {
            if ratio > 4.0 {
                Some(format!(
                    "Position error ({:.0}m) is {:.1}x the expected accuracy ({:.0}m)",
                    error_meters, ratio, confidence_radius_m
                ))
            } else {
                Some(format!(
                    "Position error ({:.0}m) significantly exceeds expected accuracy ({:.0}m)",
                    error_meters, confidence_radius_m
                ))
            }
        } else if score >= self.config.monitor_threshold {
            Some(format!(
                "Position deviation ({:.0}m) is outside expected accuracy - warrants monitoring",
                error_meters
            ))
        } else {
            None
        };

        if suspected {
            log::debug!("spoofing suspected: score {:.2}, ratio {:.2}", score, ratio);
        }

        SpoofingAssessment {
            score: Some(score),
            suspected: Some(suspected),
            reason,
        }
    }
}

/// Piecewise-linear, continuous and monotone in `ratio`.
pub fn base_score(ratio: f64) -> f64 {
    if ratio <= 1.0 {
        ratio * 0.15
    } else if ratio <= 2.0 {
        0.15 + (ratio - 1.0) * 0.15
    } else if ratio <= 4.0 {
        0.30 + (ratio - 2.0) * 0.15
    } else {
        0.60 + ((ratio - 4.0) * 0.05).min(0.40)
    }
}

/// Fewer independent anchors discount the deviation signal.
pub fn anchor_factor(num_anchors: usize) -> f64 {
    match num_anchors {
        0 | 1 => 0.50,
        2 => 0.70,
        3 => 0.85,
        _ => 1.0,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
