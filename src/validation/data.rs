use std::fmt;

use crate::core::{Observation, ValidObservation};
use crate::utils::config::MissingSignalPolicy;

/// Why an observation was dropped before estimation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// Latitude or longitude absent
    MissingPosition,
    /// A coordinate is exactly zero, the feed's "no fix" sentinel
    ZeroCoordinate,
    /// Non-finite or outside [-90, 90] / [-180, 180]
    OutOfRange,
    /// No usable signal reading and the policy discards such observations
    MissingSignal,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::MissingPosition => write!(f, "anchor position missing"),
            RejectionReason::ZeroCoordinate => write!(f, "anchor position is the zero sentinel"),
            RejectionReason::OutOfRange => write!(f, "anchor position out of range"),
            RejectionReason::MissingSignal => write!(f, "no signal strength reading"),
        }
    }
}

/// Observations split into usable and dropped
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub valid: Vec<ValidObservation>,
    pub rejected: Vec<(String, RejectionReason)>,
}

impl FilterOutcome {
    pub fn supplied(&self) -> usize {
        self.valid.len() + self.rejected.len()
    }
}

/// Drops observations that cannot take part in estimation.
///
/// Best effort: bad records are skipped, never raised as errors.
#[derive(Debug, Clone, Default)]
pub struct ObservationValidator {
    missing_signal: MissingSignalPolicy,
}

impl ObservationValidator {
    pub fn new(missing_signal: MissingSignalPolicy) -> Self {
        Self { missing_signal }
    }

    /// Check a single observation, resolving its signal reading.
    pub fn validate(&self, observation: &Observation) -> Result<ValidObservation, RejectionReason> {
        let position = observation
            .anchor_position()
            .ok_or(RejectionReason::MissingPosition)?;

        if !position.is_in_range() {
            return Err(RejectionReason::OutOfRange);
        }
        if position.lat == 0.0 || position.lon == 0.0 {
            return Err(RejectionReason::ZeroCoordinate);
        }

        let reading = observation.rssi_dbm.filter(|rssi| rssi.is_finite());
        let rssi_dbm = match (reading, self.missing_signal) {
            (Some(rssi), _) => rssi,
            (None, MissingSignalPolicy::AssumeDefault { default_rssi_dbm }) => default_rssi_dbm,
            (None, MissingSignalPolicy::Discard) => return Err(RejectionReason::MissingSignal),
        };

        Ok(ValidObservation {
            anchor_id: observation.anchor_id.clone(),
            position,
            rssi_dbm,
        })
    }

    /// Filter a batch, preserving input order.
    pub fn filter(&self, observations: &[Observation]) -> FilterOutcome {
        let mut outcome = FilterOutcome::default();

        for observation in observations {
            match self.validate(observation) {
                Ok(valid) => outcome.valid.push(valid),
                Err(reason) => {
                    log::warn!("dropping observation from anchor {}: {}", observation.anchor_id, reason);
                    outcome.rejected.push((observation.anchor_id.clone(), reason));
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GeoPoint;

    fn bare(id: &str, lat: Option<f64>, lon: Option<f64>, rssi: Option<f64>) -> Observation {
        Observation {
            anchor_id: id.to_string(),
            anchor_lat: lat,
            anchor_lon: lon,
            rssi_dbm: rssi,
            frequency_mhz: None,
        }
    }

    #[test]
    fn test_valid_observation_passes() {
        let validator = ObservationValidator::default();
        let obs = Observation::new("kit-1", 34.05, -118.24, Some(-62.0)).with_frequency(2437.0);
        let valid = validator.validate(&obs).unwrap();
        assert_eq!(valid.anchor_id, "kit-1");
        assert_eq!(valid.position, GeoPoint::new(34.05, -118.24));
        assert_eq!(valid.rssi_dbm, -62.0);
    }

    #[test]
    fn test_rejections() {
        let validator = ObservationValidator::default();
        assert_eq!(
            validator.validate(&bare("a", None, Some(-118.0), Some(-60.0))),
            Err(RejectionReason::MissingPosition)
        );
        assert_eq!(
            validator.validate(&bare("b", Some(0.0), Some(0.0), Some(-60.0))),
            Err(RejectionReason::ZeroCoordinate)
        );
        assert_eq!(
            validator.validate(&bare("c", Some(34.0), Some(0.0), Some(-60.0))),
            Err(RejectionReason::ZeroCoordinate)
        );
        assert_eq!(
            validator.validate(&bare("d", Some(91.0), Some(10.0), Some(-60.0))),
            Err(RejectionReason::OutOfRange)
        );
        assert_eq!(
            validator.validate(&bare("e", Some(f64::NAN), Some(10.0), Some(-60.0))),
            Err(RejectionReason::OutOfRange)
        );
    }

    #[test]
    fn test_missing_signal_policies() {
        let obs = bare("kit-9", Some(34.05), Some(-118.24), None);

        let assume = ObservationValidator::default();
        assert_eq!(assume.validate(&obs).unwrap().rssi_dbm, -70.0);

        let custom = ObservationValidator::new(MissingSignalPolicy::AssumeDefault { default_rssi_dbm: -85.0 });
        assert_eq!(custom.validate(&obs).unwrap().rssi_dbm, -85.0);

        let discard = ObservationValidator::new(MissingSignalPolicy::Discard);
        assert_eq!(discard.validate(&obs), Err(RejectionReason::MissingSignal));
    }

    #[test]
    fn test_filter_keeps_order() {
        let validator = ObservationValidator::default();
        let observations = vec![
            Observation::new("kit-1", 34.05, -118.24, Some(-60.0)),
            bare("kit-2", None, None, Some(-60.0)),
            Observation::new("kit-3", 34.06, -118.25, None),
        ];

        let outcome = validator.filter(&observations);
        assert_eq!(outcome.supplied(), 3);
        let ids: Vec<&str> = outcome.valid.iter().map(|o| o.anchor_id.as_str()).collect();
        assert_eq!(ids, vec!["kit-1", "kit-3"]);
        assert_eq!(outcome.rejected, vec![("kit-2".to_string(), RejectionReason::MissingPosition)]);
    }
}
