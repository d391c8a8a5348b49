//! Log-distance path-loss model: signal strength to distance

use crate::utils::config::PathLossConfig;

/// Converts a received signal strength into an estimated distance.
///
/// `distance = 10 ^ ((tx_power - rssi) / (10 * n))`, clamped to the
/// model's distance range. A missing reading, or one at or above the rated
/// transmit power, yields the distance floor.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceModel {
    tx_power_dbm: f64,
    path_loss_exponent: f64,
    min_distance_m: f64,
    max_distance_m: f64,
}

impl Default for DistanceModel {
    fn default() -> Self {
        Self::from_config(&PathLossConfig::default())
    }
}

impl DistanceModel {
    pub fn new(tx_power_dbm: f64, path_loss_exponent: f64) -> Self {
        Self {
            tx_power_dbm,
            path_loss_exponent,
            ..Self::default()
        }
    }

    pub fn from_config(config: &PathLossConfig) -> Self {
        Self {
            tx_power_dbm: config.tx_power_dbm,
            path_loss_exponent: config.path_loss_exponent,
            min_distance_m: config.min_distance_m,
            max_distance_m: config.max_distance_m,
        }
    }

    pub fn tx_power_dbm(&self) -> f64 {
        self.tx_power_dbm
    }

    pub fn path_loss_exponent(&self) -> f64 {
        self.path_loss_exponent
    }

    /// Estimated distance (m) for a reading in dBm
    pub fn rssi_to_distance(&self, rssi_dbm: Option<f64>) -> f64 {
        let rssi = match rssi_dbm {
            Some(rssi) if rssi.is_finite() && rssi < self.tx_power_dbm => rssi,
            _ => return self.min_distance_m,
        };

        let exponent = (self.tx_power_dbm - rssi) / (10.0 * self.path_loss_exponent);
        10f64.powf(exponent).clamp(self.min_distance_m, self.max_distance_m)
    }

    /// Reading that maps back to `distance_m` under this model (unclamped).
    #[cfg(test)]
    pub(crate) fn distance_to_rssi(&self, distance_m: f64) -> f64 {
        self.tx_power_dbm - 10.0 * self.path_loss_exponent * distance_m.log10()
    }
}

/// Default-model conversion with explicit parameters.
pub fn rssi_to_distance(rssi_dbm: Option<f64>, tx_power_dbm: f64, path_loss_exponent: f64) -> f64 {
    DistanceModel::new(tx_power_dbm, path_loss_exponent).rssi_to_distance(rssi_dbm)
}
