//! Physical constants and model defaults

/// Mean Earth radius used by the haversine formula (m)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Signal strength assumed for observations that carry no reading (dBm)
pub const DEFAULT_MISSING_RSSI_DBM: f64 = -70.0;

/// Rated transmitter power assumed by the path-loss model (dBm)
pub const DEFAULT_TX_POWER_DBM: f64 = 0.0;

/// Typical outdoor path-loss exponent
pub const DEFAULT_PATH_LOSS_EXPONENT: f64 = 2.5;

/// Distance floor and ceiling of the path-loss model (m)
pub const MIN_MODEL_DISTANCE_M: f64 = 10.0;
pub const MAX_MODEL_DISTANCE_M: f64 = 10_000.0;

/// Flat mid-latitude degree conversions used by the solver step
pub const METERS_PER_DEG_LAT: f64 = 111_000.0;
pub const METERS_PER_DEG_LON: f64 = 85_000.0;
