//! Great-circle distance and local flat-plane helpers

use nalgebra::Vector2;

use crate::core::{GeoPoint, EARTH_RADIUS_M};

/// Haversine distance between two points (m).
///
/// Inputs outside the geodetic ranges are the caller's problem.
pub fn distance(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    let lat_a_rad = lat_a.to_radians();
    let lat_b_rad = lat_b.to_radians();
    let delta_lat = (lat_b - lat_a).to_radians();
    let delta_lon = (lon_b - lon_a).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat_a_rad.cos() * lat_b_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Haversine distance between two points (m)
pub fn distance_between(a: &GeoPoint, b: &GeoPoint) -> f64 {
    distance(a.lat, a.lon, b.lat, b.lon)
}

/// East/north offset of `pos` from `reference` on a local tangent plane (m).
/// Valid for small areas only.
pub fn to_local(pos: &GeoPoint, reference: &GeoPoint) -> Vector2<f64> {
    let (m_lat, m_lon) = meters_per_degree(reference.lat);
    Vector2::new((pos.lon - reference.lon) * m_lon, (pos.lat - reference.lat) * m_lat)
}

/// Inverse of [`to_local`].
pub fn from_local(local: &Vector2<f64>, reference: &GeoPoint) -> GeoPoint {
    let (m_lat, m_lon) = meters_per_degree(reference.lat);
    GeoPoint::new(reference.lat + local.y / m_lat, reference.lon + local.x / m_lon)
}

fn meters_per_degree(lat: f64) -> (f64, f64) {
    let m_lat = EARTH_RADIUS_M.to_radians();
    (m_lat, m_lat * lat.to_radians().cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        assert_eq!(distance(34.05, -118.24, 34.05, -118.24), 0.0);
        assert_eq!(distance(-89.9, 179.9, -89.9, 179.9), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let ab = distance(34.05, -118.24, 34.06, -118.25);
        let ba = distance(34.06, -118.25, 34.05, -118.24);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn test_known_distances() {
        // One degree of latitude on the mean sphere
        let one_deg = distance(0.0, 0.0, 1.0, 0.0);
        assert!((one_deg - 111_194.93).abs() < 0.1);

        // Los Angeles to New York, roughly 3936 km on the sphere
        let la_ny = distance(34.0522, -118.2437, 40.7128, -74.0060);
        assert!((la_ny - 3_935_746.0).abs() < 5_000.0);
    }

    #[test]
    fn test_local_plane_round_trip() {
        let reference = GeoPoint::new(34.05, -118.24);
        let pos = GeoPoint::new(34.052, -118.237);

        let local = to_local(&pos, &reference);
        let back = from_local(&local, &reference);
        assert!((back.lat - pos.lat).abs() < 1e-12);
        assert!((back.lon - pos.lon).abs() < 1e-12);

        // Plane distance agrees with haversine over a few hundred meters
        let plane = local.norm();
        let sphere = distance_between(&pos, &reference);
        assert!((plane - sphere).abs() < 0.5);
    }
}
