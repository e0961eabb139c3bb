use super::GeoPoint;

/// Mean equatorial radius used by the map widget's spherical geometry.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Great-circle distance between two points (haversine).
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + a.lat_rad().cos() * b.lat_rad().cos() * (dlng / 2.0).sin().powi(2);
    // Clamp guards asin against rounding just above 1 for antipodal points.
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

/// Initial bearing from `a` towards `b`, in [0, 360).
pub fn bearing_degrees(a: GeoPoint, b: GeoPoint) -> f64 {
    let dlng = (b.lng - a.lng).to_radians();
    let x = dlng.sin() * b.lat_rad().cos();
    let y = a.lat_rad().cos() * b.lat_rad().sin()
        - a.lat_rad().sin() * b.lat_rad().cos() * dlng.cos();

    let bearing = x.atan2(y).to_degrees().rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs
    if bearing >= 360.0 {
        0.0
    } else {
        bearing
    }
}
