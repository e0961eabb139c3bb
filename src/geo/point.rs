use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Parses `"lat, lng"`, optionally wrapped in parentheses as the coverage
    /// backend renders its sample keys: `"(-14.2, -51.9)"`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let inner = trimmed
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .unwrap_or(trimmed);
        let parts: Vec<_> = inner.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return None;
        }
        let lat: f64 = parts[0].parse().ok()?;
        let lng: f64 = parts[1].parse().ok()?;
        if !lat.is_finite() || !lng.is_finite() {
            return None;
        }
        Some(Self { lat, lng })
    }

    pub fn lat_rad(&self) -> f64 {
        self.lat.to_radians()
    }

    /// Squared Euclidean distance in degree space. Only meaningful for ranking
    /// nearby points against each other.
    pub fn degree_distance_sq(&self, other: &GeoPoint) -> f64 {
        let dlat = self.lat - other.lat;
        let dlng = self.lng - other.lng;
        dlat * dlat + dlng * dlng
    }
}
