use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::geo::GeoPoint;

/// Initial transmitter state as stored by the backend for the logged-in user.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub frequency: Option<f64>,
    #[serde(default)]
    pub propagation_model: Option<String>,
    #[serde(default)]
    pub antenna_tilt: Option<f64>,
    #[serde(default)]
    pub tx_location_name: Option<String>,
    #[serde(default)]
    pub tx_elevation: Option<f64>,
    #[serde(default)]
    pub climate_updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationUpdate {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<GeoPoint> for LocationUpdate {
    fn from(point: GeoPoint) -> Self {
        Self {
            latitude: point.lat,
            longitude: point.lng,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationInfo {
    #[serde(default)]
    pub municipality: Option<String>,
    #[serde(default)]
    pub elevation: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TiltUpdate {
    pub tilt: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageRequest {
    pub radius: f64,
    pub min_signal_level: Option<f64>,
    pub max_signal_level: Option<f64>,
    pub custom_center: GeoPoint,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, ToSchema)]
pub struct RawBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawUnitImage {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub colorbar: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RawScaleRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawScale {
    #[serde(default)]
    pub units: HashMap<String, RawScaleRange>,
    #[serde(default)]
    pub default_unit: Option<String>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct LossComponent {
    #[serde(default)]
    pub center: Option<f64>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct GainComponents {
    #[serde(default)]
    pub base_gain_dbi: Option<f64>,
    #[serde(default)]
    pub horizontal_adjustment_db_min: Option<f64>,
    #[serde(default)]
    pub horizontal_adjustment_db_max: Option<f64>,
    #[serde(default)]
    pub vertical_adjustment_db_min: Option<f64>,
    #[serde(default)]
    pub vertical_adjustment_db_max: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct CenterMetrics {
    #[serde(default)]
    pub combined_loss_center_db: Option<f64>,
    #[serde(default)]
    pub received_power_center_dbm: Option<f64>,
    #[serde(default)]
    pub field_center_dbuv_m: Option<f64>,
    #[serde(default)]
    pub effective_gain_center_db: Option<f64>,
    #[serde(default)]
    pub distance_center_km: Option<f64>,
    #[serde(default)]
    pub path_type: Option<String>,
}

/// Response of the coverage computation endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoverageResponse {
    pub bounds: Option<RawBounds>,
    #[serde(default)]
    pub center: Option<GeoPoint>,
    #[serde(default)]
    pub images: Option<HashMap<String, RawUnitImage>>,
    // Single-image responses predate the per-unit `images` map.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub colorbar: Option<String>,
    #[serde(default)]
    pub scale: Option<RawScale>,
    #[serde(default)]
    pub signal_level_dict: HashMap<String, Option<f64>>,
    #[serde(default)]
    pub signal_level_dict_dbm: HashMap<String, Option<f64>>,
    #[serde(default)]
    pub loss_components: HashMap<String, LossComponent>,
    #[serde(default)]
    pub gain_components: Option<GainComponents>,
    #[serde(default)]
    pub center_metrics: Option<CenterMetrics>,
    #[serde(default)]
    pub requested_radius_km: Option<f64>,
    #[serde(default)]
    pub tx_location_name: Option<String>,
    #[serde(default)]
    pub tx_site_elevation: Option<f64>,
    #[serde(default)]
    pub climate_updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location_status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileRequest {
    pub path: [GeoPoint; 2],
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileResponse {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub field_dbuv: Option<f64>,
    #[serde(default)]
    pub obstacle_distances_km: Option<Vec<f64>>,
    #[serde(default)]
    pub received_power_dbm: Option<f64>,
    #[serde(default)]
    pub tx_gain_dbi: Option<f64>,
}
