use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::backend::types::{LocationInfo, SessionData};
use crate::geo::GeoPoint;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Transmitter {
    pub position: GeoPoint,
    pub frequency_mhz: Option<f64>,
    pub propagation_model: Option<String>,
    pub antenna_tilt_deg: f64,
    pub location_name: Option<String>,
    pub elevation_m: Option<f64>,
    pub climate_updated_at: Option<DateTime<Utc>>,
}

impl From<SessionData> for Transmitter {
    fn from(data: SessionData) -> Self {
        Self {
            position: GeoPoint::new(data.latitude, data.longitude),
            frequency_mhz: data.frequency,
            propagation_model: data.propagation_model,
            antenna_tilt_deg: data.antenna_tilt.unwrap_or(0.0),
            location_name: data.tx_location_name,
            elevation_m: data.tx_elevation,
            climate_updated_at: data.climate_updated_at,
        }
    }
}

impl Transmitter {
    /// Merges reverse-geocoding output. Absent fields keep their old value.
    pub fn merge_location(&mut self, info: &LocationInfo) {
        if let Some(name) = &info.municipality {
            self.location_name = Some(name.clone());
        }
        if let Some(elevation) = info.elevation {
            self.elevation_m = Some(elevation);
        }
    }
}
