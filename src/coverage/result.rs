use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use utoipa::ToSchema;

use super::{CoverageError, SignalSampleIndex, UnitKey};
use crate::backend::types::{
    CenterMetrics, CoverageResponse, GainComponents, LossComponent, RawBounds, RawUnitImage,
};
use crate::geo::GeoPoint;

const LEGACY_DBUV_LABEL: &str = "Campo elétrico [dBµV/m]";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Bounds {
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }
}

impl From<RawBounds> for Bounds {
    fn from(raw: RawBounds) -> Self {
        Self {
            north: raw.north,
            south: raw.south,
            east: raw.east,
            west: raw.west,
        }
    }
}

/// Rendered raster for one unit. Images are base64-encoded PNGs, passed
/// through to the map widget untouched.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UnitImage {
    pub image: String,
    pub colorbar: Option<String>,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct ScaleRange {
    pub min: f64,
    pub max: f64,
}

/// One successful coverage computation. Built in one go from a backend
/// response and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct CoverageResult {
    pub bounds: Bounds,
    pub center: GeoPoint,
    pub requested_radius_km: Option<f64>,
    pub images: HashMap<UnitKey, UnitImage>,
    pub scale: HashMap<UnitKey, ScaleRange>,
    pub default_unit: UnitKey,
    pub samples: HashMap<UnitKey, SignalSampleIndex>,
    pub loss_components: BTreeMap<String, LossComponent>,
    pub gain_components: Option<GainComponents>,
    pub center_metrics: Option<CenterMetrics>,
}

impl CoverageResult {
    pub fn from_response(response: &CoverageResponse) -> Result<Self, CoverageError> {
        let images = collect_images(response);
        if !images.contains_key(&UnitKey::Dbuv) {
            return Err(CoverageError::EmptyImage(UnitKey::Dbuv));
        }

        let bounds: Bounds = response.bounds.unwrap_or_default().into();
        let center = response.center.unwrap_or_else(|| bounds.center());

        let mut scale = HashMap::new();
        let mut default_unit = UnitKey::Dbuv;
        if let Some(raw) = &response.scale {
            for unit in UnitKey::ALL {
                let entry = raw.units.iter().find_map(|(key, range)| {
                    (UnitKey::from_key(key) == Some(unit)).then_some(*range)
                });
                let min = entry.and_then(|r| r.min).or(raw.min);
                let max = entry.and_then(|r| r.max).or(raw.max);
                if let (Some(min), Some(max)) = (min, max) {
                    scale.insert(unit, ScaleRange { min, max });
                }
            }
            if let Some(unit) = raw.default_unit.as_deref().and_then(UnitKey::from_key) {
                if images.contains_key(&unit) {
                    default_unit = unit;
                }
            }
        }

        let samples = HashMap::from([
            (
                UnitKey::Dbuv,
                SignalSampleIndex::from_raw(&response.signal_level_dict),
            ),
            (
                UnitKey::Dbm,
                SignalSampleIndex::from_raw(&response.signal_level_dict_dbm),
            ),
        ]);

        let requested_radius_km = response
            .requested_radius_km
            .filter(|r| r.is_finite() && *r > 0.0);

        Ok(Self {
            bounds,
            center,
            requested_radius_km,
            images,
            scale,
            default_unit,
            samples,
            loss_components: response
                .loss_components
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
            gain_components: response.gain_components,
            center_metrics: response.center_metrics.clone(),
        })
    }

    /// A unit can be displayed only when the response rendered an image for it.
    pub fn has_unit(&self, unit: UnitKey) -> bool {
        self.images.contains_key(&unit)
    }

    pub fn image(&self, unit: UnitKey) -> Option<&UnitImage> {
        self.images.get(&unit)
    }

    pub fn samples(&self, unit: UnitKey) -> Option<&SignalSampleIndex> {
        self.samples.get(&unit)
    }

    pub fn requested_radius_m(&self) -> Option<f64> {
        self.requested_radius_km.map(|km| km * 1000.0)
    }
}

fn collect_images(response: &CoverageResponse) -> HashMap<UnitKey, UnitImage> {
    let mut images = HashMap::new();

    match &response.images {
        Some(raw_images) => {
            for (key, raw) in raw_images {
                let Some(unit) = UnitKey::from_key(key) else {
                    log::debug!("Ignoring coverage image for unknown unit {:?}", key);
                    continue;
                };
                if let Some(image) = unit_image(raw, unit) {
                    images.insert(unit, image);
                }
            }
        }
        None => {
            let legacy = RawUnitImage {
                image: response.image.clone(),
                colorbar: response.colorbar.clone(),
                label: Some(LEGACY_DBUV_LABEL.to_string()),
            };
            if let Some(image) = unit_image(&legacy, UnitKey::Dbuv) {
                images.insert(UnitKey::Dbuv, image);
            }
        }
    }

    images
}

fn unit_image(raw: &RawUnitImage, unit: UnitKey) -> Option<UnitImage> {
    let image = raw.image.as_deref().filter(|s| !s.is_empty())?;
    Some(UnitImage {
        image: image.to_string(),
        colorbar: raw.colorbar.clone().filter(|s| !s.is_empty()),
        label: raw
            .label
            .clone()
            .unwrap_or_else(|| format!("[{}]", unit.symbol())),
    })
}
