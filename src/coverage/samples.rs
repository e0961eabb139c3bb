use std::collections::HashMap;

use crate::geo::GeoPoint;

/// Sparse predicted field-strength samples for one display unit.
///
/// Lookups are a linear scan in degree space, which is fine for the few
/// hundred samples a coverage run produces. A grid or k-d tree could replace
/// the scan without changing results.
#[derive(Debug, Clone, Default)]
pub struct SignalSampleIndex {
    samples: Vec<(GeoPoint, f64)>,
}

impl SignalSampleIndex {
    pub fn new(samples: Vec<(GeoPoint, f64)>) -> Self {
        Self { samples }
    }

    /// Builds the index from the backend mapping of `"(lat, lng)"` keys.
    /// Keys that do not parse and null values are skipped.
    pub fn from_raw(raw: &HashMap<String, Option<f64>>) -> Self {
        let mut samples = Vec::with_capacity(raw.len());
        for (key, value) in raw {
            let Some(point) = GeoPoint::parse(key) else {
                log::warn!("Skipping signal sample with unparsable key {:?}", key);
                continue;
            };
            match value {
                Some(v) if v.is_finite() => samples.push((point, *v)),
                _ => log::debug!("Skipping empty signal sample at {}", key),
            }
        }
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Value of the sample closest to `point`. On exact ties the first sample
    /// in load order wins.
    pub fn nearest(&self, point: GeoPoint) -> Option<f64> {
        let mut best: Option<(f64, f64)> = None;
        for (sample_point, value) in &self.samples {
            let dist = point.degree_distance_sq(sample_point);
            match best {
                Some((best_dist, _)) if dist >= best_dist => {}
                _ => best = Some((dist, *value)),
            }
        }
        best.map(|(_, value)| value)
    }
}
