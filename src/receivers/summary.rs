use serde::Serialize;
use utoipa::ToSchema;

use crate::backend::types::ProfileResponse;
use crate::coverage::{CoverageResult, UnitKey};
use crate::geo::{bearing_degrees, distance_meters, GeoPoint};

/// Slack added to the requested radius so points on the raster edge still
/// count as covered.
pub const RADIUS_TOLERANCE_M: f64 = 20.0;

/// Obstacles beyond this count are dropped from a profile result.
pub const MAX_OBSTACLES: usize = 6;

/// Everything a summary is derived from.
#[derive(Debug, Clone, Copy)]
pub struct SummaryContext<'a> {
    pub transmitter: GeoPoint,
    pub coverage: Option<&'a CoverageResult>,
    pub unit: UnitKey,
    pub radius_tolerance_m: f64,
}

/// Derived facts about the link from the transmitter to one receiver.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LinkSummary {
    pub distance_km: f64,
    pub bearing_deg: f64,
    pub elevation_m: Option<f64>,
    pub field_dbuv: Option<f64>,
    pub field_dbm: Option<f64>,
    pub inside_coverage_radius: bool,
    pub pending_field: bool,
    pub obstacle_distances_km: Option<Vec<f64>>,
    pub tx_gain_dbi: Option<f64>,
}

impl LinkSummary {
    /// Geometry and sampled field strength for `position`. Elevation and
    /// path-profile data are merged in separately.
    pub fn derive(ctx: &SummaryContext<'_>, position: GeoPoint) -> Self {
        let distance_m = distance_meters(ctx.transmitter, position);
        let bearing_deg = bearing_degrees(ctx.transmitter, position);

        let inside_coverage_radius = match ctx.coverage.and_then(|c| c.requested_radius_m()) {
            Some(radius_m) => distance_m <= radius_m + ctx.radius_tolerance_m,
            None => true,
        };

        let mut summary = Self {
            distance_km: distance_m / 1000.0,
            bearing_deg,
            elevation_m: None,
            field_dbuv: None,
            field_dbm: None,
            inside_coverage_radius,
            pending_field: false,
            obstacle_distances_km: None,
            tx_gain_dbi: None,
        };

        if inside_coverage_radius {
            if let Some(coverage) = ctx.coverage {
                let lookup = |unit| coverage.samples(unit).and_then(|s| s.nearest(position));
                summary.field_dbuv = lookup(UnitKey::Dbuv);
                summary.field_dbm = lookup(UnitKey::Dbm);
            }
        }
        summary.refresh_pending(ctx.unit);
        summary
    }

    pub fn field(&self, unit: UnitKey) -> Option<f64> {
        match unit {
            UnitKey::Dbuv => self.field_dbuv,
            UnitKey::Dbm => self.field_dbm,
        }
    }

    /// Pending means covered but not yet resolved for the displayed unit.
    pub fn refresh_pending(&mut self, unit: UnitKey) {
        self.pending_field = self.inside_coverage_radius && self.field(unit).is_none();
    }

    /// Carries over the data obtained from a path profile request.
    pub fn keep_path_data(&mut self, previous: &LinkSummary) {
        self.obstacle_distances_km = previous.obstacle_distances_km.clone();
        self.tx_gain_dbi = previous.tx_gain_dbi;
    }

    pub fn apply_profile(&mut self, profile: &ProfileResponse, unit: UnitKey) {
        if let Some(field) = profile.field_dbuv {
            self.field_dbuv = Some(field);
        }
        if let Some(power) = profile.received_power_dbm {
            self.field_dbm = Some(power);
        }
        if let Some(distances) = &profile.obstacle_distances_km {
            self.obstacle_distances_km =
                Some(distances.iter().copied().take(MAX_OBSTACLES).collect());
        }
        if let Some(gain) = profile.tx_gain_dbi {
            self.tx_gain_dbi = Some(gain);
        }
        if profile.field_dbuv.is_some() || profile.received_power_dbm.is_some() {
            self.refresh_pending(unit);
        }
    }
}
