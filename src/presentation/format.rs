//! Display text for the panels. Unknown values render as `-`.

use crate::backend::types::LossComponent;
use crate::coverage::UnitKey;
use crate::receivers::LinkSummary;

const UNKNOWN: &str = "-";

pub fn format_distance_km(km: f64) -> String {
    format!("{:.2} km", km)
}

pub fn format_bearing(deg: f64) -> String {
    format!("{:.1}°", deg)
}

pub fn format_elevation(meters: Option<f64>) -> String {
    match meters {
        Some(m) => format!("{:.1} m", m),
        None => UNKNOWN.to_string(),
    }
}

/// One-decimal value with a unit suffix, as used for field strength and
/// link-budget figures.
pub fn format_db(value: Option<f64>, unit: &str) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{:.1} {}", v, unit),
        None => UNKNOWN.to_string(),
    }
}

/// Center value with the min–max spread, when both ends are known.
pub fn format_db_range(component: Option<&LossComponent>) -> String {
    let Some(component) = component else {
        return UNKNOWN.to_string();
    };
    let center = format_db(component.center, "dB");
    match (component.min, component.max) {
        (Some(min), Some(max)) => format!(
            "{} ({} – {})",
            center,
            format_db(Some(min), "dB"),
            format_db(Some(max), "dB")
        ),
        _ => center,
    }
}

pub fn format_field(summary: &LinkSummary, unit: UnitKey) -> String {
    if let Some(value) = summary.field(unit) {
        return format!("{:.1} {}", value, unit.symbol());
    }
    if !summary.inside_coverage_radius {
        "outside area".to_string()
    } else if summary.pending_field {
        "pending".to_string()
    } else {
        UNKNOWN.to_string()
    }
}

/// `None` until a profile was generated, `none` when it found no obstacles.
pub fn format_obstacles(distances_km: Option<&[f64]>) -> String {
    match distances_km {
        None => UNKNOWN.to_string(),
        Some([]) => "none".to_string(),
        Some(distances) => distances
            .iter()
            .map(|d| format!("{:.2} km", d))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Human label for the dominant propagation mechanism. Unknown codes pass
/// through unchanged.
pub fn path_type_label(code: &str) -> String {
    match code.to_ascii_uppercase().as_str() {
        "LOS" => "Line of sight (LOS)".to_string(),
        "NLOS" => "Beyond the horizon (NLOS)".to_string(),
        "DIFFRACTION" => "Diffraction dominated".to_string(),
        "TROPOSCATTER" => "Tropospheric scatter".to_string(),
        _ => code.to_string(),
    }
}
