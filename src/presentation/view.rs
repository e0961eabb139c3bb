use serde::Serialize;
use utoipa::ToSchema;

use super::format::{
    format_bearing, format_db, format_db_range, format_distance_km, format_elevation,
    format_field, format_obstacles, path_type_label,
};
use crate::backend::types::{CenterMetrics, GainComponents};
use crate::coverage::{CoverageResult, UnitKey};
use crate::geo::to_dms;
use crate::receivers::{ReceiverEntry, ReceiverId};
use crate::session::{CoverageState, Notice, SessionSnapshot, Transmitter};

const LOSS_KEYS: [&str; 6] = ["L_b0p", "L_bd", "L_bs", "L_ba", "L_b", "L_b_corr"];

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransmitterPanel {
    pub latitude: String,
    pub longitude: String,
    pub latitude_dms: String,
    pub longitude_dms: String,
    pub frequency: String,
    pub model: String,
    pub tilt: String,
    pub location_name: String,
    pub elevation: String,
    pub climate: String,
}

impl From<&Transmitter> for TransmitterPanel {
    fn from(tx: &Transmitter) -> Self {
        Self {
            latitude: format!("{:.2}°", tx.position.lat),
            longitude: format!("{:.2}°", tx.position.lng),
            latitude_dms: to_dms(tx.position.lat, true).to_string(),
            longitude_dms: to_dms(tx.position.lng, false).to_string(),
            frequency: match tx.frequency_mhz {
                Some(f) => format!("{:.2} MHz", f),
                None => "-".to_string(),
            },
            model: tx.propagation_model.clone().unwrap_or_else(|| "-".into()),
            tilt: format_bearing(tx.antenna_tilt_deg),
            location_name: tx.location_name.clone().unwrap_or_else(|| "-".into()),
            elevation: format_elevation(tx.elevation_m),
            climate: match tx.climate_updated_at {
                Some(at) => format!("Climate adjusted at {} UTC", at.format("%Y-%m-%d %H:%M")),
                None => "Climate not adjusted for this location".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UnitButton {
    pub unit: UnitKey,
    pub label: String,
    pub enabled: bool,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ScaleReadout {
    pub text: String,
    pub colorbar: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReceiverRow {
    pub id: ReceiverId,
    pub label: String,
    pub selected: bool,
    pub distance: String,
    pub bearing: String,
    pub elevation: String,
    pub field: String,
    pub obstacles: String,
    pub tx_gain: String,
}

impl ReceiverRow {
    fn new(index: usize, entry: &ReceiverEntry, unit: UnitKey) -> Self {
        let label = format!("RX {}", index + 1);
        match &entry.summary {
            Some(summary) => Self {
                id: entry.id,
                label,
                selected: entry.selected,
                distance: format_distance_km(summary.distance_km),
                bearing: format_bearing(summary.bearing_deg),
                elevation: format_elevation(summary.elevation_m),
                field: format_field(summary, unit),
                obstacles: format_obstacles(summary.obstacle_distances_km.as_deref()),
                tx_gain: match summary.tx_gain_dbi {
                    Some(gain) => format!("{:.2} dBi", gain),
                    None => "-".to_string(),
                },
            },
            None => Self {
                id: entry.id,
                label,
                selected: entry.selected,
                distance: "-".into(),
                bearing: "-".into(),
                elevation: "-".into(),
                field: "pending".into(),
                obstacles: "-".into(),
                tx_gain: "-".into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LossRow {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GainPanel {
    pub base: String,
    pub horizontal: String,
    pub vertical: String,
}

fn format_gain_db(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2} dB", v),
        None => "-".to_string(),
    }
}

fn gain_pair(min: Option<f64>, max: Option<f64>) -> String {
    match min {
        Some(_) => format!("{} / {}", format_gain_db(min), format_gain_db(max)),
        None => "-".to_string(),
    }
}

impl From<Option<&GainComponents>> for GainPanel {
    fn from(gain: Option<&GainComponents>) -> Self {
        match gain {
            Some(g) => Self {
                base: format_gain_db(Some(g.base_gain_dbi.unwrap_or(0.0))),
                horizontal: gain_pair(
                    g.horizontal_adjustment_db_min,
                    g.horizontal_adjustment_db_max,
                ),
                vertical: gain_pair(g.vertical_adjustment_db_min, g.vertical_adjustment_db_max),
            },
            None => Self {
                base: "-".into(),
                horizontal: "-".into(),
                vertical: "-".into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CenterPanel {
    pub loss: String,
    pub power: String,
    pub field: String,
    pub gain: String,
    pub distance: String,
    pub path_type: String,
}

impl From<Option<&CenterMetrics>> for CenterPanel {
    fn from(metrics: Option<&CenterMetrics>) -> Self {
        let empty = CenterMetrics::default();
        let m = metrics.unwrap_or(&empty);
        Self {
            loss: format_db(m.combined_loss_center_db, "dB"),
            power: format_db(m.received_power_center_dbm, "dBm"),
            field: format_db(m.field_center_dbuv_m, "dBµV/m"),
            gain: format_db(m.effective_gain_center_db, "dB"),
            distance: match m.distance_center_km {
                Some(km) => format_distance_km(km),
                None => "-".to_string(),
            },
            path_type: m
                .path_type
                .as_deref()
                .map(path_type_label)
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Everything the page shows besides the map itself.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct View {
    pub state: CoverageState,
    pub status_message: Option<String>,
    pub transmitter: TransmitterPanel,
    pub unit_buttons: Vec<UnitButton>,
    pub scale: Option<ScaleReadout>,
    pub overlay_opacity: String,
    pub receivers: Vec<ReceiverRow>,
    pub losses: Vec<LossRow>,
    pub gain: GainPanel,
    pub center: CenterPanel,
    pub profile_image: Option<String>,
    pub notices: Vec<Notice>,
}

impl View {
    pub fn build(snapshot: &SessionSnapshot, overlay_opacity: f64, notices: Vec<Notice>) -> Self {
        let coverage = snapshot.coverage.as_deref();
        let unit = snapshot.unit;
        Self {
            state: snapshot.state,
            status_message: snapshot.status_message.clone(),
            transmitter: TransmitterPanel::from(&snapshot.transmitter),
            unit_buttons: unit_buttons(coverage, unit),
            scale: coverage.map(|c| scale_readout(c, unit)),
            overlay_opacity: format!("{:.2}", overlay_opacity),
            receivers: snapshot
                .receivers
                .iter()
                .enumerate()
                .map(|(i, entry)| ReceiverRow::new(i, entry, unit))
                .collect(),
            losses: LOSS_KEYS
                .iter()
                .map(|key| LossRow {
                    key: key.to_string(),
                    value: format_db_range(coverage.and_then(|c| c.loss_components.get(*key))),
                })
                .collect(),
            gain: GainPanel::from(coverage.and_then(|c| c.gain_components.as_ref())),
            center: CenterPanel::from(coverage.and_then(|c| c.center_metrics.as_ref())),
            profile_image: snapshot.profile_image.clone(),
            notices,
        }
    }
}

fn unit_buttons(coverage: Option<&CoverageResult>, active: UnitKey) -> Vec<UnitButton> {
    UnitKey::ALL
        .into_iter()
        .map(|unit| UnitButton {
            unit,
            label: unit.symbol().to_string(),
            enabled: coverage.is_some_and(|c| c.has_unit(unit)),
            active: coverage.is_some() && unit == active,
        })
        .collect()
}

fn scale_readout(coverage: &CoverageResult, unit: UnitKey) -> ScaleReadout {
    let image = coverage.image(unit);
    ScaleReadout {
        text: match coverage.scale.get(&unit) {
            Some(range) => format!("{:.2} – {:.2} {}", range.min, range.max, unit.symbol()),
            None => "-".to_string(),
        },
        colorbar: image.and_then(|i| i.colorbar.clone()),
        label: image.map(|i| i.label.clone()),
    }
}
