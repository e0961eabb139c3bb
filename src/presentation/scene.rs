use serde::Serialize;
use utoipa::ToSchema;

use super::widget::{circle_fill_opacity, Circle, MapWidget, Marker, MarkerId, Overlay};
use crate::coverage::Bounds;
use crate::geo::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Viewport {
    pub center: GeoPoint,
    /// Set when the map should zoom to fit these bounds.
    pub fit: Option<Bounds>,
}

/// Retained-mode [`MapWidget`]: records what should be on the map so a
/// remote client can draw it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct Scene {
    pub markers: Vec<Marker>,
    pub polyline: Option<Vec<GeoPoint>>,
    pub circle: Option<Circle>,
    pub overlay: Option<Overlay>,
    pub viewport: Option<Viewport>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }
}

impl MapWidget for Scene {
    fn place_marker(&mut self, marker: Marker) {
        match self.markers.iter_mut().find(|m| m.id == marker.id) {
            Some(existing) => *existing = marker,
            None => self.markers.push(marker),
        }
    }

    fn remove_marker(&mut self, id: MarkerId) {
        self.markers.retain(|m| m.id != id);
    }

    fn draw_polyline(&mut self, path: Option<[GeoPoint; 2]>) {
        self.polyline = path.map(Vec::from);
    }

    fn draw_circle(&mut self, circle: Option<Circle>) {
        self.circle = circle;
    }

    fn draw_overlay(&mut self, overlay: Option<Overlay>) {
        self.overlay = overlay;
    }

    fn set_overlay_opacity(&mut self, opacity: f64) {
        if let Some(overlay) = &mut self.overlay {
            overlay.opacity = opacity;
        }
        if let Some(circle) = &mut self.circle {
            circle.fill_opacity = circle_fill_opacity(opacity);
        }
    }

    fn pan_to(&mut self, center: GeoPoint) {
        self.viewport = Some(Viewport { center, fit: None });
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.viewport = Some(Viewport {
            center: bounds.center(),
            fit: Some(bounds),
        });
    }
}
