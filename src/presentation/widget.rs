use serde::Serialize;
use utoipa::ToSchema;

use crate::coverage::Bounds;
use crate::geo::GeoPoint;
use crate::receivers::ReceiverId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum MarkerId {
    Transmitter,
    Receiver(ReceiverId),
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Marker {
    pub id: MarkerId,
    pub position: GeoPoint,
    pub label: String,
    pub selected: bool,
    pub draggable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Circle {
    pub center: GeoPoint,
    pub radius_m: f64,
    pub fill_opacity: f64,
}

/// Georeferenced raster, stretched over `bounds`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Overlay {
    /// Base64-encoded PNG.
    pub image: String,
    pub bounds: Bounds,
    pub opacity: f64,
}

/// The radius circle stays faintly visible even when the overlay is hidden.
pub fn circle_fill_opacity(overlay_opacity: f64) -> f64 {
    (overlay_opacity / 6.0).max(0.05)
}

/// Drawing surface the presentation layer renders onto.
///
/// Calls are idempotent: placing an existing marker moves it, and `None`
/// removes a shape. Click and drag-end events flow the other way, into the
/// gesture handlers of [`super::PresentationAdapter`].
pub trait MapWidget {
    fn place_marker(&mut self, marker: Marker);
    fn remove_marker(&mut self, id: MarkerId);
    fn draw_polyline(&mut self, path: Option<[GeoPoint; 2]>);
    fn draw_circle(&mut self, circle: Option<Circle>);
    fn draw_overlay(&mut self, overlay: Option<Overlay>);
    fn set_overlay_opacity(&mut self, opacity: f64);
    fn pan_to(&mut self, center: GeoPoint);
    fn fit_bounds(&mut self, bounds: Bounds);
}
