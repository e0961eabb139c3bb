mod distance;
mod dms;
mod point;

pub use distance::{bearing_degrees, distance_meters};
pub use dms::{from_dms, to_dms, Hemisphere};
pub use point::GeoPoint;
