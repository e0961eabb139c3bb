mod adapter;
mod format;
mod scene;
mod view;
mod widget;

pub use adapter::{PresentationAdapter, DEFAULT_OVERLAY_OPACITY};
pub use scene::Scene;
pub use view::View;
