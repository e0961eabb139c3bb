mod registry;
mod summary;

pub use registry::{ReceiverEntry, ReceiverId, ReceiverRegistry, SummaryTicket};
pub use summary::{LinkSummary, SummaryContext, RADIUS_TOLERANCE_M};
