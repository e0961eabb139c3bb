mod debounce;
mod error;
mod notice;
mod session;
mod stream;
mod transmitter;

pub use error::SessionError;
pub use notice::{Notice, NoticeLevel};
pub use session::{
    CoverageParams, CoverageSession, CoverageState, SessionSettings, SessionSnapshot,
    SessionStatus,
};
pub use transmitter::Transmitter;
