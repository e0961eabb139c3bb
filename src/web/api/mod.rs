pub mod error;
pub mod receivers;
pub mod session;
