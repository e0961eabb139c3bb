pub mod api;
pub mod api_doc;
pub mod config;
pub mod server;
mod state;

pub use config::Config;
pub use server::{build_router, run_server};
pub use state::{AppState, LiveAdapter};
