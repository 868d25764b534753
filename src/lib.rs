pub mod api;
pub mod audio;
pub mod config;
pub mod feedback;
mod logging;
pub mod session;
pub mod speech;
pub mod store;
mod telemetry;

pub use logging::{init_logging, log_debug, log_debug_content, log_file_path};
pub use telemetry::init_tracing;
