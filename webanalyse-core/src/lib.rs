pub mod report;
pub mod server;

pub use report::{ReportFormat, generate_report};
pub use server::{ServerConfig, serve, shutdown_signal};
