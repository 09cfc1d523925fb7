//! Logger module
//!
//! Provides logging utilities for the dev server including:
//! - Startup banner
//! - Access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to access log
fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Print the two banner lines once the listener is bound
pub fn log_server_start(config: &Config) {
    let port = config.server.port;
    println!("☕ devserve starting on {}", config.local_url());
    println!("👉 To reach it from your phone, run: tailscale serve --bg {port}");
}

pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    write_error(&format!("[ERROR] Failed to serve connection: {err}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Report a fatal startup failure
///
/// Goes straight to stderr: the writer may be the thing that failed.
pub fn log_fatal(err: &impl std::fmt::Display) {
    eprintln!("[FATAL] {err}");
}

pub fn log_shutdown(signal: &str) {
    write_access(&format!("\n[SIGNAL] {signal} received, shutting down"));
}
