//! Basic console logging example.
//!
//! This example demonstrates the leveled, formatted and key-value methods,
//! a derived logger carrying context, and `tracing` events reaching the
//! same output once the logger is installed globally.

use logkit::{Field, Level, kv};
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Build and install with the builder API
    let logger = logkit::builder()
        .with_level(Level::Debug)
        .with_name("basic")
        .init()?;
    let _guard = logger.flush_guard();

    logger.debug("This is a debug message", &[]);
    logger.info(
        "Server started",
        &[Field::int("port", 8080), Field::duration("boot", Duration::from_millis(42))],
    );
    logger.warnf(format_args!("Disk usage at {}%", 91));
    logger.errorw("Request failed", &kv!["path", "/api/users", "status", 502]);

    let request = logger.with_values(&kv!["request_id", "r-1234"]);
    request.info("Handled by derived logger", &[]);

    tracing::info!(component = "scheduler", "This comes from tracing");

    Ok(())
}
