//! Basic logger usage example
//!
//! Demonstrates a console-only logger built by hand and the five log levels.
//!
//! Run with: cargo run --example basic_usage

use chrono::Local;
use rust_logger_pipeline::prelude::*;
use rust_logger_pipeline::{info, warning};

fn main() -> Result<()> {
    println!("=== Rust Logger Pipeline - Basic Usage Example ===\n");

    // A logger with a single console sink; no registry or scheduler needed
    let logger = Logger::builder("examples::Basic")
        .display_name("Basic")
        .sink(ConsoleSink::new("Basic"))
        .build();
    logger.prepare_for_period(Local::now())?;

    println!("1. Logging at different levels:");
    logger.trace("This is a trace message");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warning("This is a warning message");
    logger.error("This is an error message");

    println!("\n2. Formatting macros:");
    let port = 8080;
    info!(logger, "Server listening on port {}", port);
    warning!(logger, "Retry attempt {} of {}", 3, 5);

    println!("\n3. Logging an error with its sources:");
    if let Err(e) = LoggingConfig::from_json_str(r#"{ "max_queue_size": 0 }"#) {
        logger.log_error(LogLevel::Error, &e);
    }

    logger.dispose()?;

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
