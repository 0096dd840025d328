//! File logging example
//!
//! Demonstrates driving a daily file sink by hand: opening a period,
//! buffering, soft and forced flushes, and rotating to the next day.
//!
//! Run with: cargo run --example file_logging

use chrono::{Duration, Local};
use rust_logger_pipeline::prelude::*;

fn main() -> Result<()> {
    println!("=== Rust Logger Pipeline - File Logging Example ===\n");

    let logger = Logger::builder("examples::Files")
        .display_name("Files")
        .sink(FileSink::new("Files", "logs", 5))
        .sink(ConsoleSink::new("Files"))
        .build();

    let today = Local::now();
    logger.prepare_for_period(today)?;

    println!("1. Logging to both console and file:");
    logger.info("Application started");
    logger.debug("Loading configuration...");
    logger.warning("Using default settings for some options");

    let file = logger.sinks()[0]
        .as_file()
        .ok_or_else(|| LoggerError::other("first sink is not a file sink"))?;

    println!("\n2. Soft flush with {} lines buffered:", file.pending());
    logger.flush(false)?;
    println!("   still buffered: {}", file.pending());

    for i in 1..=5 {
        logger.info(format!("Processing item {}/5", i));
    }
    logger.flush(false)?;
    println!("   after reaching the threshold: {}", file.pending());

    println!("\n3. Rotating to tomorrow's file:");
    logger.flush(true)?;
    logger.prepare_for_period(today + Duration::days(1))?;
    logger.info("First line of the next day");

    logger.dispose()?;

    println!("\n=== Example completed successfully! ===");
    println!("Check the 'logs' directory for one file per day");

    Ok(())
}
