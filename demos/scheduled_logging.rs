//! Scheduled logging example
//!
//! Demonstrates the process-wide registry: the scheduler thread flushes and
//! rotates while worker threads only log.
//!
//! Run with: cargo run --example scheduled_logging

use rust_logger_pipeline::prelude::*;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Rust Logger Pipeline - Scheduled Logging Example ===\n");

    let config = LoggingConfig::builder()
        .log_directory("logs")
        .max_log_age(Duration::from_millis(500))
        .max_queue_size(50)
        .build()?;
    rust_logger_pipeline::init(config)?;

    let app = rust_logger_pipeline::get_logger("examples::App", SinkSet::ALL, Some("App"))?;
    app.info("Starting workers");

    let workers: Vec<_> = (0..4)
        .map(|id| {
            thread::spawn(move || -> Result<()> {
                let name = format!("Worker{}", id);
                let logger = rust_logger_pipeline::get_logger(&name, SinkSet::FILE, None)?;
                for job in 0..100 {
                    logger.info(format!("finished job {}", job));
                }
                Ok(())
            })
        })
        .collect();

    for worker in workers {
        worker
            .join()
            .map_err(|_| LoggerError::other("worker thread panicked"))??;
    }

    app.info("All workers done");

    // Statics are not dropped; drain explicitly before exiting
    rust_logger_pipeline::shutdown()?;

    println!("\n=== Example completed successfully! ===");
    println!("Check the 'logs' directory for App and Worker files");

    Ok(())
}
