//! Integration tests for the logger pipeline
//!
//! These tests verify:
//! - Log injection prevention
//! - Line and file name format
//! - Registry lifecycle with the scheduler running
//! - The process-wide registry
//! - Configuration loading

use chrono::{Local, NaiveDateTime};
use rust_logger_pipeline::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(String::from)
        .collect()
}

fn today_file(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}_{}.log", name, Local::now().format("%Y-%m-%d")))
}

fn quiet_config(dir: &Path) -> LoggingConfig {
    LoggingConfig::builder()
        .log_directory(dir)
        .max_log_age(Duration::from_secs(600))
        .max_queue_size(10_000)
        .build()
        .expect("valid config")
}

#[test]
fn test_log_injection_prevention() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let registry = LoggerRegistry::new(quiet_config(temp_dir.path())).unwrap();
    let logger = registry.get_logger("Injection", SinkSet::FILE, None).unwrap();

    let malicious_message = "User login\nError [2024-10-17] Fake error injected\r\n\tContinuation";
    logger.info(malicious_message);
    registry.shutdown().unwrap();

    let lines = read_lines(&today_file(temp_dir.path(), "Injection"));
    assert_eq!(lines.len(), 1, "Log should be a single line, not multiple");
    assert!(lines[0].ends_with(
        "User login\\nError [2024-10-17] Fake error injected\\r\\n\\tContinuation"
    ));
}

#[test]
fn test_line_format() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let registry = LoggerRegistry::new(quiet_config(temp_dir.path())).unwrap();
    let logger = registry
        .get_logger("app::Billing", SinkSet::FILE, Some("Billing"))
        .unwrap();

    logger.warning("card declined");
    registry.shutdown().unwrap();

    let lines = read_lines(&today_file(temp_dir.path(), "Billing"));
    assert_eq!(lines.len(), 1);
    let line = &lines[0];

    let (timestamp, rest) = line.split_at(19);
    NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S")
        .expect("line starts with a timestamp");
    assert!(rest.starts_with("|Billing|Warning [|"));
    assert!(rest.contains("integration_tests.rs:"));
    assert!(rest.ends_with("] card declined"));
}

#[test]
fn test_macros_record_module_path() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let registry = LoggerRegistry::new(quiet_config(temp_dir.path())).unwrap();
    let logger = registry.get_logger("Macros", SinkSet::FILE, None).unwrap();

    rust_logger_pipeline::error!(logger, "request {} failed", 17);
    registry.shutdown().unwrap();

    let lines = read_lines(&today_file(temp_dir.path(), "Macros"));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("|Macros|Error [integration_tests|"));
    assert!(lines[0].ends_with("] request 17 failed"));
}

#[test]
fn test_loggers_write_separate_files() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let registry = LoggerRegistry::new(quiet_config(temp_dir.path())).unwrap();
    registry.start().unwrap();

    let orders = registry.get_logger("Orders", SinkSet::FILE, None).unwrap();
    let payments = registry.get_logger("Payments", SinkSet::FILE, None).unwrap();
    for i in 0..20 {
        orders.info(format!("order {}", i));
        payments.debug(format!("payment {}", i));
    }
    registry.shutdown().unwrap();

    let order_lines = read_lines(&today_file(temp_dir.path(), "Orders"));
    let payment_lines = read_lines(&today_file(temp_dir.path(), "Payments"));
    assert_eq!(order_lines.len(), 20);
    assert_eq!(payment_lines.len(), 20);
    for (i, line) in order_lines.iter().enumerate() {
        assert!(line.ends_with(&format!("] order {}", i)));
    }
    assert!(payment_lines.iter().all(|l| l.contains("|Payments|Debug [")));
}

#[test]
fn test_log_error_chain_reaches_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let registry = LoggerRegistry::new(quiet_config(temp_dir.path())).unwrap();
    let logger = registry.get_logger("Errors", SinkSet::FILE, None).unwrap();

    let err = LoggingConfig::from_json_str("{ not json").unwrap_err();
    logger.log_error(LogLevel::Error, &err);
    registry.shutdown().unwrap();

    let lines = read_lines(&today_file(temp_dir.path(), "Errors"));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("|Errors|Error ["));
    assert!(lines[0].contains("JSON error:"));
}

#[test]
fn test_flush_all_writes_without_scheduler() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let registry = LoggerRegistry::new(quiet_config(temp_dir.path())).unwrap();
    let logger = registry.get_logger("Manual", SinkSet::FILE, None).unwrap();

    logger.info("one");
    registry.flush_all(false).unwrap();
    assert!(read_lines(&today_file(temp_dir.path(), "Manual")).is_empty());

    registry.flush_all(true).unwrap();
    assert_eq!(read_lines(&today_file(temp_dir.path(), "Manual")).len(), 1);
}

#[test]
fn test_registry_from_json_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_dir = temp_dir.path().join("from_json");
    let config_path = temp_dir.path().join("logging.json");
    fs::write(
        &config_path,
        format!(
            r#"{{ "log_directory": {}, "max_log_age_ms": 20, "max_queue_size": 1000 }}"#,
            serde_json::to_string(&log_dir).unwrap()
        ),
    )
    .unwrap();

    let config = LoggingConfig::from_json_file(&config_path).unwrap();
    let registry = LoggerRegistry::new(config).unwrap();
    registry.start().unwrap();

    let logger = registry.get_logger("Json", SinkSet::FILE, None).unwrap();
    logger.info("configured from file");

    let path = today_file(&log_dir, "Json");
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while read_lines(&path).is_empty() && std::time::Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(read_lines(&path).len(), 1);
    registry.shutdown().unwrap();
}

#[test]
fn test_global_registry_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let registry = rust_logger_pipeline::init(quiet_config(temp_dir.path())).unwrap();
    assert!(registry.is_running());
    assert!(rust_logger_pipeline::init(LoggingConfig::default()).is_err());

    let logger = rust_logger_pipeline::get_logger("Global", SinkSet::FILE, None).unwrap();
    let again = rust_logger_pipeline::get_logger("Global", SinkSet::ALL, None).unwrap();
    assert!(std::sync::Arc::ptr_eq(&logger, &again));

    logger.info("through the global registry");
    rust_logger_pipeline::shutdown().unwrap();

    assert_eq!(read_lines(&today_file(temp_dir.path(), "Global")).len(), 1);
    assert!(matches!(
        rust_logger_pipeline::get_logger("Global", SinkSet::FILE, None),
        Err(LoggerError::LoggerStopped)
    ));
    rust_logger_pipeline::shutdown().unwrap();
}
