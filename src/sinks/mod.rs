//! Sink implementations

pub mod console;
pub mod file;

pub use console::ConsoleSink;
pub use file::FileSink;

pub use crate::core::{AnySink, Sink};
