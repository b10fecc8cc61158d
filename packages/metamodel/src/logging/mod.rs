//! Logging
//!
//! Logger abstraction used by the metamodel engine.

mod console_logger;
mod logger;

pub use console_logger::ConsoleLogger;
pub use logger::{LogLevel, Logger, NullLogger};
