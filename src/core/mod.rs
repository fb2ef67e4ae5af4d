pub mod logger;

pub use logger::{LogLevel, Logger, LoggerConfig, LoggerError, init_from_args};
