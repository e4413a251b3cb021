//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON, pretty or compact terminal output on stderr
//! - Rolling JSON log files
//! - Secret scrubbing of every written line

pub mod config;
pub mod logger;
pub mod secret_scrubbing;

pub use config::{LogConfig, LogFormat, RotationPolicy};
pub use logger::LoggerImpl;
pub use secret_scrubbing::{scrub_secrets, ScrubbingMakeWriter, SecretScrubber};
