//! # Logkit
//!
//! A structured logging facade with multi-sink output and rotating log files.
//!
//! ## Features
//!
//! - Leveled, printf-style and key-value logging methods
//! - Console and JSON records written to stdout and a rotating file at once
//! - Size-based rotation with backup count, age limit and gzip compression
//! - Derived loggers carrying bound context fields
//! - Configuration through setters, a builder, serde or command-line flags
//! - Integration with the `tracing` ecosystem
//!
//! ## Example
//!
//! ```rust
//! use logkit::{Field, Level, Logger, kv, option};
//!
//! let mut logger = Logger::new();
//! logger.set_options([option::with_level(Level::Debug), option::with_name("demo")]);
//! logger.build()?;
//!
//! logger.debugf(format_args!("cache warmed in {}ms", 12));
//! logger.info("ready", &[Field::int("workers", 4)]);
//! logger
//!     .with_values(&kv!["request_id", "r-1"])
//!     .warnw("slow request", &kv!["elapsed_ms", 950]);
//! logger.flush();
//! # Ok::<(), logkit::Error>(())
//! ```

pub mod backend;
pub mod builder;
pub mod encoder;
pub mod entry;
pub mod error;
pub mod field;
#[cfg(feature = "cli")]
pub mod flags;
pub mod global;
pub mod level;
pub mod logger;
pub mod option;
pub mod options;
pub mod rotation;
pub mod writer;

pub use backend::{Backend, Sink};
pub use builder::LogBuilder;
pub use encoder::{Encoder, Encoding, encode_duration, encode_time};
pub use entry::Entry;
pub use error::{Error, Result};
pub use field::{Field, FieldValue};
#[cfg(feature = "cli")]
pub use flags::LogFlags;
pub use global::init_logging;
pub use level::{LEVEL_NAMES, Level, OutputPath};
pub use logger::{FlushGuard, Logger};
pub use option::LogOption;
pub use options::Options;
pub use rotation::RotationPolicy;
pub use writer::RotatingWriter;

/// Start a [`LogBuilder`] with default options.
pub fn builder() -> LogBuilder {
    LogBuilder::new()
}
