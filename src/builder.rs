//! Builder pattern for configuring a logger.
//!
//! This module provides a fluent alternative to the functional setters in
//! [`option`](crate::option), ending in a built [`Logger`].
//!
//! # Example
//!
//! ```rust,no_run
//! use logkit::Level;
//!
//! // Console logging
//! let logger = logkit::builder()
//!     .with_level(Level::Debug)
//!     .with_name("worker")
//!     .build()
//!     .expect("Failed to build logger");
//!
//! // Console and rotating file, installed as the global `tracing` default
//! let logger = logkit::builder()
//!     .with_format("json")
//!     .with_file("/var/log/app.log")
//!     .with_rotation(10, 3, 7, true)
//!     .init()
//!     .expect("Failed to initialize logging");
//! ```

use std::path::PathBuf;

use crate::{Level, Logger, OutputPath, Options, Result, init_logging};

/// A builder for configuring and building a [`Logger`].
#[derive(Debug, Clone, Default)]
pub struct LogBuilder {
    options: Options,
}

impl LogBuilder {
    /// Create a new LogBuilder with default options.
    pub fn new() -> Self {
        Self {
            options: Options::new(),
        }
    }

    /// Create a LogBuilder from existing options.
    pub fn from_options(options: Options) -> Self {
        Self { options }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.options.level = level;
        self
    }

    /// Set the record format ("console" or "json").
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.options.format = format.into();
        self
    }

    /// Replace the output paths.
    pub fn with_output_paths(mut self, paths: impl IntoIterator<Item = OutputPath>) -> Self {
        self.options.output_paths = paths.into_iter().collect();
        self
    }

    /// Write to a rotating file at `path`, in addition to the current outputs.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.file_path = path.into();
        if !self.options.output_paths.contains(&OutputPath::File) {
            self.options.output_paths.push(OutputPath::File);
        }
        self
    }

    /// Set the rotation thresholds of the file output.
    pub fn with_rotation(
        mut self,
        max_size_mb: u64,
        max_backups: usize,
        max_age_days: u64,
        compress: bool,
    ) -> Self {
        self.options.max_size = max_size_mb;
        self.options.max_backups = max_backups;
        self.options.max_age = max_age_days;
        self.options.compress = compress;
        self
    }

    pub fn with_error_output_paths(
        mut self,
        paths: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.options.error_output_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_enable_color(mut self, enable: bool) -> Self {
        self.options.enable_color = enable;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.options.name = name.into();
        self
    }

    pub fn with_development(mut self, development: bool) -> Self {
        self.options.development = development;
        self
    }

    pub fn with_disable_caller(mut self, disable: bool) -> Self {
        self.options.disable_caller = disable;
        self
    }

    pub fn with_disable_stacktrace(mut self, disable: bool) -> Self {
        self.options.disable_stacktrace = disable;
        self
    }

    /// Get the current options without building.
    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn into_options(self) -> Options {
        self.options
    }

    /// Build a logger with the configured options.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - no output path is recognized
    /// - the log file cannot be opened
    pub fn build(self) -> Result<Logger> {
        let mut logger = Logger::with_options(self.options);
        logger.build()?;
        Ok(logger)
    }

    /// Build a logger and install it as the global `tracing` default.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the logger cannot be built
    /// - a global default is already installed
    pub fn init(self) -> Result<Logger> {
        init_logging(self.options)
    }
}
