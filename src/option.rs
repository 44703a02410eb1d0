//! Functional setters for [`Options`].
//!
//! Each setter returns a [`LogOption`] that changes one field. They are
//! applied to a logger with [`Logger::set_options`](crate::Logger::set_options)
//! and take effect on the next [`Logger::build`](crate::Logger::build).
//!
//! ```rust
//! use logkit::{Level, Logger, OutputPath, option};
//!
//! let logger = Logger::new();
//! logger.set_options([
//!     option::with_level(Level::Debug),
//!     option::with_output_paths([OutputPath::Stdout]),
//!     option::with_name("worker"),
//! ]);
//! assert_eq!(logger.options().level, Level::Debug);
//! ```

use std::path::PathBuf;

use crate::{Level, OutputPath, Options};

/// A mutation of one configuration field.
pub type LogOption = Box<dyn FnOnce(&mut Options) + Send>;

pub fn with_level(level: Level) -> LogOption {
    Box::new(move |o| o.level = level)
}

pub fn with_format(format: impl Into<String>) -> LogOption {
    let format = format.into();
    Box::new(move |o| o.format = format)
}

/// Replace the output paths.
pub fn with_output_paths(paths: impl IntoIterator<Item = OutputPath>) -> LogOption {
    let paths: Vec<_> = paths.into_iter().collect();
    Box::new(move |o| o.output_paths = paths)
}

pub fn with_error_output_paths(paths: impl IntoIterator<Item = impl Into<String>>) -> LogOption {
    let paths: Vec<String> = paths.into_iter().map(Into::into).collect();
    Box::new(move |o| o.error_output_paths = paths)
}

pub fn with_disable_caller(disable: bool) -> LogOption {
    Box::new(move |o| o.disable_caller = disable)
}

pub fn with_disable_stacktrace(disable: bool) -> LogOption {
    Box::new(move |o| o.disable_stacktrace = disable)
}

pub fn with_enable_color(enable: bool) -> LogOption {
    Box::new(move |o| o.enable_color = enable)
}

pub fn with_name(name: impl Into<String>) -> LogOption {
    let name = name.into();
    Box::new(move |o| o.name = name)
}

pub fn with_development(development: bool) -> LogOption {
    Box::new(move |o| o.development = development)
}

/// Rotate the log file once it reaches `max_size` megabytes.
pub fn with_max_size(max_size: u64) -> LogOption {
    Box::new(move |o| o.max_size = max_size)
}

pub fn with_max_backups(max_backups: usize) -> LogOption {
    Box::new(move |o| o.max_backups = max_backups)
}

/// Remove rotated files older than `max_age` days.
pub fn with_max_age(max_age: u64) -> LogOption {
    Box::new(move |o| o.max_age = max_age)
}

pub fn with_compress(compress: bool) -> LogOption {
    Box::new(move |o| o.compress = compress)
}

pub fn with_file_path(path: impl Into<PathBuf>) -> LogOption {
    let path = path.into();
    Box::new(move |o| o.file_path = path)
}

/// Apply options in order to `opts`.
pub fn apply(opts: &mut Options, options: impl IntoIterator<Item = LogOption>) {
    for option in options {
        option(opts);
    }
}
