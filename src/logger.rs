//! The logging facade.
//!
//! A [`Logger`] holds its options behind a mutex and, once built, a shared
//! backend. Derived loggers created with [`Logger::with_values`] share the
//! backend and carry extra context fields on every record.
//!
//! ```rust
//! use logkit::{Field, Logger, kv};
//!
//! let mut logger = Logger::new();
//! logger.build().unwrap();
//!
//! logger.info("server started", &[Field::int("port", 8080)]);
//! logger.infof(format_args!("listening on {}", "0.0.0.0"));
//! logger.infow("request served", &kv!["path", "/health", "status", 200]);
//!
//! let request_logger = logger.with_values(&kv!["request_id", "r-42"]);
//! request_logger.warn("slow response", &[]);
//! logger.flush();
//! ```

use std::fmt;
use std::panic::Location;
use std::sync::{Arc, Mutex, PoisonError};

use crate::backend::Backend;
use crate::entry::Entry;
use crate::field::pair_values;
use crate::option::{self, LogOption};
use crate::{Field, FieldValue, Level, Options, Result};

/// Message of the record reporting a key passed without a value.
const DANGLING_KEY_MESSAGE: &str = "Ignored key without a value.";

/// A leveled, structured logger.
#[derive(Debug, Clone)]
pub struct Logger {
    options: Arc<Mutex<Options>>,
    backend: Option<Arc<Backend>>,
    context: Arc<[Field]>,
}

impl Logger {
    /// Create an unbuilt logger with default options.
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// Create an unbuilt logger with the given options.
    pub fn with_options(options: Options) -> Self {
        Self {
            options: Arc::new(Mutex::new(options)),
            backend: None,
            context: Arc::from(Vec::new()),
        }
    }

    /// Apply setters to the stored options. They take effect on the next [`build`](Self::build).
    pub fn set_options(&self, options: impl IntoIterator<Item = LogOption>) {
        let mut opts = self.options.lock().unwrap_or_else(PoisonError::into_inner);
        option::apply(&mut opts, options);
    }

    /// A snapshot of the current options.
    pub fn options(&self) -> Options {
        self.options
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Build the backend from the current options.
    ///
    /// On failure the logger keeps its previous backend, if any.
    pub fn build(&mut self) -> Result<()> {
        let backend = self.options().build()?;
        self.backend = Some(Arc::new(backend));
        Ok(())
    }

    pub(crate) fn from_backend(options: Options, backend: Backend) -> Self {
        Self {
            backend: Some(Arc::new(backend)),
            ..Self::with_options(options)
        }
    }

    pub fn is_built(&self) -> bool {
        self.backend.is_some()
    }

    pub fn backend(&self) -> Option<&Backend> {
        self.backend.as_deref()
    }

    /// Fields bound to this logger.
    pub fn context(&self) -> &[Field] {
        &self.context
    }

    /// Derive a logger carrying extra context fields.
    ///
    /// `keys_and_values` alternates keys and values; a trailing key without a
    /// value is bound to `"MISSING"`. With no arguments the logger itself is
    /// returned.
    pub fn with_values(&self, keys_and_values: &[FieldValue]) -> Logger {
        if keys_and_values.is_empty() {
            return self.clone();
        }

        let context: Vec<Field> = self
            .context
            .iter()
            .cloned()
            .chain(pair_values(keys_and_values))
            .collect();

        Logger {
            options: Arc::new(Mutex::new(self.options())),
            backend: self.backend.clone(),
            context: Arc::from(context),
        }
    }

    /// Flush every sink. Errors are discarded.
    pub fn flush(&self) {
        if let Some(backend) = &self.backend {
            let _ = backend.flush();
        }
    }

    /// A guard that flushes this logger when dropped.
    pub fn flush_guard(&self) -> FlushGuard {
        FlushGuard {
            logger: self.clone(),
        }
    }

    fn log(
        &self,
        level: Level,
        message: String,
        fields: &[Field],
        caller: &'static Location<'static>,
    ) {
        let Some(backend) = &self.backend else {
            return;
        };
        if !backend.enabled(level) {
            return;
        }
        let entry = Entry::new(level, message, caller, &self.context, fields);
        backend.emit(&entry);
    }

    /// Drop a trailing key without a value, reporting it at Error level.
    fn paired(
        &self,
        keys_and_values: &[FieldValue],
        caller: &'static Location<'static>,
    ) -> Vec<Field> {
        let pairs = match keys_and_values.split_last() {
            Some((dangling, rest)) if keys_and_values.len() % 2 == 1 => {
                self.log(
                    Level::Error,
                    DANGLING_KEY_MESSAGE.to_string(),
                    &[Field::string("ignored", dangling.to_string())],
                    caller,
                );
                rest
            }
            _ => keys_and_values,
        };
        pair_values(pairs)
    }

    fn panic_with(&self, message: String, fields: &[Field], caller: &'static Location<'static>) -> ! {
        self.log(Level::Panic, message.clone(), fields, caller);
        self.flush();
        panic!("{}", message)
    }

    fn fatal_with(&self, message: String, fields: &[Field], caller: &'static Location<'static>) -> ! {
        self.log(Level::Fatal, message, fields, caller);
        self.flush();
        std::process::exit(1)
    }

    #[track_caller]
    pub fn debug(&self, msg: &str, fields: &[Field]) {
        self.log(Level::Debug, msg.to_string(), fields, Location::caller());
    }

    #[track_caller]
    pub fn info(&self, msg: &str, fields: &[Field]) {
        self.log(Level::Info, msg.to_string(), fields, Location::caller());
    }

    #[track_caller]
    pub fn warn(&self, msg: &str, fields: &[Field]) {
        self.log(Level::Warn, msg.to_string(), fields, Location::caller());
    }

    #[track_caller]
    pub fn error(&self, msg: &str, fields: &[Field]) {
        self.log(Level::Error, msg.to_string(), fields, Location::caller());
    }

    /// Log at Panic level, then panic with `msg`.
    #[track_caller]
    pub fn panic(&self, msg: &str, fields: &[Field]) -> ! {
        self.panic_with(msg.to_string(), fields, Location::caller())
    }

    /// Log at Fatal level, flush, then exit the process with status 1.
    #[track_caller]
    pub fn fatal(&self, msg: &str, fields: &[Field]) -> ! {
        self.fatal_with(msg.to_string(), fields, Location::caller())
    }

    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args.to_string(), &[], Location::caller());
    }

    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args.to_string(), &[], Location::caller());
    }

    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args.to_string(), &[], Location::caller());
    }

    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args.to_string(), &[], Location::caller());
    }

    #[track_caller]
    pub fn panicf(&self, args: fmt::Arguments<'_>) -> ! {
        self.panic_with(args.to_string(), &[], Location::caller())
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        self.fatal_with(args.to_string(), &[], Location::caller())
    }

    #[track_caller]
    pub fn debugw(&self, msg: &str, keys_and_values: &[FieldValue]) {
        let caller = Location::caller();
        let fields = self.paired(keys_and_values, caller);
        self.log(Level::Debug, msg.to_string(), &fields, caller);
    }

    #[track_caller]
    pub fn infow(&self, msg: &str, keys_and_values: &[FieldValue]) {
        let caller = Location::caller();
        let fields = self.paired(keys_and_values, caller);
        self.log(Level::Info, msg.to_string(), &fields, caller);
    }

    #[track_caller]
    pub fn warnw(&self, msg: &str, keys_and_values: &[FieldValue]) {
        let caller = Location::caller();
        let fields = self.paired(keys_and_values, caller);
        self.log(Level::Warn, msg.to_string(), &fields, caller);
    }

    #[track_caller]
    pub fn errorw(&self, msg: &str, keys_and_values: &[FieldValue]) {
        let caller = Location::caller();
        let fields = self.paired(keys_and_values, caller);
        self.log(Level::Error, msg.to_string(), &fields, caller);
    }

    #[track_caller]
    pub fn panicw(&self, msg: &str, keys_and_values: &[FieldValue]) -> ! {
        let caller = Location::caller();
        let fields = self.paired(keys_and_values, caller);
        self.panic_with(msg.to_string(), &fields, caller)
    }

    #[track_caller]
    pub fn fatalw(&self, msg: &str, keys_and_values: &[FieldValue]) -> ! {
        let caller = Location::caller();
        let fields = self.paired(keys_and_values, caller);
        self.fatal_with(msg.to_string(), &fields, caller)
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// Flushes its logger when dropped.
#[must_use = "the logger is flushed when the guard is dropped"]
#[derive(Debug)]
pub struct FlushGuard {
    logger: Logger,
}

impl Drop for FlushGuard {
    fn drop(&mut self) {
        self.logger.flush();
    }
}
