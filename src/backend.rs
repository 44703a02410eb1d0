//! The built logging backend: one `tracing` dispatcher fanning out to every sink.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::Dispatch;
use tracing_subscriber::filter::{FilterExt, filter_fn};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::{EnvFilter, Registry};

use crate::encoder::{Encoder, SEVERITY_FIELD};
use crate::entry::Entry;
use crate::{Error, Level, Result};

/// Records at or above this level carry a stack trace.
pub const STACKTRACE_LEVEL: Level = Level::Panic;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// A shared, mutex-guarded output destination.
#[derive(Clone)]
pub struct Sink {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Sink {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn flush(&self) -> io::Result<()> {
        self.lock().flush()
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink").finish_non_exhaustive()
    }
}

/// Exclusive access to a sink for the duration of one record.
pub struct SinkWriter<'a>(MutexGuard<'a, Box<dyn Write + Send>>);

impl Write for SinkWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<'a> MakeWriter<'a> for Sink {
    type Writer = SinkWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        SinkWriter(self.lock())
    }
}

/// One output of a backend.
#[derive(Debug, Clone)]
pub(crate) struct SinkSpec {
    pub sink: Sink,
    pub ansi: bool,
}

/// An initialized logger backend.
pub struct Backend {
    dispatch: Dispatch,
    level: Level,
    name: String,
    sinks: Vec<Sink>,
}

impl Backend {
    /// Assemble a backend writing every record to every sink.
    pub(crate) fn new(
        level: Level,
        name: &str,
        encoder: Encoder,
        sinks: Vec<SinkSpec>,
        filter: &str,
        log_internal_errors: bool,
    ) -> Result<Self> {
        if sinks.is_empty() {
            return Err(Error::Config("no valid output paths configured".to_string()));
        }

        let env_filter = EnvFilter::try_new(filter)
            .map_err(|e| Error::Config(format!("invalid filter {:?}: {}", filter, e)))?;
        // Logger events carry their own level, checked in `emit`.
        let logger_events = filter_fn(|metadata| metadata.fields().field(SEVERITY_FIELD).is_some());

        let layers: Vec<BoxedLayer> = sinks
            .iter()
            .map(|spec| -> BoxedLayer {
                tracing_subscriber::fmt::layer()
                    .event_format(encoder)
                    .with_writer(spec.sink.clone())
                    .with_ansi(spec.ansi)
                    .log_internal_errors(log_internal_errors)
                    .boxed()
            })
            .collect();

        let subscriber =
            tracing_subscriber::registry().with(layers.with_filter(env_filter.or(logger_events)));

        Ok(Self {
            dispatch: Dispatch::new(subscriber),
            level,
            name: name.to_string(),
            sinks: sinks.into_iter().map(|spec| spec.sink).collect(),
        })
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Flush every sink, returning the first failure.
    pub fn flush(&self) -> io::Result<()> {
        let mut result = Ok(());
        for sink in &self.sinks {
            if let Err(e) = sink.flush()
                && result.is_ok()
            {
                result = Err(e);
            }
        }
        result
    }

    pub(crate) fn emit(&self, entry: &Entry<'_>) {
        if !self.enabled(entry.level) {
            return;
        }
        let timestamp = entry.timestamp();
        let caller = entry.caller();
        let fields = entry.fields_json();
        let stacktrace = entry.stacktrace.as_deref().unwrap_or("");
        let severity = i64::from(entry.level.as_i8());
        let name = self.name.as_str();

        macro_rules! emit_at {
            ($level:expr) => {
                tracing::event!(
                    $level,
                    logkit.severity = severity,
                    logkit.timestamp = timestamp.as_str(),
                    logkit.caller = caller.as_str(),
                    logkit.logger = name,
                    logkit.stacktrace = stacktrace,
                    logkit.fields = fields.as_str(),
                    "{}",
                    entry.message
                )
            };
        }

        tracing::dispatcher::with_default(&self.dispatch, || match entry.level {
            Level::Debug => emit_at!(tracing::Level::DEBUG),
            Level::Info => emit_at!(tracing::Level::INFO),
            Level::Warn => emit_at!(tracing::Level::WARN),
            Level::Error | Level::Panic | Level::Fatal => emit_at!(tracing::Level::ERROR),
        });
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("level", &self.level)
            .field("name", &self.name)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

/// In-memory sink target for tests.
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct CaptureBuffer(Arc<Mutex<Vec<u8>>>);

#[cfg(test)]
impl CaptureBuffer {
    pub(crate) fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

#[cfg(test)]
impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
