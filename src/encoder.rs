//! Record encoding for console and JSON output.
//!
//! The [`Encoder`] is a `tracing-subscriber` event formatter shared by every
//! sink of a backend. Events emitted by a [`Logger`](crate::Logger) carry their
//! severity, timestamp, call site and structured fields in reserved
//! `logkit.*` fields; plain `tracing` events are formatted from their metadata.

use colored::Colorize;
use serde_json::{Map, Value};
use std::fmt::{self, Write as _};
use std::time::Duration;
use time::{OffsetDateTime, UtcOffset, macros::format_description};
use tracing::field::{Field as TracingField, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, format::Writer};
use tracing_subscriber::registry::LookupSpan;

use crate::Level;

pub const MESSAGE_KEY: &str = "message";
pub const LEVEL_KEY: &str = "level";
pub const TIME_KEY: &str = "timestamp";
pub const NAME_KEY: &str = "logger";
pub const CALLER_KEY: &str = "caller";
pub const STACKTRACE_KEY: &str = "stacktrace";

const FIXED_KEYS: [&str; 6] = [
    MESSAGE_KEY,
    LEVEL_KEY,
    TIME_KEY,
    NAME_KEY,
    CALLER_KEY,
    STACKTRACE_KEY,
];

/// Prefix given to user fields whose key collides with a fixed key.
pub const COLLISION_PREFIX: &str = "fields.";

pub(crate) const SEVERITY_FIELD: &str = "logkit.severity";
pub(crate) const TIMESTAMP_FIELD: &str = "logkit.timestamp";
pub(crate) const CALLER_FIELD: &str = "logkit.caller";
pub(crate) const NAME_FIELD: &str = "logkit.logger";
pub(crate) const STACKTRACE_FIELD: &str = "logkit.stacktrace";
pub(crate) const FIELDS_FIELD: &str = "logkit.fields";

/// Format a timestamp as UTC `YYYY-MM-DD HH:MM:SS`.
pub fn encode_time(t: OffsetDateTime) -> String {
    t.to_offset(UtcOffset::UTC)
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .unwrap_or_default()
}

/// Express a duration in fractional milliseconds.
pub fn encode_duration(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Output encoding selected by `Options::format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Console,
    Json,
}

impl Encoding {
    pub fn from_format(format: &str) -> Self {
        if format.eq_ignore_ascii_case("json") {
            Encoding::Json
        } else {
            Encoding::Console
        }
    }
}

/// Event formatter writing one line per record.
#[derive(Debug, Clone, Copy)]
pub struct Encoder {
    encoding: Encoding,
}

impl Encoder {
    pub fn new(encoding: Encoding) -> Self {
        Self { encoding }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    fn write_console(&self, w: &mut impl fmt::Write, record: &Record, ansi: bool) -> fmt::Result {
        w.write_str(&record.timestamp)?;
        if ansi {
            write!(w, "\t{}", record.level.as_str().color(record.level.color()))?;
        } else {
            write!(w, "\t{}", record.level)?;
        }
        if !record.logger.is_empty() {
            write!(w, "\t{}", record.logger)?;
        }
        if !record.caller.is_empty() {
            write!(w, "\t{}", record.caller)?;
        }
        write!(w, "\t{}", record.message)?;
        if !record.fields.is_empty() {
            write!(w, "\t{}", Value::Object(record.fields.clone()))?;
        }
        writeln!(w)?;
        if !record.stacktrace.is_empty() {
            writeln!(w, "{}", record.stacktrace.trim_end())?;
        }
        Ok(())
    }

    fn write_json(&self, w: &mut impl fmt::Write, record: &Record) -> fmt::Result {
        let mut object = Map::new();
        object.insert(LEVEL_KEY.into(), Value::from(record.level.as_str()));
        object.insert(TIME_KEY.into(), Value::from(record.timestamp.as_str()));
        if !record.logger.is_empty() {
            object.insert(NAME_KEY.into(), Value::from(record.logger.as_str()));
        }
        if !record.caller.is_empty() {
            object.insert(CALLER_KEY.into(), Value::from(record.caller.as_str()));
        }
        object.insert(MESSAGE_KEY.into(), Value::from(record.message.as_str()));
        for (key, value) in &record.fields {
            let key = if FIXED_KEYS.contains(&key.as_str()) {
                format!("{}{}", COLLISION_PREFIX, key)
            } else {
                key.clone()
            };
            object.insert(key, value.clone());
        }
        if !record.stacktrace.is_empty() {
            object.insert(STACKTRACE_KEY.into(), Value::from(record.stacktrace.as_str()));
        }
        writeln!(w, "{}", Value::Object(object))
    }
}

impl<S, N> FormatEvent<S, N> for Encoder
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let record = Record::from_event(event);
        match self.encoding {
            Encoding::Console => {
                let ansi = writer.has_ansi_escapes();
                self.write_console(&mut writer, &record, ansi)
            }
            Encoding::Json => self.write_json(&mut writer, &record),
        }
    }
}

/// Everything the encoder needs from one event.
#[derive(Debug)]
struct Record {
    level: Level,
    timestamp: String,
    logger: String,
    caller: String,
    message: String,
    fields: Map<String, Value>,
    stacktrace: String,
}

impl Record {
    fn from_event(event: &Event<'_>) -> Self {
        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);

        let metadata = event.metadata();
        let level = visitor
            .severity
            .and_then(|s| i8::try_from(s).ok())
            .and_then(Level::from_i8)
            .unwrap_or_else(|| Level::from_tracing(metadata.level()));
        let timestamp = visitor
            .timestamp
            .unwrap_or_else(|| encode_time(OffsetDateTime::now_utc()));
        let caller = visitor.caller.unwrap_or_else(|| match (metadata.file(), metadata.line()) {
            (Some(file), Some(line)) => format!("{}:{}", file, line),
            (Some(file), None) => file.to_string(),
            _ => String::new(),
        });

        Self {
            level,
            timestamp,
            logger: visitor.logger.unwrap_or_default(),
            caller,
            message: visitor.message,
            fields: visitor.fields,
            stacktrace: visitor.stacktrace.unwrap_or_default(),
        }
    }
}

#[derive(Default)]
struct RecordVisitor {
    message: String,
    severity: Option<i64>,
    timestamp: Option<String>,
    caller: Option<String>,
    logger: Option<String>,
    stacktrace: Option<String>,
    fields: Map<String, Value>,
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &TracingField, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            TIMESTAMP_FIELD => self.timestamp = non_empty(value),
            CALLER_FIELD => self.caller = non_empty(value),
            NAME_FIELD => self.logger = non_empty(value),
            STACKTRACE_FIELD => self.stacktrace = non_empty(value),
            FIELDS_FIELD => {
                if value.is_empty() {
                    return;
                }
                match serde_json::from_str::<Map<String, Value>>(value) {
                    Ok(map) => self.fields.extend(map),
                    Err(_) => {
                        self.fields.insert("fields".into(), Value::from(value));
                    }
                }
            }
            name => {
                self.fields.insert(name.to_string(), Value::from(value));
            }
        }
    }

    fn record_i64(&mut self, field: &TracingField, value: i64) {
        if field.name() == SEVERITY_FIELD {
            self.severity = Some(value);
        } else {
            self.fields.insert(field.name().to_string(), Value::from(value));
        }
    }

    fn record_u64(&mut self, field: &TracingField, value: u64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_f64(&mut self, field: &TracingField, value: f64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &TracingField, value: bool) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_error(
        &mut self,
        field: &TracingField,
        value: &(dyn std::error::Error + 'static),
    ) {
        self.fields
            .insert(field.name().to_string(), Value::from(value.to_string()));
    }

    fn record_debug(&mut self, field: &TracingField, value: &dyn fmt::Debug) {
        let mut rendered = String::new();
        let _ = write!(rendered, "{:?}", value);
        if field.name() == "message" {
            self.message = rendered;
        } else {
            self.fields
                .insert(field.name().to_string(), Value::from(rendered));
        }
    }
}
