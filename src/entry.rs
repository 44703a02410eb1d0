use std::backtrace::Backtrace;
use std::panic::Location;
use time::OffsetDateTime;

use crate::backend::STACKTRACE_LEVEL;
use crate::encoder::encode_time;
use crate::field::fields_to_map;
use crate::{Field, Level};

/// A single log call, captured before it is handed to the backend.
#[derive(Debug)]
pub struct Entry<'a> {
    pub level: Level,
    pub time: OffsetDateTime,
    pub caller: &'static Location<'static>,
    pub message: String,
    /// Fields bound to the logger.
    pub context: &'a [Field],
    /// Fields passed with this call.
    pub fields: &'a [Field],
    pub stacktrace: Option<String>,
}

impl<'a> Entry<'a> {
    pub fn new(
        level: Level,
        message: String,
        caller: &'static Location<'static>,
        context: &'a [Field],
        fields: &'a [Field],
    ) -> Self {
        let stacktrace =
            (level >= STACKTRACE_LEVEL).then(|| Backtrace::force_capture().to_string());
        Self {
            level,
            time: OffsetDateTime::now_utc(),
            caller,
            message,
            context,
            fields,
            stacktrace,
        }
    }

    pub fn timestamp(&self) -> String {
        encode_time(self.time)
    }

    pub fn caller(&self) -> String {
        format!("{}:{}", self.caller.file(), self.caller.line())
    }

    /// Context and call fields as one JSON object, or an empty string when there are none.
    pub fn fields_json(&self) -> String {
        if self.context.is_empty() && self.fields.is_empty() {
            return String::new();
        }
        serde_json::Value::Object(fields_to_map(self.context.iter().chain(self.fields))).to_string()
    }
}
