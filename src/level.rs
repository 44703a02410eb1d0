//! Severity levels and output path kinds.

use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::filter::LevelFilter;

use crate::Error;

/// Log severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(i8)]
pub enum Level {
    Debug = -1,
    #[default]
    Info = 0,
    Warn = 1,
    Error = 2,
    /// Logs, then panics.
    Panic = 3,
    /// Logs, then exits the process.
    Fatal = 4,
}

/// Display name of every level.
pub static LEVEL_NAMES: Lazy<HashMap<Level, &'static str>> = Lazy::new(|| {
    Level::ALL
        .iter()
        .map(|level| (*level, level.as_str()))
        .collect()
});

impl Level {
    pub const ALL: [Level; 6] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Panic,
        Level::Fatal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Panic => "PANIC",
            Level::Fatal => "FATAL",
        }
    }

    pub fn as_i8(&self) -> i8 {
        *self as i8
    }

    pub fn from_i8(value: i8) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_i8() == value)
    }

    /// Parse a level name, falling back to `Info` for anything unrecognized.
    pub fn parse_lossy(s: &str) -> Self {
        s.parse().unwrap_or(Level::Info)
    }

    /// The `tracing` level events of this severity are dispatched at.
    pub fn as_tracing(&self) -> tracing::Level {
        match self {
            Level::Debug => tracing::Level::DEBUG,
            Level::Info => tracing::Level::INFO,
            Level::Warn => tracing::Level::WARN,
            Level::Error | Level::Panic | Level::Fatal => tracing::Level::ERROR,
        }
    }

    pub fn from_tracing(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::TRACE | tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            _ => Level::Error,
        }
    }

    pub fn as_filter(&self) -> LevelFilter {
        LevelFilter::from_level(self.as_tracing())
    }

    pub fn color(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            Level::Debug => Magenta,
            Level::Info => Blue,
            Level::Warn => Yellow,
            Level::Error | Level::Panic | Level::Fatal => Red,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Level::Debug),
            "INFO" | "" => Ok(Level::Info),
            "WARN" | "WARNING" => Ok(Level::Warn),
            "ERROR" => Ok(Level::Error),
            "PANIC" => Ok(Level::Panic),
            "FATAL" => Ok(Level::Fatal),
            _ => Err(Error::Config(format!("unrecognized level: {:?}", s))),
        }
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_str().to_ascii_lowercase())
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Level::parse_lossy(&name))
    }
}

/// Where log records are written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OutputPath {
    /// The rotating log file at `Options::file_path`.
    File,
    /// Process standard output.
    Stdout,
    /// Anything else. Accepted in configuration, skipped when building.
    Other(String),
}

impl OutputPath {
    pub fn as_str(&self) -> &str {
        match self {
            OutputPath::File => "file",
            OutputPath::Stdout => "stdout",
            OutputPath::Other(path) => path,
        }
    }
}

impl From<&str> for OutputPath {
    fn from(s: &str) -> Self {
        match s {
            "file" => OutputPath::File,
            "stdout" => OutputPath::Stdout,
            other => OutputPath::Other(other.to_string()),
        }
    }
}

impl From<String> for OutputPath {
    fn from(s: String) -> Self {
        OutputPath::from(s.as_str())
    }
}

impl From<OutputPath> for String {
    fn from(path: OutputPath) -> Self {
        path.as_str().to_string()
    }
}

impl fmt::Display for OutputPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_names_cover_every_level() {
        assert_eq!(LEVEL_NAMES.len(), 6);
        assert_eq!(LEVEL_NAMES[&Level::Debug], "DEBUG");
        assert_eq!(LEVEL_NAMES[&Level::Info], "INFO");
        assert_eq!(LEVEL_NAMES[&Level::Warn], "WARN");
        assert_eq!(LEVEL_NAMES[&Level::Error], "ERROR");
        assert_eq!(LEVEL_NAMES[&Level::Panic], "PANIC");
        assert_eq!(LEVEL_NAMES[&Level::Fatal], "FATAL");
    }

    #[test]
    fn test_level_name_round_trip() {
        for level in Level::ALL {
            let name = LEVEL_NAMES[&level];
            assert_eq!(name.parse::<Level>().unwrap(), level);
            assert_eq!(name.to_lowercase().parse::<Level>().unwrap(), level);
        }
    }

    #[test]
    fn test_level_ordinals() {
        assert_eq!(Level::Debug.as_i8(), -1);
        assert_eq!(Level::Info.as_i8(), 0);
        assert_eq!(Level::Fatal.as_i8(), 4);
        assert_eq!(Level::from_i8(3), Some(Level::Panic));
        assert_eq!(Level::from_i8(9), None);
    }

    #[test]
    fn test_level_ordering() {
        assert!(Level::Fatal > Level::Panic);
        assert!(Level::Panic > Level::Error);
        assert!(Level::Error > Level::Warn);
        assert!(Level::Warn > Level::Info);
        assert!(Level::Info > Level::Debug);
    }

    #[test]
    fn test_parse_lossy_falls_back_to_info() {
        assert_eq!(Level::parse_lossy("verbose"), Level::Info);
        assert_eq!(Level::parse_lossy("Warn"), Level::Warn);
        assert!("verbose".parse::<Level>().is_err());
    }

    #[test]
    fn test_tracing_mapping() {
        assert_eq!(Level::Debug.as_tracing(), tracing::Level::DEBUG);
        assert_eq!(Level::Panic.as_tracing(), tracing::Level::ERROR);
        assert_eq!(Level::Fatal.as_filter(), LevelFilter::ERROR);
        assert_eq!(Level::from_tracing(&tracing::Level::TRACE), Level::Debug);
        assert_eq!(Level::from_tracing(&tracing::Level::WARN), Level::Warn);
    }

    #[test]
    fn test_output_path_from_str() {
        assert_eq!(OutputPath::from("file"), OutputPath::File);
        assert_eq!(OutputPath::from("stdout"), OutputPath::Stdout);
        assert_eq!(
            OutputPath::from("stderr"),
            OutputPath::Other("stderr".to_string())
        );
        assert_eq!(OutputPath::Other("stderr".into()).to_string(), "stderr");
    }
}
