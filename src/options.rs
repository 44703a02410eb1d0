use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::backend::{Backend, Sink, SinkSpec};
use crate::encoder::{Encoder, Encoding};
use crate::rotation::{DEFAULT_MAX_AGE_DAYS, DEFAULT_MAX_BACKUPS, DEFAULT_MAX_SIZE_MB};
use crate::{Error, Level, OutputPath, Result, RotatingWriter, RotationPolicy};

pub const CONSOLE_FORMAT: &str = "console";
pub const JSON_FORMAT: &str = "json";

/// Configuration for a [`Logger`](crate::Logger)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Options {
    /// Sinks every record is written to (`stdout`, `file`)
    pub output_paths: Vec<OutputPath>,
    /// Path of the rotating log file used by the `file` output
    #[serde(rename = "file")]
    pub file_path: PathBuf,
    /// Where write failures of the sinks themselves are reported
    pub error_output_paths: Vec<String>,
    /// Minimum level written
    pub level: Level,
    /// Record format ("console" or "json")
    pub format: String,
    pub disable_caller: bool,
    pub disable_stacktrace: bool,
    /// Colorize level names on console output
    pub enable_color: bool,
    pub development: bool,
    /// Size in megabytes before the log file is rotated
    pub max_size: u64,
    /// Rotated files to keep
    pub max_backups: usize,
    /// Days to keep rotated files
    pub max_age: u64,
    /// Gzip rotated files
    pub compress: bool,
    /// Logger name attached to every record
    pub name: String,
}

impl Options {
    /// Create options with defaults: info level, console format, stdout only.
    pub fn new() -> Self {
        Self {
            output_paths: vec![OutputPath::Stdout],
            file_path: PathBuf::from("./log/app.log"),
            error_output_paths: vec!["stderr".to_string()],
            level: Level::Info,
            format: CONSOLE_FORMAT.to_string(),
            disable_caller: false,
            disable_stacktrace: false,
            enable_color: true,
            development: false,
            max_size: DEFAULT_MAX_SIZE_MB,
            max_backups: DEFAULT_MAX_BACKUPS,
            max_age: DEFAULT_MAX_AGE_DAYS,
            compress: false,
            name: "app-logger".to_string(),
        }
    }

    /// Check the options, returning every problem found.
    pub fn validate(&self) -> Vec<Error> {
        let mut errs = Vec::new();

        let format = self.format.to_ascii_lowercase();
        if format != CONSOLE_FORMAT && format != JSON_FORMAT {
            errs.push(Error::Config(format!(
                "not a valid log format: {:?}",
                self.format
            )));
        }

        errs
    }

    pub fn encoding(&self) -> Encoding {
        Encoding::from_format(&self.format)
    }

    pub fn rotation_policy(&self) -> RotationPolicy {
        RotationPolicy::new(self.max_size, self.max_backups, self.max_age, self.compress)
    }

    /// Build a backend writing to the configured output paths.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - no output path is recognized
    /// - the log file cannot be opened
    pub fn build(&self) -> Result<Backend> {
        self.build_with(Sink::stdout(), &self.level.as_filter().to_string())
    }

    pub(crate) fn build_with(&self, stdout: Sink, filter: &str) -> Result<Backend> {
        let encoding = self.encoding();
        let mut file_sink: Option<Sink> = None;
        let mut sinks = Vec::with_capacity(self.output_paths.len());

        for path in &self.output_paths {
            let spec = match path {
                OutputPath::Stdout => SinkSpec {
                    sink: stdout.clone(),
                    ansi: self.enable_color && encoding == Encoding::Console,
                },
                OutputPath::File => {
                    let sink = match &file_sink {
                        Some(sink) => sink.clone(),
                        None => {
                            let writer =
                                RotatingWriter::new(&self.file_path, self.rotation_policy())?;
                            file_sink.insert(Sink::new(writer)).clone()
                        }
                    };
                    SinkSpec { sink, ansi: false }
                }
                OutputPath::Other(_) => continue,
            };
            sinks.push(spec);
        }

        let log_internal_errors = self.error_output_paths.iter().any(|p| p == "stderr");

        Backend::new(
            self.level,
            &self.name,
            Encoder::new(encoding),
            sinks,
            filter,
            log_internal_errors,
        )
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CaptureBuffer;

    #[test]
    fn test_options_defaults() {
        let opts = Options::default();
        assert_eq!(opts.level, Level::Info);
        assert_eq!(opts.format, "console");
        assert_eq!(opts.output_paths, vec![OutputPath::Stdout]);
        assert_eq!(opts.error_output_paths, vec!["stderr".to_string()]);
        assert!(opts.enable_color);
        assert!(!opts.compress);
        assert_eq!(opts.max_size, 100);
        assert_eq!(opts.max_backups, 5);
        assert_eq!(opts.max_age, 7);
        assert_eq!(opts.name, "app-logger");
    }

    #[test]
    fn test_validate_accepts_known_formats() {
        for format in ["console", "json", "JSON", "Console"] {
            let opts = Options {
                format: format.to_string(),
                ..Default::default()
            };
            assert!(opts.validate().is_empty(), "{} should be valid", format);
        }
    }

    #[test]
    fn test_validate_rejects_unknown_format() {
        let opts = Options {
            format: "text".to_string(),
            ..Default::default()
        };
        let errs = opts.validate();
        assert_eq!(errs.len(), 1);
        assert!(errs[0].to_string().contains("\"text\""));
    }

    #[test]
    fn test_build_stdout() {
        let backend = Options::default().build().unwrap();
        assert_eq!(backend.sink_count(), 1);
        assert_eq!(backend.level(), Level::Info);
        assert_eq!(backend.name(), "app-logger");
    }

    #[test]
    fn test_build_without_output_paths_fails() {
        let opts = Options {
            output_paths: Vec::new(),
            ..Default::default()
        };
        let err = opts.build().unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg == "no valid output paths configured"));
    }

    #[test]
    fn test_build_skips_unrecognized_paths() {
        let opts = Options {
            output_paths: vec![OutputPath::from("stderr"), OutputPath::from("/dev/null")],
            ..Default::default()
        };
        assert!(opts.build().is_err());

        let opts = Options {
            output_paths: vec![OutputPath::from("stderr"), OutputPath::Stdout],
            ..Default::default()
        };
        assert_eq!(opts.build().unwrap().sink_count(), 1);
    }

    #[test]
    fn test_build_file_sink_shared_between_repeats() {
        let dir = tempfile::tempdir().unwrap();
        let opts = Options {
            output_paths: vec![OutputPath::File, OutputPath::File],
            file_path: dir.path().join("logs/app.log"),
            format: "json".to_string(),
            ..Default::default()
        };
        let buffer = CaptureBuffer::default();
        let backend = opts.build_with(Sink::new(buffer), "info").unwrap();
        assert_eq!(backend.sink_count(), 2);
        assert!(dir.path().join("logs/app.log").exists());
    }

    #[test]
    fn test_build_file_error_surfaces() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();
        let opts = Options {
            output_paths: vec![OutputPath::File],
            file_path: blocker.join("app.log"),
            ..Default::default()
        };
        assert!(matches!(opts.build(), Err(Error::Io(_))));
    }

    #[test]
    fn test_rotation_policy_from_options() {
        let opts = Options {
            max_size: 10,
            max_backups: 3,
            max_age: 0,
            compress: true,
            ..Default::default()
        };
        let policy = opts.rotation_policy();
        assert_eq!(policy.max_bytes, 10 * 1024 * 1024);
        assert_eq!(policy.max_backups, 3);
        assert_eq!(policy.max_age, None);
        assert!(policy.compress);
    }

    #[test]
    fn test_options_from_yaml() {
        let yaml = r#"
level: debug
format: json
output-paths: [stdout, file]
file: /var/log/app.log
max-size: 10
compress: true
name: api
"#;
        let opts: Options = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(opts.level, Level::Debug);
        assert_eq!(opts.format, "json");
        assert_eq!(opts.output_paths, vec![OutputPath::Stdout, OutputPath::File]);
        assert_eq!(opts.file_path, PathBuf::from("/var/log/app.log"));
        assert_eq!(opts.max_size, 10);
        assert!(opts.compress);
        assert_eq!(opts.name, "api");
        // untouched keys keep their defaults
        assert_eq!(opts.max_backups, 5);
        assert!(opts.enable_color);
    }

    #[test]
    fn test_options_from_toml() {
        let toml_str = r#"
level = "bogus"
enable-color = false
error-output-paths = []
"#;
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.level, Level::Info);
        assert!(!opts.enable_color);
        assert!(opts.error_output_paths.is_empty());
        assert_eq!(opts.output_paths, vec![OutputPath::Stdout]);
    }
}
