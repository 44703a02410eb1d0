//! Command-line flags for the logger, one per configurable option

use clap::{ArgAction, Args};

use crate::option::{self, LogOption};
use crate::{Level, OutputPath};

/// Logger flags, meant to be flattened into an application's own parser.
///
/// ```rust
/// use clap::Parser;
/// use logkit::{LogFlags, Logger};
///
/// #[derive(Parser)]
/// struct Cli {
///     #[command(flatten)]
///     log: LogFlags,
/// }
///
/// let cli = Cli::parse_from(["app", "--log.level", "debug", "--log.name", "api"]);
/// let logger = Logger::new();
/// logger.set_options(cli.log.options());
/// assert_eq!(logger.options().name, "api");
/// ```
#[derive(Args, Debug, Clone, PartialEq)]
pub struct LogFlags {
    /// Minimum log output LEVEL
    #[arg(long = "log.level", value_name = "LEVEL", default_value = "info")]
    pub level: String,

    /// Disable output of caller information in the log
    #[arg(long = "log.disable-caller")]
    pub disable_caller: bool,

    /// Disable the log to record a stack trace for all messages at or above panic level
    #[arg(long = "log.disable-stacktrace")]
    pub disable_stacktrace: bool,

    /// Log output FORMAT, console or json
    #[arg(long = "log.format", value_name = "FORMAT", default_value = "console")]
    pub format: String,

    /// Enable output ansi colors in console format logs
    #[arg(long = "log.enable-color", action = ArgAction::Set, default_value_t = true)]
    pub enable_color: bool,

    /// Output paths of log
    #[arg(long = "log.output-paths", value_delimiter = ',', default_value = "stdout")]
    pub output_paths: Vec<String>,

    /// Error output paths of log
    #[arg(long = "log.error-output-paths", value_delimiter = ',', default_value = "stderr")]
    pub error_output_paths: Vec<String>,

    /// Development mode, which changes the behavior of panic-level logs
    #[arg(long = "log.development")]
    pub development: bool,

    /// The name of the logger
    #[arg(long = "log.name", default_value = "app-logger")]
    pub name: String,
}

impl LogFlags {
    /// Convert the parsed flags into setters. An unknown level becomes Info.
    pub fn options(&self) -> Vec<LogOption> {
        vec![
            option::with_level(Level::parse_lossy(&self.level)),
            option::with_disable_caller(self.disable_caller),
            option::with_disable_stacktrace(self.disable_stacktrace),
            option::with_format(self.format.clone()),
            option::with_enable_color(self.enable_color),
            option::with_output_paths(
                self.output_paths
                    .iter()
                    .map(|path| OutputPath::from(path.as_str())),
            ),
            option::with_error_output_paths(self.error_output_paths.clone()),
            option::with_development(self.development),
            option::with_name(self.name.clone()),
        ]
    }
}
