//! Command-line configuration example.
//!
//! Run with e.g. `--log.level debug --log.format json --log.output-paths stdout,file`.

use clap::Parser;
use logkit::{LogFlags, Logger};

#[derive(Parser, Debug)]
#[command(name = "flags", about = "Configure logkit from the command line")]
struct Cli {
    #[command(flatten)]
    log: LogFlags,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut logger = Logger::new();
    logger.set_options(cli.log.options());
    for err in logger.options().validate() {
        eprintln!("{}", err);
    }
    logger.build()?;

    logger.debug("Visible with --log.level debug", &[]);
    logger.infow("Configured from flags", &logkit::kv!["name", cli.log.name.as_str()]);
    logger.flush();

    Ok(())
}
