//! Rotating file example.
//!
//! Writes a little over 1 MB of records to a file rotated at 1 MB,
//! then lists the active file and its compressed backups.

use logkit::{Field, Logger, OutputPath, option};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::tempdir()?;
    let log_path = temp_dir.path().join("test.log");

    let mut logger = Logger::new();
    logger.set_options([
        option::with_output_paths([OutputPath::Stdout, OutputPath::File]),
        option::with_file_path(&log_path),
        option::with_format("json"),
        option::with_max_size(1),
        option::with_max_backups(3),
        option::with_compress(true),
    ]);
    logger.build()?;

    let padding = "-".repeat(1024);
    for i in 0..1200 {
        logger.info(&padding, &[Field::int("seq", i)]);
    }
    logger.flush();

    for entry in std::fs::read_dir(temp_dir.path())? {
        let entry = entry?;
        println!("{} ({} bytes)", entry.path().display(), entry.metadata()?.len());
    }

    Ok(())
}
