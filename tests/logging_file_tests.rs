use logkit::{Field, Level, Logger, Options, OutputPath, kv, option};
use std::fs;
use std::io::Read;
use std::path::Path;

fn file_logger(path: &Path, format: &str) -> Logger {
    let mut logger = Logger::new();
    logger.set_options([
        option::with_output_paths([OutputPath::File]),
        option::with_file_path(path),
        option::with_format(format),
        option::with_enable_color(true),
    ]);
    logger.build().expect("build file logger");
    logger
}

#[test]
fn test_file_logging_disables_ansi_console() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("app.log");

    let logger = file_logger(&path, "console");
    logger.info("file-logging-test: no-ansi", &[Field::bool("colored", false)]);
    logger.error("file-logging-test: error", &[]);
    logger.flush();

    let s = fs::read_to_string(&path).expect("read log file");
    assert!(s.contains("file-logging-test: no-ansi"));
    assert!(s.contains("\tERROR\t"));
    assert!(!s.contains("\x1b"), "ANSI escape found in log file");
}

#[test]
fn test_file_logging_disables_ansi_json() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("app.log");

    let logger = file_logger(&path, "json");
    logger.warnw("file-logging-test: json", &kv!["attempt", 2]);
    logger.flush();

    let s = fs::read_to_string(&path).expect("read log file");
    assert!(!s.contains("\x1b"), "ANSI escape found in log file");

    let record: serde_json::Value = serde_json::from_str(s.lines().next().unwrap()).unwrap();
    assert_eq!(record["level"], "WARN");
    assert_eq!(record["message"], "file-logging-test: json");
    assert_eq!(record["attempt"], 2);
    assert_eq!(record["logger"], "app-logger");
}

#[test]
fn test_stdout_and_file_together() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("nested/app.log");

    let mut logger = Logger::new();
    logger.set_options([
        option::with_output_paths([OutputPath::Stdout, OutputPath::File, OutputPath::File]),
        option::with_file_path(&path),
        option::with_level(Level::Debug),
    ]);
    logger.build().expect("build");
    assert_eq!(logger.backend().unwrap().sink_count(), 3);

    logger.debugf(format_args!("x {}", "y"));
    logger.flush();

    // both File entries share one writer, so each record appears twice
    let s = fs::read_to_string(&path).expect("read log file");
    assert_eq!(s.matches("x y").count(), 2);
    assert!(s.contains("DEBUG"));
}

#[test]
fn test_derived_logger_writes_context() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("app.log");

    let logger = file_logger(&path, "json");
    let request = logger.with_values(&kv!["request_id", "r-9", "user"]);
    request.info("handled", &[]);
    logger.flush();

    let s = fs::read_to_string(&path).expect("read log file");
    let record: serde_json::Value = serde_json::from_str(s.lines().next().unwrap()).unwrap();
    assert_eq!(record["request_id"], "r-9");
    assert_eq!(record["user"], "MISSING");
}

#[test]
fn test_options_from_yaml_end_to_end() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("svc.log");
    let yaml = format!(
        "level: warn\nformat: json\noutput-paths: [file]\nfile: {}\nname: svc\n",
        path.display()
    );
    let options: Options = serde_yaml::from_str(&yaml).expect("parse options");

    let mut logger = Logger::with_options(options);
    logger.build().expect("build");
    logger.info("filtered out", &[]);
    logger.warn("kept", &[]);
    logger.flush();

    let s = fs::read_to_string(&path).expect("read log file");
    assert_eq!(s.lines().count(), 1);
    assert!(s.contains(r#""logger":"svc""#));
    assert!(s.contains("kept"));
}

#[test]
fn test_rotation_produces_compressed_backup() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("app.log");

    let mut logger = Logger::new();
    logger.set_options([
        option::with_output_paths([OutputPath::File]),
        option::with_file_path(&path),
        option::with_max_size(10),
        option::with_max_backups(5),
        option::with_max_age(7),
        option::with_compress(true),
    ]);
    logger.build().expect("build");

    let payload = "x".repeat(10 * 1024);
    for i in 0..1100 {
        logger.info(&payload, &[Field::int("seq", i)]);
    }
    logger.flush();

    let backup = dir.path().join("app.log.1.gz");
    assert!(backup.exists(), "compressed backup should exist");
    assert!(!dir.path().join("app.log.1").exists());
    assert!(fs::metadata(&path).unwrap().len() < 10 * 1024 * 1024);

    let mut decoded = Vec::new();
    flate2::read::GzDecoder::new(fs::File::open(&backup).unwrap())
        .read_to_end(&mut decoded)
        .expect("decode backup");
    assert!(decoded.len() > 9 * 1024 * 1024);
}

#[test]
fn test_concurrent_records_never_interleave() {
    const THREADS: usize = 8;
    const RECORDS: usize = 250;

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("app.log");
    let logger = file_logger(&path, "json");

    std::thread::scope(|scope| {
        for thread in 0..THREADS {
            let logger = logger.with_values(&kv!["thread", thread]);
            scope.spawn(move || {
                let padding = "y".repeat(512);
                for seq in 0..RECORDS {
                    logger.infow(&padding, &kv!["seq", seq]);
                }
            });
        }
    });
    logger.flush();

    let s = fs::read_to_string(&path).expect("read log file");
    let lines: Vec<&str> = s.lines().collect();
    assert_eq!(lines.len(), THREADS * RECORDS);

    let mut per_thread = [0usize; THREADS];
    for line in lines {
        let record: serde_json::Value = serde_json::from_str(line).expect("whole JSON record");
        let thread = record["thread"].as_u64().expect("thread field") as usize;
        per_thread[thread] += 1;
    }
    assert!(per_thread.iter().all(|&count| count == RECORDS));
}
