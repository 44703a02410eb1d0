use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::RotationPolicy;

/// State of the current log file.
#[derive(Debug)]
pub struct FileState {
    /// The open file handle.
    pub file: File,
    /// Current size of the file in bytes.
    pub size: u64,
}

/// A rotated copy of the log file, `<path>.<index>[.gz]`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Backup {
    index: usize,
    path: PathBuf,
    compressed: bool,
}

/// A writer that rotates its log file by size, keeping a bounded set of backups.
///
/// Rotation copies `app.log` to `app.log.1` (shifting older backups up by one)
/// and truncates `app.log` in place, so processes following the file keep
/// reading the same inode.
#[derive(Debug)]
pub struct RotatingWriter {
    path: PathBuf,
    policy: RotationPolicy,
    state: Option<FileState>,
}

impl RotatingWriter {
    /// Create a new rotating writer, creating parent directories as needed.
    pub fn new(path: &Path, policy: RotationPolicy) -> io::Result<Self> {
        let mut writer = Self {
            path: path.to_path_buf(),
            policy,
            state: None,
        };

        if let Some(parent) = writer.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        // An existing file already past the limit is rotated before reuse.
        if let Ok(metadata) = writer.path.metadata()
            && metadata.len() > writer.policy.max_bytes
        {
            writer.rotate()?;
        }
        writer.open_current()?;

        Ok(writer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    fn open_current(&mut self) -> io::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let size = file.metadata().map(|m| m.len()).unwrap_or(0);
        self.state = Some(FileState { file, size });
        Ok(())
    }

    fn backup_path(&self, index: usize, compressed: bool) -> PathBuf {
        let suffix = if compressed { ".gz" } else { "" };
        PathBuf::from(format!("{}.{}{}", self.path.display(), index, suffix))
    }

    /// List existing backups of the log file.
    fn backups(&self) -> io::Result<Vec<Backup>> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let Some(file_name) = self.path.file_name().and_then(|n| n.to_str()) else {
            return Ok(Vec::new());
        };
        let prefix = format!("{}.", file_name);

        let mut backups = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(rest) = name.to_str().and_then(|n| n.strip_prefix(&prefix)) else {
                continue;
            };
            let (number, compressed) = match rest.strip_suffix(".gz") {
                Some(number) => (number, true),
                None => (rest, false),
            };
            if let Ok(index) = number.parse::<usize>()
                && index > 0
            {
                backups.push(Backup {
                    index,
                    path: entry.path(),
                    compressed,
                });
            }
        }
        backups.sort_by(|a, b| b.index.cmp(&a.index));
        Ok(backups)
    }

    /// Move every backup up one index, dropping those past `max_backups`.
    fn shift_backups(&self) -> io::Result<()> {
        for backup in self.backups()? {
            let next = backup.index + 1;
            if self.policy.retains(next) {
                fs::rename(&backup.path, self.backup_path(next, backup.compressed))?;
            } else {
                fs::remove_file(&backup.path)?;
            }
        }
        Ok(())
    }

    fn remove_expired(&self) -> io::Result<()> {
        if self.policy.max_age.is_none() {
            return Ok(());
        }
        for backup in self.backups()? {
            let modified = fs::metadata(&backup.path).and_then(|m| m.modified())?;
            if self.policy.is_expired(modified) {
                fs::remove_file(&backup.path)?;
            }
        }
        Ok(())
    }

    /// Perform rotation: shift backups, copy the active file to `.1`, truncate it.
    fn rotate(&mut self) -> io::Result<()> {
        // Close the active handle before touching files on disk.
        self.state = None;

        self.shift_backups()?;

        if self.path.exists() {
            let first = self.backup_path(1, false);
            fs::copy(&self.path, &first)?;
            OpenOptions::new()
                .write(true)
                .truncate(true)
                .open(&self.path)?;

            if self.policy.compress {
                compress_file(&first)?;
            }
        }

        self.remove_expired()
    }
}

/// Gzip `path` to `<path>.gz`, removing the original once the archive is complete.
fn compress_file(path: &Path) -> io::Result<()> {
    let gz_path = PathBuf::from(format!("{}.gz", path.display()));
    let tmp_path = PathBuf::from(format!("{}.gz.tmp", path.display()));

    if let Err(e) = gzip(path, &tmp_path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    fs::rename(&tmp_path, &gz_path)?;
    fs::remove_file(path)
}

fn gzip(src: &Path, dst: &Path) -> io::Result<()> {
    let mut reader = BufReader::new(File::open(src)?);
    let output = BufWriter::new(File::create(dst)?);
    let mut encoder = GzEncoder::new(output, Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?.flush()
}

impl Write for RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let needs_rotation = self
            .state
            .as_ref()
            .is_some_and(|state| self.policy.should_rotate(state.size, buf.len()));
        if needs_rotation {
            self.rotate()?;
        }
        if self.state.is_none() {
            self.open_current()?;
        }

        match self.state.as_mut() {
            Some(state) => {
                let written = state.file.write(buf)?;
                state.size += written as u64;
                Ok(written)
            }
            None => Err(io::Error::other("Failed to open log file")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.state.as_ref() {
            Some(state) => state.file.sync_all(),
            None => Ok(()),
        }
    }
}
