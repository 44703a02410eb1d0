use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

pub const DEFAULT_MAX_SIZE_MB: u64 = 100;
pub const DEFAULT_MAX_BACKUPS: usize = 5;
pub const DEFAULT_MAX_AGE_DAYS: u64 = 7;

const MEGABYTE: u64 = 1024 * 1024;
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// When and how the log file is rotated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationPolicy {
    /// Size in bytes a file may reach before it is rotated.
    pub max_bytes: u64,
    /// Backups to keep; 0 keeps all of them.
    pub max_backups: usize,
    /// Backups older than this are removed; `None` keeps them regardless of age.
    pub max_age: Option<Duration>,
    /// Gzip rotated files.
    pub compress: bool,
}

impl RotationPolicy {
    /// Build a policy from megabytes and days. A zero size means the 100 MB default,
    /// a zero age disables age-based cleanup.
    pub fn new(max_size_mb: u64, max_backups: usize, max_age_days: u64, compress: bool) -> Self {
        let max_size_mb = if max_size_mb == 0 {
            DEFAULT_MAX_SIZE_MB
        } else {
            max_size_mb
        };
        Self {
            max_bytes: max_size_mb.saturating_mul(MEGABYTE),
            max_backups,
            max_age: (max_age_days > 0)
                .then(|| DAY.saturating_mul(u32::try_from(max_age_days).unwrap_or(u32::MAX))),
            compress,
        }
    }

    /// A policy measured in bytes, for small thresholds.
    pub fn bytes(max_bytes: u64, max_backups: usize) -> Self {
        Self {
            max_bytes,
            max_backups,
            max_age: None,
            compress: false,
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Whether writing `incoming` bytes to a file of `current` bytes should rotate first.
    pub fn should_rotate(&self, current: u64, incoming: usize) -> bool {
        current > 0 && current.saturating_add(incoming as u64) > self.max_bytes
    }

    /// Whether the backup with this 1-based index is within the retention count.
    pub fn retains(&self, index: usize) -> bool {
        self.max_backups == 0 || index <= self.max_backups
    }

    /// Whether a backup last modified at `modified` has outlived `max_age`.
    pub fn is_expired(&self, modified: SystemTime) -> bool {
        match self.max_age {
            Some(max_age) => SystemTime::now()
                .duration_since(modified)
                .map(|age| age > max_age)
                .unwrap_or(false),
            None => false,
        }
    }
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE_MB, DEFAULT_MAX_BACKUPS, DEFAULT_MAX_AGE_DAYS, false)
    }
}
