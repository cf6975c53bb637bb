//! Append-only line writer with daily and size-based rotation.
//!
//! The active file is renamed with a date suffix when the UTC date changes
//! (`calls.log` → `calls.log.2026-10-16`), or with a timestamp suffix when it
//! grows past `max_file_size_bytes`. Only the newest `max_rotated_files`
//! rotated files are kept.
//!
//! Thread-safe: every write takes an internal `Mutex`.

use chrono::{NaiveDate, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};
use wiretap_core::config::FileSinkConfig;

// ── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RotationPolicy {
    /// Active file path, e.g. `/var/log/wiretap/calls.log`.
    pub file_path: PathBuf,
    /// 0 = size-based rotation disabled (daily rotation only).
    pub max_file_size_bytes: u64,
    /// 0 = unlimited.
    pub max_rotated_files: usize,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self::from(&FileSinkConfig::default())
    }
}

impl From<&FileSinkConfig> for RotationPolicy {
    fn from(cfg: &FileSinkConfig) -> Self {
        Self {
            file_path: cfg.path.clone(),
            max_file_size_bytes: cfg.max_file_size_bytes,
            max_rotated_files: cfg.max_rotated_files,
        }
    }
}

// ── Writer ───────────────────────────────────────────────────────────────────

pub struct RotatingFileWriter {
    policy: RotationPolicy,
    inner: Mutex<WriterState>,
}

struct WriterState {
    writer: BufWriter<File>,
    current_date: NaiveDate,
    current_size: u64,
}

impl RotatingFileWriter {
    /// Open (or create) the active file, creating parent directories.
    pub fn new(policy: RotationPolicy) -> io::Result<Self> {
        if let Some(parent) = policy.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = open_append(&policy.file_path)?;
        let current_size = file.metadata()?.len();

        info!(path = %policy.file_path.display(), "Log file writer opened");

        Ok(Self {
            policy,
            inner: Mutex::new(WriterState {
                writer: BufWriter::new(file),
                current_date: Utc::now().date_naive(),
                current_size,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.policy.file_path
    }

    /// Append `line` plus a newline, rotating first if needed.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut state = self.lock()?;

        let today = Utc::now().date_naive();
        let date_changed = today != state.current_date;
        let too_big = self.policy.max_file_size_bytes > 0
            && state.current_size >= self.policy.max_file_size_bytes;

        if date_changed || too_big {
            let suffix = if date_changed {
                state.current_date.format("%Y-%m-%d").to_string()
            } else {
                Utc::now().format("%Y-%m-%d-%H%M%S%.3f").to_string()
            };
            self.rotate(&mut state, &suffix)?;
            state.current_date = today;
        }

        let bytes = line.as_bytes();
        state.writer.write_all(bytes)?;
        state.writer.write_all(b"\n")?;
        state.writer.flush()?;
        state.current_size += bytes.len() as u64 + 1;

        Ok(())
    }

    pub fn flush(&self) -> io::Result<()> {
        self.lock()?.writer.flush()
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, WriterState>> {
        self.inner
            .lock()
            .map_err(|_| io::Error::other("log file writer lock poisoned"))
    }

    fn rotate(&self, state: &mut WriterState, suffix: &str) -> io::Result<()> {
        state.writer.flush()?;

        let base = &self.policy.file_path;
        let rotated = rotated_file_path(base, suffix);
        match fs::rename(base, &rotated) {
            Ok(()) => info!(from = %base.display(), to = %rotated.display(), "Rotated log file"),
            Err(e) => error!(
                error = %e,
                from = %base.display(),
                to = %rotated.display(),
                "Failed to rotate log file"
            ),
        }

        if self.policy.max_rotated_files > 0 {
            if let Err(e) = prune_rotated_files(base, self.policy.max_rotated_files) {
                warn!(error = %e, "Failed to prune old log files");
            }
        }

        // Replacing the writer closes the renamed file.
        state.writer = BufWriter::new(open_append(base)?);
        state.current_size = 0;
        Ok(())
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// `calls.log` + `2026-10-16` → `calls.log.2026-10-16`.
fn rotated_file_path(base: &Path, suffix: &str) -> PathBuf {
    let mut path = base.as_os_str().to_owned();
    path.push(".");
    path.push(suffix);
    PathBuf::from(path)
}

/// Delete all but the newest `keep` rotated siblings of `base_path`.
fn prune_rotated_files(base_path: &Path, keep: usize) -> io::Result<()> {
    let parent = match base_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let base_name = base_path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned();
    let prefix = format!("{base_name}.");

    let mut rotated: Vec<PathBuf> = fs::read_dir(parent)?
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with(&prefix))
        .map(|e| e.path())
        .collect();

    // Suffixes are dates / timestamps, so name order is age order.
    rotated.sort();

    if rotated.len() > keep {
        let excess = rotated.len() - keep;
        for path in rotated.iter().take(excess) {
            debug!(path = %path.display(), "Pruning old rotated log file");
            fs::remove_file(path)?;
        }
    }

    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────────────────
