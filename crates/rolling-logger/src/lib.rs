//! Rolling Logger
//!
//! Installs a global `tracing` subscriber that writes to stderr and to a
//! size-rotated log file. Once `<app>.log` grows past the configured size it
//! is renamed to `<app>.log.1`, older files shift up by one and the oldest
//! is dropped.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default size of a single log file before it is rotated
pub const DEFAULT_MAX_BYTES: u64 = 1024 * 1024;
/// Default number of rotated files kept next to the live one
pub const DEFAULT_MAX_FILES: usize = 5;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("failed to open log file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("logger already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Logger settings
#[derive(Debug, Clone)]
pub struct LoggerOptions {
    pub log_dir: PathBuf,
    pub app_name: String,
    pub max_bytes: u64,
    pub max_files: usize,
    /// Filter used when `RUST_LOG` is not set
    pub default_filter: String,
}

impl LoggerOptions {
    pub fn new(log_dir: impl Into<PathBuf>, app_name: &str) -> Self {
        Self {
            log_dir: log_dir.into(),
            app_name: app_name.to_string(),
            max_bytes: DEFAULT_MAX_BYTES,
            max_files: DEFAULT_MAX_FILES,
            default_filter: "info".to_string(),
        }
    }
}

/// Initialize logging with default rotation settings
pub fn init_logger(log_dir: impl Into<PathBuf>, app_name: &str) -> Result<(), LoggerError> {
    init_with(LoggerOptions::new(log_dir, app_name))
}

/// Initialize logging
pub fn init_with(options: LoggerOptions) -> Result<(), LoggerError> {
    let mut file = RollingFile::open(
        &options.log_dir,
        &options.app_name,
        options.max_bytes,
        options.max_files,
    )?;
    // Session banner so restarts are easy to find in the file
    let banner = format!(
        "=== {} started {} ===\n",
        options.app_name,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f")
    );
    file.write_all(banner.as_bytes()).map_err(|source| LoggerError::Io {
        path: file.current_path(),
        source,
    })?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&options.default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))?;

    tracing::debug!(dir = %options.log_dir.display(), "rolling logger ready");
    Ok(())
}

/// Log file writer that rotates by size
pub struct RollingFile {
    dir: PathBuf,
    app_name: String,
    max_bytes: u64,
    max_files: usize,
    file: File,
    written: u64,
}

impl RollingFile {
    pub fn open(
        dir: &Path,
        app_name: &str,
        max_bytes: u64,
        max_files: usize,
    ) -> Result<Self, LoggerError> {
        fs::create_dir_all(dir).map_err(|source| LoggerError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(format!("{}.log", app_name));
        let file = open_append(&path).map_err(|source| LoggerError::Io {
            path: path.clone(),
            source,
        })?;
        let written = file.metadata().map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            dir: dir.to_path_buf(),
            app_name: app_name.to_string(),
            max_bytes: max_bytes.max(1),
            max_files,
            file,
            written,
        })
    }

    /// Path of the live log file
    pub fn current_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.app_name))
    }

    fn rotated_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}.log.{}", self.app_name, index))
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.max_files == 0 {
            self.file = File::create(self.current_path())?;
            self.written = 0;
            return Ok(());
        }

        let oldest = self.rotated_path(self.max_files);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (1..self.max_files).rev() {
            let from = self.rotated_path(index);
            if from.exists() {
                fs::rename(&from, self.rotated_path(index + 1))?;
            }
        }
        fs::rename(self.current_path(), self.rotated_path(1))?;

        self.file = open_append(&self.current_path())?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_to_live_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = RollingFile::open(dir.path(), "Catalog", 1024, 3).unwrap();
        log.write_all(b"hello\n").unwrap();
        log.flush().unwrap();

        let content = fs::read_to_string(dir.path().join("Catalog.log")).unwrap();
        assert_eq!(content, "hello\n");
    }

    #[test]
    fn test_rotates_when_full() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = RollingFile::open(dir.path(), "Catalog", 10, 2).unwrap();
        log.write_all(b"first-line\n").unwrap();
        log.write_all(b"second-line\n").unwrap();
        log.write_all(b"third-line\n").unwrap();
        log.flush().unwrap();

        let live = fs::read_to_string(dir.path().join("Catalog.log")).unwrap();
        let one = fs::read_to_string(dir.path().join("Catalog.log.1")).unwrap();
        let two = fs::read_to_string(dir.path().join("Catalog.log.2")).unwrap();
        assert_eq!(live, "third-line\n");
        assert_eq!(one, "second-line\n");
        assert_eq!(two, "first-line\n");
    }

    #[test]
    fn test_drops_oldest_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = RollingFile::open(dir.path(), "Catalog", 4, 1).unwrap();
        for line in ["aaaa", "bbbb", "cccc"] {
            log.write_all(line.as_bytes()).unwrap();
        }
        log.flush().unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("Catalog.log")).unwrap(), "cccc");
        assert_eq!(fs::read_to_string(dir.path().join("Catalog.log.1")).unwrap(), "bbbb");
        assert!(!dir.path().join("Catalog.log.2").exists());
    }

    #[test]
    fn test_reopen_appends() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut log = RollingFile::open(dir.path(), "Catalog", 1024, 3).unwrap();
            log.write_all(b"one\n").unwrap();
        }
        let mut log = RollingFile::open(dir.path(), "Catalog", 1024, 3).unwrap();
        log.write_all(b"two\n").unwrap();
        log.flush().unwrap();

        let content = fs::read_to_string(log.current_path()).unwrap();
        assert_eq!(content, "one\ntwo\n");
    }
}
