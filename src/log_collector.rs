//! Decoupled, non-blocking log persistence for the desktop client.
//!
//! ```text
//! log::info!() / warn!() / ...
//!     |
//! [LogCollector]  (implements log::Log, never blocks the UI thread)
//!     | (crossbeam unbounded channel)
//!     v
//! [disk writer thread]  ->  logs/<YYYYmmdd_HHMMSS>_scancam.log
//! ```
//!
//! The writer is a plain OS thread so it keeps draining regardless of which
//! tokio worker (or the egui main thread) produced the record.

use chrono::Local;
use crossbeam_channel::{unbounded, Sender};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Internal log line or special marker
enum LogMessage {
    /// Regular log line
    Line(LogLine),
    /// Flush marker with channel sender to signal completion
    Flush(std::sync::mpsc::Sender<()>),
}

/// Get the global logs path relative to the current working directory: ./logs
pub fn get_global_logs_path() -> Result<PathBuf, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Failed to get current working directory: {}", e))?;
    Ok(cwd.join("logs"))
}

/// Ensure the global logs directory exists
pub fn ensure_logs_dir_exists(log_dir: &Path) -> Result<(), String> {
    std::fs::create_dir_all(log_dir)
        .map_err(|e| format!("Failed to create logs directory: {}", e))
}

/// A log line with metadata
#[derive(Clone, Debug)]
pub struct LogLine {
    pub message: String,
    pub level: Level,
    /// `HH:MM:SS.mmm`
    pub timestamp: String,
}

impl LogLine {
    pub fn new(level: Level, message: String) -> Self {
        LogLine {
            message,
            level,
            timestamp: Local::now().format("%H:%M:%S%.3f").to_string(),
        }
    }

    /// `[HH:MM:SS.mmm] [LEVEL] message`
    pub fn format(&self) -> String {
        format!("[{}] [{}] {}", self.timestamp, self.level, self.message)
    }
}

/// Logger that hands every record to a background disk writer
#[derive(Clone)]
pub struct LogCollector {
    /// crossbeam unbounded: sending never blocks and works from any thread
    tx: Sender<LogMessage>,
    log_path: PathBuf,
    level: LevelFilter,
}

impl LogCollector {
    /// Create the session log file under `log_dir` and start the writer thread
    pub fn new(log_dir: PathBuf, level: LevelFilter) -> Result<Self, String> {
        ensure_logs_dir_exists(&log_dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_path = log_dir.join(format!("{}_scancam.log", timestamp));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(|e| format!("Failed to open log file {}: {}", log_path.display(), e))?;

        let (tx, rx) = unbounded::<LogMessage>();

        std::thread::spawn(move || {
            let mut file: File = file;
            while let Ok(msg) = rx.recv() {
                match msg {
                    LogMessage::Line(line) => {
                        let formatted = format!("{}\n", line.format());
                        let _ = file.write_all(formatted.as_bytes());
                    }
                    LogMessage::Flush(done) => {
                        let _ = file.flush();
                        let _ = done.send(());
                    }
                }
            }
            let _ = file.flush();
            eprintln!("[Log] Disk writer thread shutting down");
        });

        Ok(LogCollector { tx, log_path, level })
    }

    /// Path of the file this session writes to
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Send a log line (non-blocking, cannot fail)
    pub fn log_line(&self, line: LogLine) {
        let _ = self.tx.send(LogMessage::Line(line));
    }

    /// Send a plain info message
    pub fn log_str(&self, message: impl Into<String>) {
        self.log_line(LogLine::new(Level::Info, message.into()));
    }

    /// Wait until every line sent before this call has reached the file.
    ///
    /// Uses a flush marker travelling through the same channel, so ordering
    /// is guaranteed.
    pub async fn wait_for_empty(&self) -> Result<(), String> {
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        self.tx
            .send(LogMessage::Flush(tx))
            .map_err(|e| format!("Failed to send flush marker: {}", e))?;
        rx.recv()
            .map_err(|e| format!("Flush signal interrupted: {}", e))?;
        Ok(())
    }
}

/// Wires all `log::info!()`, `log::warn!()`, ... calls into the collector
impl Log for LogCollector {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = LogLine::new(record.level(), record.args().to_string());
        // Problems should be visible on the console too
        if record.level() <= Level::Warn {
            eprintln!("{}", line.format());
        }
        self.log_line(line);
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_log_collector_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let collector = LogCollector::new(dir.path().join("logs"), LevelFilter::Info).unwrap();

        assert!(collector.log_path().exists());
        assert!(collector
            .log_path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with("_scancam.log"));
    }

    #[tokio::test]
    async fn test_lines_persisted_after_flush() {
        let dir = tempfile::tempdir().unwrap();
        let collector = LogCollector::new(dir.path().to_path_buf(), LevelFilter::Info).unwrap();

        for i in 0..500 {
            collector.log_str(format!("Log message {}", i));
        }
        collector.wait_for_empty().await.unwrap();

        let content = fs::read_to_string(collector.log_path()).unwrap();
        assert_eq!(content.lines().count(), 500);
        assert!(content.contains("[INFO] Log message 499"));
    }

    #[test]
    fn test_level_filter() {
        let dir = tempfile::tempdir().unwrap();
        let collector = LogCollector::new(dir.path().to_path_buf(), LevelFilter::Info).unwrap();

        let debug = Metadata::builder().level(Level::Debug).build();
        let warn = Metadata::builder().level(Level::Warn).build();
        assert!(!collector.enabled(&debug));
        assert!(collector.enabled(&warn));
    }
}
