//! Logging: `tracing` subscriber setup plus the CLI operation journal.
//!
//! The journal lives at `~/.zep/logs/operations.log` with 1MB rotation.

use crate::error::{Result, ZepError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "operations.log";
const LOG_DIR_NAME: &str = "logs";
const MAX_LOG_SIZE: u64 = 1_048_576; // 1MB

/// Install the global `tracing` subscriber on stderr.
///
/// `ZEP_LOG` wins over `RUST_LOG`; `default_level` is used when neither parses.
pub fn init_tracing(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_env("ZEP_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| ZepError::Config(format!("invalid log level '{}': {}", default_level, e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| ZepError::Config(format!("failed to set subscriber: {}", e)))
}

/// A single journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub details: Option<String>,
    pub success: bool,
}

impl LogEntry {
    pub fn new(operation: impl Into<String>, details: Option<String>, success: bool) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: operation.into(),
            details,
            success,
        }
    }

    /// Format as a single log line.
    pub fn to_log_line(&self) -> String {
        let status = if self.success { "OK" } else { "ERR" };
        // Keep one entry per line even when details carry server messages.
        let details = self
            .details
            .as_deref()
            .map(|d| d.replace(['\n', '\r'], " "))
            .unwrap_or_else(|| "-".to_string());
        format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            status,
            self.operation,
            details
        )
    }

    /// Parse from a log line.
    pub fn from_log_line(line: &str) -> Option<Self> {
        // Format: [2024-01-24 10:30:45] OK thread-create id=t1
        if !line.starts_with('[') {
            return None;
        }

        let timestamp_end = line.find(']')?;
        let timestamp_str = &line[1..timestamp_end];

        let rest = line.get(timestamp_end + 2..)?.trim();
        let parts: Vec<&str> = rest.splitn(3, ' ').collect();
        if parts.len() < 2 {
            return None;
        }

        let success = parts[0] == "OK";
        let operation = parts[1].to_string();
        let details = parts.get(2).map(|s| s.to_string()).filter(|s| s != "-");

        let timestamp = chrono::NaiveDateTime::parse_from_str(timestamp_str, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|dt| dt.and_utc())?;

        Some(Self {
            timestamp,
            operation,
            details,
            success,
        })
    }
}

/// Get the journal path, creating its directory if needed.
pub fn get_log_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ZepError::Config("Could not determine home directory".to_string()))?;

    let log_dir = home.join(".zep").join(LOG_DIR_NAME);
    if !log_dir.exists() {
        fs::create_dir_all(&log_dir)?;
    }

    Ok(log_dir.join(LOG_FILE_NAME))
}

fn needs_rotation(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.len() >= MAX_LOG_SIZE)
        .unwrap_or(false)
}

/// Rotate log file (rename to .old, start fresh).
fn rotate_log(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    let old_path = path.with_extension("log.old");
    if old_path.exists() {
        fs::remove_file(&old_path)?;
    }
    fs::rename(path, &old_path)?;

    Ok(())
}

/// Append an entry to the standard journal.
pub fn log(operation: impl Into<String>, details: Option<String>, success: bool) -> Result<()> {
    log_to(&get_log_path()?, operation, details, success)
}

/// Append an entry to the journal at `path`.
pub fn log_to(
    path: &Path,
    operation: impl Into<String>,
    details: Option<String>,
    success: bool,
) -> Result<()> {
    if needs_rotation(path) {
        rotate_log(path)?;
    }

    let line = LogEntry::new(operation, details, success).to_log_line();

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{}", line)?;
    writer.flush()?;

    Ok(())
}

/// Read entries from the standard journal.
pub fn read_logs(limit: usize, operation: Option<&str>) -> Result<Vec<LogEntry>> {
    read_logs_from(&get_log_path()?, limit, operation)
}

/// Read entries, most recent first.
///
/// - `limit`: maximum number of entries to return
/// - `operation`: optional case-insensitive filter by operation name
pub fn read_logs_from(path: &Path, limit: usize, operation: Option<&str>) -> Result<Vec<LogEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(path)?);

    let mut entries: Vec<LogEntry> = reader
        .lines()
        .map_while(|line| line.ok())
        .filter_map(|line| LogEntry::from_log_line(&line))
        .filter(|entry| operation.map_or(true, |op| entry.operation.eq_ignore_ascii_case(op)))
        .collect();

    entries.reverse();
    entries.truncate(limit);

    Ok(entries)
}

/// Clear the standard journal.
pub fn clear_logs() -> Result<usize> {
    clear_logs_at(&get_log_path()?)
}

/// Truncate the journal at `path` and drop its rotated backup.
///
/// Returns the number of lines removed from the live file.
pub fn clear_logs_at(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Ok(0);
    }

    let count = BufReader::new(File::open(path)?).lines().count();
    File::create(path)?;

    let old_path = path.with_extension("log.old");
    if old_path.exists() {
        fs::remove_file(&old_path)?;
    }

    Ok(count)
}
