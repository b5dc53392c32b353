//! CSV session log
//!
//! Provides append-only logging of completed cycles. Each line has the form
//! `TOPIC,COMPLETED_WORK_SECONDS,COMPLETED_REST_SECONDS,UTC_TIMESTAMP` and
//! the file has no header.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use crate::error::TimerError;

/// Work and rest completed in one cycle, or in the part of a cycle that ran
/// before an interrupt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRecord {
    /// Label the time is logged under
    pub topic: String,
    /// Seconds of work completed
    pub completed_work_seconds: u64,
    /// Seconds of rest completed
    pub completed_rest_seconds: u64,
    /// When the record was made
    pub timestamp: DateTime<Utc>,
}

impl CompletionRecord {
    /// Create a record stamped with the current time
    #[must_use]
    pub fn now(topic: &str, completed_work_seconds: u64, completed_rest_seconds: u64) -> Self {
        Self {
            topic: topic.to_string(),
            completed_work_seconds,
            completed_rest_seconds,
            timestamp: Utc::now(),
        }
    }

    /// Render the record as one CSV line, including the trailing newline
    #[must_use]
    pub fn to_line(&self) -> String {
        format!(
            "{},{},{},{}\n",
            quote_field(&self.topic),
            self.completed_work_seconds,
            self.completed_rest_seconds,
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }

    /// Parse one CSV line written by [`CompletionRecord::to_line`]
    pub fn parse_line(line: &str) -> Result<Self> {
        // Only the topic may contain commas, so split from the right
        let mut fields = line.trim_end_matches(['\r', '\n']).rsplitn(4, ',');
        let (Some(timestamp), Some(rest), Some(work), Some(topic)) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            bail!("Expected 4 fields in {line:?}");
        };

        Ok(Self {
            topic: unquote_field(topic)?,
            completed_work_seconds: work
                .parse()
                .with_context(|| format!("Invalid work seconds: {work:?}"))?,
            completed_rest_seconds: rest
                .parse()
                .with_context(|| format!("Invalid rest seconds: {rest:?}"))?,
            timestamp: DateTime::parse_from_rfc3339(timestamp)
                .with_context(|| format!("Invalid timestamp: {timestamp:?}"))?
                .with_timezone(&Utc),
        })
    }
}

fn quote_field(value: &str) -> String {
    // Each record is exactly one physical line
    let value: String = value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if value.contains([',', '"']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value
    }
}

fn unquote_field(value: &str) -> Result<String> {
    match value.strip_prefix('"') {
        None => Ok(value.to_string()),
        Some(inner) => match inner.strip_suffix('"') {
            Some(inner) => Ok(inner.replace("\"\"", "\"")),
            None => bail!("Unterminated quoted field: {value:?}"),
        },
    }
}

/// The open session log.
///
/// Opened once at startup and held until the program exits. Every append
/// is flushed to disk before it returns. The file handle is released by
/// [`SessionLog::close`], or on drop if the log is never closed explicitly.
#[derive(Debug)]
pub struct SessionLog {
    path: PathBuf,
    file: Option<File>,
}

impl SessionLog {
    /// Open the log for appending, creating it and its parent directory if
    /// they do not exist. Existing content is never truncated.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TimerError> {
        let path = path.as_ref().to_path_buf();
        let unavailable = |source| TimerError::LogUnavailable {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(unavailable)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(unavailable)?;

        log::debug!("Opened session log {}", path.display());
        Ok(Self {
            path,
            file: Some(file),
        })
    }

    /// Append a record and wait until it has reached the disk
    pub fn append(&mut self, record: &CompletionRecord) -> Result<()> {
        let file = self
            .file
            .as_mut()
            .with_context(|| format!("Log file already closed: {}", self.path.display()))?;

        // One write call per record so a line is never split
        file.write_all(record.to_line().as_bytes())
            .with_context(|| format!("Failed to write to log file: {}", self.path.display()))?;
        file.sync_data()
            .with_context(|| format!("Failed to sync log file: {}", self.path.display()))?;

        log::info!(
            "Logged {}s work, {}s rest for {:?}",
            record.completed_work_seconds,
            record.completed_rest_seconds,
            record.topic
        );
        Ok(())
    }

    /// Flush and release the log file
    pub fn close(mut self) -> Result<()> {
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()
                .and_then(|()| file.sync_all())
                .with_context(|| format!("Failed to close log file: {}", self.path.display()))?;
            log::debug!("Closed session log {}", self.path.display());
        }
        Ok(())
    }
}

impl Drop for SessionLog {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::error!("{e:#}");
        }
    }
}

/// Read every record from a log file, in the order they were appended
///
/// A missing file reads as an empty log.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<CompletionRecord>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read log file: {}", path.display()))?;

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(line_num, line)| {
            CompletionRecord::parse_line(line)
                .with_context(|| format!("Failed to parse line {}", line_num + 1))
        })
        .collect()
}
