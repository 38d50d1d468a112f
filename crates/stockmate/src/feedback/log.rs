//! Append-only CSV feedback log

use chrono::NaiveDateTime;
use csv::{QuoteStyle, StringRecord, WriterBuilder};
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::feedback::TIMESTAMP_FORMAT;
use crate::types::FeedbackRecord;

const HEADER: [&str; 4] = ["timestamp", "question", "answer", "feedback"];

/// Timestamps with or without a fractional part
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// The durable record of user ratings
///
/// Rows are only ever appended. Appends from this process are serialized;
/// other processes writing the same file are not coordinated.
pub struct FeedbackLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FeedbackLog {
    /// Open the log, creating it with a header row if it does not exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let log = Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        };

        if let Some(parent) = log.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        {
            let _guard = log.write_lock.lock();
            log.ensure_header()?;
        }

        tracing::info!("Feedback log at {}", log.path.display());
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_header(&self) -> Result<()> {
        let is_empty = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };
        if is_empty {
            let mut writer = WriterBuilder::new()
                .quote_style(QuoteStyle::Always)
                .from_path(&self.path)?;
            writer.write_record(HEADER)?;
            writer.flush()?;
        }
        Ok(())
    }

    /// Append one record
    pub fn append(&self, record: &FeedbackRecord) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.ensure_header()?;

        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .has_headers(false)
            .from_writer(file);

        let timestamp = record.timestamp.format(TIMESTAMP_FORMAT).to_string();
        writer.write_record([
            timestamp.as_str(),
            record.question.as_str(),
            record.answer.as_str(),
            record.feedback.as_str(),
        ])?;
        writer.flush()?;

        tracing::info!("Logged feedback: {}", record.feedback);
        Ok(())
    }

    /// Read every record, skipping rows that cannot be parsed
    pub fn read_all(&self) -> Result<Vec<FeedbackRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;

        let mut records = Vec::new();
        for (line, row) in reader.records().enumerate() {
            match row.map_err(Error::from).and_then(|row| parse_row(&row)) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Skipping feedback row {}: {}", line + 1, e),
            }
        }

        Ok(records)
    }

    /// Records stamped at or after `since`
    pub fn since(&self, since: NaiveDateTime) -> Result<Vec<FeedbackRecord>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|r| r.timestamp >= since)
            .collect())
    }
}

fn parse_row(row: &StringRecord) -> Result<FeedbackRecord> {
    let field = |i: usize| {
        row.get(i)
            .ok_or_else(|| Error::Feedback(format!("missing column {}", HEADER[i])))
    };

    let timestamp = NaiveDateTime::parse_from_str(field(0)?, TIMESTAMP_PARSE_FORMAT)
        .map_err(|e| Error::Feedback(format!("bad timestamp {:?}: {}", field(0).unwrap_or(""), e)))?;

    Ok(FeedbackRecord {
        timestamp,
        question: field(1)?.to_string(),
        answer: field(2)?.to_string(),
        feedback: field(3)?.to_string(),
    })
}
