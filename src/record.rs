//! Analysis records and the persistence boundary.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::verdict::Verdict;

/// The durable, user-visible result of one analysis.
///
/// Write-once: built at the end of a pipeline run and never mutated. The
/// fields are public for reading and serialization; nothing in this crate
/// modifies a record after [`AnalysisRecord::new`] returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Unique identifier, generated at creation.
    pub id: Uuid,
    /// Original upload filename.
    pub filename: String,
    /// Classification outcome.
    pub verdict: Verdict,
    /// Certainty in the verdict, an integer percentage in `[0, 100]`.
    pub confidence: u8,
    /// True when the ELA transform fed a real trained classifier end to
    /// end; false means the placeholder scored this request and the result
    /// is non-authoritative.
    pub ela_processed: bool,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
}

impl AnalysisRecord {
    /// Assemble a record, minting its id and timestamp.
    ///
    /// This is the single point where a result gains durable identity;
    /// before this call nothing has an id.
    #[must_use]
    pub fn new(
        filename: impl Into<String>,
        verdict: Verdict,
        confidence: u8,
        ela_processed: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            verdict,
            confidence,
            ela_processed,
            timestamp: Utc::now(),
        }
    }
}

/// Where completed records are handed off.
///
/// The core only stores; listing and retrieval belong to whatever sits
/// behind the sink.
pub trait RecordSink {
    /// Persist one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized or written.
    fn store(&mut self, record: &AnalysisRecord) -> Result<()>;
}

/// Append-only JSON-lines sink, one record object per line.
pub struct JsonlSink {
    writer: BufWriter<std::fs::File>,
}

impl JsonlSink {
    /// Open (or create) a JSONL log at `path` for appending.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl RecordSink for JsonlSink {
    fn store(&mut self, record: &AnalysisRecord) -> Result<()> {
        let line = serde_json::to_string(record)?;
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;
        Ok(())
    }
}
