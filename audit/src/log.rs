//! Append-only audit logs.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::entry::{AuditEntry, AuditRecord, Seq};
use crate::error::{AuditError, AuditResult};

/// Storage behind the audit engine.
///
/// Entries are never updated or removed once appended.
pub trait AuditLog: Send + Sync {
    /// Append one entry.
    fn append(&self, entry: &AuditEntry) -> AuditResult<()>;

    /// All entries, in append order.
    fn entries(&self) -> AuditResult<Vec<AuditEntry>>;

    /// Highest sequence number stored, or 0 when empty.
    fn last_seq(&self) -> Seq {
        self.entries()
            .ok()
            .and_then(|entries| entries.iter().map(|e| e.seq).max())
            .unwrap_or(0)
    }
}

/// In-memory audit log for tests and ephemeral setups.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: RwLock<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    /// Create a new empty memory log.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl AuditLog for MemoryAuditLog {
    fn append(&self, entry: &AuditEntry) -> AuditResult<()> {
        self.entries.write().push(entry.clone());
        Ok(())
    }

    fn entries(&self) -> AuditResult<Vec<AuditEntry>> {
        Ok(self.entries.read().clone())
    }

    fn last_seq(&self) -> Seq {
        self.entries.read().last().map(|e| e.seq).unwrap_or(0)
    }
}

/// File-backed audit log: one JSON record per line.
pub struct FileAuditLog {
    /// Path to the log file.
    path: PathBuf,
    /// File for appending. Records go straight to the file unbuffered.
    file: Mutex<File>,
    /// Entries read at open plus everything appended since.
    entries: RwLock<Vec<AuditEntry>>,
}

impl FileAuditLog {
    /// Open or create a log file.
    ///
    /// Existing lines are scanned; a line that cannot be parsed is skipped
    /// with a warning rather than failing the open.
    pub fn open(path: impl AsRef<Path>) -> AuditResult<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            Self::scan_file(&path)?
        } else {
            Vec::new()
        };

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!(
            target: "cmdb::audit",
            path = %path.display(),
            entries = entries.len(),
            "Opened audit log"
        );

        Ok(Self {
            path,
            file: Mutex::new(file),
            entries: RwLock::new(entries),
        })
    }

    fn scan_file(path: &Path) -> AuditResult<Vec<AuditEntry>> {
        let reader = BufReader::new(File::open(path)?);
        let mut entries = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match Self::parse_line(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(
                    target: "cmdb::audit",
                    path = %path.display(),
                    line = index + 1,
                    error = %e,
                    "Skipping malformed audit record"
                ),
            }
        }

        Ok(entries)
    }

    fn parse_line(line: &str) -> AuditResult<AuditEntry> {
        let record: AuditRecord =
            serde_json::from_str(line).map_err(|e| AuditError::invalid_format(e.to_string()))?;
        AuditEntry::try_from(record)
    }

    fn format_line(entry: &AuditEntry) -> AuditResult<String> {
        serde_json::to_string(&AuditRecord::from(entry))
            .map_err(|e| AuditError::serialization(e.to_string()))
    }

    /// Get the log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditLog for FileAuditLog {
    fn append(&self, entry: &AuditEntry) -> AuditResult<()> {
        let mut record = Self::format_line(entry)?;
        record.push('\n');

        let mut file = self.file.lock();
        let len = file.metadata()?.len();
        if let Err(e) = file.write_all(record.as_bytes()).and_then(|()| file.flush()) {
            // Drop any partial record.
            if let Err(truncate) = file.set_len(len) {
                warn!(
                    target: "cmdb::audit",
                    path = %self.path.display(),
                    error = %truncate,
                    "Could not roll back partial audit record"
                );
            }
            return Err(e.into());
        }

        self.entries.write().push(entry.clone());
        Ok(())
    }

    fn entries(&self) -> AuditResult<Vec<AuditEntry>> {
        Ok(self.entries.read().clone())
    }
}
