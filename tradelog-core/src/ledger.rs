//! JSONL ledger — append-only persistence with last-write-wins reconciliation.
//!
//! Positions are persisted as one JSON object per line, partitioned into one
//! file per calendar month of open time (`trades-YYYY-MM.jsonl`). Appending
//! is the only write primitive: closing a position re-appends its full state
//! under the same id, and reads fold every line into an id-keyed map where a
//! later line wins. The log is never rewritten in place, so a crash mid-write
//! damages at most the last line, which the per-line parse-skip policy
//! tolerates.
//!
//! The cost is O(file size) reads and unbounded growth of superseded
//! records — acceptable at manual journal cadence.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::Datelike;
use thiserror::Error;
use tracing::warn;

use crate::domain::{Position, Status};

/// Ledger failure: I/O and serialization surface directly, never retried.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to serialize position: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("position not found: {id}")]
    NotFound { id: String },
}

/// Append-only JSONL store bound to a data directory.
#[derive(Debug, Clone)]
pub struct JsonlLedger {
    data_dir: PathBuf,
}

impl JsonlLedger {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn month_file(&self, year: i32, month: u32) -> PathBuf {
        self.data_dir
            .join(format!("trades-{year:04}-{month:02}.jsonl"))
    }

    /// Append one position record to the file for its open month.
    ///
    /// This is the only write primitive; both creation and close amendments
    /// go through it.
    pub fn append(&self, pos: &Position) -> Result<(), LedgerError> {
        fs::create_dir_all(&self.data_dir)?;

        let path = self.month_file(pos.open_time.year(), pos.open_time.month());
        let json = serde_json::to_string(pos)?;

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "{json}")?;
        file.flush()?;

        Ok(())
    }

    /// Amend a position by appending a new full snapshot under the same id.
    /// Fold-time reconciliation makes the new snapshot authoritative.
    pub fn update(&self, pos: &Position) -> Result<(), LedgerError> {
        self.append(pos)
    }

    /// Read one month's positions, reconciled and sorted by open time.
    /// A missing file yields an empty list.
    pub fn read_month(&self, year: i32, month: u32) -> Result<Vec<Position>, LedgerError> {
        let path = self.month_file(year, month);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut folded = HashMap::new();
        self.fold_file(&path, &mut folded)?;
        Ok(sorted_by_open_time(folded))
    }

    /// Read every `*.jsonl` file in the data directory into one reconciled
    /// set, sorted by open time.
    ///
    /// Reconciliation is global: a later append in any file supersedes an
    /// earlier record for the same id. Files fold in name order, which for
    /// the `trades-YYYY-MM` pattern is chronological, so scan order is
    /// deterministic across filesystems. A file that cannot be opened is
    /// warned and skipped; one bad file must not block the rest of history.
    pub fn read_all(&self) -> Result<Vec<Position>, LedgerError> {
        fs::create_dir_all(&self.data_dir)?;

        let mut files: Vec<PathBuf> = fs::read_dir(&self.data_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("jsonl"))
            .collect();
        files.sort();

        let mut folded = HashMap::new();
        for path in files {
            if let Err(err) = self.fold_file(&path, &mut folded) {
                warn!(file = %path.display(), %err, "skipping unreadable ledger file");
            }
        }

        Ok(sorted_by_open_time(folded))
    }

    /// All positions still open, sorted by open time.
    pub fn read_open(&self) -> Result<Vec<Position>, LedgerError> {
        let all = self.read_all()?;
        Ok(all.into_iter().filter(|p| p.status == Status::Open).collect())
    }

    /// Find the authoritative record for an id, or `NotFound`.
    pub fn find_by_id(&self, position_id: &str) -> Result<Position, LedgerError> {
        let all = self.read_all()?;
        all.into_iter()
            .find(|p| p.position_id == position_id)
            .ok_or_else(|| LedgerError::NotFound {
                id: position_id.to_string(),
            })
    }

    /// Fold one file line by line into the id-keyed map. Malformed lines are
    /// warned and skipped; a later line for the same id overwrites an
    /// earlier one.
    fn fold_file(
        &self,
        path: &Path,
        folded: &mut HashMap<String, Position>,
    ) -> Result<(), LedgerError> {
        let file = fs::File::open(path)?;
        let reader = io::BufReader::new(file);

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Position>(&line) {
                Ok(pos) => {
                    folded.insert(pos.position_id.clone(), pos);
                }
                Err(err) => {
                    warn!(
                        file = %path.display(),
                        line = index + 1,
                        %err,
                        "skipping malformed ledger line"
                    );
                }
            }
        }

        Ok(())
    }
}

fn sorted_by_open_time(folded: HashMap<String, Position>) -> Vec<Position> {
    let mut result: Vec<Position> = folded.into_values().collect();
    result.sort_by_key(|p| p.open_time);
    result
}
