//! omd-logging: NDJSON event logs for simulation runs.
//!
//! One JSON object per line, append-only. A run writes one `trial` event per finished
//! trial followed by a single `run_summary` event.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Bump whenever an event layout changes.
pub const EVENT_SCHEMA_VERSION: u32 = 1;

pub fn now_ms() -> u64 {
    let d = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    d.as_millis() as u64
}

/// Stable hash of the effective config, for matching logs to runs.
pub fn hash_config_bytes(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Emitted once per finished trial.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialEventV1 {
    pub event: String, // "trial"
    pub v: u32,
    pub ts_ms: u64,
    pub run_id: String,

    pub trial: u32,
    pub outcome: String, // "converged" | "exhausted"
    pub attempts: u32,
    /// 1-based predicted value (converged only).
    pub prediction: Option<u8>,
    /// Raw orientation per face on the committing attempt (converged only).
    pub roll: Option<Vec<String>>,
}

/// Emitted once at the end of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummaryEventV1 {
    pub event: String, // "run_summary"
    pub v: u32,
    pub ts_ms: u64,
    pub run_id: String,

    pub seed: Option<u64>,
    pub config_hash: Option<String>,
    pub scheme: String,
    pub strategy: String,

    pub trials: u32,
    pub converged: u32,
    pub exhausted: u32,
    pub attempts: u64,

    /// Empty when no trial converged.
    pub histogram: Vec<f64>,
    pub chi2: Option<f64>,
    pub cdf: Option<f64>,
    /// Error message when the run failed.
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum NdjsonError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Event sink for one log file. Every `write_event` appends exactly one line.
pub struct NdjsonWriter {
    out: BufWriter<File>,
    pending: u64,
    /// Flush after this many buffered lines; 0 means only on `flush`/drop.
    flush_every: u64,
}

impl NdjsonWriter {
    /// Open `path` for appending, creating it when missing.
    pub fn open_append(path: impl AsRef<Path>) -> Result<Self, NdjsonError> {
        Self::open_append_with_flush(path, 0)
    }

    pub fn open_append_with_flush(
        path: impl AsRef<Path>,
        flush_every: u64,
    ) -> Result<Self, NdjsonError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            out: BufWriter::new(file),
            pending: 0,
            flush_every,
        })
    }

    pub fn write_event<T: Serialize>(&mut self, event: &T) -> Result<(), NdjsonError> {
        // Serialize before touching the buffer.
        let line = serde_json::to_string(event)?;
        writeln!(self.out, "{line}")?;
        self.pending += 1;
        if self.flush_every != 0 && self.pending == self.flush_every {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), NdjsonError> {
        self.out.flush()?;
        self.pending = 0;
        Ok(())
    }
}
