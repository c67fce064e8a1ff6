//! `ConfigRecord`: the flat JSON document that is the daemon's side of the
//! PID/running handshake. The daemon rewrites it with its pid and
//! `running = true` at startup; CLI subcommands (`stop`, `info`) read it to
//! find the daemon.
//!
//! There is no locking between writers and readers (spec's own §5 design
//! note flags this as a known gap for a future revision with a lock file).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Default worker pool size, per spec.
pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_KMER_SIZE: u8 = 31;
pub const DEFAULT_SKETCH_SIZE: usize = 9_586;
pub const DEFAULT_BLOOM_FP_RATE: f64 = 0.01;
pub const DEFAULT_BLOOM_MAX_ELEMENTS: usize = 1_000;

/// Daemon and CLI configuration, persisted as a single flat JSON document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigRecord {
    pub config_file_path: PathBuf,
    pub watch_directory: PathBuf,
    pub working_directory: PathBuf,
    /// Directory holding `metadata.json`/`bitvectors.db`/`colours.db`.
    pub index_directory: PathBuf,
    pub pid: Option<u32>,
    pub running: bool,
    pub kmer_size: u8,
    pub sketch_size: usize,
    pub bloom_fp_rate: f64,
    pub bloom_max_elements: usize,
    /// Worker pool size. Defaults to [`DEFAULT_WORKERS`].
    pub workers: usize,
    /// Overridable the same way `--log-level` overrides a loaded config.
    pub log_level: String,
}

impl ConfigRecord {
    /// Builds a fresh record with this project's defaults.
    pub fn new(
        config_file_path: impl Into<PathBuf>,
        watch_directory: impl Into<PathBuf>,
        working_directory: impl Into<PathBuf>,
        index_directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config_file_path: config_file_path.into(),
            watch_directory: watch_directory.into(),
            working_directory: working_directory.into(),
            index_directory: index_directory.into(),
            pid: None,
            running: false,
            kmer_size: DEFAULT_KMER_SIZE,
            sketch_size: DEFAULT_SKETCH_SIZE,
            bloom_fp_rate: DEFAULT_BLOOM_FP_RATE,
            bloom_max_elements: DEFAULT_BLOOM_MAX_ELEMENTS,
            workers: DEFAULT_WORKERS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    /// Reads a config record from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let bytes = fs::read(path.as_ref())?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Writes this record to its own `config_file_path`.
    pub fn save(&self) -> Result<(), Error> {
        self.save_to(&self.config_file_path)
    }

    fn save_to(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let bytes = serde_json::to_vec_pretty(self)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Rewrites the record with the daemon's pid and `running = true`.
    pub fn mark_running(&mut self, pid: u32) -> Result<(), Error> {
        self.pid = Some(pid);
        self.running = true;
        self.save()
    }

    /// Clears the running flag, leaving the last known pid in place.
    pub fn mark_stopped(&mut self) -> Result<(), Error> {
        self.running = false;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("bigsi.json");
        let mut record = ConfigRecord::new(
            &config_path,
            dir.path().join("watch"),
            dir.path().join("work"),
            dir.path().join("index"),
        );
        record.mark_running(1234).unwrap();

        let loaded = ConfigRecord::load(&config_path).unwrap();
        assert_eq!(loaded, record);
        assert_eq!(loaded.pid, Some(1234));
        assert!(loaded.running);
    }

    #[test]
    fn mark_stopped_clears_running_but_keeps_pid() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("bigsi.json");
        let mut record = ConfigRecord::new(&config_path, "w", "wd", "idx");
        record.mark_running(42).unwrap();
        record.mark_stopped().unwrap();

        assert!(!record.running);
        assert_eq!(record.pid, Some(42));
    }

    #[test]
    fn defaults_match_documented_constants() {
        let record = ConfigRecord::new("c", "w", "wd", "idx");
        assert_eq!(record.workers, DEFAULT_WORKERS);
        assert_eq!(record.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(record.kmer_size, DEFAULT_KMER_SIZE);
    }
}
