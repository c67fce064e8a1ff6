//! The daemon pipeline: binds a directory watcher to a fixed-size worker
//! pool, with signal-driven cooperative shutdown and a PID/running
//! handshake through [`bigsi_config::ConfigRecord`].
//!
//! State machine: `Init -> Detached (after daemonize) -> Running (pool up,
//! watcher up) -> Stopping (term signal, watcher stopped) -> Stopped (pool
//! drained and destroyed)`. Terminal transitions always release resources
//! even on internal errors.
//!
//! The double-fork/setsid/dup2 daemonization ritual and the signal-handling
//! self-pipe are POSIX-specific, so this whole crate builds only on unix.

#![cfg(unix)]

pub mod daemonize;
pub mod ingest;
pub mod pool;
pub mod signals;

use std::sync::Arc;

use thiserror::Error;

use bigsi_config::ConfigRecord;
use pool::{Pool, Task};
use signals::Signal;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] bigsi_core::Error),
    #[error(transparent)]
    Config(#[from] bigsi_config::Error),
    #[error(transparent)]
    Ingest(#[from] ingest::Error),
    #[error(transparent)]
    Daemonize(#[from] daemonize::Error),
    #[error(transparent)]
    Watcher(#[from] watcher::Error),
    #[error(transparent)]
    Signals(#[from] signals::Error),
}

pub mod watcher;

/// Lifecycle state of a running [`Daemon`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Init,
    Detached,
    Running,
    Stopping,
    Stopped,
}

/// Owns the daemon's configuration and tracks its lifecycle state.
pub struct Daemon {
    config: ConfigRecord,
    state: State,
}

impl Daemon {
    pub fn new(config: ConfigRecord) -> Self {
        Self {
            config,
            state: State::Init,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Runs the daemon to completion: daemonizes (unless `foreground`),
    /// brings up the watcher and worker pool, blocks on a termination
    /// signal, then drains and tears everything down.
    pub fn run(mut self, foreground: bool) -> Result<(), Error> {
        if !foreground {
            daemonize::daemonize(
                &self.config.working_directory,
                &self.config.working_directory.join("bigsi.out.log"),
                &self.config.working_directory.join("bigsi.err.log"),
            )?;
        }
        self.state = State::Detached;
        self.config.mark_running(std::process::id())?;

        let ingest = Arc::new(ingest::Ingest::open(&self.config)?);
        let (results_tx, results_rx) = crossbeam_channel::unbounded();
        let pool = Pool::with(self.config.workers, ingest, results_tx);

        let submitter = pool.submitter();
        let mut watcher = watcher::Watcher::spawn(&self.config.watch_directory, move |event| {
            for path in event.paths {
                submitter.submit(Task::IngestFile(path));
            }
        })?;

        let terminations = signals::install()?;
        self.state = State::Running;
        log::info!(target: "daemon", "bigsi daemon running, watching {:?}", self.config.watch_directory);

        // Drain any ingestion results in the background so the channel
        // never backs up; this doesn't affect shutdown, which only waits on
        // the pool's own task queue and active-worker count.
        std::thread::spawn(move || {
            for result in results_rx.iter() {
                match result.outcome {
                    Ok(outcome) => log::debug!(
                        target: "daemon",
                        "{:?}: {} kmers, {} matches",
                        result.path,
                        outcome.kmers_processed,
                        outcome.matched_sequence_ids.len()
                    ),
                    Err(err) => log::warn!(target: "daemon", "{:?}: {err}", result.path),
                }
            }
        });

        let signal = terminations.recv().ok();
        log::info!(target: "daemon", "received {signal:?}, shutting down");
        self.state = State::Stopping;

        watcher.stop();
        pool.wait();
        pool.destroy();

        self.config.mark_stopped()?;
        self.state = State::Stopped;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn new_daemon_starts_in_init_state() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigRecord::new(
            dir.path().join("bigsi.json"),
            dir.path().join("watch"),
            dir.path().to_path_buf(),
            dir.path().join("index"),
        );
        let daemon = Daemon::new(config);
        assert_eq!(daemon.state(), State::Init);
    }
}
