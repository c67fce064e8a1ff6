//! A single source thread that watches a directory and calls back into the
//! pipeline on every filesystem event, using the `notify` crate's native
//! watcher under the hood. Runs until [`Watcher::stop`] is called.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher as _};

pub use notify::Error;

/// Owns the native watcher and the thread draining its event channel.
pub struct Watcher {
    _inner: RecommendedWatcher,
    thread: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl Watcher {
    /// Starts watching `path` non-recursively, calling `on_event` from a
    /// dedicated thread for every event the native watcher reports.
    pub fn spawn<F>(path: &Path, on_event: F) -> Result<Self, Error>
    where
        F: Fn(notify::Event) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let mut inner = notify::recommended_watcher(tx)?;
        inner.watch(path, RecursiveMode::NonRecursive)?;

        let stop = Arc::new(AtomicBool::new(false));
        let stop_reader = stop.clone();

        let thread = std::thread::Builder::new()
            .name("bigsi-watcher".to_string())
            .spawn(move || loop {
                if stop_reader.load(Ordering::SeqCst) {
                    return;
                }
                match rx.recv_timeout(Duration::from_millis(200)) {
                    Ok(Ok(event)) => on_event(event),
                    Ok(Err(err)) => log::warn!(target: "watcher", "watch error: {err}"),
                    Err(mpsc::RecvTimeoutError::Timeout) => continue,
                    Err(mpsc::RecvTimeoutError::Disconnected) => return,
                }
            })
            .expect("failed to spawn watcher thread");

        Ok(Self {
            _inner: inner,
            thread: Some(thread),
            stop,
        })
    }

    /// Signals the watcher thread to stop and joins it.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!(target: "watcher", "watcher thread panicked");
            }
        }
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        self.stop();
    }
}
