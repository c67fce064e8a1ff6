//! Fixed-size worker pool. Workers pull [`Task`]s from an unbounded FIFO
//! queue; dequeue order across workers is not guaranteed. Mirrors the shape
//! of a typed-message worker pool: one OS thread per worker, blocking on
//! `Receiver::recv`, shut down by dropping every sender so `recv` errors out.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel as chan;

use crate::ingest::{Ingest, IngestOutcome};

/// Unit of work submitted to the pool: a single file a worker should sketch
/// and query against the ingest context's frozen index.
pub enum Task {
    IngestFile(PathBuf),
}

/// What a worker produced for a [`Task`].
pub struct TaskResult {
    pub path: PathBuf,
    pub outcome: Result<IngestOutcome, crate::Error>,
}

/// A cloneable handle for submitting tasks, shared between the pool and
/// whatever produces tasks (the directory watcher's callback).
#[derive(Clone)]
pub struct Submitter {
    tasks: chan::Sender<Task>,
    active: Arc<AtomicUsize>,
}

impl Submitter {
    pub fn submit(&self, task: Task) {
        self.active.fetch_add(1, Ordering::SeqCst);
        if self.tasks.send(task).is_err() {
            log::error!(target: "pool", "submitted a task but the worker pool is gone");
            self.active.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

struct Worker {
    id: usize,
    tasks: chan::Receiver<Task>,
    results: chan::Sender<TaskResult>,
    ingest: Arc<Ingest>,
    active: Arc<AtomicUsize>,
}

impl Worker {
    /// Waits for tasks and runs them. Returns once the task channel
    /// disconnects (i.e. the pool is being destroyed).
    fn run(self) -> Result<(), chan::RecvError> {
        loop {
            let task = self.tasks.recv()?;
            let result = self.process(task);
            self.active.fetch_sub(1, Ordering::SeqCst);
            if self.results.send(result).is_err() {
                log::trace!(target: "worker", "worker#{} result channel disconnected", self.id);
            }
        }
    }

    fn process(&self, task: Task) -> TaskResult {
        match task {
            Task::IngestFile(path) => {
                log::debug!(target: "worker", "worker#{} ingesting {:?}", self.id, path);
                let outcome = self.ingest.ingest_file(&path);
                TaskResult { path, outcome }
            }
        }
    }
}

/// A pool of workers. One thread is allocated per worker.
pub struct Pool {
    submitter: Submitter,
    threads: Vec<JoinHandle<Result<(), chan::RecvError>>>,
}

impl Pool {
    /// Spawns `capacity` worker threads sharing `ingest`, each forwarding
    /// its result onto `results`.
    pub fn with(capacity: usize, ingest: Arc<Ingest>, results: chan::Sender<TaskResult>) -> Self {
        let (tasks_tx, tasks_rx) = chan::unbounded();
        let active = Arc::new(AtomicUsize::new(0));
        let mut threads = Vec::with_capacity(capacity);

        for id in 0..capacity {
            let worker = Worker {
                id,
                tasks: tasks_rx.clone(),
                results: results.clone(),
                ingest: ingest.clone(),
                active: active.clone(),
            };
            let thread = std::thread::Builder::new()
                .name(format!("bigsi-worker-{id}"))
                .spawn(move || worker.run())
                .expect("failed to spawn worker thread");
            threads.push(thread);
        }

        Self {
            submitter: Submitter {
                tasks: tasks_tx,
                active,
            },
            threads,
        }
    }

    /// A cloneable submit handle, usable from the watcher's callback thread.
    pub fn submitter(&self) -> Submitter {
        self.submitter.clone()
    }

    pub fn submit(&self, task: Task) {
        self.submitter.submit(task)
    }

    /// Blocks until the queue is empty and every worker has finished its
    /// current task.
    pub fn wait(&self) {
        while self.submitter.tasks.len() > 0 || self.submitter.active.load(Ordering::SeqCst) > 0 {
            std::thread::yield_now();
        }
    }

    /// Signals shutdown (by dropping the last task sender) and joins every
    /// worker thread.
    pub fn destroy(self) {
        drop(self.submitter);
        for (id, thread) in self.threads.into_iter().enumerate() {
            match thread.join() {
                Ok(Ok(())) => {}
                Ok(Err(err)) => log::trace!(target: "pool", "worker#{id} exited: {err}"),
                Err(_) => log::error!(target: "pool", "worker#{id} panicked"),
            }
        }
        log::debug!(target: "pool", "worker pool shut down");
    }
}
