//! Fan-out of independent work units with fail-fast joins.
//!
//! Every unit runs on its own thread and reports into a single channel. The
//! caller returns as soon as either all units succeeded or the first one
//! failed. Units still in flight after a failure are not cancelled: they run
//! to completion and their results are dropped with the channel.

use std::io;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use thiserror::Error;
use tracing::trace;

/// A worker thread failed to deliver a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkerError {
    /// The worker panicked before reporting its result.
    #[error("a worker task panicked before reporting its result")]
    Panicked,

    /// The operating system refused to start a worker thread.
    #[error("failed to start worker thread: {0}")]
    Spawn(String),
}

impl From<io::Error> for WorkerError {
    fn from(e: io::Error) -> Self {
        WorkerError::Spawn(e.to_string())
    }
}

/// How a batch of units is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingMode {
    /// One thread per unit.
    #[default]
    Parallel,
    /// One unit after the other on the calling thread.
    Serial,
}

impl ProcessingMode {
    /// Mode for the `parallel_processing` feature toggle.
    pub fn from_parallel(parallel: bool) -> Self {
        if parallel {
            Self::Parallel
        } else {
            Self::Serial
        }
    }
}

/// Run `task` over `items` in `mode`, returning results in input order.
pub fn execute<I, T, E, F>(mode: ProcessingMode, items: Vec<I>, task: F) -> Result<Vec<T>, E>
where
    I: Send + 'static,
    T: Send + 'static,
    E: From<WorkerError> + Send + 'static,
    F: Fn(I) -> Result<T, E> + Send + Sync + 'static,
{
    match mode {
        ProcessingMode::Parallel => fan_out(items, task),
        ProcessingMode::Serial => items.into_iter().map(task).collect(),
    }
}

/// Run `task` over every item concurrently, first error wins.
///
/// Results are written into a buffer slot owned by each unit's index, so the
/// output order matches `items` regardless of completion order. If a thread
/// cannot be started the batch fails with [`WorkerError::Spawn`]; units
/// already started keep running.
pub fn fan_out<I, T, E, F>(items: Vec<I>, task: F) -> Result<Vec<T>, E>
where
    I: Send + 'static,
    T: Send + 'static,
    E: From<WorkerError> + Send + 'static,
    F: Fn(I) -> Result<T, E> + Send + Sync + 'static,
{
    fan_out_with(items, task, spawn_thread)
}

/// Unit of work handed to a spawner.
type Work = Box<dyn FnOnce() + Send + 'static>;

fn spawn_thread(name: String, work: Work) -> io::Result<()> {
    thread::Builder::new().name(name).spawn(work).map(drop)
}

fn fan_out_with<I, T, E, F, S>(items: Vec<I>, task: F, spawn: S) -> Result<Vec<T>, E>
where
    I: Send + 'static,
    T: Send + 'static,
    E: From<WorkerError> + Send + 'static,
    F: Fn(I) -> Result<T, E> + Send + Sync + 'static,
    S: Fn(String, Work) -> io::Result<()>,
{
    let total = items.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let task = Arc::new(task);
    let (tx, rx) = mpsc::channel::<(usize, Result<T, E>)>();

    for (idx, item) in items.into_iter().enumerate() {
        let task = Arc::clone(&task);
        let tx = tx.clone();
        let work: Work = Box::new(move || {
            let result = task(item);
            // The receiver is gone once the batch has failed; late results
            // are discarded.
            let _ = tx.send((idx, result));
        });
        if let Err(e) = spawn(format!("fanout-{}", idx), work) {
            trace!(unit = idx, error = %e, "Could not start worker, abandoning batch");
            return Err(WorkerError::from(e).into());
        }
    }
    drop(tx);

    let mut slots: Vec<Option<T>> = (0..total).map(|_| None).collect();
    let mut remaining = total;
    while remaining > 0 {
        match rx.recv() {
            Ok((idx, Ok(value))) => {
                slots[idx] = Some(value);
                remaining -= 1;
            }
            Ok((idx, Err(e))) => {
                trace!(unit = idx, pending = remaining - 1, "Unit failed, abandoning batch");
                return Err(e);
            }
            // Every sender is gone but results are missing: a worker panicked.
            Err(_) => return Err(WorkerError::Panicked.into()),
        }
    }

    slots
        .into_iter()
        .map(|slot| slot.ok_or_else(|| WorkerError::Panicked.into()))
        .collect()
}
