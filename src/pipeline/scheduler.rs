//! Scheduler: a fixed pool of worker threads driving the worklist through the invoker.
//!
//! Worklist → item channel → N workers (one analyzer process each) → completion channel.
//! The pool size is the concurrency ceiling; a worker takes the next item as soon as its
//! current one reaches a terminal outcome.

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender, bounded};
use log::debug;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::types::{AttemptResult, WorkItem};

use super::cancel::CancelToken;
use super::invoker::Invoker;

/// One terminal outcome, emitted in process-exit order (not worklist order).
#[derive(Debug)]
pub struct Completion {
    pub item: WorkItem,
    pub result: AttemptResult,
    /// Wall time from admission to terminal outcome, retries included.
    pub elapsed: Duration,
}

/// Handles returned by [`run`]: receive completions until the channel closes, then [`join`](Self::join).
pub struct SchedulerHandles {
    pub completion_rx: Receiver<Completion>,
    pub worker_handles: Vec<JoinHandle<()>>,
}

impl SchedulerHandles {
    /// Join the worker threads. Call after `completion_rx` is drained.
    pub fn join(self) -> Result<()> {
        drop(self.completion_rx);
        let mut panicked = 0;
        for h in self.worker_handles {
            if h.join().is_err() {
                panicked += 1;
            }
        }
        if panicked > 0 {
            anyhow::bail!("{} analysis worker thread(s) panicked", panicked);
        }
        Ok(())
    }
}

/// Pool size for `requested` ceiling over `items`: at least 1, never more than there are items.
pub fn pool_size(requested: usize, items: usize) -> usize {
    requested.max(1).min(items)
}

/// Single worker: take items until the queue is empty or the token is cancelled.
/// The token is checked before each admission and inside the invoker.
fn worker_loop(
    item_rx: Receiver<WorkItem>,
    completion_tx: Sender<Completion>,
    token: CancelToken,
    invoker: Arc<Invoker>,
) {
    while let Ok(item) = item_rx.recv() {
        if token.is_cancelled() {
            break;
        }
        let started = Instant::now();
        let result = invoker.invoke(&item, &token);
        let completion = Completion {
            item,
            result,
            elapsed: started.elapsed(),
        };
        if completion_tx.send(completion).is_err() {
            break;
        }
    }
}

/// Start the pool. The completion channel closes once every worker has exited: the worklist
/// ran out, or cancellation was observed and in-flight items were drained.
pub fn run(
    worklist: Vec<WorkItem>,
    concurrency_limit: usize,
    token: &CancelToken,
    invoker: Arc<Invoker>,
) -> SchedulerHandles {
    let total = worklist.len();
    let workers = pool_size(concurrency_limit, total);
    debug!(
        "Scheduling {} files on {} workers ({} retries each)",
        total,
        workers,
        invoker.max_retries()
    );

    // Capacity covers the whole worklist so filling never blocks.
    let (item_tx, item_rx) = bounded::<WorkItem>(total.max(1));
    for item in worklist {
        let _ = item_tx.send(item);
    }
    drop(item_tx);

    let (completion_tx, completion_rx) = bounded::<Completion>(workers.max(1));
    let worker_handles = (0..workers)
        .map(|_| {
            let item_rx = item_rx.clone();
            let completion_tx = completion_tx.clone();
            let token = token.clone();
            let invoker = Arc::clone(&invoker);
            thread::spawn(move || worker_loop(item_rx, completion_tx, token, invoker))
        })
        .collect();

    // Dropping the last sender closes the channel once workers exit.
    drop(completion_tx);

    SchedulerHandles {
        completion_rx,
        worker_handles,
    }
}
