//! # Completion Delivery
//!
//! Every store operation finishes by handing its result to a completion
//! callback. Where that callback runs is chosen by the embedder:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CallbackQueue                                    │
//! │                                                                         │
//! │  Inline                                                                 │
//! │    sync task ──► completion(result)          (on the worker task)      │
//! │                                                                         │
//! │  Queue                                                                  │
//! │    sync task ──► mpsc ──► CallbackRunner ──► completion(result)        │
//! │                           (owned by the caller's context, e.g. a UI    │
//! │                            loop or the CLI's main task)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each completion runs exactly once.

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use shopsync_core::ReconcileSummary;

use crate::error::SyncResult;

/// Completion callback of a store operation.
pub type Completion = Box<dyn FnOnce(SyncResult<ReconcileSummary>) + Send + 'static>;

/// A completion paired with the result it is to receive.
pub struct Job {
    completion: Completion,
    result: SyncResult<ReconcileSummary>,
}

// =============================================================================
// Callback Queue
// =============================================================================

/// Where completions are delivered.
#[derive(Clone, Default)]
pub enum CallbackQueue {
    /// Run on the task that finished the work.
    #[default]
    Inline,

    /// Forward to a [`CallbackRunner`].
    Queue(mpsc::UnboundedSender<Job>),
}

impl fmt::Debug for CallbackQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackQueue::Inline => f.write_str("CallbackQueue::Inline"),
            CallbackQueue::Queue(_) => f.write_str("CallbackQueue::Queue"),
        }
    }
}

impl CallbackQueue {
    pub fn inline() -> Self {
        CallbackQueue::Inline
    }

    /// Creates a queue and the runner that drains it.
    pub fn spawn() -> (CallbackQueue, CallbackRunner) {
        let (tx, rx) = mpsc::unbounded_channel();
        (CallbackQueue::Queue(tx), CallbackRunner { rx })
    }

    /// Hands `result` to `completion` in this queue's context.
    pub fn deliver(&self, completion: Completion, result: SyncResult<ReconcileSummary>) {
        match self {
            CallbackQueue::Inline => completion(result),
            CallbackQueue::Queue(tx) => {
                if let Err(mpsc::error::SendError(job)) = tx.send(Job { completion, result }) {
                    warn!("Callback runner is gone, running completion inline");
                    (job.completion)(job.result);
                }
            }
        }
    }
}

// =============================================================================
// Callback Runner
// =============================================================================

/// Receiving end of a [`CallbackQueue::Queue`].
pub struct CallbackRunner {
    rx: mpsc::UnboundedReceiver<Job>,
}

impl CallbackRunner {
    /// Runs completions until every queue handle is dropped.
    pub async fn run(mut self) {
        while let Some(job) = self.rx.recv().await {
            (job.completion)(job.result);
        }
        debug!("Callback runner stopped");
    }

    /// Waits for the next completion and runs it. Returns false once every
    /// queue handle is dropped.
    pub async fn run_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(job) => {
                (job.completion)(job.result);
                true
            }
            None => false,
        }
    }

    /// Runs the completions already queued without waiting for more.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            (job.completion)(job.result);
            ran += 1;
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording(log: &Arc<Mutex<Vec<u64>>>) -> Completion {
        let log = log.clone();
        Box::new(move |result| {
            log.lock().unwrap().push(result.unwrap().inserted);
        })
    }

    fn summary(inserted: u64) -> SyncResult<ReconcileSummary> {
        Ok(ReconcileSummary {
            inserted,
            ..ReconcileSummary::default()
        })
    }

    #[test]
    fn test_inline_runs_immediately() {
        let log = Arc::new(Mutex::new(Vec::new()));
        CallbackQueue::inline().deliver(recording(&log), summary(1));
        assert_eq!(*log.lock().unwrap(), vec![1]);
    }

    #[test]
    fn test_queue_runs_only_when_drained() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (queue, mut runner) = CallbackQueue::spawn();

        queue.deliver(recording(&log), summary(1));
        queue.deliver(recording(&log), summary(2));
        assert!(log.lock().unwrap().is_empty());

        assert_eq!(runner.run_pending(), 2);
        assert_eq!(*log.lock().unwrap(), vec![1, 2]);
        assert_eq!(runner.run_pending(), 0);
    }

    #[test]
    fn test_dropped_runner_falls_back_to_inline() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (queue, runner) = CallbackQueue::spawn();
        drop(runner);

        queue.deliver(recording(&log), summary(5));
        assert_eq!(*log.lock().unwrap(), vec![5]);
    }

    #[tokio::test]
    async fn test_run_stops_when_queue_dropped() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (queue, runner) = CallbackQueue::spawn();

        queue.deliver(recording(&log), summary(3));
        drop(queue);
        runner.run().await;

        assert_eq!(*log.lock().unwrap(), vec![3]);
    }
}
