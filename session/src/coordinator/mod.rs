//! Single-flight background jobs polled from the frame loop.
//!
//! Each coordinator owns one [`JobSlot`]: at most one job runs at a time, a
//! request made while one is in flight is dropped, and the finished job leaves
//! its result in a one-element mailbox for the next poll.

mod analysis;
mod mover;

pub use analysis::AnalysisCoordinator;
pub use mover::{MoveCoordinator, MoveResult};

use std::future::Future;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub(crate) struct JobSlot<T> {
    handle: Option<JoinHandle<()>>,
    tx: mpsc::Sender<T>,
    rx: mpsc::Receiver<T>,
    spawned: usize,
}

impl<T: Send + 'static> JobSlot<T> {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::channel(1);
        Self {
            handle: None,
            tx,
            rx,
            spawned: 0,
        }
    }

    /// True while a spawned job has not finished.
    pub(crate) fn is_busy(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Spawn `job` unless one is already running.
    ///
    /// An unread result from the previous job is discarded first so the
    /// mailbox only ever holds the newest answer.
    pub(crate) fn spawn<F>(&mut self, runtime: &Handle, job: F) -> bool
    where
        F: Future<Output = T> + Send + 'static,
    {
        if self.is_busy() {
            return false;
        }
        while self.rx.try_recv().is_ok() {}

        let tx = self.tx.clone();
        self.handle = Some(runtime.spawn(async move {
            if tx.try_send(job.await).is_err() {
                tracing::debug!("Job result dropped: mailbox occupied");
            }
        }));
        self.spawned += 1;
        true
    }

    /// Take the finished job's result, if one is waiting.
    pub(crate) fn take(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    pub(crate) fn spawned(&self) -> usize {
        self.spawned
    }
}
