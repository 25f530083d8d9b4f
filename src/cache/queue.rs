//! Serial Queue Module
//!
//! Every cache owns one worker thread that exclusively owns the cache state
//! and runs submitted jobs one at a time, in submission order.

use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::thread;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::error::{CacheError, Result};

type Job<S> = Box<dyn FnOnce(&mut S) + Send + 'static>;

// == Serial Queue ==
/// Single-worker FIFO execution context owning a state `S`.
///
/// Clones share the same worker. The worker drains every job already
/// submitted and then exits once the last handle is dropped.
pub(crate) struct SerialQueue<S> {
    label: String,
    jobs: mpsc::UnboundedSender<Job<S>>,
}

impl<S> Clone for SerialQueue<S> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            jobs: self.jobs.clone(),
        }
    }
}

impl<S: Send + 'static> SerialQueue<S> {
    /// Starts a worker thread named `label` that takes ownership of `state`.
    pub(crate) fn spawn(label: impl Into<String>, state: S) -> Result<Self> {
        let label = label.into();
        let (jobs, mut receiver) = mpsc::unbounded_channel::<Job<S>>();

        let worker_label = label.clone();
        thread::Builder::new()
            .name(label.clone())
            .spawn(move || {
                let mut state = state;
                debug!(queue = %worker_label, "cache worker started");
                while let Some(job) = receiver.blocking_recv() {
                    // A panicking job drops its completion sender; the caller sees a default result.
                    if catch_unwind(AssertUnwindSafe(|| job(&mut state))).is_err() {
                        error!(queue = %worker_label, "cache operation panicked");
                    }
                }
                debug!(queue = %worker_label, "cache worker stopped");
            })
            .map_err(|source| CacheError::Worker {
                label: label.clone(),
                source,
            })?;

        Ok(Self { label, jobs })
    }

    // == Submit ==
    /// Enqueues `op` and returns a completion resolving to its result.
    ///
    /// The job is queued before this returns, so jobs run in call order.
    pub(crate) fn submit<T, F>(&self, op: F) -> Completion<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut S) -> T + Send + 'static,
    {
        let (done, receiver) = oneshot::channel();
        let job: Job<S> = Box::new(move |state| {
            let _ = done.send(op(state));
        });

        if self.jobs.send(job).is_err() {
            error!(queue = %self.label, "cache worker is gone, dropping operation");
        }

        Completion { receiver }
    }
}

// == Completion ==
/// Future resolving to the result of one cache operation.
///
/// Resolves exactly once. If the worker lost the operation it resolves to
/// `T::default()`, i.e. `false`, `None` or `()`.
#[must_use = "cache operations report their result through the completion"]
#[derive(Debug)]
pub struct Completion<T> {
    receiver: oneshot::Receiver<T>,
}

impl<T: Default> Future for Completion<T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(value)) => Poll::Ready(value),
            Poll::Ready(Err(_)) => {
                error!("cache operation was dropped before completing");
                Poll::Ready(T::default())
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
