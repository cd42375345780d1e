//! Frontier queue of addresses awaiting a worker
//!
//! The frontier is an unbounded FIFO behind a mutex. Pushing never blocks, so
//! a worker can fan out any number of links without parking on a full queue
//! and without spawning a task per link. Idle workers wait on a `Notify`.
//!
//! The frontier also counts addresses that have been popped but not yet
//! completed. An empty queue with nothing in flight can never grow again, so
//! `pop` reports it as exhausted.

use crate::url::Address;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
struct Queue {
    pending: VecDeque<Address>,
    in_flight: usize,
    pushed: u64,
}

/// Shared FIFO of addresses known but not yet fetched
#[derive(Debug, Default)]
pub struct Frontier {
    queue: Mutex<Queue>,
    ready: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an address and wakes one idle worker
    pub fn push(&self, address: Address) {
        {
            let mut queue = self.lock();
            queue.pending.push_back(address);
            queue.pushed += 1;
        }
        self.ready.notify_one();
    }

    /// Takes the next address, waiting while the queue is empty
    ///
    /// Returns `None` when `stop` fires or when the frontier is exhausted.
    /// Every `Some` must be matched by a call to [`Frontier::complete`].
    pub async fn pop(&self, stop: &CancellationToken) -> Option<Address> {
        loop {
            if stop.is_cancelled() {
                return None;
            }

            // Register interest before looking at the queue so a push or an
            // exhaustion signal between the check and the await is not lost.
            let notified = self.ready.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut queue = self.lock();
                if let Some(address) = queue.pending.pop_front() {
                    queue.in_flight += 1;
                    return Some(address);
                }
                if queue.in_flight == 0 {
                    return None;
                }
            }

            tokio::select! {
                _ = &mut notified => {}
                _ = stop.cancelled() => return None,
            }
        }
    }

    /// Marks a popped address as finished, after its links have been pushed
    pub fn complete(&self) {
        let exhausted = {
            let mut queue = self.lock();
            queue.in_flight = queue.in_flight.saturating_sub(1);
            queue.in_flight == 0 && queue.pending.is_empty()
        };

        if exhausted {
            self.ready.notify_waiters();
        }
    }

    /// Number of addresses waiting for a worker
    pub fn len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of pushes since the crawl started
    pub fn pushed(&self) -> u64 {
        self.lock().pushed
    }

    fn lock(&self) -> MutexGuard<'_, Queue> {
        self.queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
