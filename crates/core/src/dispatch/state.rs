//! Shared dispatch state.
//!
//! Three independent locks, never held together:
//! - the queue lock covers every output queue, the order queue and the
//!   in-flight turn marker
//! - the activation lock is held for the duration of one activation
//! - the completion lock guards the per-line outstanding counter
//!
//! Wake-ups go through [`Notify`]. Every wait registers interest before
//! checking its condition under the lock, so a notification sent between the
//! check and the wait is never lost.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, MutexGuard, Notify};

use crate::sequence::{OutputKind, PerKind, Token};

use super::types::{DispatchError, QueueSnapshot};

#[derive(Debug, Default)]
struct Queues {
    pending: PerKind<VecDeque<Token>>,
    order: VecDeque<OutputKind>,
    in_flight: Option<OutputKind>,
}

/// Queues, turn tracking and completion barrier shared by the engine and its
/// workers.
#[derive(Debug)]
pub struct DispatchState {
    queues: Mutex<Queues>,
    /// Fired when a token lands in that kind's output queue.
    work_ready: PerKind<Notify>,
    /// Fired when the order queue head or the in-flight marker changes.
    turn_changed: Notify,
    activation: Mutex<()>,
    outstanding: Mutex<usize>,
    /// Fired when `outstanding` drops to zero.
    completed: Notify,
    completed_total: AtomicU64,
}

impl Default for DispatchState {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchState {
    pub fn new() -> Self {
        Self {
            queues: Mutex::new(Queues::default()),
            work_ready: PerKind::from_fn(|_| Notify::new()),
            turn_changed: Notify::new(),
            activation: Mutex::new(()),
            outstanding: Mutex::new(0),
            completed: Notify::new(),
            completed_total: AtomicU64::new(0),
        }
    }

    /// Reset the completion counter to `count`.
    ///
    /// Must be called before the first token of the line is enqueued, so a
    /// worker cannot complete a token before the counter accounts for it.
    pub async fn arm(&self, count: usize) {
        *self.outstanding.lock().await = count;
    }

    /// Append `token` to its output queue and its tag to the order queue.
    ///
    /// Capacity for both is reserved first; on failure neither queue changes.
    pub async fn enqueue(&self, token: Token) -> Result<(), DispatchError> {
        let kind = token.kind;
        let mut queues = self.queues.lock().await;

        queues
            .order
            .try_reserve(1)
            .map_err(|_| DispatchError::QueueAllocation { kind })?;
        queues.pending[kind]
            .try_reserve(1)
            .map_err(|_| DispatchError::QueueAllocation { kind })?;

        queues.pending[kind].push_back(token);
        queues.order.push_back(kind);

        self.work_ready[kind].notify_one();
        self.turn_changed.notify_waiters();
        Ok(())
    }

    /// Wait until `kind` has at least one pending token.
    pub async fn wait_for_work(&self, kind: OutputKind) {
        loop {
            let notified = self.work_ready[kind].notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if !self.queues.lock().await.pending[kind].is_empty() {
                return;
            }
            notified.await;
        }
    }

    /// Wait for `kind`'s turn, then claim it.
    ///
    /// The head tag and its token leave the queues in the same critical
    /// section, and the turn stays in flight until [`finish_turn`] is called.
    ///
    /// [`finish_turn`]: DispatchState::finish_turn
    pub async fn take_turn(&self, kind: OutputKind) -> Result<Token, DispatchError> {
        loop {
            let notified = self.turn_changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut queues = self.queues.lock().await;
                if queues.in_flight.is_none() && queues.order.front() == Some(&kind) {
                    let token = queues.pending[kind]
                        .pop_front()
                        .ok_or(DispatchError::OrphanedTag { kind })?;
                    queues.order.pop_front();
                    queues.in_flight = Some(kind);
                    return Ok(token);
                }
            }

            notified.await;
        }
    }

    /// Release the turn claimed by [`take_turn`](DispatchState::take_turn).
    pub async fn finish_turn(&self, kind: OutputKind) {
        {
            let mut queues = self.queues.lock().await;
            debug_assert_eq!(queues.in_flight, Some(kind));
            queues.in_flight = None;
        }
        self.turn_changed.notify_waiters();
    }

    /// Acquire exclusive access to the physical outputs.
    pub async fn lock_activation(&self) -> MutexGuard<'_, ()> {
        self.activation.lock().await
    }

    /// Record one completed token.
    pub async fn complete_one(&self) {
        let mut outstanding = self.outstanding.lock().await;
        *outstanding = outstanding.saturating_sub(1);
        self.completed_total.fetch_add(1, Ordering::Relaxed);

        if *outstanding == 0 {
            self.completed.notify_waiters();
        }
    }

    /// Wait until every armed token has completed.
    pub async fn wait_for_completion(&self) {
        loop {
            let notified = self.completed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if *self.outstanding.lock().await == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Tokens of the current line not yet completed.
    pub async fn outstanding(&self) -> usize {
        *self.outstanding.lock().await
    }

    /// Tokens completed since this state was created.
    pub fn completed_total(&self) -> u64 {
        self.completed_total.load(Ordering::Relaxed)
    }

    /// Consistent view of every queue.
    pub async fn snapshot(&self) -> QueueSnapshot {
        let queues = self.queues.lock().await;

        let mut order_tags = PerKind::<usize>::default();
        for kind in &queues.order {
            order_tags[*kind] += 1;
        }

        QueueSnapshot {
            pending_tokens: queues.pending.map(|_, queue| queue.len()),
            order_tags,
            in_flight: queues.in_flight,
        }
    }
}
