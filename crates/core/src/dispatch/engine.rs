//! Dispatch engine implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::actuator::Actuator;
use crate::sequence::{OutputKind, Sequence};

use super::state::DispatchState;
use super::types::{DispatchError, DispatchReport, EngineStatus};
use super::worker::Worker;

/// Fans tokens out to per-kind workers and waits for each line to finish.
pub struct DispatchEngine {
    state: Arc<DispatchState>,
    actuator: Arc<dyn Actuator>,

    // Runtime state
    running: AtomicBool,
    workers: Vec<JoinHandle<()>>,
    shutdown_tx: broadcast::Sender<()>,
    fatal_tx: mpsc::UnboundedSender<DispatchError>,
    fatal_rx: mpsc::UnboundedReceiver<DispatchError>,
}

impl DispatchEngine {
    /// Create a stopped engine driving `actuator`.
    pub fn new(actuator: Arc<dyn Actuator>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let (fatal_tx, fatal_rx) = mpsc::unbounded_channel();

        Self {
            state: Arc::new(DispatchState::new()),
            actuator,
            running: AtomicBool::new(false),
            workers: Vec::with_capacity(OutputKind::COUNT),
            shutdown_tx,
            fatal_tx,
            fatal_rx,
        }
    }

    /// Spawn one worker per output kind.
    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Dispatch engine already running");
            return;
        }

        for kind in OutputKind::ALL {
            let worker = Worker::new(
                kind,
                Arc::clone(&self.state),
                Arc::clone(&self.actuator),
                self.fatal_tx.clone(),
            );
            let shutdown_rx = self.shutdown_tx.subscribe();
            self.workers.push(tokio::spawn(worker.run(shutdown_rx)));
        }

        info!(
            "Dispatch engine started with {} workers ({})",
            self.workers.len(),
            self.actuator.name()
        );
    }

    /// Stop the workers and switch every output off.
    ///
    /// Queued tokens are discarded. The engine can be started again with
    /// fresh queues.
    pub async fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Dispatch engine not running");
            return;
        }

        info!("Stopping dispatch engine");
        let _ = self.shutdown_tx.send(());

        for result in join_all(self.workers.drain(..)).await {
            if let Err(e) = result {
                warn!("Worker task ended abnormally: {}", e);
            }
        }

        if let Err(e) = self.actuator.all_off().await {
            warn!("Failed to switch outputs off: {}", e);
        }

        self.state = Arc::new(DispatchState::new());
        while self.fatal_rx.try_recv().is_ok() {}

        info!("Dispatch engine stopped");
    }

    /// Enqueue every token of `sequence`, then wait until all have been
    /// activated.
    ///
    /// Returns early with the worker's error if any worker fails.
    pub async fn dispatch(&mut self, sequence: &Sequence) -> Result<DispatchReport, DispatchError> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(DispatchError::NotRunning);
        }
        if let Ok(error) = self.fatal_rx.try_recv() {
            return Err(error);
        }

        let started = Instant::now();
        let count = sequence.len();
        if count == 0 {
            debug!("Empty sequence, nothing to dispatch");
            return Ok(DispatchReport {
                activations: 0,
                elapsed: started.elapsed(),
            });
        }

        self.state.arm(count).await;
        for token in &sequence.tokens {
            self.state.enqueue(*token).await?;
        }
        debug!("Enqueued {} tokens, waiting for completion", count);

        tokio::select! {
            _ = self.state.wait_for_completion() => {}
            Some(error) = self.fatal_rx.recv() => return Err(error),
        }

        let report = DispatchReport {
            activations: count,
            elapsed: started.elapsed(),
        };
        debug!(
            "Sequence complete: {} activations in {:?}",
            report.activations, report.elapsed
        );
        Ok(report)
    }

    /// Get current engine status.
    pub async fn status(&self) -> EngineStatus {
        let snapshot = self.state.snapshot().await;

        EngineStatus {
            running: self.running.load(Ordering::Relaxed),
            queues: snapshot.depths(),
            order_len: snapshot.order_len(),
            in_flight: snapshot.in_flight,
            outstanding: self.state.outstanding().await,
            completed_total: self.state.completed_total(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Shared state handle, for observing queues from outside the engine.
    pub fn state(&self) -> Arc<DispatchState> {
        Arc::clone(&self.state)
    }

    pub fn actuator(&self) -> &Arc<dyn Actuator> {
        &self.actuator
    }
}

impl Drop for DispatchEngine {
    fn drop(&mut self) {
        for worker in &self.workers {
            worker.abort();
        }
    }
}
