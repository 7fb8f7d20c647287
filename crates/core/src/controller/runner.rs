//! Signal controller implementation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::actuator::{Actuator, ActuatorError};
use crate::dispatch::{DispatchEngine, EngineStatus};
use crate::line::{Command, LineSource};
use crate::sequence::{parse_line, Sequence};

use super::config::ControllerConfig;
use super::types::{ControllerError, LineOutcome};

/// Called whenever diagnostic verbosity is switched, with the new state.
pub type DiagnosticsCallback = Arc<dyn Fn(bool) + Send + Sync>;

/// Reads lines, parses them and dispatches one line at a time.
pub struct SignalController {
    engine: DispatchEngine,
    diagnostics: bool,
    on_diagnostics: Option<DiagnosticsCallback>,
    sequences_dispatched: u64,
}

impl SignalController {
    /// Create a controller driving `actuator`.
    pub fn new(config: ControllerConfig, actuator: Arc<dyn Actuator>) -> Self {
        Self {
            engine: DispatchEngine::new(actuator),
            diagnostics: config.diagnostics,
            on_diagnostics: None,
            sequences_dispatched: 0,
        }
    }

    /// Set a callback invoked whenever diagnostic mode changes.
    pub fn with_diagnostics_callback(mut self, callback: DiagnosticsCallback) -> Self {
        self.on_diagnostics = Some(callback);
        self
    }

    /// Probe the actuator, switch everything off and start the workers.
    pub async fn start(&mut self) -> Result<(), ControllerError> {
        let actuator = Arc::clone(self.engine.actuator());
        if !actuator.is_ready().await {
            return Err(ActuatorError::NotReady {
                name: actuator.name().to_string(),
            }
            .into());
        }
        actuator.all_off().await?;

        self.engine.start();
        if let Some(ref callback) = self.on_diagnostics {
            callback(self.diagnostics);
        }

        info!(
            "Signal controller started (diagnostics {})",
            if self.diagnostics { "on" } else { "off" }
        );
        Ok(())
    }

    /// Stop the workers and switch every output off.
    pub async fn stop(&mut self) {
        if self.engine.is_running() {
            self.engine.stop().await;
        }
        info!(
            "Signal controller stopped after {} sequences",
            self.sequences_dispatched
        );
    }

    /// Handle lines until the source is exhausted.
    ///
    /// Returns `Ok(())` at end of input. Any error is unrecoverable.
    pub async fn run<S>(&mut self, source: &mut S) -> Result<(), ControllerError>
    where
        S: LineSource + ?Sized,
    {
        while let Some(line) = source.next_line().await? {
            self.handle_line(&line).await?;
        }

        info!("Input exhausted");
        Ok(())
    }

    /// Handle one complete input line.
    pub async fn handle_line(&mut self, line: &str) -> Result<LineOutcome, ControllerError> {
        match Command::parse(line) {
            Command::Empty => Ok(LineOutcome::Ignored),
            Command::Diagnostics(enabled) => {
                self.set_diagnostics(enabled);
                Ok(LineOutcome::DiagnosticsToggled(enabled))
            }
            Command::Sequence(text) => {
                let sequence = parse_line(text)?;
                self.report(text, &sequence);

                let report = self.engine.dispatch(&sequence).await?;
                self.sequences_dispatched += 1;
                Ok(LineOutcome::Dispatched {
                    activations: report.activations,
                    diagnostics: sequence.diagnostics.len(),
                })
            }
        }
    }

    /// Sequence lines fully dispatched. Blank and control lines are not
    /// counted.
    pub fn sequences_dispatched(&self) -> u64 {
        self.sequences_dispatched
    }

    /// Whether diagnostic verbosity is on.
    pub fn diagnostics_enabled(&self) -> bool {
        self.diagnostics
    }

    /// Get current engine status.
    pub async fn status(&self) -> EngineStatus {
        self.engine.status().await
    }

    fn set_diagnostics(&mut self, enabled: bool) {
        self.diagnostics = enabled;
        if let Some(ref callback) = self.on_diagnostics {
            callback(enabled);
        }
        info!("Diagnostics {}", if enabled { "enabled" } else { "disabled" });
    }

    fn report(&self, text: &str, sequence: &Sequence) {
        for diagnostic in &sequence.diagnostics {
            if self.diagnostics {
                warn!("Sequence {:?}: {}", text, diagnostic);
            } else {
                debug!("Sequence {:?}: {}", text, diagnostic);
            }
        }

        if self.diagnostics {
            for token in &sequence.tokens {
                info!("Queued {} for {} ms", token.kind, token.duration_ms);
            }
        }
        debug!(
            "Parsed {} tokens ({} repetitions)",
            sequence.len(),
            sequence.repeat_count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::sequence::{OutputKind, SequenceError};
    use crate::testing::{MockActuator, MockLineSource};

    fn controller() -> (SignalController, Arc<MockActuator>) {
        let actuator = Arc::new(MockActuator::new());
        let controller = SignalController::new(
            ControllerConfig::default(),
            Arc::clone(&actuator) as Arc<dyn Actuator>,
        );
        (controller, actuator)
    }

    #[tokio::test]
    async fn test_start_fails_when_actuator_not_ready() {
        let (mut controller, actuator) = controller();
        actuator.set_ready(false).await;

        let err = controller.start().await.unwrap_err();
        assert!(matches!(
            err,
            ControllerError::Actuator(ActuatorError::NotReady { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_line_outcomes() {
        let (mut controller, actuator) = controller();
        controller.start().await.unwrap();

        assert_eq!(
            controller.handle_line("").await.unwrap(),
            LineOutcome::Ignored
        );
        assert_eq!(
            controller.handle_line("D,1").await.unwrap(),
            LineOutcome::DiagnosticsToggled(true)
        );
        assert!(controller.diagnostics_enabled());

        assert_eq!(
            controller.handle_line("R,100,X,5,G,50").await.unwrap(),
            LineOutcome::Dispatched {
                activations: 2,
                diagnostics: 1
            }
        );
        assert_eq!(
            actuator.activation_kinds().await,
            vec![OutputKind::Red, OutputKind::Green]
        );

        controller.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_repeat_stops_run() {
        let (mut controller, actuator) = controller();
        controller.start().await.unwrap();

        let mut source = MockLineSource::new(["R,10", "G,200,T,0", "Y,10"]);
        let err = controller.run(&mut source).await.unwrap_err();

        assert!(matches!(
            err,
            ControllerError::Sequence(SequenceError::RepeatOutOfRange { count: 0 })
        ));
        assert!(err.is_fatal());
        // The first line ran, the rejected one produced nothing, the third was never read.
        assert_eq!(actuator.activation_kinds().await, vec![OutputKind::Red]);
        assert_eq!(source.remaining(), 1);

        controller.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_input_exhausted() {
        let (mut controller, actuator) = controller();
        controller.start().await.unwrap();

        let mut source = MockLineSource::new(["Y,10,T,3", "", "R,5"]);
        controller.run(&mut source).await.unwrap();

        assert_eq!(actuator.activations().await.len(), 4);
        assert_eq!(controller.status().await.completed_total, 4);
        assert_eq!(controller.sequences_dispatched(), 2);

        controller.stop().await;
        assert!(actuator.active_kinds().await.is_empty());
    }

    #[tokio::test]
    async fn test_diagnostics_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let calls = Arc::new(AtomicUsize::new(0));

        let callback: DiagnosticsCallback = {
            let seen = Arc::clone(&seen);
            let calls = Arc::clone(&calls);
            Arc::new(move |enabled| {
                seen.lock().unwrap().push(enabled);
                calls.fetch_add(1, Ordering::SeqCst);
            })
        };

        let (controller, _) = controller();
        let mut controller = controller.with_diagnostics_callback(callback);
        controller.start().await.unwrap();

        controller.handle_line("D,1").await.unwrap();
        controller.handle_line("D,0").await.unwrap();
        assert_eq!(controller.sequences_dispatched(), 0);

        // Initial state is applied on start.
        assert_eq!(*seen.lock().unwrap(), vec![false, true, false]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        controller.stop().await;
    }

    #[tokio::test]
    async fn test_dispatch_before_start_is_not_fatal() {
        let (mut controller, _) = controller();

        let err = controller.handle_line("R,1").await.unwrap_err();
        assert!(!err.is_fatal());
    }
}
