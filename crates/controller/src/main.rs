mod logging;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::signal;
use tracing::{error, info, warn};

use lightseq_core::{
    load_config_or_default, validate_config, Actuator, Config, ControllerError,
    DiagnosticsCallback, LampActuator, LineSource, ReaderLineSource, SignalController,
};

use logging::DiagnosticsSwitch;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let diagnostics = Arc::new(logging::init());
    info!("lightseq {} starting", VERSION);

    let config_path = std::env::var("LIGHTSEQ_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("lightseq.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;
    info!(
        "Configuration loaded (max line length {}, restart delay {}ms, max restarts {})",
        config.line.max_line_len,
        config.controller.restart_delay_ms,
        config.controller.max_restarts
    );

    let mut source = ReaderLineSource::new(tokio::io::stdin(), config.line.max_line_len);
    supervise(&config, &mut source, diagnostics).await
}

/// Run controllers over `source` until input ends or a shutdown signal
/// arrives, restarting after each fatal error.
async fn supervise<S>(
    config: &Config,
    source: &mut S,
    diagnostics: Arc<DiagnosticsSwitch>,
) -> Result<()>
where
    S: LineSource + ?Sized,
{
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut restarts: u32 = 0;
    loop {
        let actuator: Arc<dyn Actuator> = Arc::new(LampActuator::new());
        let mut controller = SignalController::new(config.controller.clone(), actuator)
            .with_diagnostics_callback(diagnostics_callback(&diagnostics));

        let outcome = tokio::select! {
            result = run_controller(&mut controller, source) => Some(result),
            _ = &mut shutdown => None,
        };
        controller.stop().await;

        let error = match outcome {
            None => {
                info!("Shutdown signal received");
                return Ok(());
            }
            Some(Ok(())) => {
                info!("Input closed, shutting down");
                return Ok(());
            }
            Some(Err(e)) => e,
        };

        error!("Controller failed: {}", error);
        restarts += 1;
        let max = config.controller.max_restarts;
        if max != 0 && restarts > max {
            bail!("Giving up after {} restarts: {}", max, error);
        }

        let delay = Duration::from_millis(config.controller.restart_delay_ms);
        warn!("Restarting controller in {:?} (restart {})", delay, restarts);
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                return Ok(());
            }
        }
    }
}

async fn run_controller<S>(
    controller: &mut SignalController,
    source: &mut S,
) -> Result<(), ControllerError>
where
    S: LineSource + ?Sized,
{
    controller.start().await?;
    controller.run(source).await
}

fn diagnostics_callback(switch: &Arc<DiagnosticsSwitch>) -> DiagnosticsCallback {
    let switch = Arc::clone(switch);
    Arc::new(move |enabled| {
        if let Err(e) = switch.set(enabled) {
            warn!("Failed to switch log filter: {}", e);
        }
    })
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
