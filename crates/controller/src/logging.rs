//! Log subscriber setup and the runtime diagnostics switch.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Filter used while diagnostic mode is on.
const DIAGNOSTICS_DIRECTIVES: &str = "debug";

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_DIRECTIVES: &str = "info";

/// Switches the global log filter between the base filter and full debug
/// output.
pub struct DiagnosticsSwitch {
    handle: reload::Handle<EnvFilter, Registry>,
    base: String,
}

impl DiagnosticsSwitch {
    pub fn new(handle: reload::Handle<EnvFilter, Registry>, base: impl Into<String>) -> Self {
        Self {
            handle,
            base: base.into(),
        }
    }

    /// Replace the active filter. Fails once the subscriber is gone.
    pub fn set(&self, enabled: bool) -> Result<(), reload::Error> {
        let directives = if enabled {
            DIAGNOSTICS_DIRECTIVES
        } else {
            self.base.as_str()
        };
        self.handle.reload(EnvFilter::new(directives))
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` sets the base filter. `LIGHTSEQ_LOG_JSON=1` switches to JSON lines.
pub fn init() -> DiagnosticsSwitch {
    let base = std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|directives| EnvFilter::try_new(directives).is_ok())
        .unwrap_or_else(|| DEFAULT_DIRECTIVES.to_string());
    let json = std::env::var("LIGHTSEQ_LOG_JSON").is_ok_and(|v| v == "1" || v == "true");

    let (filter, handle) = reload::Layer::new(EnvFilter::new(&base));

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(|| fmt::layer()))
        .init();

    DiagnosticsSwitch::new(handle, base)
}
