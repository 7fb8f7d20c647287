pub mod actuator;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod line;
pub mod sequence;
pub mod testing;

pub use actuator::{lamp_pattern, Actuator, ActuatorError, Lamp, LampActuator, LampState};
pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError, LineConfig,
};
pub use controller::{
    ControllerConfig, ControllerError, DiagnosticsCallback, LineOutcome, SignalController,
};
pub use dispatch::{
    DispatchEngine, DispatchError, DispatchReport, DispatchState, EngineStatus, QueueDepth,
    QueueSnapshot,
};
pub use line::{Command, LineFramer, LineSource, LineSourceError, ReaderLineSource};
pub use sequence::{
    parse_line, OutputKind, ParseDiagnostic, PerKind, Sequence, SequenceError, Token, MAX_REPEAT,
    MIN_REPEAT,
};
