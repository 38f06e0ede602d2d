mod app;
mod cli;
mod codec;
mod error;
mod script;
mod state;
mod telemetry;
mod terminal;

pub use app::{run, run_with_clients, run_with_clients_and_log_level, run_with_log_level};
pub use cli::{Args, Command, DecodeArgs, LogLevel, OutputFormat, ScriptArgs, WatchArgs};
pub use codec::{ServiceStateCodec, SnapshotCodec};
pub use error::{
    MalformedRecordError, RecordField, ScriptError, SnapshotError, SyncError, TransitionError,
};
pub use script::{EventScript, ScriptAction, ScriptStep, StepOutcome};
pub use state::{
    BatteryError, BatteryLevel, ConnectionState, DeviceEvent, DeviceId, DeviceSnapshot,
    DeviceStateMachine, ScanState, ServiceState,
};
pub use terminal::{SystemTerminalClient, TerminalClient};
