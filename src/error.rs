use derive_more::From;
use strum_macros::Display;
use thiserror::Error;

use crate::state::{BatteryError, ConnectionState, ScanState};

/// Errors returned by `DeviceStateMachine::transition`.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum TransitionError {
    #[error("device id must not be empty")]
    EmptyDeviceId,
    #[error("device `{device_id}` is not known to the connection layer; `{event}` cannot be applied")]
    UnknownDevice {
        device_id: String,
        event: &'static str,
    },
    #[error(
        "event `{event}` is not valid for device `{device_id}` in connection state {connection_state} / scan state {scan_state}"
    )]
    IllegalTransition {
        device_id: String,
        event: &'static str,
        connection_state: ConnectionState,
        scan_state: ScanState,
    },
    #[error(transparent)]
    InvalidSnapshot(#[from] SnapshotError),
}

/// Errors returned when a snapshot would violate its invariants.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum SnapshotError {
    #[error("device id must not be empty")]
    EmptyDeviceId,
    #[error("{field} is {len} bytes long; records hold at most {max}")]
    FieldTooLong {
        field: RecordField,
        len: usize,
        max: usize,
    },
}

/// Fields of the binary snapshot and service-state records.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RecordField {
    Id,
    Name,
    ConnectionState,
    BatteryPercentage,
    FirmwareVersion,
    ScanState,
    ServiceStatus,
    GlassesCount,
    GlassesRecord,
}

/// Errors returned while decoding a record from another process.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum MalformedRecordError {
    #[error("record ended inside {field}: needed {needed} more bytes, {remaining} remain")]
    Truncated {
        field: RecordField,
        needed: usize,
        remaining: usize,
    },
    #[error("{field} is not valid UTF-8")]
    InvalidUtf8 { field: RecordField },
    #[error("record declares an empty device id")]
    EmptyDeviceId,
    #[error("connection state {value} is not a known state")]
    ConnectionStateOutOfRange { value: i32 },
    #[error("scan state {value} is not a known state")]
    ScanStateOutOfRange { value: i32 },
    #[error("battery percentage {value} is neither -1 nor within 0..=100")]
    BatteryOutOfRange { value: i32 },
    #[error("{field} is {len} bytes long, more than a record field holds")]
    FieldTooLong { field: RecordField, len: usize },
    #[error("record has {count} unexpected trailing bytes")]
    TrailingBytes { count: usize },
    #[error("device `{device_id}` appears more than once")]
    DuplicateDeviceId { device_id: String },
    #[error("device `{next}` follows `{previous}`; glasses must be ordered by id")]
    DeviceIdsOutOfOrder { previous: String, next: String },
    #[error("service status {encoded} does not match the glasses, which fold to {expected}")]
    StatusMismatch {
        encoded: ScanState,
        expected: ScanState,
    },
}

/// Errors returned when parsing textual event scripts.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ScriptError {
    #[error("the event script is empty")]
    EmptyScript,
    #[error("script step `{step}` must be `device_id|event`")]
    InvalidStepFieldCount { step: String },
    #[error("script step `{step}` has an empty field")]
    EmptyStepField { step: String },
    #[error("unknown event `{name}`")]
    UnknownEvent { name: String },
    #[error("invalid battery value")]
    InvalidBattery(#[from] BatteryError),
}

/// Errors returned by telemetry initialisation.
#[derive(Debug, Error)]
pub(crate) enum TelemetryError {
    #[error("failed to install tracing subscriber")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Top-level error wrapping module-specific error types.
#[derive(Debug, Error, From)]
pub enum SyncError {
    #[error(transparent)]
    #[from(TransitionError, Box<TransitionError>)]
    Transition(Box<TransitionError>),
    #[error(transparent)]
    #[from(MalformedRecordError, Box<MalformedRecordError>)]
    MalformedRecord(Box<MalformedRecordError>),
    #[error(transparent)]
    #[from(SnapshotError, Box<SnapshotError>)]
    Snapshot(Box<SnapshotError>),
    #[error(transparent)]
    #[from(ScriptError, Box<ScriptError>)]
    Script(Box<ScriptError>),
}
