use std::str::FromStr;

use strum_macros::{Display, IntoStaticStr};

use super::BatteryLevel;
use crate::error::ScriptError;

/// One observed real-world occurrence for a pair of glasses.
#[derive(Debug, Clone, Eq, PartialEq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum DeviceEvent {
    /// Discovery started looking for the device.
    ScanStarted,
    /// Discovery finished and reported the device.
    ScanFinished,
    /// Discovery returned to idle.
    ScanReset,
    /// A client asked to connect.
    ConnectRequested,
    /// The link came up.
    ConnectionEstablished,
    /// The link dropped or the attempt failed.
    ConnectionLost,
    /// A client asked to disconnect.
    DisconnectRequested,
    /// The platform reported a failure.
    ErrorObserved,
    /// The device reported its battery level.
    BatteryReported(BatteryLevel),
    /// The firmware version was read from the device.
    FirmwareReported(String),
    /// The advertised name became known.
    NameResolved(String),
}

impl DeviceEvent {
    /// Returns whether this event may introduce a previously untracked device.
    ///
    /// ```
    /// use g1sync::DeviceEvent;
    ///
    /// assert!(DeviceEvent::ScanStarted.is_discovery());
    /// assert!(!DeviceEvent::ConnectRequested.is_discovery());
    /// ```
    #[must_use]
    pub fn is_discovery(&self) -> bool {
        matches!(self, Self::ScanStarted | Self::ScanFinished)
    }

    /// Returns the snake_case event name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

impl FromStr for DeviceEvent {
    type Err = ScriptError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if let Some((key, argument)) = value.split_once('=') {
            let argument = argument.trim();
            return match key.trim() {
                "battery" => Ok(Self::BatteryReported(argument.parse()?)),
                "firmware" => Ok(Self::FirmwareReported(argument.to_string())),
                "name" => Ok(Self::NameResolved(argument.to_string())),
                other => Err(ScriptError::UnknownEvent {
                    name: other.to_string(),
                }),
            };
        }

        match value {
            "scan_started" => Ok(Self::ScanStarted),
            "scan_finished" => Ok(Self::ScanFinished),
            "scan_reset" => Ok(Self::ScanReset),
            "connect_requested" => Ok(Self::ConnectRequested),
            "connection_established" => Ok(Self::ConnectionEstablished),
            "connection_lost" => Ok(Self::ConnectionLost),
            "disconnect_requested" => Ok(Self::DisconnectRequested),
            "error_observed" => Ok(Self::ErrorObserved),
            other => Err(ScriptError::UnknownEvent {
                name: other.to_string(),
            }),
        }
    }
}
