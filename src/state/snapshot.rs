use std::borrow::Borrow;

use bon::bon;
use serde::Serialize;

use super::{BatteryLevel, ConnectionState, ScanState};
use crate::error::{RecordField, SnapshotError};

/// Longest string that fits in one length-prefixed record field.
pub(crate) const MAX_FIELD_LEN: usize = u16::MAX as usize;

/// Opaque, non-empty identifier of one pair of glasses.
#[derive(
    Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, derive_more::Display,
)]
#[serde(transparent)]
#[display("{_0}")]
pub struct DeviceId(String);

impl DeviceId {
    /// Creates a validated device identifier.
    ///
    /// # Errors
    ///
    /// Returns an error when `value` is empty or longer than a record field allows.
    ///
    /// ```
    /// use g1sync::DeviceId;
    ///
    /// let id = DeviceId::new("left-a1b2")?;
    /// assert_eq!("left-a1b2", id.as_str());
    /// assert!(DeviceId::new("").is_err());
    /// # Ok::<(), g1sync::SnapshotError>(())
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, SnapshotError> {
        let value = value.into();
        if value.is_empty() {
            return Err(SnapshotError::EmptyDeviceId);
        }
        check_field_len(RecordField::Id, &value)?;
        Ok(Self(value))
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for DeviceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for DeviceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Immutable point-in-time view of one pair of glasses.
///
/// Every state change produces a new snapshot; nothing mutates one in place.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct DeviceSnapshot {
    id: DeviceId,
    name: Option<String>,
    connection_state: ConnectionState,
    scan_state: ScanState,
    battery: BatteryLevel,
    firmware_version: Option<String>,
}

#[bon]
impl DeviceSnapshot {
    /// Builds a validated snapshot.
    ///
    /// Empty `name` or `firmware_version` values are stored as absent.
    ///
    /// # Errors
    ///
    /// Returns an error when the id is empty or a text field is too long for a record.
    ///
    /// ```
    /// use g1sync::{BatteryLevel, ConnectionState, DeviceSnapshot};
    ///
    /// let snapshot = DeviceSnapshot::builder()
    ///     .id("left-a1b2")
    ///     .name("Even G1_L")
    ///     .connection_state(ConnectionState::Connected)
    ///     .battery(BatteryLevel::new(80)?)
    ///     .build()?;
    /// assert_eq!(Some("Even G1_L"), snapshot.name());
    /// assert_eq!(None, snapshot.firmware_version());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[builder]
    pub fn new(
        #[builder(into)] id: String,
        #[builder(into)] name: Option<String>,
        #[builder(default)] connection_state: ConnectionState,
        #[builder(default)] scan_state: ScanState,
        #[builder(default)] battery: BatteryLevel,
        #[builder(into)] firmware_version: Option<String>,
    ) -> Result<Self, SnapshotError> {
        Ok(Self {
            id: DeviceId::new(id)?,
            name: present_field(RecordField::Name, name)?,
            connection_state,
            scan_state,
            battery,
            firmware_version: present_field(RecordField::FirmwareVersion, firmware_version)?,
        })
    }
}

impl DeviceSnapshot {
    /// The snapshot created when an identifier is first observed.
    pub(crate) fn first_seen(id: DeviceId) -> Self {
        Self {
            id,
            name: None,
            connection_state: ConnectionState::Uninitialized,
            scan_state: ScanState::Ready,
            battery: BatteryLevel::UNKNOWN,
            firmware_version: None,
        }
    }

    /// Returns the device identifier.
    #[must_use]
    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    /// Returns the human-readable name, if discovered.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the connection lifecycle state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.connection_state
    }

    /// Returns the discovery lifecycle state.
    #[must_use]
    pub fn scan_state(&self) -> ScanState {
        self.scan_state
    }

    /// Returns the battery level.
    #[must_use]
    pub fn battery(&self) -> BatteryLevel {
        self.battery
    }

    /// Returns the firmware version, if read from the device.
    #[must_use]
    pub fn firmware_version(&self) -> Option<&str> {
        self.firmware_version.as_deref()
    }

    pub(crate) fn with_connection_state(&self, connection_state: ConnectionState) -> Self {
        Self {
            connection_state,
            ..self.clone()
        }
    }

    pub(crate) fn with_states(&self, connection_state: ConnectionState, scan_state: ScanState) -> Self {
        Self {
            connection_state,
            scan_state,
            ..self.clone()
        }
    }

    pub(crate) fn with_battery(&self, battery: BatteryLevel) -> Self {
        Self {
            battery,
            ..self.clone()
        }
    }

    pub(crate) fn with_name(&self, name: Option<String>) -> Result<Self, SnapshotError> {
        Ok(Self {
            name: present_field(RecordField::Name, name)?,
            ..self.clone()
        })
    }

    pub(crate) fn with_firmware_version(
        &self,
        firmware_version: Option<String>,
    ) -> Result<Self, SnapshotError> {
        Ok(Self {
            firmware_version: present_field(RecordField::FirmwareVersion, firmware_version)?,
            ..self.clone()
        })
    }
}

fn present_field(field: RecordField, value: Option<String>) -> Result<Option<String>, SnapshotError> {
    match value {
        Some(text) if !text.is_empty() => {
            check_field_len(field, &text)?;
            Ok(Some(text))
        }
        _ => Ok(None),
    }
}

fn check_field_len(field: RecordField, value: &str) -> Result<(), SnapshotError> {
    if value.len() > MAX_FIELD_LEN {
        return Err(SnapshotError::FieldTooLong {
            field,
            len: value.len(),
            max: MAX_FIELD_LEN,
        });
    }
    Ok(())
}
