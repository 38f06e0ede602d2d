use tracing::instrument;

use super::record::{RecordReader, RecordWriter};
use crate::error::{MalformedRecordError, RecordField, SnapshotError};
use crate::state::{BatteryLevel, ConnectionState, DeviceSnapshot, ScanState};

const FIXED_FIELDS_LEN: usize = 2 + 2 + 4 + 4 + 2 + 4;
const SCAN_STATE_LEN: usize = 4;

/// Encodes and decodes one snapshot as a flat big-endian record.
///
/// Layout:
/// `[u16 len][id][u16 len][name][i32 connection_state][i32 battery][u16 len][firmware][i32 scan_state]`.
/// A zero string length means absent. The trailing scan state is optional
/// on decode; records without it carry `ScanState::Ready`.
pub struct SnapshotCodec;

impl SnapshotCodec {
    /// Encodes a snapshot.
    ///
    /// ```
    /// use g1sync::{DeviceSnapshot, SnapshotCodec};
    ///
    /// let snapshot = DeviceSnapshot::builder().id("ab").build()?;
    /// let record = SnapshotCodec::encode(&snapshot);
    /// assert_eq!(
    ///     vec![
    ///         0x00, 0x02, b'a', b'b', // id
    ///         0x00, 0x00, // name (absent)
    ///         0x00, 0x00, 0x00, 0x00, // connection state (uninitialized)
    ///         0xFF, 0xFF, 0xFF, 0xFF, // battery (unknown)
    ///         0x00, 0x00, // firmware (absent)
    ///         0x00, 0x00, 0x00, 0x00, // scan state (ready)
    ///     ],
    ///     record
    /// );
    /// # Ok::<(), g1sync::SnapshotError>(())
    /// ```
    #[must_use]
    #[instrument(skip(snapshot), level = "trace", fields(device_id = %snapshot.id()))]
    pub fn encode(snapshot: &DeviceSnapshot) -> Vec<u8> {
        let text_len = snapshot.id().as_str().len()
            + snapshot.name().map_or(0, str::len)
            + snapshot.firmware_version().map_or(0, str::len);
        let mut writer = RecordWriter::with_capacity(FIXED_FIELDS_LEN + text_len);
        writer.put_str(snapshot.id().as_str());
        writer.put_optional_str(snapshot.name());
        writer.put_i32(snapshot.connection_state().as_raw());
        writer.put_i32(snapshot.battery().as_raw());
        writer.put_optional_str(snapshot.firmware_version());
        writer.put_i32(snapshot.scan_state().as_raw());
        writer.into_bytes()
    }

    /// Decodes and re-validates a snapshot record.
    ///
    /// # Errors
    ///
    /// Returns an error when a declared length runs past the end of `record`,
    /// a string is not UTF-8, the id is empty, a state or battery value is out
    /// of its domain, or bytes remain after the record.
    ///
    /// ```
    /// use g1sync::{DeviceSnapshot, SnapshotCodec};
    ///
    /// let snapshot = DeviceSnapshot::builder().id("abc").name("Even G1_L").build()?;
    /// let decoded = SnapshotCodec::decode(&SnapshotCodec::encode(&snapshot))?;
    /// assert_eq!(snapshot, decoded);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[instrument(skip(record), level = "trace", fields(record_len = record.len()))]
    pub fn decode(record: &[u8]) -> Result<DeviceSnapshot, MalformedRecordError> {
        let mut reader = RecordReader::new(record);
        let snapshot = Self::read(&mut reader)?;
        reader.finish()?;
        Ok(snapshot)
    }

    fn read(reader: &mut RecordReader<'_>) -> Result<DeviceSnapshot, MalformedRecordError> {
        let id = reader.str(RecordField::Id)?;
        let name = reader.optional_str(RecordField::Name)?;
        let connection_state = ConnectionState::try_from(reader.i32(RecordField::ConnectionState)?)?;
        let raw_battery = reader.i32(RecordField::BatteryPercentage)?;
        let battery = BatteryLevel::new(raw_battery)
            .map_err(|_| MalformedRecordError::BatteryOutOfRange { value: raw_battery })?;
        let firmware_version = reader.optional_str(RecordField::FirmwareVersion)?;
        let scan_state = if reader.remaining() >= SCAN_STATE_LEN {
            ScanState::try_from(reader.i32(RecordField::ScanState)?)?
        } else if reader.remaining() == 0 {
            ScanState::Ready
        } else {
            return Err(MalformedRecordError::Truncated {
                field: RecordField::ScanState,
                needed: SCAN_STATE_LEN,
                remaining: reader.remaining(),
            });
        };

        DeviceSnapshot::builder()
            .id(id)
            .maybe_name(name)
            .connection_state(connection_state)
            .scan_state(scan_state)
            .battery(battery)
            .maybe_firmware_version(firmware_version)
            .build()
            .map_err(|error| match error {
                SnapshotError::EmptyDeviceId => MalformedRecordError::EmptyDeviceId,
                SnapshotError::FieldTooLong { field, len, .. } => {
                    MalformedRecordError::FieldTooLong { field, len }
                }
            })
    }
}
