use std::cmp::Ordering;
use std::sync::Arc;

use tracing::instrument;

use super::SnapshotCodec;
use super::record::{RecordReader, RecordWriter};
use crate::error::{MalformedRecordError, RecordField};
use crate::state::{DeviceId, DeviceSnapshot, ScanState, ServiceState};

const HEADER_LEN: usize = 4 + 4;
const RECORD_LEN_PREFIX: usize = 4;

/// Encodes and decodes the whole service state for observing clients.
///
/// Layout: `[i32 status][u32 count]` followed by `count` entries of
/// `[u32 len][snapshot record]`, all big-endian.
pub struct ServiceStateCodec;

impl ServiceStateCodec {
    /// Encodes a service state.
    ///
    /// ```
    /// use g1sync::{ServiceState, ServiceStateCodec};
    ///
    /// let record = ServiceStateCodec::encode(&ServiceState::default());
    /// assert_eq!(vec![0, 0, 0, 0, 0, 0, 0, 0], record);
    /// ```
    #[must_use]
    #[instrument(skip(state), level = "trace", fields(glasses = state.glasses().len()))]
    pub fn encode(state: &ServiceState) -> Vec<u8> {
        let records: Vec<Vec<u8>> = state
            .glasses()
            .iter()
            .map(|snapshot| SnapshotCodec::encode(snapshot))
            .collect();
        let body_len: usize = records
            .iter()
            .map(|record| RECORD_LEN_PREFIX + record.len())
            .sum();

        let mut writer = RecordWriter::with_capacity(HEADER_LEN + body_len);
        writer.put_i32(state.status().as_raw());
        writer.put_u32(len_u32(records.len()));
        for record in &records {
            writer.put_u32(len_u32(record.len()));
            writer.put_bytes(record);
        }
        writer.into_bytes()
    }

    /// Decodes and re-validates a service state.
    ///
    /// # Errors
    ///
    /// Returns an error when the header or any framed snapshot record is
    /// malformed, bytes remain after the last record, the glasses are not in
    /// strictly ascending id order, or the status disagrees with the glasses.
    #[instrument(skip(record), level = "trace", fields(record_len = record.len()))]
    pub fn decode(record: &[u8]) -> Result<ServiceState, MalformedRecordError> {
        let mut reader = RecordReader::new(record);
        let status = ScanState::try_from(reader.i32(RecordField::ServiceStatus)?)?;
        let count = reader.u32(RecordField::GlassesCount)?;

        let mut glasses: Vec<Arc<DeviceSnapshot>> = Vec::new();
        for _ in 0..count {
            let len = reader.u32(RecordField::GlassesRecord)?;
            let len = usize::try_from(len).unwrap_or(usize::MAX);
            let framed = reader.take(RecordField::GlassesRecord, len)?;
            let snapshot = SnapshotCodec::decode(framed)?;
            if let Some(previous) = glasses.last() {
                check_order(previous.id(), snapshot.id())?;
            }
            glasses.push(Arc::new(snapshot));
        }
        reader.finish()?;

        let state = ServiceState::from_snapshots(glasses);
        if state.status() != status {
            return Err(MalformedRecordError::StatusMismatch {
                encoded: status,
                expected: state.status(),
            });
        }
        Ok(state)
    }
}

fn check_order(previous: &DeviceId, next: &DeviceId) -> Result<(), MalformedRecordError> {
    match previous.cmp(next) {
        Ordering::Less => Ok(()),
        Ordering::Equal => Err(MalformedRecordError::DuplicateDeviceId {
            device_id: next.to_string(),
        }),
        Ordering::Greater => Err(MalformedRecordError::DeviceIdsOutOfOrder {
            previous: previous.to_string(),
            next: next.to_string(),
        }),
    }
}

fn len_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
