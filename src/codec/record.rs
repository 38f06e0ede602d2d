use crate::error::{MalformedRecordError, RecordField};

const STRING_LEN_PREFIX: usize = 2;
const INT_LEN: usize = 4;

/// Appends big-endian record fields to a buffer.
#[derive(Debug, Default)]
pub(crate) struct RecordWriter {
    bytes: Vec<u8>,
}

impl RecordWriter {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Writes a `u16` length prefix followed by the UTF-8 bytes.
    ///
    /// Callers guarantee `value` fits a `u16` length; snapshots enforce this
    /// on construction.
    pub(crate) fn put_str(&mut self, value: &str) {
        let len = u16::try_from(value.len()).unwrap_or(u16::MAX);
        self.bytes.extend_from_slice(&len.to_be_bytes());
        self.bytes
            .extend_from_slice(&value.as_bytes()[..usize::from(len)]);
    }

    /// Writes an optional string; absence is a zero length.
    pub(crate) fn put_optional_str(&mut self, value: Option<&str>) {
        self.put_str(value.unwrap_or_default());
    }

    pub(crate) fn put_i32(&mut self, value: i32) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    pub(crate) fn put_u32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    pub(crate) fn put_bytes(&mut self, value: &[u8]) {
        self.bytes.extend_from_slice(value);
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Bounds-checked reader over an untrusted record.
#[derive(Debug)]
pub(crate) struct RecordReader<'a> {
    remaining: &'a [u8],
}

impl<'a> RecordReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { remaining: bytes }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.remaining.len()
    }

    pub(crate) fn take(
        &mut self,
        field: RecordField,
        len: usize,
    ) -> Result<&'a [u8], MalformedRecordError> {
        if self.remaining.len() < len {
            return Err(MalformedRecordError::Truncated {
                field,
                needed: len,
                remaining: self.remaining.len(),
            });
        }
        let (head, tail) = self.remaining.split_at(len);
        self.remaining = tail;
        Ok(head)
    }

    pub(crate) fn str(&mut self, field: RecordField) -> Result<&'a str, MalformedRecordError> {
        let prefix = self.take(field, STRING_LEN_PREFIX)?;
        let len = usize::from(u16::from_be_bytes([prefix[0], prefix[1]]));
        let bytes = self.take(field, len)?;
        std::str::from_utf8(bytes).map_err(|_| MalformedRecordError::InvalidUtf8 { field })
    }

    /// Reads a string where a zero length means absent.
    pub(crate) fn optional_str(
        &mut self,
        field: RecordField,
    ) -> Result<Option<&'a str>, MalformedRecordError> {
        let value = self.str(field)?;
        Ok((!value.is_empty()).then_some(value))
    }

    pub(crate) fn i32(&mut self, field: RecordField) -> Result<i32, MalformedRecordError> {
        let bytes = self.take(field, INT_LEN)?;
        Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub(crate) fn u32(&mut self, field: RecordField) -> Result<u32, MalformedRecordError> {
        let bytes = self.take(field, INT_LEN)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub(crate) fn finish(self) -> Result<(), MalformedRecordError> {
        if self.remaining.is_empty() {
            Ok(())
        } else {
            Err(MalformedRecordError::TrailingBytes {
                count: self.remaining.len(),
            })
        }
    }
}
