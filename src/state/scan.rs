use serde_with::SerializeDisplay;
use strum_macros::{Display, EnumIter};

use crate::error::MalformedRecordError;

/// Discovery lifecycle, tracked independently from the connection.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, EnumIter, Display, SerializeDisplay)]
#[strum(serialize_all = "snake_case")]
pub enum ScanState {
    /// Discovery failed.
    Error,
    /// Idle, ready to scan.
    #[default]
    Ready,
    /// A scan is running.
    Looking,
    /// A scan completed.
    Looked,
}

impl ScanState {
    /// Returns the raw wire code.
    ///
    /// ```
    /// use g1sync::ScanState;
    ///
    /// assert_eq!(1, ScanState::Looking.as_raw());
    /// ```
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        match self {
            Self::Error => -1,
            Self::Ready => 0,
            Self::Looking => 1,
            Self::Looked => 2,
        }
    }

    /// Precedence used when folding per-device scan states into one service status.
    pub(crate) const fn aggregate_rank(self) -> u8 {
        match self {
            Self::Ready => 0,
            Self::Looked => 1,
            Self::Looking => 2,
            Self::Error => 3,
        }
    }
}

impl TryFrom<i32> for ScanState {
    type Error = MalformedRecordError;

    fn try_from(value: i32) -> Result<Self, MalformedRecordError> {
        match value {
            -1 => Ok(ScanState::Error),
            0 => Ok(ScanState::Ready),
            1 => Ok(ScanState::Looking),
            2 => Ok(ScanState::Looked),
            _ => Err(MalformedRecordError::ScanStateOutOfRange { value }),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn raw_codes_map_back_to_the_same_state() {
        for state in ScanState::iter() {
            let decoded = ScanState::try_from(state.as_raw())
                .expect("every raw code produced by as_raw should decode");
            assert_eq!(state, decoded);
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert_matches!(
            ScanState::try_from(3),
            Err(MalformedRecordError::ScanStateOutOfRange { value: 3 })
        );
    }

    #[test]
    fn error_outranks_every_other_state() {
        let top = ScanState::iter()
            .max_by_key(|state| state.aggregate_rank())
            .expect("enum has variants");
        assert_eq!(ScanState::Error, top);
    }
}
