use serde_with::SerializeDisplay;
use strum_macros::{Display, EnumIter};

use crate::error::MalformedRecordError;

/// Connection lifecycle of one pair of glasses.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, EnumIter, Display, SerializeDisplay)]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionState {
    /// The connection layer has not seen the device yet.
    #[default]
    Uninitialized,
    /// Known to the connection layer, not connected.
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// The link is up.
    Connected,
    /// A requested disconnect is in flight.
    Disconnecting,
    /// The last connection attempt or link failed.
    Error,
}

impl ConnectionState {
    /// Returns the raw wire code.
    ///
    /// ```
    /// use g1sync::ConnectionState;
    ///
    /// assert_eq!(3, ConnectionState::Connected.as_raw());
    /// assert_eq!(-1, ConnectionState::Error.as_raw());
    /// ```
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        match self {
            Self::Uninitialized => 0,
            Self::Disconnected => 1,
            Self::Connecting => 2,
            Self::Connected => 3,
            Self::Disconnecting => 4,
            Self::Error => -1,
        }
    }
}

impl TryFrom<i32> for ConnectionState {
    type Error = MalformedRecordError;

    fn try_from(value: i32) -> Result<Self, MalformedRecordError> {
        match value {
            0 => Ok(ConnectionState::Uninitialized),
            1 => Ok(ConnectionState::Disconnected),
            2 => Ok(ConnectionState::Connecting),
            3 => Ok(ConnectionState::Connected),
            4 => Ok(ConnectionState::Disconnecting),
            -1 => Ok(ConnectionState::Error),
            _ => Err(MalformedRecordError::ConnectionStateOutOfRange { value }),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn raw_codes_map_back_to_the_same_state() {
        for state in ConnectionState::iter() {
            let decoded = ConnectionState::try_from(state.as_raw())
                .expect("every raw code produced by as_raw should decode");
            assert_eq!(state, decoded);
        }
    }

    #[rstest]
    #[case(5)]
    #[case(-2)]
    #[case(i32::MAX)]
    fn unknown_codes_are_rejected(#[case] value: i32) {
        assert_matches!(
            ConnectionState::try_from(value),
            Err(MalformedRecordError::ConnectionStateOutOfRange { value: rejected }) if rejected == value
        );
    }

    #[test]
    fn display_uses_snake_case() {
        assert_eq!("disconnecting", ConnectionState::Disconnecting.to_string());
    }
}
