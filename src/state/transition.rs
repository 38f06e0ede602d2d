use strum::IntoEnumIterator;

use super::{ConnectionState, DeviceEvent, DeviceSnapshot, ScanState};
use crate::error::TransitionError;

/// Result of applying one event to a snapshot.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) enum Outcome {
    /// The event produced a new snapshot.
    Changed(DeviceSnapshot),
    /// The event was accepted but left the device as it was.
    Unchanged,
}

/// Single-axis verdict for one event.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Step<S> {
    To(S),
    Stay,
    Illegal,
}

/// Applies `event` to `current` without touching any shared state.
pub(crate) fn apply(current: &DeviceSnapshot, event: &DeviceEvent) -> Result<Outcome, TransitionError> {
    let connection = current.connection_state();
    let scan = current.scan_state();

    let next = match event {
        DeviceEvent::ScanStarted | DeviceEvent::ScanFinished | DeviceEvent::ScanReset => {
            match scan_step(scan, event) {
                Step::To(next_scan) => {
                    let next_connection = discovery_connection(connection, event);
                    Some(current.with_states(next_connection, next_scan))
                }
                Step::Stay => changed_if(
                    current,
                    discovery_connection(connection, event),
                    scan,
                ),
                Step::Illegal => return Err(illegal(current, event)),
            }
        }
        DeviceEvent::ConnectRequested if connection == ConnectionState::Uninitialized => {
            return Err(TransitionError::UnknownDevice {
                device_id: current.id().to_string(),
                event: event.name(),
            });
        }
        DeviceEvent::ConnectRequested
        | DeviceEvent::ConnectionEstablished
        | DeviceEvent::ConnectionLost
        | DeviceEvent::DisconnectRequested => match connection_step(connection, event) {
            Step::To(next_connection) => Some(current.with_connection_state(next_connection)),
            Step::Stay => None,
            Step::Illegal => return Err(illegal(current, event)),
        },
        DeviceEvent::ErrorObserved => {
            let next_connection = match connection {
                ConnectionState::Connecting => ConnectionState::Error,
                other => other,
            };
            changed_if(current, next_connection, ScanState::Error)
        }
        DeviceEvent::BatteryReported(level) => {
            (current.battery() != *level).then(|| current.with_battery(*level))
        }
        DeviceEvent::FirmwareReported(version) => {
            let updated = current.with_firmware_version(Some(version.clone()))?;
            (updated != *current).then_some(updated)
        }
        DeviceEvent::NameResolved(name) => {
            let updated = current.with_name(Some(name.clone()))?;
            (updated != *current).then_some(updated)
        }
    };

    Ok(next.map_or(Outcome::Unchanged, Outcome::Changed))
}

/// Classifies an event against an edge table.
///
/// An event re-delivered to the state its edge leads to is accepted as a
/// no-op; anything else without an edge is illegal.
fn step<S, I>(
    current: S,
    event: &DeviceEvent,
    states: I,
    edge: fn(S, &DeviceEvent) -> Option<S>,
) -> Step<S>
where
    S: Copy + PartialEq,
    I: IntoIterator<Item = S>,
{
    match edge(current, event) {
        Some(next) => Step::To(next),
        None if states
            .into_iter()
            .any(|from| edge(from, event) == Some(current)) =>
        {
            Step::Stay
        }
        None => Step::Illegal,
    }
}

fn scan_step(current: ScanState, event: &DeviceEvent) -> Step<ScanState> {
    step(current, event, ScanState::iter(), scan_edge)
}

fn scan_edge(current: ScanState, event: &DeviceEvent) -> Option<ScanState> {
    match (current, event) {
        (ScanState::Ready, DeviceEvent::ScanStarted) => Some(ScanState::Looking),
        (ScanState::Looking, DeviceEvent::ScanFinished) => Some(ScanState::Looked),
        (ScanState::Looked | ScanState::Error, DeviceEvent::ScanReset) => Some(ScanState::Ready),
        _ => None,
    }
}

fn connection_step(current: ConnectionState, event: &DeviceEvent) -> Step<ConnectionState> {
    step(current, event, ConnectionState::iter(), connection_edge)
}

fn connection_edge(current: ConnectionState, event: &DeviceEvent) -> Option<ConnectionState> {
    match (current, event) {
        (ConnectionState::Disconnected | ConnectionState::Error, DeviceEvent::ConnectRequested) => {
            Some(ConnectionState::Connecting)
        }
        (ConnectionState::Connecting, DeviceEvent::ConnectionEstablished) => {
            Some(ConnectionState::Connected)
        }
        (ConnectionState::Connecting | ConnectionState::Connected, DeviceEvent::ConnectionLost) => {
            Some(ConnectionState::Error)
        }
        (ConnectionState::Connected, DeviceEvent::DisconnectRequested) => {
            Some(ConnectionState::Disconnecting)
        }
        (ConnectionState::Disconnecting, DeviceEvent::ConnectionLost) => {
            Some(ConnectionState::Disconnected)
        }
        _ => None,
    }
}

/// A finished scan introduces the device to the connection layer.
fn discovery_connection(current: ConnectionState, event: &DeviceEvent) -> ConnectionState {
    match (current, event) {
        (ConnectionState::Uninitialized, DeviceEvent::ScanFinished) => ConnectionState::Disconnected,
        (other, _) => other,
    }
}

fn changed_if(
    current: &DeviceSnapshot,
    connection: ConnectionState,
    scan: ScanState,
) -> Option<DeviceSnapshot> {
    (current.connection_state() != connection || current.scan_state() != scan)
        .then(|| current.with_states(connection, scan))
}

fn illegal(current: &DeviceSnapshot, event: &DeviceEvent) -> TransitionError {
    TransitionError::IllegalTransition {
        device_id: current.id().to_string(),
        event: event.name(),
        connection_state: current.connection_state(),
        scan_state: current.scan_state(),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::state::{BatteryLevel, DeviceId};

    fn snapshot(connection: ConnectionState, scan: ScanState) -> DeviceSnapshot {
        DeviceSnapshot::first_seen(DeviceId::new("abc").expect("non-empty id"))
            .with_states(connection, scan)
    }

    fn connection_after(outcome: Outcome, before: &DeviceSnapshot) -> ConnectionState {
        match outcome {
            Outcome::Changed(next) => next.connection_state(),
            Outcome::Unchanged => before.connection_state(),
        }
    }

    #[rstest]
    #[case(ConnectionState::Disconnected, DeviceEvent::ConnectRequested, ConnectionState::Connecting)]
    #[case(ConnectionState::Connecting, DeviceEvent::ConnectionEstablished, ConnectionState::Connected)]
    #[case(ConnectionState::Connecting, DeviceEvent::ConnectionLost, ConnectionState::Error)]
    #[case(ConnectionState::Connecting, DeviceEvent::ErrorObserved, ConnectionState::Error)]
    #[case(ConnectionState::Connected, DeviceEvent::DisconnectRequested, ConnectionState::Disconnecting)]
    #[case(ConnectionState::Connected, DeviceEvent::ConnectionLost, ConnectionState::Error)]
    #[case(ConnectionState::Disconnecting, DeviceEvent::ConnectionLost, ConnectionState::Disconnected)]
    #[case(ConnectionState::Error, DeviceEvent::ConnectRequested, ConnectionState::Connecting)]
    fn connection_table_edges(
        #[case] from: ConnectionState,
        #[case] event: DeviceEvent,
        #[case] expected: ConnectionState,
    ) {
        let before = snapshot(from, ScanState::Ready);
        let outcome = apply(&before, &event).expect("table edge should be legal");
        assert_eq!(expected, connection_after(outcome, &before));
    }

    #[rstest]
    #[case(ConnectionState::Connected, DeviceEvent::ConnectionEstablished)]
    #[case(ConnectionState::Connecting, DeviceEvent::ConnectRequested)]
    #[case(ConnectionState::Disconnecting, DeviceEvent::DisconnectRequested)]
    #[case(ConnectionState::Error, DeviceEvent::ConnectionLost)]
    #[case(ConnectionState::Disconnected, DeviceEvent::ConnectionLost)]
    fn repeated_connection_events_are_no_ops(#[case] from: ConnectionState, #[case] event: DeviceEvent) {
        let before = snapshot(from, ScanState::Ready);
        assert_eq!(Ok(Outcome::Unchanged), apply(&before, &event));
    }

    #[test]
    fn every_unlisted_connection_pair_is_illegal() {
        let events = [
            DeviceEvent::ConnectRequested,
            DeviceEvent::ConnectionEstablished,
            DeviceEvent::ConnectionLost,
            DeviceEvent::DisconnectRequested,
        ];
        for from in ConnectionState::iter() {
            for event in &events {
                let before = snapshot(from, ScanState::Ready);
                let verdict = connection_step(from, event);
                let result = apply(&before, event);
                match verdict {
                    Step::Illegal if from == ConnectionState::Uninitialized
                        && *event == DeviceEvent::ConnectRequested =>
                    {
                        assert_matches!(result, Err(TransitionError::UnknownDevice { .. }));
                    }
                    Step::Illegal => assert_matches!(
                        result,
                        Err(TransitionError::IllegalTransition { connection_state, .. })
                            if connection_state == from
                    ),
                    Step::To(_) | Step::Stay => assert_matches!(result, Ok(_)),
                }
            }
        }
    }

    #[rstest]
    #[case(ScanState::Ready, DeviceEvent::ScanStarted, ScanState::Looking)]
    #[case(ScanState::Looking, DeviceEvent::ScanFinished, ScanState::Looked)]
    #[case(ScanState::Looked, DeviceEvent::ScanReset, ScanState::Ready)]
    #[case(ScanState::Error, DeviceEvent::ScanReset, ScanState::Ready)]
    #[case(ScanState::Ready, DeviceEvent::ErrorObserved, ScanState::Error)]
    #[case(ScanState::Looking, DeviceEvent::ErrorObserved, ScanState::Error)]
    #[case(ScanState::Looked, DeviceEvent::ErrorObserved, ScanState::Error)]
    fn scan_table_edges(#[case] from: ScanState, #[case] event: DeviceEvent, #[case] expected: ScanState) {
        let before = snapshot(ConnectionState::Disconnected, from);
        let outcome = apply(&before, &event).expect("scan edge should be legal");
        assert_matches!(outcome, Outcome::Changed(next) if next.scan_state() == expected);
    }

    #[rstest]
    #[case(ScanState::Ready, DeviceEvent::ScanFinished)]
    #[case(ScanState::Looked, DeviceEvent::ScanStarted)]
    #[case(ScanState::Error, DeviceEvent::ScanStarted)]
    #[case(ScanState::Looking, DeviceEvent::ScanReset)]
    fn scan_events_outside_the_table_are_illegal(#[case] from: ScanState, #[case] event: DeviceEvent) {
        let before = snapshot(ConnectionState::Disconnected, from);
        assert_matches!(
            apply(&before, &event),
            Err(TransitionError::IllegalTransition { scan_state, .. }) if scan_state == from
        );
    }

    #[rstest]
    #[case(ScanState::Looking, DeviceEvent::ScanStarted)]
    #[case(ScanState::Looked, DeviceEvent::ScanFinished)]
    #[case(ScanState::Ready, DeviceEvent::ScanReset)]
    fn repeated_scan_events_are_no_ops(#[case] from: ScanState, #[case] event: DeviceEvent) {
        let before = snapshot(ConnectionState::Disconnected, from);
        assert_eq!(Ok(Outcome::Unchanged), apply(&before, &event));
    }

    #[test]
    fn connection_no_ops_are_repeats_of_an_edge_into_the_current_state() {
        let expected = [
            (ConnectionState::Disconnected, DeviceEvent::ConnectionLost),
            (ConnectionState::Connecting, DeviceEvent::ConnectRequested),
            (ConnectionState::Connected, DeviceEvent::ConnectionEstablished),
            (ConnectionState::Disconnecting, DeviceEvent::DisconnectRequested),
            (ConnectionState::Error, DeviceEvent::ConnectionLost),
        ];
        let events = [
            DeviceEvent::ConnectRequested,
            DeviceEvent::ConnectionEstablished,
            DeviceEvent::ConnectionLost,
            DeviceEvent::DisconnectRequested,
        ];
        let mut stays = Vec::new();
        for from in ConnectionState::iter() {
            for event in &events {
                if connection_step(from, event) == Step::Stay {
                    stays.push((from, event.clone()));
                }
            }
        }
        assert_eq!(expected.to_vec(), stays);
    }

    #[test]
    fn finished_scan_initialises_the_connection_axis() {
        let before = snapshot(ConnectionState::Uninitialized, ScanState::Looking);
        let outcome = apply(&before, &DeviceEvent::ScanFinished).expect("scan may finish");
        assert_matches!(
            outcome,
            Outcome::Changed(next)
                if next.connection_state() == ConnectionState::Disconnected
                    && next.scan_state() == ScanState::Looked
        );
    }

    #[test]
    fn connect_before_discovery_reports_unknown_device() {
        let before = snapshot(ConnectionState::Uninitialized, ScanState::Looking);
        assert_matches!(
            apply(&before, &DeviceEvent::ConnectRequested),
            Err(TransitionError::UnknownDevice { device_id, event: "connect_requested" }) if device_id == "abc"
        );
    }

    #[test]
    fn error_while_connected_only_moves_the_scan_axis() {
        let before = snapshot(ConnectionState::Connected, ScanState::Looked);
        let outcome = apply(&before, &DeviceEvent::ErrorObserved).expect("errors are always accepted");
        assert_matches!(
            outcome,
            Outcome::Changed(next)
                if next.connection_state() == ConnectionState::Connected
                    && next.scan_state() == ScanState::Error
        );
    }

    #[test]
    fn repeated_error_is_a_no_op() {
        let before = snapshot(ConnectionState::Connected, ScanState::Error);
        assert_eq!(Ok(Outcome::Unchanged), apply(&before, &DeviceEvent::ErrorObserved));
    }

    #[test]
    fn metadata_events_update_only_their_field() {
        let before = snapshot(ConnectionState::Connected, ScanState::Looked);
        let level = BatteryLevel::new(64).expect("valid battery");

        let outcome = apply(&before, &DeviceEvent::BatteryReported(level)).expect("battery update");
        let Outcome::Changed(next) = outcome else {
            panic!("battery update should change the snapshot");
        };
        assert_eq!(level, next.battery());
        assert_eq!(before.connection_state(), next.connection_state());

        assert_eq!(Ok(Outcome::Unchanged), apply(&next, &DeviceEvent::BatteryReported(level)));
    }

    #[test]
    fn restating_firmware_is_a_no_op() {
        let before = snapshot(ConnectionState::Connected, ScanState::Looked)
            .with_firmware_version(Some("1.4.2".to_string()))
            .expect("short firmware string");
        assert_eq!(
            Ok(Outcome::Unchanged),
            apply(&before, &DeviceEvent::FirmwareReported("1.4.2".to_string()))
        );
    }
}
