use std::fmt::{self, Display, Formatter};

use crate::state::{DeviceSnapshot, ServiceState};

use super::painter::Painter;
use super::table::Table;

const GLASSES_HEADER: [&str; 6] = ["id", "name", "connection", "scan", "battery", "firmware"];

/// Renders one snapshot as a field/value table.
pub(crate) struct SnapshotView<'a> {
    snapshot: &'a DeviceSnapshot,
    painter: &'a Painter,
}

impl<'a> SnapshotView<'a> {
    pub(crate) fn new(snapshot: &'a DeviceSnapshot, painter: &'a Painter) -> Self {
        Self { snapshot, painter }
    }
}

impl Display for SnapshotView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let painter = self.painter;
        let snapshot = self.snapshot;
        let table = Table::fields(
            painter,
            vec![
                ("id", painter.value(snapshot.id())),
                ("name", painter.optional(snapshot.name())),
                (
                    "connection_state",
                    painter.connection_state(snapshot.connection_state()),
                ),
                ("scan_state", painter.scan_state(snapshot.scan_state())),
                ("battery", painter.value(snapshot.battery().to_string())),
                (
                    "firmware_version",
                    painter.optional(snapshot.firmware_version()),
                ),
            ],
        );
        write!(f, "{table}")
    }
}

/// Renders the service status followed by one table row per pair of glasses.
pub(crate) struct ServiceStateView<'a> {
    state: &'a ServiceState,
    painter: &'a Painter,
}

impl<'a> ServiceStateView<'a> {
    pub(crate) fn new(state: &'a ServiceState, painter: &'a Painter) -> Self {
        Self { state, painter }
    }
}

impl Display for ServiceStateView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let painter = self.painter;
        write!(
            f,
            "{} {}",
            painter.heading("Service status:"),
            painter.scan_state(self.state.status())
        )?;
        if self.state.glasses().is_empty() {
            return write!(f, "\n{}", painter.muted("no glasses tracked"));
        }

        let mut table = Table::with_header(GLASSES_HEADER);
        for snapshot in self.state.glasses() {
            table.push(vec![
                painter.value(snapshot.id()),
                painter.optional(snapshot.name()),
                painter.connection_state(snapshot.connection_state()),
                painter.scan_state(snapshot.scan_state()),
                snapshot.battery().to_string(),
                painter.optional(snapshot.firmware_version()),
            ]);
        }
        write!(f, "\n{table}")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::state::{BatteryLevel, ConnectionState, ScanState};

    fn left() -> DeviceSnapshot {
        DeviceSnapshot::builder()
            .id("left-a1b2")
            .name("Even G1_L")
            .connection_state(ConnectionState::Connected)
            .scan_state(ScanState::Looked)
            .battery(BatteryLevel::new(82).expect("valid battery"))
            .build()
            .expect("valid snapshot")
    }

    #[test]
    fn snapshot_view_lists_every_field() {
        let painter = Painter::new(false);
        let snapshot = left();
        let rendered = SnapshotView::new(&snapshot, &painter).to_string();

        for expected in [
            "left-a1b2",
            "Even G1_L",
            "connected",
            "looked",
            "82%",
            "firmware_version",
        ] {
            assert!(rendered.contains(expected), "missing {expected} in:\n{rendered}");
        }
    }

    #[test]
    fn empty_service_state_says_so() {
        let painter = Painter::new(false);
        let state = ServiceState::default();
        assert_eq!(
            "Service status: ready\nno glasses tracked",
            ServiceStateView::new(&state, &painter).to_string()
        );
    }

    #[test]
    fn service_state_view_has_a_row_per_device() {
        let painter = Painter::new(false);
        let right = DeviceSnapshot::builder()
            .id("right-c3d4")
            .scan_state(ScanState::Looking)
            .build()
            .expect("valid snapshot");
        let state = ServiceState::from_snapshots(vec![Arc::new(right), Arc::new(left())]);
        let rendered = ServiceStateView::new(&state, &painter).to_string();

        let mut lines = rendered.lines();
        assert_eq!(Some("Service status: looking"), lines.next());
        let left_row = rendered.find("left-a1b2").expect("left row");
        let right_row = rendered.find("right-c3d4").expect("right row");
        assert!(left_row < right_row);
        assert!(rendered.contains("unknown"));
    }
}
