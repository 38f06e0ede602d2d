use std::sync::Arc;

use serde::Serialize;

use super::{DeviceSnapshot, ScanState};

/// Service-wide view handed to observing clients.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct ServiceState {
    status: ScanState,
    glasses: Vec<Arc<DeviceSnapshot>>,
}

impl ServiceState {
    /// Builds a service state from the current snapshots.
    ///
    /// The status folds the per-device scan states (error wins over looking,
    /// looking over looked, looked over ready). Glasses are ordered by id.
    ///
    /// ```
    /// use g1sync::{ScanState, ServiceState};
    ///
    /// let empty = ServiceState::from_snapshots(Vec::new());
    /// assert_eq!(ScanState::Ready, empty.status());
    /// ```
    #[must_use]
    pub fn from_snapshots(mut glasses: Vec<Arc<DeviceSnapshot>>) -> Self {
        glasses.sort_by(|left, right| left.id().cmp(right.id()));
        let status = glasses
            .iter()
            .map(|snapshot| snapshot.scan_state())
            .max_by_key(|state| state.aggregate_rank())
            .unwrap_or_default();
        Self { status, glasses }
    }

    /// Returns the aggregated discovery status.
    #[must_use]
    pub fn status(&self) -> ScanState {
        self.status
    }

    /// Returns all tracked glasses, ordered by id.
    #[must_use]
    pub fn glasses(&self) -> &[Arc<DeviceSnapshot>] {
        &self.glasses
    }

    /// Looks up one pair of glasses by id.
    #[must_use]
    pub fn find(&self, device_id: &str) -> Option<&Arc<DeviceSnapshot>> {
        self.glasses
            .iter()
            .find(|snapshot| snapshot.id().as_str() == device_id)
    }
}
