use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, instrument};

use super::transition::{self, Outcome};
use super::{DeviceEvent, DeviceId, DeviceSnapshot, ServiceState};
use crate::error::TransitionError;

/// Owns the canonical snapshot of every tracked pair of glasses.
///
/// Readers clone an `Arc` to a fully built snapshot; writers build the
/// successor off to the side and swap it in under the write lock, so a reader
/// never sees half of a transition.
///
/// Observers are notified after the write lock is released. `publishing`
/// serializes writers so service states go out in the order they were
/// committed.
#[derive(Debug)]
pub struct DeviceStateMachine {
    devices: RwLock<HashMap<DeviceId, Arc<DeviceSnapshot>>>,
    publishing: Mutex<()>,
    published: watch::Sender<ServiceState>,
}

impl Default for DeviceStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceStateMachine {
    /// Creates a state machine tracking no devices.
    #[must_use]
    pub fn new() -> Self {
        let (published, _initial) = watch::channel(ServiceState::default());
        Self {
            devices: RwLock::new(HashMap::new()),
            publishing: Mutex::new(()),
            published,
        }
    }

    /// Applies one event to the device and returns the resulting snapshot.
    ///
    /// Discovery events create the device when it is not tracked yet. Events
    /// that leave the device unchanged return the current snapshot itself.
    ///
    /// # Errors
    ///
    /// Returns an error when `device_id` is empty, the device is not tracked
    /// and `event` is not a discovery event, or `event` is not valid from the
    /// current state. A failed transition leaves the stored snapshot untouched.
    ///
    /// ```
    /// use g1sync::{ConnectionState, DeviceEvent, DeviceStateMachine, ScanState};
    ///
    /// let machine = DeviceStateMachine::new();
    /// let snapshot = machine.transition("abc", DeviceEvent::ScanStarted)?;
    /// assert_eq!(ScanState::Looking, snapshot.scan_state());
    /// assert_eq!(ConnectionState::Uninitialized, snapshot.connection_state());
    /// # Ok::<(), g1sync::TransitionError>(())
    /// ```
    #[instrument(skip(self, event), level = "debug", fields(event = event.name()))]
    pub fn transition(
        &self,
        device_id: &str,
        event: DeviceEvent,
    ) -> Result<Arc<DeviceSnapshot>, TransitionError> {
        if device_id.is_empty() {
            return Err(TransitionError::EmptyDeviceId);
        }

        let _publishing = self.publishing.lock().unwrap_or_else(PoisonError::into_inner);
        let (next, state) = {
            let mut devices = self.devices.write().unwrap_or_else(PoisonError::into_inner);
            let (current, tracked) = match devices.get(device_id) {
                Some(snapshot) => (Arc::clone(snapshot), true),
                None if event.is_discovery() => {
                    let id = DeviceId::new(device_id)?;
                    (Arc::new(DeviceSnapshot::first_seen(id)), false)
                }
                None => {
                    return Err(TransitionError::UnknownDevice {
                        device_id: device_id.to_string(),
                        event: event.name(),
                    });
                }
            };

            let next = match transition::apply(&current, &event)? {
                Outcome::Changed(snapshot) => Arc::new(snapshot),
                Outcome::Unchanged if tracked => return Ok(current),
                Outcome::Unchanged => current,
            };
            devices.insert(next.id().clone(), Arc::clone(&next));
            (next, Self::service_state_of(&devices))
        };

        debug!(
            connection_state = %next.connection_state(),
            scan_state = %next.scan_state(),
            battery = %next.battery(),
            "accepted transition"
        );
        self.published.send_replace(state);
        Ok(next)
    }

    /// Returns the current snapshot for a device, if tracked.
    #[must_use]
    pub fn current_snapshot(&self, device_id: &str) -> Option<Arc<DeviceSnapshot>> {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(device_id)
            .cloned()
    }

    /// Stops tracking a device. Returns its last snapshot, if it was tracked.
    #[instrument(skip(self), level = "debug")]
    pub fn forget(&self, device_id: &str) -> Option<Arc<DeviceSnapshot>> {
        let _publishing = self.publishing.lock().unwrap_or_else(PoisonError::into_inner);
        let (removed, state) = {
            let mut devices = self.devices.write().unwrap_or_else(PoisonError::into_inner);
            let removed = devices.remove(device_id)?;
            (removed, Self::service_state_of(&devices))
        };
        debug!("forgot device");
        self.published.send_replace(state);
        Some(removed)
    }

    /// Returns the ids of all tracked devices, sorted.
    #[must_use]
    pub fn tracked_devices(&self) -> Vec<DeviceId> {
        let mut ids: Vec<DeviceId> = self
            .devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    /// Returns the current service-wide state.
    #[must_use]
    pub fn service_state(&self) -> ServiceState {
        self.published.borrow().clone()
    }

    /// Subscribes to service-state changes.
    ///
    /// The receiver starts at the current state and observes the latest state
    /// after every accepted change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ServiceState> {
        self.published.subscribe()
    }

    /// Returns a stream yielding the current service state, then every change.
    #[must_use]
    pub fn watch(&self) -> WatchStream<ServiceState> {
        WatchStream::new(self.subscribe())
    }

    fn service_state_of(devices: &HashMap<DeviceId, Arc<DeviceSnapshot>>) -> ServiceState {
        ServiceState::from_snapshots(devices.values().cloned().collect())
    }
}
