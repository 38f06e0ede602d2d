mod battery;
mod connection;
mod event;
mod machine;
mod scan;
mod service_state;
mod snapshot;
mod transition;

pub use self::battery::{BatteryError, BatteryLevel};
pub use self::connection::ConnectionState;
pub use self::event::DeviceEvent;
pub use self::machine::DeviceStateMachine;
pub use self::scan::ScanState;
pub use self::service_state::ServiceState;
pub use self::snapshot::{DeviceId, DeviceSnapshot};
