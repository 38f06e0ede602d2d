mod record;
mod service_state_codec;
mod snapshot_codec;

pub use self::service_state_codec::ServiceStateCodec;
pub use self::snapshot_codec::SnapshotCodec;
