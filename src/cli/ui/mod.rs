mod painter;
mod records_view;
mod snapshot_view;
mod step_view;
mod table;

pub(crate) use self::painter::Painter;
pub(crate) use self::records_view::EncodedRecordsView;
pub(crate) use self::snapshot_view::{ServiceStateView, SnapshotView};
pub(crate) use self::step_view::StepView;
