use std::fmt::{self, Display, Formatter};

use crate::cli::replay::{StepReport, StepStatus};

use super::painter::Painter;

/// Renders one replayed script step as a single line.
pub(crate) struct StepView<'a> {
    report: &'a StepReport,
    painter: &'a Painter,
}

impl<'a> StepView<'a> {
    pub(crate) fn new(report: &'a StepReport, painter: &'a Painter) -> Self {
        Self { report, painter }
    }
}

impl Display for StepView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let painter = self.painter;
        let status = self.report.status();
        let label = match status {
            StepStatus::Changed => painter.success(status.to_string()),
            StepStatus::Rejected => painter.failure(status.to_string()),
            StepStatus::Unchanged | StepStatus::Forgotten | StepStatus::NotTracked => {
                painter.muted(status.to_string())
            }
        };
        write!(f, "{} {label}", painter.value(self.report.step()))?;

        if let Some(snapshot) = self.report.snapshot()
            && status == StepStatus::Changed
        {
            write!(
                f,
                ": {} / {}, battery {}",
                painter.connection_state(snapshot.connection_state()),
                painter.scan_state(snapshot.scan_state()),
                snapshot.battery()
            )?;
        }
        if let Some(error) = self.report.error() {
            write!(f, ": {error}")?;
        }
        Ok(())
    }
}
