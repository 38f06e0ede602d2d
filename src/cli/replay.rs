use std::io;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use strum_macros::Display;
use tracing::{instrument, warn};

use crate::cli::OutputFormat;
use crate::error::TransitionError;
use crate::script::{EventScript, ScriptStep, StepOutcome};
use crate::state::{DeviceSnapshot, DeviceStateMachine, ServiceState};
use crate::terminal::TerminalClient;

use super::command::ScriptArgs;
use super::ui::{Painter, ServiceStateView, StepView};

/// How one script step ended.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub(crate) enum StepStatus {
    Changed,
    Unchanged,
    Forgotten,
    NotTracked,
    Rejected,
}

/// Outcome of one script step, ready for printing.
#[derive(Debug, Serialize)]
pub(crate) struct StepReport {
    step: String,
    status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<Arc<DeviceSnapshot>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl StepReport {
    fn new(step: &ScriptStep, result: Result<StepOutcome, TransitionError>) -> Self {
        let (status, snapshot, error) = match result {
            Ok(StepOutcome::Changed(snapshot)) => (StepStatus::Changed, Some(snapshot), None),
            Ok(StepOutcome::Unchanged(snapshot)) => (StepStatus::Unchanged, Some(snapshot), None),
            Ok(StepOutcome::Forgotten(Some(_last))) => (StepStatus::Forgotten, None, None),
            Ok(StepOutcome::Forgotten(None)) => (StepStatus::NotTracked, None, None),
            Err(error) => (StepStatus::Rejected, None, Some(error.to_string())),
        };
        Self {
            step: step.to_string(),
            status,
            snapshot,
            error,
        }
    }

    pub(crate) fn step(&self) -> &str {
        &self.step
    }

    pub(crate) fn status(&self) -> StepStatus {
        self.status
    }

    pub(crate) fn snapshot(&self) -> Option<&DeviceSnapshot> {
        self.snapshot.as_deref()
    }

    pub(crate) fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[derive(Debug, Serialize)]
struct ReplayReport<'a> {
    steps: &'a [StepReport],
    state: &'a ServiceState,
}

/// Applies one script step, logging rejections instead of failing.
pub(crate) fn apply_step(machine: &DeviceStateMachine, step: &ScriptStep) -> StepReport {
    let result = step.apply(machine);
    if let Err(error) = &result {
        warn!(step = %step, %error, "rejected script step");
    }
    StepReport::new(step, result)
}

/// Applies every step of `script` in order.
pub(crate) fn replay_script(machine: &DeviceStateMachine, script: &EventScript) -> Vec<StepReport> {
    script
        .steps()
        .iter()
        .map(|step| apply_step(machine, step))
        .collect()
}

/// Executes the `replay` command.
#[instrument(skip(args, out, terminal_client), level = "info", fields(?output_format))]
pub(crate) fn run<W>(
    args: &ScriptArgs,
    out: &mut W,
    terminal_client: &dyn TerminalClient,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    let machine = DeviceStateMachine::new();
    let steps = replay_script(&machine, args.script());
    let state = machine.service_state();

    match output_format {
        OutputFormat::Pretty => {
            let painter = Painter::new(terminal_client.stdout_is_terminal());
            for report in &steps {
                writeln!(out, "{}", StepView::new(report, &painter))?;
            }
            writeln!(out)?;
            writeln!(out, "{}", ServiceStateView::new(&state, &painter))?;
        }
        OutputFormat::Json => {
            let report = ReplayReport {
                steps: &steps,
                state: &state,
            };
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn rejected_steps_do_not_stop_the_replay() {
        let machine = DeviceStateMachine::new();
        let script: EventScript = "abc|connect_requested;abc|scan_started;abc|forget;abc|forget"
            .parse()
            .expect("script should parse");

        let statuses: Vec<StepStatus> = replay_script(&machine, &script)
            .iter()
            .map(StepReport::status)
            .collect();
        assert_eq!(
            vec![
                StepStatus::Rejected,
                StepStatus::Changed,
                StepStatus::Forgotten,
                StepStatus::NotTracked,
            ],
            statuses
        );
    }

    #[test]
    fn rejected_report_carries_the_error_message() {
        let machine = DeviceStateMachine::new();
        let step: ScriptStep = "abc|connect_requested".parse().expect("step should parse");
        let report = apply_step(&machine, &step);

        assert_eq!(StepStatus::Rejected, report.status());
        assert_eq!(
            Some(
                "device `abc` is not known to the connection layer; `connect_requested` cannot be applied"
            ),
            report.error()
        );
        assert_eq!(None, report.snapshot());
    }
}
