use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;
use tokio_stream::StreamExt;
use tracing::{debug, instrument};

use crate::cli::OutputFormat;
use crate::script::EventScript;
use crate::state::DeviceStateMachine;
use crate::terminal::TerminalClient;

use super::command::WatchArgs;
use super::replay::apply_step;
use super::ui::{Painter, ServiceStateView};

/// Executes the `watch` command.
///
/// A background task replays the script while this task prints every
/// service state the observer stream yields. The stream ends once the
/// replay task drops the state machine.
#[instrument(skip(args, out, terminal_client), level = "info", fields(?output_format))]
pub(crate) async fn run<W>(
    args: WatchArgs,
    out: &mut W,
    terminal_client: &dyn TerminalClient,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    let (script, step_delay) = args.into_parts();
    let machine = Arc::new(DeviceStateMachine::new());
    let mut states = machine.watch();
    let replay = tokio::spawn(replay_with_delay(machine, script, step_delay));

    let painter = Painter::new(terminal_client.stdout_is_terminal());
    let mut printed = 0usize;
    while let Some(state) = states.next().await {
        match output_format {
            OutputFormat::Pretty => {
                if printed > 0 {
                    writeln!(out)?;
                }
                writeln!(out, "{}", ServiceStateView::new(&state, &painter))?;
            }
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, &state)?;
                writeln!(out)?;
            }
        }
        printed += 1;
    }

    replay.await?;
    debug!(printed, "observer stream closed");
    Ok(())
}

async fn replay_with_delay(
    machine: Arc<DeviceStateMachine>,
    script: EventScript,
    step_delay: Duration,
) {
    for step in script.steps() {
        if !step_delay.is_zero() {
            sleep(step_delay).await;
        }
        apply_step(&machine, step);
        tokio::task::yield_now().await;
    }
}
