use std::io;

use anyhow::Result;
use serde::Serialize;
use serde_with::hex::Hex;
use serde_with::{formats::Uppercase, serde_as};
use tracing::instrument;

use crate::cli::OutputFormat;
use crate::codec::{ServiceStateCodec, SnapshotCodec};
use crate::state::{DeviceId, DeviceStateMachine};
use crate::terminal::TerminalClient;

use super::command::ScriptArgs;
use super::replay::replay_script;
use super::ui::{EncodedRecordsView, Painter};

/// Encoded records of one replayed service state.
#[serde_as]
#[derive(Debug, Serialize)]
pub(crate) struct EncodedRecords {
    #[serde_as(as = "Hex<Uppercase>")]
    service_state: Vec<u8>,
    glasses: Vec<EncodedSnapshot>,
}

#[serde_as]
#[derive(Debug, Serialize)]
pub(crate) struct EncodedSnapshot {
    id: DeviceId,
    #[serde_as(as = "Hex<Uppercase>")]
    record: Vec<u8>,
}

impl EncodedRecords {
    pub(crate) fn service_state(&self) -> &[u8] {
        &self.service_state
    }

    pub(crate) fn glasses(&self) -> impl Iterator<Item = (&DeviceId, &[u8])> {
        self.glasses
            .iter()
            .map(|encoded| (&encoded.id, encoded.record.as_slice()))
    }
}

/// Replays the script and encodes the resulting state.
fn encode_script(args: &ScriptArgs) -> EncodedRecords {
    let machine = DeviceStateMachine::new();
    replay_script(&machine, args.script());
    let state = machine.service_state();

    EncodedRecords {
        service_state: ServiceStateCodec::encode(&state),
        glasses: state
            .glasses()
            .iter()
            .map(|snapshot| EncodedSnapshot {
                id: snapshot.id().clone(),
                record: SnapshotCodec::encode(snapshot),
            })
            .collect(),
    }
}

/// Executes the `encode` command.
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
    let records = encode_script(args);

    match output_format {
        OutputFormat::Pretty => {
            let painter = Painter::new(terminal_client.stdout_is_terminal());
            writeln!(out, "{}", EncodedRecordsView::new(&records, &painter))?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &records)?;
            writeln!(out)?;
        }
    }

    Ok(())
}
