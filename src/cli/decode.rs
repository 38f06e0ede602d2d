use std::io;
use std::str::FromStr;

use anyhow::Result;
use tracing::instrument;

use crate::cli::OutputFormat;
use crate::codec::{ServiceStateCodec, SnapshotCodec};
use crate::error::SyncError;
use crate::terminal::TerminalClient;

use super::command::DecodeArgs;
use super::ui::{Painter, ServiceStateView, SnapshotView};

/// Record bytes parsed from hexadecimal text.
#[derive(Debug, Clone, Eq, PartialEq, derive_more::From, derive_more::Into)]
pub(crate) struct HexRecord(Vec<u8>);

impl AsRef<[u8]> for HexRecord {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for HexRecord {
    type Err = hex::FromHexError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let cleaned: String = value.chars().filter(|c| !c.is_whitespace()).collect();
        Ok(Self(hex::decode(cleaned)?))
    }
}

/// Executes the `decode` command.
#[instrument(skip(args, out, terminal_client), level = "info", fields(?output_format))]
pub(crate) fn run<W>(
    args: &DecodeArgs,
    out: &mut W,
    terminal_client: &dyn TerminalClient,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    let painter = Painter::new(terminal_client.stdout_is_terminal());

    if args.service_state() {
        let state = ServiceStateCodec::decode(args.record()).map_err(SyncError::from)?;
        match output_format {
            OutputFormat::Pretty => writeln!(out, "{}", ServiceStateView::new(&state, &painter))?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, &state)?;
                writeln!(out)?;
            }
        }
    } else {
        let snapshot = SnapshotCodec::decode(args.record()).map_err(SyncError::from)?;
        match output_format {
            OutputFormat::Pretty => writeln!(out, "{}", SnapshotView::new(&snapshot, &painter))?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, &snapshot)?;
                writeln!(out)?;
            }
        }
    }

    Ok(())
}
