use std::io;

use anyhow::Result;
use tracing::instrument;

use crate::cli::{Command, LogLevel, OutputFormat};
use crate::telemetry;
use crate::terminal::{SystemTerminalClient, TerminalClient};

const SERVICE_NAME: &str = "g1sync";

/// Runs the CLI command against the process's real terminal.
///
/// ```
/// # async fn run() -> anyhow::Result<()> {
/// use clap::Parser;
///
/// let args = g1sync::Args::try_parse_from([
///     "g1sync",
///     "replay",
///     "--script",
///     "left|scan_started;left|scan_finished",
/// ])?;
/// let mut out = Vec::new();
/// g1sync::run(args.into_command(), &mut out, g1sync::OutputFormat::Json).await?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if tracing initialisation fails, a record cannot be
/// decoded, or output writing fails.
pub async fn run<W>(command: Command, out: &mut W, output_format: OutputFormat) -> Result<()>
where
    W: io::Write,
{
    run_with_log_level(command, out, output_format, None).await
}

/// Runs the CLI command with an explicit telemetry log-level override.
///
/// # Errors
///
/// Returns an error if tracing initialisation fails, a record cannot be
/// decoded, or output writing fails.
pub async fn run_with_log_level<W>(
    command: Command,
    out: &mut W,
    output_format: OutputFormat,
    log_level: Option<LogLevel>,
) -> Result<()>
where
    W: io::Write,
{
    run_with_clients_and_log_level(
        command,
        out,
        &SystemTerminalClient,
        output_format,
        log_level,
    )
    .await
}

/// Runs the CLI command with an injected terminal client.
///
/// # Errors
///
/// Returns an error if tracing initialisation fails, a record cannot be
/// decoded, or output writing fails.
pub async fn run_with_clients<W>(
    command: Command,
    out: &mut W,
    terminal_client: &dyn TerminalClient,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    run_with_clients_and_log_level(command, out, terminal_client, output_format, None).await
}

/// Runs the CLI command with injected clients and explicit telemetry settings.
///
/// ```
/// # async fn run() -> anyhow::Result<()> {
/// use clap::Parser;
///
/// struct FakeTerminal;
/// impl g1sync::TerminalClient for FakeTerminal {
///     fn stdout_is_terminal(&self) -> bool { false }
///     fn stderr_is_terminal(&self) -> bool { false }
/// }
///
/// let args = g1sync::Args::try_parse_from([
///     "g1sync",
///     "--log-level",
///     "trace",
///     "encode",
///     "--script",
///     "left|scan_started",
/// ])?;
/// let log_level = args.log_level();
/// let mut out = Vec::new();
/// g1sync::run_with_clients_and_log_level(
///     args.into_command(),
///     &mut out,
///     &FakeTerminal,
///     g1sync::OutputFormat::Pretty,
///     log_level,
/// ).await?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if tracing initialisation fails, a record cannot be
/// decoded, or output writing fails.
#[instrument(
    skip(out, terminal_client),
    level = "info",
    fields(command = %command_name(&command), ?log_level)
)]
pub async fn run_with_clients_and_log_level<W>(
    command: Command,
    out: &mut W,
    terminal_client: &dyn TerminalClient,
    output_format: OutputFormat,
    log_level: Option<LogLevel>,
) -> Result<()>
where
    W: io::Write,
{
    telemetry::initialise_tracing(
        SERVICE_NAME,
        terminal_client.stderr_is_terminal(),
        log_level.map(LogLevel::as_level_filter),
    )?;

    match command {
        Command::Replay(args) => {
            crate::cli::replay::run(&args, out, terminal_client, output_format)
        }
        Command::Encode(args) => {
            crate::cli::encode::run(&args, out, terminal_client, output_format)
        }
        Command::Decode(args) => {
            crate::cli::decode::run(&args, out, terminal_client, output_format)
        }
        Command::Watch(args) => {
            crate::cli::watch::run(args, out, terminal_client, output_format).await
        }
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Replay(_args) => "replay",
        Command::Encode(_args) => "encode",
        Command::Decode(_args) => "decode",
        Command::Watch(_args) => "watch",
    }
}
