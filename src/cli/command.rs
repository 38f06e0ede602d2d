use std::time::Duration;

use bon::Builder;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::level_filters::LevelFilter;

use crate::cli::decode::HexRecord;
use crate::script::EventScript;

/// Command-line options for the G1 glasses state tool.
#[derive(Debug, Parser)]
#[command(
    name = "g1sync",
    about = "Replay connection and discovery events for Even G1 glasses and exchange snapshot records."
)]
pub struct Args {
    /// Overrides `RUST_LOG` for diagnostic output on stderr.
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,
    /// Output format; defaults to pretty on a terminal and JSON otherwise.
    #[arg(long = "output", global = true, value_enum)]
    output_format: Option<OutputFormat>,
    #[command(subcommand)]
    command: Command,
}

impl Args {
    /// Creates argument values directly without CLI parsing.
    ///
    /// ```
    /// use g1sync::{Args, Command, ScriptArgs};
    ///
    /// let args = Args::new(Command::Replay(ScriptArgs::new("abc|scan_started".parse()?)));
    /// assert_eq!(None, args.log_level());
    /// # Ok::<(), g1sync::ScriptError>(())
    /// ```
    #[must_use]
    pub fn new(command: Command) -> Self {
        Self {
            log_level: None,
            output_format: None,
            command,
        }
    }

    /// Returns the requested log level, if any.
    #[must_use]
    pub fn log_level(&self) -> Option<LogLevel> {
        self.log_level
    }

    /// Returns the requested output format, if any.
    #[must_use]
    pub fn output_format(&self) -> Option<OutputFormat> {
        self.output_format
    }

    /// Consumes the arguments, returning the selected command.
    #[must_use]
    pub fn into_command(self) -> Command {
        self.command
    }
}

/// Log levels accepted by `--log-level`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Converts to the equivalent tracing filter.
    #[must_use]
    pub fn as_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::ERROR,
            Self::Warn => LevelFilter::WARN,
            Self::Info => LevelFilter::INFO,
            Self::Debug => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }
}

/// Output styles for command results.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    Pretty,
    /// JSON documents.
    Json,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply an event script and print each step's outcome and the final service state.
    Replay(ScriptArgs),
    /// Apply an event script and print the resulting records as hexadecimal.
    Encode(ScriptArgs),
    /// Decode a hexadecimal snapshot or service-state record.
    Decode(DecodeArgs),
    /// Apply an event script step by step while printing every published service state.
    Watch(WatchArgs),
}

/// Arguments for commands driven by an event script.
#[derive(Debug, Clone, clap::Args)]
pub struct ScriptArgs {
    /// Events in the form `device_id|event;...` (e.g. `left|scan_started;left|battery=80`).
    #[arg(long)]
    script: EventScript,
}

impl ScriptArgs {
    /// Creates script arguments directly without CLI parsing.
    #[must_use]
    pub fn new(script: EventScript) -> Self {
        Self { script }
    }

    pub(crate) fn script(&self) -> &EventScript {
        &self.script
    }
}

/// Arguments for the `decode` command.
#[derive(Debug, Clone, clap::Args)]
pub struct DecodeArgs {
    /// Record bytes as hexadecimal; whitespace is ignored.
    record: HexRecord,
    /// Decodes a whole service-state record instead of a single snapshot.
    #[arg(long)]
    service_state: bool,
}

impl DecodeArgs {
    /// Creates decode arguments directly without CLI parsing.
    #[must_use]
    pub fn new(record: Vec<u8>, service_state: bool) -> Self {
        Self {
            record: HexRecord::from(record),
            service_state,
        }
    }

    pub(crate) fn record(&self) -> &[u8] {
        self.record.as_ref()
    }

    pub(crate) fn service_state(&self) -> bool {
        self.service_state
    }
}

/// Arguments for the `watch` command.
#[derive(Debug, Clone, clap::Args, Builder)]
pub struct WatchArgs {
    /// Events in the form `device_id|event;...`.
    #[arg(long)]
    script: EventScript,
    /// Pause before each step (e.g. `250ms`, `1s`).
    #[arg(long, value_parser = parse_duration, default_value = "0s")]
    #[builder(default)]
    step_delay: Duration,
}

impl WatchArgs {
    pub(crate) fn into_parts(self) -> (EventScript, Duration) {
        (self.script, self.step_delay)
    }
}

fn parse_duration(value: &str) -> Result<Duration, String> {
    humantime::parse_duration(value).map_err(|error| error.to_string())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use clap::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn global_flags_parse_after_the_subcommand() {
        let args = Args::try_parse_from([
            "g1sync",
            "replay",
            "--script",
            "abc|scan_started",
            "--log-level",
            "debug",
            "--output",
            "json",
        ])
        .expect("valid arguments should parse");

        assert_eq!(Some(LogLevel::Debug), args.log_level());
        assert_eq!(Some(OutputFormat::Json), args.output_format());
        assert_matches!(args.into_command(), Command::Replay(_));
    }

    #[test]
    fn replay_requires_a_script() {
        let error = Args::try_parse_from(["g1sync", "replay"])
            .expect_err("missing --script should fail argument parsing");
        assert_eq!(ErrorKind::MissingRequiredArgument, error.kind());
    }

    #[test]
    fn invalid_script_is_a_value_error() {
        let error = Args::try_parse_from(["g1sync", "encode", "--script", "abc|teleport"])
            .expect_err("unknown events should fail argument parsing");
        assert_eq!(ErrorKind::ValueValidation, error.kind());
    }

    #[test]
    fn decode_rejects_odd_length_hex() {
        let error = Args::try_parse_from(["g1sync", "decode", "ABC"])
            .expect_err("odd-length hex should fail argument parsing");
        assert_eq!(ErrorKind::ValueValidation, error.kind());
    }

    #[test]
    fn watch_parses_step_delay() {
        let args = Args::try_parse_from([
            "g1sync",
            "watch",
            "--script",
            "abc|scan_started",
            "--step-delay",
            "250ms",
        ])
        .expect("valid arguments should parse");

        let Command::Watch(watch) = args.into_command() else {
            panic!("expected watch command");
        };
        assert_eq!(Duration::from_millis(250), watch.into_parts().1);
    }

    #[test]
    fn watch_step_delay_defaults_to_zero() {
        let args = Args::try_parse_from(["g1sync", "watch", "--script", "abc|scan_started"])
            .expect("valid arguments should parse");

        let Command::Watch(watch) = args.into_command() else {
            panic!("expected watch command");
        };
        assert_eq!(Duration::ZERO, watch.into_parts().1);
    }

    #[rstest]
    #[case(LogLevel::Error, LevelFilter::ERROR)]
    #[case(LogLevel::Warn, LevelFilter::WARN)]
    #[case(LogLevel::Info, LevelFilter::INFO)]
    #[case(LogLevel::Debug, LevelFilter::DEBUG)]
    #[case(LogLevel::Trace, LevelFilter::TRACE)]
    fn log_levels_map_to_filters(#[case] level: LogLevel, #[case] expected: LevelFilter) {
        assert_eq!(expected, level.as_level_filter());
    }
}
