pub(crate) mod command;
pub(crate) mod decode;
pub(crate) mod encode;
pub(crate) mod replay;
pub(crate) mod ui;
pub(crate) mod watch;

pub use self::command::{
    Args, Command, DecodeArgs, LogLevel, OutputFormat, ScriptArgs, WatchArgs,
};
