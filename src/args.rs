use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;

use crate::store::DEFAULT_DATA_FILE;

/// Student records sidecar. Reads one JSON request per line on stdin and
/// answers one JSON response per line on stdout. Logs go to stderr.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct StudentdArgs {
    /// Workspace directory to open at startup (same as a workspace.select request)
    #[arg(short, long)]
    pub workspace: Option<PathBuf>,

    /// Roster file name inside the workspace
    #[arg(long, default_value = DEFAULT_DATA_FILE)]
    pub data_file: String,

    /// Root log level for the stderr logger
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// log4rs YAML file; replaces the stderr logger when it loads
    #[arg(long)]
    pub logging_config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}
