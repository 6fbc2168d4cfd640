// src/cli.rs

//! Command-line interface of the `signalwatch` binary.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::loader::default_config_path;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "signalwatch",
    version,
    about = "Aggregate signals from providers and emit debounced actions as JSON lines.",
    long_about = None
)]
pub struct CliArgs {
    /// Config file to load. Files ending in `.json` are read as JSON, all
    /// others as TOML.
    #[arg(short, long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Override the log filter. Falls back to `SIGNALWATCH_LOG`, then `info`.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate the config and print groups and providers without starting
    /// any provider.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

pub fn parse() -> CliArgs {
    CliArgs::parse()
}
