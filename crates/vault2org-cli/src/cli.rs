use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;
use vault2org_config::ConverterKind;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages (default)
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "vault2org")]
#[command(about = "vault2org - convert an Obsidian vault into Org-roam notes")]
#[command(version)]
pub struct Cli {
    /// Obsidian vault to convert
    pub input: PathBuf,

    /// Directory the Org-roam files are written to (created if missing)
    pub output: PathBuf,

    /// Config file path (defaults to ~/.config/vault2org/config.toml)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Worker threads for rendering (overrides config file)
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Body converter: builtin or pandoc (overrides config file)
    #[arg(long, value_name = "KIND")]
    pub converter: Option<ConverterKind>,

    /// Pandoc executable (overrides config file)
    #[arg(long = "pandoc", value_name = "PATH")]
    pub pandoc: Option<PathBuf>,

    /// Cache converted bodies in this directory
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Set log level (off, error, warn, info, debug, trace)
    /// If not specified, uses RUST_LOG or defaults to 'info'
    #[arg(short = 'l', long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable the progress bar
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

impl Cli {
    /// Level requested on the command line, `--log-level` beating `--verbose`
    pub fn log_level(&self) -> Option<LogLevel> {
        self.log_level.or(self.verbose.then_some(LogLevel::Debug))
    }
}
