use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages (default for verbose)
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
#[command(name = "sieve")]
#[command(about = "sieve - compile structured filter/order expressions into backend-native queries")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (TOML, YAML or JSON)
    #[arg(short = 'C', long, global = true, env = "SIEVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Adapter override (postgres, mysql, sqlite, mssql, search)
    #[arg(short, long, global = true)]
    pub adapter: Option<String>,

    /// Set log level (off, error, warn, info, debug, trace)
    /// If not specified, uses config file value or defaults to 'warn'
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compile a filter (and optional order) for one entity
    ///
    /// JSON arguments may be given inline or as `@path` to read a file.
    Compile {
        /// Entity the expression targets
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        entity: String,

        /// Filter expression
        #[arg(short, long, value_name = "JSON")]
        filter: String,

        /// Order expression
        #[arg(short, long, value_name = "JSON")]
        order: Option<String>,
    },

    /// List types reachable from the roots, in walk order
    Discover {
        /// Root type (repeatable; defaults to `schema.roots`)
        #[arg(short, long = "root", value_name = "TYPE")]
        roots: Vec<String>,
    },

    /// Show the operator table for the bound adapter
    Operators {
        /// Only this kind (`string`, `integer`, `enum:Status`, ...)
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Generate filter/order/operator inputs for discovered types
    Inputs {
        /// Root type (repeatable; defaults to `schema.roots`)
        #[arg(short, long = "root", value_name = "TYPE")]
        roots: Vec<String>,
    },
}
